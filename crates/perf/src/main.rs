//! Prism performance runner.
//!
//! Times bulk loads under stacked views and the per-event cost of keeping a
//! view current. Set `RUST_LOG=info` for predicate call counts and sizes,
//! `RUST_LOG=prism_view=debug` to watch every materialization.

mod bench;
mod report;
mod utils;

use report::Report;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    println!("Prism Performance Benchmarks\n");
    let mut report = Report::new();

    println!("[1/2] Bulk load");
    bench::load::run(&mut report);
    println!();

    println!("[2/2] View maintenance");
    bench::view::run(&mut report);
    println!();

    report.print_summary();
}
