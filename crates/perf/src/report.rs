//! Performance report generation

use crate::utils::{format_duration, format_throughput, BenchResult};
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct BenchEntry {
    pub name: String,
    pub size: Option<usize>,
    pub result: BenchResult,
    pub throughput: Option<f64>,
    /// Predicate evaluations per run
    pub calls: Option<usize>,
    pub target: Option<&'static str>,
    pub passed: Option<bool>,
}

impl BenchEntry {
    pub fn new(name: &str, size: Option<usize>, result: BenchResult) -> Self {
        Self {
            name: name.to_string(),
            size,
            result,
            throughput: None,
            calls: None,
            target: None,
            passed: None,
        }
    }

    pub fn throughput(mut self, ops_per_sec: f64) -> Self {
        self.throughput = Some(ops_per_sec);
        self
    }

    pub fn calls(mut self, calls: usize) -> Self {
        self.calls = Some(calls);
        self
    }

    /// Marks the entry against a mean-time target in microseconds.
    pub fn target_us(mut self, label: &'static str, max_us: f64) -> Self {
        self.passed = Some(self.result.mean_us() < max_us);
        self.target = Some(label);
        self
    }
}

#[derive(Default)]
pub struct Report {
    categories: BTreeMap<String, Vec<BenchEntry>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: &str, entry: BenchEntry) {
        println!("    {}", line(&entry));
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(entry);
    }

    fn entries(&self) -> impl Iterator<Item = &BenchEntry> {
        self.categories.values().flatten()
    }

    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                      PERFORMANCE SUMMARY                         ║");
        println!("╚══════════════════════════════════════════════════════════════════╝\n");

        for (category, entries) in &self.categories {
            println!("┌─ {} ─", category);
            for entry in entries {
                println!("│ {}", line(entry));
            }
            println!("└─");
            println!();
        }

        let total = self.entries().filter(|e| e.passed.is_some()).count();
        let failed = self.entries().filter(|e| e.passed == Some(false)).count();
        if total > 0 {
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!(
                "  Target Checks: {} passed, {} failed, {} total",
                total - failed,
                failed,
                total
            );
            if failed > 0 {
                println!("  Status: SOME TARGETS NOT MET");
            } else {
                println!("  Status: ALL TARGETS MET ✓");
            }
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        }
    }
}

fn line(entry: &BenchEntry) -> String {
    let status = match entry.passed {
        Some(true) => "✓",
        Some(false) => "✗",
        None => " ",
    };
    let size = entry
        .size
        .map(|s| format!(" [{:>6}]", format_size(s)))
        .unwrap_or_default();
    let throughput = entry
        .throughput
        .map(|t| format!(" ({})", format_throughput(t)))
        .unwrap_or_default();
    let calls = entry
        .calls
        .map(|c| format!(" {} predicate calls", c))
        .unwrap_or_default();
    let target = entry
        .target
        .map(|t| format!(" [target: {}]", t))
        .unwrap_or_default();

    format!(
        "{} {:<28}{}: {:>12}{}{}{}",
        status,
        entry.name,
        size,
        format_duration(entry.result.mean),
        throughput,
        calls,
        target
    )
}

fn format_size(size: usize) -> String {
    if size >= 1_000_000 {
        format!("{}M", size / 1_000_000)
    } else if size >= 1_000 {
        format!("{}K", size / 1_000)
    } else {
        format!("{}", size)
    }
}
