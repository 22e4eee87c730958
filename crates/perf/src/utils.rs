//! Timing, fixtures and formatting helpers

use prism_reactive::Model;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Number of iterations for each benchmark
pub const ITERATIONS: usize = 20;

/// Warmup iterations before measurement
pub const WARMUP_ITERATIONS: usize = 3;

/// Collection sizes for view maintenance runs
pub const SIZES: [usize; 3] = [100, 1_000, 10_000];

/// Size of the bulk-load scenario
pub const LOAD_SIZE: usize = 2_000;

const NAMES: [&str; 7] = ["Cat", "Dog", "Turtle", "Dinosaur", "Fish", "Pony", "Axolotl"];

/// One bulk-load item: everyone active, four in five cool.
pub fn make_item(id: usize, seed: u64) -> Rc<Model> {
    let name = NAMES[(mix(seed ^ id as u64) % NAMES.len() as u64) as usize];
    Rc::new(
        Model::new()
            .with("id", id as i64)
            .with("name", name)
            .with("active", true)
            .with("cool", id % 5 != 0),
    )
}

/// Fresh item instances, ids `0..count`.
pub fn make_items(count: usize, seed: u64) -> Vec<Rc<Model>> {
    (0..count).map(|id| make_item(id, seed)).collect()
}

/// Deterministic scrambling for reproducible fixtures.
fn mix(mut s: u64) -> u64 {
    s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    s ^ (s >> 33)
}

/// Measure execution time with setup excluded (includes warmup)
pub fn measure_with_setup<S, F, T, R>(iterations: usize, mut setup: S, mut f: F) -> BenchResult
where
    S: FnMut() -> T,
    F: FnMut(T) -> R,
{
    for _ in 0..WARMUP_ITERATIONS {
        let data = setup();
        std::hint::black_box(f(data));
    }

    let mut times = Vec::with_capacity(iterations);

    for _ in 0..iterations {
        let data = setup();
        let start = Instant::now();
        std::hint::black_box(f(data));
        times.push(start.elapsed());
    }

    BenchResult::from_times(&times)
}

/// Measure execution time against shared state (includes warmup)
pub fn measure<F, R>(iterations: usize, mut f: F) -> BenchResult
where
    F: FnMut() -> R,
{
    measure_with_setup(iterations, || (), |()| f())
}

#[derive(Clone)]
#[allow(dead_code)]
pub struct BenchResult {
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub median: Duration,
    pub iterations: usize,
}

impl BenchResult {
    pub fn from_times(times: &[Duration]) -> Self {
        let mut sorted: Vec<_> = times.to_vec();
        sorted.sort();

        let min = sorted.first().copied().unwrap_or_default();
        let max = sorted.last().copied().unwrap_or_default();
        let sum: Duration = sorted.iter().sum();
        let mean = sum / sorted.len().max(1) as u32;
        let median = sorted.get(sorted.len() / 2).copied().unwrap_or_default();

        Self {
            min,
            max,
            mean,
            median,
            iterations: times.len(),
        }
    }

    pub fn mean_us(&self) -> f64 {
        self.mean.as_secs_f64() * 1_000_000.0
    }

    pub fn throughput(&self, count: usize) -> f64 {
        count as f64 / self.mean.as_secs_f64()
    }
}

/// Format duration for display
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        format!("{} ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2} μs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2} ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2} s", nanos as f64 / 1_000_000_000.0)
    }
}

/// Format throughput for display
pub fn format_throughput(ops_per_sec: f64) -> String {
    if ops_per_sec >= 1_000_000.0 {
        format!("{:.2}M ops/s", ops_per_sec / 1_000_000.0)
    } else if ops_per_sec >= 1_000.0 {
        format!("{:.2}K ops/s", ops_per_sec / 1_000.0)
    } else {
        format!("{:.2} ops/s", ops_per_sec)
    }
}
