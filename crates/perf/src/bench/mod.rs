//! Benchmark modules

pub mod load;
pub mod view;
