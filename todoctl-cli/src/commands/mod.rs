//! Command implementations for todoctl CLI

pub mod data;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use data::{run_clear, run_generate, run_seed, run_stats};
pub use serve::run_serve;
