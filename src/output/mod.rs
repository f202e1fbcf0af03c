//! Output module for reporting on harvested data
//!
//! This module handles:
//! - Loading record statistics from the database
//! - Printing them for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};
