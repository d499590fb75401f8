//! Input/Output operations for plane-wave calculations
//!
//! This module handles logging setup and the final result summary.

mod output;

pub use output::{print_summary, setup_output};
