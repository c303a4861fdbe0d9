//! # Unit Components
//!
//! This module organizes the tests by the part of the engine they exercise,
//! from configuration up to whole-simulator runs.

/// Configuration parsing, defaults and validation.
pub mod config;



/// Statistics collection and reporting.
pub mod stats;
