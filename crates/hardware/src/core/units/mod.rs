//! Execution units and predictor components shared with the pipeline.
//!
//! This module contains the functional-unit pool that issue draws from and
//! the return address stack fetch predicts through.

/// Functional-unit pool with per-unit busy counters.
pub mod fu_pool;

/// Return Address Stack for predicting return addresses.
pub mod ras;

pub use fu_pool::{FuHandle, FuPool};
pub use ras::{Ras, ReturnAddressStack};
