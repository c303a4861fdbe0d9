//! Memory access latency oracles.
//!
//! This module provides:
//! 1. **LatencyOracle:** The contract issue uses to schedule the completion of memory operations.
//! 2. **FixedLatency:** Every access takes the same number of cycles.
//!
//! The engine only consumes the returned latency; no cache or bank state is
//! modelled here.

use crate::soc::memory::MemCmd;

/// Reports the latency of a memory access in cycles.
pub trait LatencyOracle {
    /// Returns the number of cycles an access issued at `cycle` takes.
    ///
    /// # Arguments
    ///
    /// * `cmd` - Read or write.
    /// * `addr` - Effective address.
    /// * `size` - Access size in bytes.
    /// * `cycle` - Cycle the access issues.
    fn access_latency(&mut self, cmd: MemCmd, addr: u64, size: usize, cycle: u64) -> u64;
}

/// Fixed-latency oracle; every access takes the same number of cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedLatency {
    latency: u64,
}

impl FixedLatency {
    /// Creates an oracle that always reports `latency` cycles.
    pub const fn new(latency: u64) -> Self {
        Self { latency }
    }

    /// The configured latency.
    pub const fn latency(&self) -> u64 {
        self.latency
    }
}

impl LatencyOracle for FixedLatency {
    fn access_latency(&mut self, _cmd: MemCmd, _addr: u64, _size: usize, _cycle: u64) -> u64 {
        self.latency
    }
}
