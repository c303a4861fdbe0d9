//! Byte-addressable data memory.
//!
//! This module implements the memory object the engine executes loads and
//! stores against. It provides:
//! 1. **Interface:** The `Memory` trait, a single `access` entry point plus little-endian helpers.
//! 2. **Flat Memory:** `FlatMemory`, a bounds-checked byte array mapped at a base address.
//! 3. **Controller:** Latency modeling through the `LatencyOracle` trait.
//!
//! Rollback replays pre-store shadow bytes through the same `access` call that
//! stores use, so the undo path sees exactly the memory the program sees.

/// Access latency oracles.
pub mod controller;

use crate::common::error::MemFault;

/// Direction of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemCmd {
    /// Copy memory into the buffer.
    Read,
    /// Copy the buffer into memory.
    Write,
}

/// Byte-addressable memory.
pub trait Memory {
    /// Reads into or writes from `buf` at `addr`; `buf.len()` is the access size.
    ///
    /// # Errors
    ///
    /// Returns `MemFault` if any byte is unmapped or the access is misaligned.
    /// A faulting access leaves memory unchanged.
    fn access(&mut self, cmd: MemCmd, addr: u64, buf: &mut [u8]) -> Result<(), MemFault>;

    /// Reads a little-endian value of `size` bytes (1, 2, 4 or 8), zero-extended.
    ///
    /// # Errors
    ///
    /// Propagates the fault of the underlying access.
    fn read_value(&mut self, addr: u64, size: usize) -> Result<u64, MemFault> {
        let mut bytes = [0u8; 8];
        self.access(MemCmd::Read, addr, &mut bytes[..size])?;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Writes the low `size` bytes of `val` little-endian.
    ///
    /// # Errors
    ///
    /// Propagates the fault of the underlying access.
    fn write_value(&mut self, addr: u64, size: usize, val: u64) -> Result<(), MemFault> {
        let mut bytes = val.to_le_bytes();
        self.access(MemCmd::Write, addr, &mut bytes[..size])
    }
}

/// Flat RAM mapped at `[base, base + len)`.
///
/// Accesses must be naturally aligned to their size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatMemory {
    base: u64,
    data: Vec<u8>,
}

impl FlatMemory {
    /// Creates a zero-filled memory of `size` bytes at `base`.
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
        }
    }

    /// Base address.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Size in bytes.
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the memory has no bytes.
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrows `len` bytes starting at `addr`, if mapped.
    pub fn slice(&self, addr: u64, len: usize) -> Option<&[u8]> {
        let range = self.range(addr, len)?;
        self.data.get(range)
    }

    /// Copies `data` into memory at `addr`, ignoring alignment.
    ///
    /// # Errors
    ///
    /// Returns `MemFault::OutOfRange` if the region is not fully mapped.
    pub fn load(&mut self, addr: u64, data: &[u8]) -> Result<(), MemFault> {
        let range = self
            .range(addr, data.len())
            .ok_or(MemFault::OutOfRange { addr })?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    fn range(&self, addr: u64, len: usize) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(addr.checked_sub(self.base)?).ok()?;
        let end = start.checked_add(len)?;
        (end <= self.data.len()).then_some(start..end)
    }
}

impl Memory for FlatMemory {
    fn access(&mut self, cmd: MemCmd, addr: u64, buf: &mut [u8]) -> Result<(), MemFault> {
        let size = buf.len() as u64;
        if size > 1 && addr % size != 0 {
            return Err(MemFault::Misaligned { addr });
        }
        let range = self
            .range(addr, buf.len())
            .ok_or(MemFault::OutOfRange { addr })?;
        match cmd {
            MemCmd::Read => buf.copy_from_slice(&self.data[range]),
            MemCmd::Write => self.data[range].copy_from_slice(buf),
        }
        Ok(())
    }
}
