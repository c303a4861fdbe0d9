//! Error and Stall definitions.
//!
//! This module defines the failure vocabulary of the simulator. It provides:
//! 1. **Recoverable Errors:** Configuration, memory, admission and transfer failures.
//! 2. **Stall Signals:** Resource exhaustion reported to dispatch as "retry next cycle".
//!
//! Invariant violations inside the engine are not represented here; they panic.

use thiserror::Error;

use crate::common::reg::RegBank;

/// Configuration could not be parsed or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document did not deserialize into a `Config`.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A size, width or count that must be non-zero was zero.
    #[error("configuration field `{0}` must be non-zero")]
    Zero(&'static str),

    /// More per-slot overrides were supplied than `max_contexts` allows.
    #[error("{overrides} slot overrides exceed max_contexts = {max_contexts}")]
    TooManySlots {
        /// Number of override entries in `slots`.
        overrides: usize,
        /// Configured context limit.
        max_contexts: usize,
    },

    /// A physical register bank would be larger than `MAX_PHYS_REGS`.
    #[error(
        "register file of {max_contexts} contexts + {rename_registers} rename registers is too large"
    )]
    RegisterFile {
        /// Configured context limit.
        max_contexts: usize,
        /// Configured rename registers per bank.
        rename_registers: usize,
    },

    /// Memory region does not fit in the address space.
    #[error("memory region base {base:#x} + size {size:#x} overflows")]
    MemoryRegion {
        /// Region base address.
        base: u64,
        /// Region size in bytes.
        size: u64,
    },
}

/// Memory access fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MemFault {
    /// The access touched bytes outside the backing store.
    #[error("access fault at {addr:#x}")]
    OutOfRange {
        /// First byte of the faulting access.
        addr: u64,
    },

    /// The address was not aligned to the access size.
    #[error("misaligned access at {addr:#x}")]
    Misaligned {
        /// Faulting address.
        addr: u64,
    },
}

impl MemFault {
    /// Address the fault was raised for.
    pub const fn addr(self) -> u64 {
        match self {
            Self::OutOfRange { addr } | Self::Misaligned { addr } => addr,
        }
    }
}

/// Exception raised by an instruction, taken when it reaches the ROB head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    /// Fetch reached an unmapped program address.
    #[error("instruction fetch fault at {pc:#x}")]
    Fetch {
        /// Unmapped program counter.
        pc: u64,
    },

    /// A load or store faulted.
    #[error("memory fault: {0}")]
    Memory(#[from] MemFault),
}

/// Context admission or eviction failure on a core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Every context slot of the core is occupied.
    #[error("core has no free context slot")]
    Full,

    /// The context is already resident on a core.
    #[error("context {0} is already admitted")]
    AlreadyAdmitted(usize),

    /// The context is not resident on this core.
    #[error("context {0} is not resident on this core")]
    NotResident(usize),

    /// The referenced core or context does not exist.
    #[error("no such {kind} {id}")]
    Unknown {
        /// "core" or "context".
        kind: &'static str,
        /// Requested identifier.
        id: usize,
    },
}

/// Migration of a context between cores failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The source core refused to release the context; nothing was changed
    /// beyond the flush.
    #[error("eject failed: {0}")]
    Eject(CoreError),

    /// The destination core refused the context after it was ejected from
    /// the source. The context is left detached from every core.
    #[error("admission failed after {squashed} squashed instructions: {source}")]
    Admission {
        /// Reason the destination rejected the context.
        source: CoreError,
        /// Instructions squashed by the flush that preceded the eject.
        squashed: usize,
    },
}

/// Resource exhaustion reported to dispatch.
///
/// A stall is not an error: the instruction stays in the fetch queue and is
/// retried on a later cycle. No state is mutated by a stalled dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stall {
    /// The context's reorder buffer is full.
    RobFull,
    /// The context's load/store queue is full.
    LsqFull,
    /// The core's shared issue queue is full.
    IssueQueueFull,
    /// No free physical register in the given bank.
    NoFreeRegister(RegBank),
    /// Nothing has been fetched yet.
    FetchQueueEmpty,
}

impl std::fmt::Display for Stall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RobFull => write!(f, "rob full"),
            Self::LsqFull => write!(f, "lsq full"),
            Self::IssueQueueFull => write!(f, "issue queue full"),
            Self::NoFreeRegister(bank) => write!(f, "no free {bank} register"),
            Self::FetchQueueEmpty => write!(f, "fetch queue empty"),
        }
    }
}
