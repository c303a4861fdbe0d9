//! Common utilities and types used throughout the simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Constants:** Register counts, instruction size and timing sentinels.
//! 2. **Error Handling:** Recoverable errors and the dispatch stall signal.
//! 3. **Register Naming:** Architected register names, banks and working values.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types and stall signals.
pub mod error;

/// Register naming and working register values.
pub mod reg;

pub use constants::NOT_READY;
pub use error::{ConfigError, CoreError, Fault, MemFault, Stall, TransferError};
pub use reg::{ArchReg, RegBank, RegType, WorkingRegs};
