//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! simulated cores. It provides:
//! 1. **Defaults:** Baseline hardware constants (widths, buffer sizes, unit latencies).
//! 2. **Structures:** Hierarchical config for general, core, per-slot, functional-unit and memory settings.
//! 3. **Validation:** `Config::from_json` parses and rejects degenerate machines.
//!
//! Every field is optional in JSON; omitted fields take the values in `defaults`.

use serde::Deserialize;

use crate::common::constants::{MAX_PHYS_REGS, NUM_INT_REGS};
use crate::common::error::ConfigError;
use crate::isa::decode::FuClass;

/// Default configuration constants for the simulator.
mod defaults {
    /// Simulation cycle limit for `Simulator::run`.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// Number of cores in the simulated system.
    pub const NUM_CORES: usize = 1;

    /// Hardware thread contexts per core.
    pub const MAX_CONTEXTS: usize = 2;

    /// Renaming registers per bank beyond the architected pool.
    pub const RENAME_REGISTERS: usize = 64;

    /// Shared issue queue entries per core.
    pub const ISSUE_QUEUE_SIZE: usize = 32;

    /// Default width of fetch, dispatch, issue and commit.
    pub const PIPELINE_WIDTH: usize = 4;

    /// Cycles fetch stays stalled after a rollback.
    pub const MISPREDICT_PENALTY: u64 = 3;

    /// Reorder buffer entries per context slot.
    pub const ROB_SIZE: usize = 32;

    /// Load/store queue entries per context slot.
    pub const LSQ_SIZE: usize = 16;

    /// Instruction fetch queue entries per context slot.
    pub const IFQ_SIZE: usize = 8;

    /// Return address stack depth per context slot.
    pub const RAS_SIZE: usize = 16;

    /// Base address of the data memory region.
    pub const MEMORY_BASE: u64 = 0;

    /// Size of the data memory region (64 KiB).
    pub const MEMORY_SIZE: u64 = 64 * 1024;

    /// Latency of a memory access in cycles.
    pub const HIT_LATENCY: u64 = 2;
}

/// Root configuration for the simulator.
///
/// # Examples
///
/// ```
/// use smtsim_core::config::Config;
///
/// let json = r#"{
///     "core": { "max_contexts": 4, "inorder_issue": true },
///     "slot": { "rob_size": 8 },
///     "fu": { "int_mul": { "count": 2, "latency": 5 } }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.core.max_contexts, 4);
/// assert!(config.core.inorder_issue);
/// assert_eq!(config.slot.rob_size, 8);
/// assert_eq!(config.slot.lsq_size, 16);
/// assert_eq!(config.fu.int_mul.latency, 5);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Per-core shared resources and pipeline widths
    #[serde(default)]
    pub core: CoreConfig,
    /// Default per-slot template
    #[serde(default)]
    pub slot: SlotConfig,
    /// Per-slot overrides, indexed by slot id; missing slots use `slot`
    #[serde(default)]
    pub slots: Vec<SlotConfig>,
    /// Functional unit pool
    #[serde(default)]
    pub fu: FuConfig,
    /// Data memory
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a JSON document and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and the validation
    /// errors of [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot make forward progress.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Zero` naming the first zero size or width,
    /// `ConfigError::RegisterFile` when a register bank would exceed
    /// `MAX_PHYS_REGS`, `ConfigError::TooManySlots` when overrides exceed
    /// `max_contexts`, and
    /// `ConfigError::MemoryRegion` when the memory region overflows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let core = &self.core;
        let nonzero = [
            ("general.num_cores", self.general.num_cores),
            ("core.max_contexts", core.max_contexts),
            ("core.rename_registers", core.rename_registers),
            ("core.issue_queue_size", core.issue_queue_size),
            ("core.fetch_width", core.fetch_width),
            ("core.dispatch_width", core.dispatch_width),
            ("core.issue_width", core.issue_width),
            ("core.commit_width", core.commit_width),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }

        let bank_size = NUM_INT_REGS
            .checked_mul(core.max_contexts)
            .and_then(|arch| arch.checked_add(core.rename_registers));
        if !bank_size.is_some_and(|size| size <= MAX_PHYS_REGS) {
            return Err(ConfigError::RegisterFile {
                max_contexts: core.max_contexts,
                rename_registers: core.rename_registers,
            });
        }

        if self.slots.len() > core.max_contexts {
            return Err(ConfigError::TooManySlots {
                overrides: self.slots.len(),
                max_contexts: core.max_contexts,
            });
        }
        for slot in std::iter::once(&self.slot).chain(&self.slots) {
            slot.validate()?;
        }

        for class in FuClass::ALL {
            if self.fu.unit(class).count == 0 {
                return Err(ConfigError::Zero(class.config_name()));
            }
        }

        if self.memory.size == 0 {
            return Err(ConfigError::Zero("memory.size"));
        }
        if self.memory.base.checked_add(self.memory.size).is_none() {
            return Err(ConfigError::MemoryRegion {
                base: self.memory.base,
                size: self.memory.size,
            });
        }
        Ok(())
    }

    /// Returns the template for context slot `idx`.
    pub fn slot_template(&self, idx: usize) -> &SlotConfig {
        self.slots.get(idx).unwrap_or(&self.slot)
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Cycle limit for `Simulator::run`
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,

    /// Number of cores
    #[serde(default = "GeneralConfig::default_num_cores")]
    pub num_cores: usize,
}

impl GeneralConfig {
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }

    fn default_num_cores() -> usize {
        defaults::NUM_CORES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
            num_cores: defaults::NUM_CORES,
        }
    }
}

/// Resources shared by every context of a core.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Context slots per core
    #[serde(default = "CoreConfig::default_max_contexts")]
    pub max_contexts: usize,

    /// Extra renaming registers per bank on top of `32 * max_contexts`
    #[serde(default = "CoreConfig::default_rename_registers")]
    pub rename_registers: usize,

    /// Shared issue queue entries
    #[serde(default = "CoreConfig::default_issue_queue_size")]
    pub issue_queue_size: usize,

    /// Instructions fetched per context per cycle
    #[serde(default = "CoreConfig::default_width")]
    pub fetch_width: usize,

    /// Instructions dispatched per context per cycle
    #[serde(default = "CoreConfig::default_width")]
    pub dispatch_width: usize,

    /// Instructions issued per context per cycle
    #[serde(default = "CoreConfig::default_width")]
    pub issue_width: usize,

    /// Instructions committed per context per cycle
    #[serde(default = "CoreConfig::default_width")]
    pub commit_width: usize,

    /// Issue strictly in program order
    #[serde(default)]
    pub inorder_issue: bool,

    /// Fetch stall after a rollback, in cycles
    #[serde(default = "CoreConfig::default_mispredict_penalty")]
    pub mispredict_penalty: u64,
}

impl CoreConfig {
    fn default_max_contexts() -> usize {
        defaults::MAX_CONTEXTS
    }

    fn default_rename_registers() -> usize {
        defaults::RENAME_REGISTERS
    }

    fn default_issue_queue_size() -> usize {
        defaults::ISSUE_QUEUE_SIZE
    }

    fn default_width() -> usize {
        defaults::PIPELINE_WIDTH
    }

    fn default_mispredict_penalty() -> u64 {
        defaults::MISPREDICT_PENALTY
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_contexts: defaults::MAX_CONTEXTS,
            rename_registers: defaults::RENAME_REGISTERS,
            issue_queue_size: defaults::ISSUE_QUEUE_SIZE,
            fetch_width: defaults::PIPELINE_WIDTH,
            dispatch_width: defaults::PIPELINE_WIDTH,
            issue_width: defaults::PIPELINE_WIDTH,
            commit_width: defaults::PIPELINE_WIDTH,
            inorder_issue: false,
            mispredict_penalty: defaults::MISPREDICT_PENALTY,
        }
    }
}

/// Capacities a context takes on when it is admitted into a slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SlotConfig {
    /// Reorder buffer entries
    #[serde(default = "SlotConfig::default_rob_size")]
    pub rob_size: usize,

    /// Load/store queue entries
    #[serde(default = "SlotConfig::default_lsq_size")]
    pub lsq_size: usize,

    /// Fetch queue entries
    #[serde(default = "SlotConfig::default_ifq_size")]
    pub ifq_size: usize,

    /// Return address stack depth
    #[serde(default = "SlotConfig::default_ras_size")]
    pub ras_size: usize,
}

impl SlotConfig {
    fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }

    fn default_lsq_size() -> usize {
        defaults::LSQ_SIZE
    }

    fn default_ifq_size() -> usize {
        defaults::IFQ_SIZE
    }

    fn default_ras_size() -> usize {
        defaults::RAS_SIZE
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("slot.rob_size", self.rob_size),
            ("slot.lsq_size", self.lsq_size),
            ("slot.ifq_size", self.ifq_size),
            ("slot.ras_size", self.ras_size),
        ];
        match sizes.into_iter().find(|&(_, v)| v == 0) {
            Some((name, _)) => Err(ConfigError::Zero(name)),
            None => Ok(()),
        }
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            rob_size: defaults::ROB_SIZE,
            lsq_size: defaults::LSQ_SIZE,
            ifq_size: defaults::IFQ_SIZE,
            ras_size: defaults::RAS_SIZE,
        }
    }
}

/// Count and latency of one functional-unit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FuUnitConfig {
    /// Number of units
    pub count: usize,
    /// Cycles from issue to result
    pub latency: u64,
}

impl FuUnitConfig {
    const fn new(count: usize, latency: u64) -> Self {
        Self { count, latency }
    }
}

/// Functional unit pool shared by a core's contexts.
#[derive(Debug, Clone, Deserialize)]
pub struct FuConfig {
    /// Integer ALUs
    #[serde(default = "FuConfig::default_int_alu")]
    pub int_alu: FuUnitConfig,
    /// Integer multipliers
    #[serde(default = "FuConfig::default_int_mul")]
    pub int_mul: FuUnitConfig,
    /// Integer dividers
    #[serde(default = "FuConfig::default_int_div")]
    pub int_div: FuUnitConfig,
    /// FP adders
    #[serde(default = "FuConfig::default_fp_add")]
    pub fp_add: FuUnitConfig,
    /// FP multipliers
    #[serde(default = "FuConfig::default_fp_mul")]
    pub fp_mul: FuUnitConfig,
    /// FP dividers
    #[serde(default = "FuConfig::default_fp_div")]
    pub fp_div: FuUnitConfig,
    /// Memory ports (address generation and load/store)
    #[serde(default = "FuConfig::default_mem_port")]
    pub mem_port: FuUnitConfig,
    /// Branch units
    #[serde(default = "FuConfig::default_branch")]
    pub branch: FuUnitConfig,
}

impl FuConfig {
    fn default_int_alu() -> FuUnitConfig {
        FuUnitConfig::new(4, 1)
    }

    fn default_int_mul() -> FuUnitConfig {
        FuUnitConfig::new(1, 3)
    }

    fn default_int_div() -> FuUnitConfig {
        FuUnitConfig::new(1, 20)
    }

    fn default_fp_add() -> FuUnitConfig {
        FuUnitConfig::new(2, 2)
    }

    fn default_fp_mul() -> FuUnitConfig {
        FuUnitConfig::new(1, 4)
    }

    fn default_fp_div() -> FuUnitConfig {
        FuUnitConfig::new(1, 12)
    }

    fn default_mem_port() -> FuUnitConfig {
        FuUnitConfig::new(2, 1)
    }

    fn default_branch() -> FuUnitConfig {
        FuUnitConfig::new(1, 1)
    }

    /// Returns the settings of one unit class.
    pub const fn unit(&self, class: FuClass) -> FuUnitConfig {
        match class {
            FuClass::IntAlu => self.int_alu,
            FuClass::IntMul => self.int_mul,
            FuClass::IntDiv => self.int_div,
            FuClass::FpAdd => self.fp_add,
            FuClass::FpMul => self.fp_mul,
            FuClass::FpDiv => self.fp_div,
            FuClass::MemPort => self.mem_port,
            FuClass::Branch => self.branch,
        }
    }
}

impl Default for FuConfig {
    fn default() -> Self {
        Self {
            int_alu: Self::default_int_alu(),
            int_mul: Self::default_int_mul(),
            int_div: Self::default_int_div(),
            fp_add: Self::default_fp_add(),
            fp_mul: Self::default_fp_mul(),
            fp_div: Self::default_fp_div(),
            mem_port: Self::default_mem_port(),
            branch: Self::default_branch(),
        }
    }
}

/// Flat data memory region.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// First valid address
    #[serde(default = "MemoryConfig::default_base")]
    pub base: u64,

    /// Size in bytes
    #[serde(default = "MemoryConfig::default_size")]
    pub size: u64,

    /// Access latency reported by the latency oracle
    #[serde(default = "MemoryConfig::default_hit_latency")]
    pub hit_latency: u64,
}

impl MemoryConfig {
    fn default_base() -> u64 {
        defaults::MEMORY_BASE
    }

    fn default_size() -> u64 {
        defaults::MEMORY_SIZE
    }

    fn default_hit_latency() -> u64 {
        defaults::HIT_LATENCY
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base: defaults::MEMORY_BASE,
            size: defaults::MEMORY_SIZE,
            hit_latency: defaults::HIT_LATENCY,
        }
    }
}
