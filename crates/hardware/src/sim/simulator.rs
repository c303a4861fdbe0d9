//! Simulator: owns the cores, the contexts and everything they share.
//!
//! Cores and contexts live side by side in two vectors so that a tick can
//! borrow one core and one context mutably at the same time. Contexts are
//! indexed by `ContextId` and never removed; a stopped or detached context
//! simply stops being ticked.

use tracing::debug;

use crate::common::error::{ConfigError, CoreError, TransferError};
use crate::config::Config;
use crate::core::context::{Context, ContextId, RunState};
use crate::core::pipeline::engine::{ExecEnv, tick_context};
use crate::core::smt::{Core, transfer_context};
use crate::isa::program::Program;
use crate::soc::memory::FlatMemory;
use crate::soc::memory::controller::{FixedLatency, LatencyOracle};
use crate::stats::{InstCounters, SimStats};

/// Outcome of [`Simulator::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles simulated in total.
    pub cycles: u64,
    /// Instructions committed in total.
    pub committed: u64,
    /// Final state of every context, by id.
    pub states: Vec<(ContextId, RunState)>,
    /// True if the run stopped at `general.max_cycles`.
    pub timed_out: bool,
}

/// Top-level simulator.
pub struct Simulator {
    config: Config,
    cores: Vec<Core>,
    contexts: Vec<Context>,
    memory: FlatMemory,
    oracle: Box<dyn LatencyOracle>,
    program: Program,
    counters: InstCounters,
    stats: SimStats,
    cycle: u64,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("cycle", &self.cycle)
            .field("cores", &self.cores.len())
            .field("contexts", &self.contexts.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Builds a simulator with `general.num_cores` empty cores.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`, or `ConfigError::MemoryRegion`
    /// when the memory size does not fit the host address space.
    pub fn new(config: Config, program: Program) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = usize::try_from(config.memory.size).map_err(|_| ConfigError::MemoryRegion {
            base: config.memory.base,
            size: config.memory.size,
        })?;
        let cores = (0..config.general.num_cores)
            .map(|id| Core::new(id, &config))
            .collect();
        Ok(Self {
            memory: FlatMemory::new(config.memory.base, size),
            oracle: Box::new(FixedLatency::new(config.memory.hit_latency)),
            cores,
            contexts: Vec::new(),
            program,
            counters: InstCounters::new(),
            stats: SimStats::default(),
            cycle: 0,
            config,
        })
    }

    /// Replaces the memory latency model.
    ///
    /// The default reports `memory.hit_latency` for every access.
    #[must_use]
    pub fn with_oracle(mut self, oracle: Box<dyn LatencyOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Creates a context starting at `pc` and admits it to core `core`.
    ///
    /// # Errors
    ///
    /// `CoreError::Unknown` for a bad core index, otherwise the admission
    /// error of [`Core::add_context`]. No context is created on error.
    pub fn spawn_context(&mut self, core: usize, pc: u64) -> Result<ContextId, CoreError> {
        let target = self.cores.get_mut(core).ok_or(CoreError::Unknown {
            kind: "core",
            id: core,
        })?;
        let id = ContextId(self.contexts.len());
        let mut ctx = Context::new(id, pc);
        let _ = target.add_context(&mut ctx)?;
        self.contexts.push(ctx);
        Ok(id)
    }

    /// Advances every core by one cycle.
    ///
    /// Within a core, contexts run in slot order; functional units are ticked
    /// after all of them.
    pub fn tick(&mut self) {
        let cycle = self.cycle;
        let mut env = ExecEnv {
            mem: &mut self.memory,
            oracle: self.oracle.as_mut(),
            program: &self.program,
            counters: &mut self.counters,
            stats: &mut self.stats,
            hit_latency: self.config.memory.hit_latency,
        };
        for core in &mut self.cores {
            let occupants: Vec<ContextId> = core.occupants().map(|(_, id)| id).collect();
            for id in occupants {
                if let Some(ctx) = self.contexts.get_mut(id.0) {
                    tick_context(core, ctx, &mut env, cycle);
                }
            }
            core.fu_pool.tick();
        }
        env.stats.cycles += 1;
        self.cycle += 1;
    }

    /// True while some admitted context is still running.
    pub fn has_running(&self) -> bool {
        self.contexts
            .iter()
            .any(|c| c.is_resident() && c.state.is_running())
    }

    /// Ticks until no admitted context is running or `max_cycles` is reached.
    pub fn run(&mut self) -> RunSummary {
        let max_cycles = self.config.general.max_cycles;
        while self.has_running() && self.cycle < max_cycles {
            self.tick();
        }
        let timed_out = self.has_running();
        debug!(
            cycles = self.cycle,
            committed = self.stats.committed,
            timed_out,
            "run finished"
        );
        RunSummary {
            cycles: self.cycle,
            committed: self.stats.committed,
            states: self.contexts.iter().map(|c| (c.id, c.state)).collect(),
            timed_out,
        }
    }

    /// Migrates context `ctx` to core `to_core`.
    ///
    /// Squashed instructions are retracted from the counters whether or not
    /// the admission succeeds. Migrating a drained context squashes nothing
    /// and is not counted as a flush.
    ///
    /// # Errors
    ///
    /// `TransferError::Eject` if the context or `to_core` is unknown, or the
    /// context is detached or already on `to_core`; nothing changes then.
    /// `TransferError::Admission` if `to_core` has no free slot, in which case
    /// the context is left detached.
    pub fn transfer(&mut self, ctx: ContextId, to_core: usize) -> Result<(), TransferError> {
        let context = self
            .contexts
            .get_mut(ctx.0)
            .ok_or(TransferError::Eject(CoreError::Unknown {
                kind: "context",
                id: ctx.0,
            }))?;
        let from_core = context
            .residence
            .map(|r| r.core)
            .ok_or(TransferError::Eject(CoreError::NotResident(ctx.0)))?;
        if from_core == to_core {
            return Err(TransferError::Eject(CoreError::AlreadyAdmitted(ctx.0)));
        }

        if to_core >= self.cores.len() {
            return Err(TransferError::Eject(CoreError::Unknown {
                kind: "core",
                id: to_core,
            }));
        }

        let (from, to) = pair_mut(&mut self.cores, from_core, to_core);
        let result = transfer_context(context, from, to, &mut self.memory);
        let squashed = match result {
            Ok(report) => report.squashed,
            Err(TransferError::Admission { squashed, .. }) => squashed,
            Err(TransferError::Eject(_)) => 0,
        };
        if squashed > 0 {
            self.counters.retract(ctx, squashed);
            self.stats.squashed += squashed as u64;
            self.stats.flushes += 1;
        }
        result.map(|_| ())
    }

    /// Current cycle.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Configuration in use.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Context `id`.
    pub fn context(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(id.0)
    }

    /// Context `id`, mutably (for seeding registers).
    pub fn context_mut(&mut self, id: ContextId) -> Option<&mut Context> {
        self.contexts.get_mut(id.0)
    }

    /// Core `id`.
    pub fn core(&self, id: usize) -> Option<&Core> {
        self.cores.get(id)
    }

    /// Core `id`, mutably (for installing predictors).
    pub fn core_mut(&mut self, id: usize) -> Option<&mut Core> {
        self.cores.get_mut(id)
    }

    /// Data memory.
    pub const fn memory(&self) -> &FlatMemory {
        &self.memory
    }

    /// Data memory, mutably (for loading data before a run).
    pub const fn memory_mut(&mut self) -> &mut FlatMemory {
        &mut self.memory
    }

    /// Dispatched-instruction counters.
    pub const fn counters(&self) -> &InstCounters {
        &self.counters
    }

    /// Performance statistics.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }
}

/// Borrows two distinct cores mutably.
fn pair_mut(cores: &mut [Core], a: usize, b: usize) -> (&mut Core, &mut Core) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = cores.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = cores.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}
