use smtsim_core::common::constants::INSTRUCTION_SIZE;
use smtsim_core::common::error::Stall;
use smtsim_core::config::Config;
use smtsim_core::core::pipeline::buffer::EntryHandle;
use smtsim_core::core::pipeline::engine::{ExecEnv, tick_context};
use smtsim_core::core::pipeline::fetch_queue::FetchedInst;
use smtsim_core::core::pipeline::stages::dispatch::dispatch_one;
use smtsim_core::core::smt::SlotId;
use smtsim_core::core::{Context, ContextId, Core};
use smtsim_core::isa::instruction::Inst;
use smtsim_core::isa::program::Program;
use smtsim_core::soc::memory::FlatMemory;
use smtsim_core::soc::memory::controller::FixedLatency;
use smtsim_core::stats::{InstCounters, SimStats};
use tracing_subscriber::EnvFilter;

use super::builder::program::TEXT_BASE;

/// Installs a test-friendly tracing subscriber once per process.
///
/// Set `RUST_LOG=smtsim_core=trace` to see pipeline events of a failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One core with one admitted context, driven stage by stage.
///
/// Instructions are normally pushed straight into the fetch queue with
/// [`TestContext::dispatch`], which bypasses fetch and prediction. Fetch stays
/// blocked until a program is installed with [`TestContext::with_program`].
pub struct TestContext {
    pub core: Core,
    pub ctx: Context,
    pub memory: FlatMemory,
    pub oracle: FixedLatency,
    pub program: Program,
    pub counters: InstCounters,
    pub stats: SimStats,
    pub hit_latency: u64,
    pub cycle: u64,
    next_pc: u64,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl TestContext {
    pub fn new(config: &Config) -> Self {
        init_tracing();

        let mut core = Core::new(0, config);
        let mut ctx = Context::new(ContextId(0), TEXT_BASE);
        let _ = core.add_context(&mut ctx).unwrap();
        ctx.fetch_blocked = true;
        Self {
            core,
            ctx,
            memory: FlatMemory::new(config.memory.base, config.memory.size as usize),
            oracle: FixedLatency::new(0),
            program: Program::new(TEXT_BASE, Vec::new()),
            counters: InstCounters::new(),
            stats: SimStats::default(),
            hit_latency: config.memory.hit_latency,
            cycle: 0,
            next_pc: TEXT_BASE,
        }
    }

    /// Harness over a config with the given slot ROB and LSQ sizes.
    pub fn with_buffers(rob_size: usize, lsq_size: usize) -> Self {
        let mut config = Config::default();
        config.slot.rob_size = rob_size;
        config.slot.lsq_size = lsq_size;
        Self::new(&config)
    }

    /// Replaces the instruction source used by `tick`.
    pub fn with_program(mut self, program: Program) -> Self {
        self.ctx.fetch_pc = program.base();
        self.ctx.fetch_blocked = false;
        self.program = program;
        self
    }

    /// Slot the context occupies.
    pub fn slot(&self) -> SlotId {
        self.ctx.residence.unwrap().slot
    }

    /// Splits the harness into the core, the context and an execution
    /// environment over the remaining collaborators.
    pub fn parts(&mut self) -> (&mut Core, &mut Context, ExecEnv<'_>) {
        let env = ExecEnv {
            mem: &mut self.memory,
            oracle: &mut self.oracle,
            program: &self.program,
            counters: &mut self.counters,
            stats: &mut self.stats,
            hit_latency: self.hit_latency,
        };
        (&mut self.core, &mut self.ctx, env)
    }

    /// Appends a fetched instruction with a fall-through prediction.
    pub fn push_fetched(&mut self, inst: Inst) {
        let pc = self.next_pc;
        self.push_predicted(inst, pc + INSTRUCTION_SIZE, 0);
    }

    /// Appends a fetched instruction with an explicit prediction and RAS
    /// checkpoint.
    pub fn push_predicted(&mut self, inst: Inst, pred_pc: u64, stack_recover_idx: usize) {
        let pc = self.next_pc;
        self.ctx.ifq.push(FetchedInst {
            pc,
            inst,
            pred_pc,
            stack_recover_idx,
            fault: false,
        });
        self.next_pc = pc + INSTRUCTION_SIZE;
    }

    /// Dispatches whatever is at the head of the fetch queue.
    pub fn try_dispatch(&mut self) -> Result<(), Stall> {
        let cycle = self.cycle;
        let (core, ctx, mut env) = self.parts();
        dispatch_one(core, ctx, &mut env, cycle)
    }

    /// Fetches and dispatches `inst`, returning its ROB handle.
    pub fn dispatch(&mut self, inst: Inst) -> EntryHandle {
        self.push_fetched(inst);
        self.try_dispatch().unwrap();
        self.ctx.rob.tail_handle().unwrap()
    }

    /// Runs every stage of the context for one cycle.
    pub fn tick(&mut self) {
        let cycle = self.cycle;
        let (core, ctx, mut env) = self.parts();
        tick_context(core, ctx, &mut env, cycle);
        core.fu_pool.tick();
        self.cycle += 1;
    }

    /// Ticks until the context stops or `limit` cycles pass.
    pub fn run(&mut self, limit: u64) {
        for _ in 0..limit {
            if !self.ctx.state.is_running() {
                break;
            }
            self.tick();
        }
    }
}
