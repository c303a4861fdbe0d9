//! SMT core: the resources shared by the contexts it hosts.
//!
//! A core composes the structures its contexts compete for:
//! 1. **Register File:** One physical register file with an admission reserve.
//! 2. **Issue Queue:** Slots bounding dispatched-but-unissued instructions.
//! 3. **Functional Units:** A pool of units of every class.
//! 4. **Context Slots:** Per-slot buffer templates and return-address stacks.
//!
//! Contexts are admitted with [`Core::add_context`], evicted with
//! [`Core::eject_context`] and migrated between cores with [`transfer_context`].

use tracing::{debug, warn};

use crate::common::constants::{NUM_FP_REGS, NUM_INT_REGS};
use crate::common::error::{CoreError, TransferError};
use crate::common::reg::RegBank;
use crate::config::{Config, CoreConfig, SlotConfig};
use crate::core::context::{Context, ContextId, Residence};
use crate::core::pipeline::issue_queue::IssueQueue;
use crate::core::pipeline::regfile::PhysRegFile;
use crate::core::pipeline::rollback::{SquashReport, flush_context};
use crate::core::units::fu_pool::FuPool;
use crate::core::units::ras::{Ras, ReturnAddressStack};
use crate::soc::memory::Memory;

/// Index of a context slot within a core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// One hardware-thread slot.
pub struct ContextSlot {
    /// Buffer sizes applied to an admitted context.
    pub template: SlotConfig,
    /// Return-address stack used by the occupant's fetch.
    pub ras: Box<dyn ReturnAddressStack>,
    /// Context currently admitted here.
    pub occupant: Option<ContextId>,
}

impl std::fmt::Debug for ContextSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextSlot")
            .field("template", &self.template)
            .field("ras_top", &self.ras.checkpoint())
            .field("occupant", &self.occupant)
            .finish()
    }
}

/// A simultaneous-multithreading core.
#[derive(Debug)]
pub struct Core {
    /// Core id.
    pub id: usize,
    /// Widths, sizes and issue policy.
    pub config: CoreConfig,
    /// Shared physical registers.
    pub regfile: PhysRegFile,
    /// Shared issue queue.
    pub issue_queue: IssueQueue,
    /// Shared functional units.
    pub fu_pool: FuPool,
    /// ROB entries across all admitted contexts.
    pub live_insts: usize,
    slots: Vec<ContextSlot>,
}

impl Core {
    /// Builds an empty core with `config.core.max_contexts` slots.
    pub fn new(id: usize, config: &Config) -> Self {
        let core = &config.core;
        let slots = (0..core.max_contexts)
            .map(|i| {
                let template = config.slot_template(i).clone();
                let ras: Box<dyn ReturnAddressStack> = Box::new(Ras::new(template.ras_size));
                ContextSlot {
                    template,
                    ras,
                    occupant: None,
                }
            })
            .collect();
        Self {
            id,
            config: core.clone(),
            regfile: PhysRegFile::new(core.max_contexts, core.rename_registers),
            issue_queue: IssueQueue::new(core.issue_queue_size),
            fu_pool: FuPool::new(&config.fu),
            live_insts: 0,
            slots,
        }
    }

    /// Number of context slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot `slot`, if it exists.
    pub fn slot(&self, slot: SlotId) -> Option<&ContextSlot> {
        self.slots.get(slot.0)
    }

    /// Replaces the return-address stack of `slot`.
    pub fn set_ras(&mut self, slot: SlotId, ras: Box<dyn ReturnAddressStack>) {
        self.slots[slot.0].ras = ras;
    }

    /// Return-address stack of `slot`.
    pub fn ras_mut(&mut self, slot: SlotId) -> &mut dyn ReturnAddressStack {
        self.slots[slot.0].ras.as_mut()
    }

    /// Admitted contexts in slot order.
    pub fn occupants(&self) -> impl Iterator<Item = (SlotId, ContextId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.occupant.map(|c| (SlotId(i), c)))
    }

    /// Admits `ctx` into a free slot.
    ///
    /// Sizes the context's buffers and wakeup queues to the slot template and
    /// leases 32 integer and 32 FP registers as its architected state.
    ///
    /// # Errors
    ///
    /// `CoreError::AlreadyAdmitted` if `ctx` is resident anywhere,
    /// `CoreError::Full` if every slot is taken. Nothing is modified on error.
    pub fn add_context(&mut self, ctx: &mut Context) -> Result<SlotId, CoreError> {
        if ctx.is_resident() {
            return Err(CoreError::AlreadyAdmitted(ctx.id.0));
        }
        let idx = self
            .slots
            .iter()
            .position(|s| s.occupant.is_none())
            .ok_or(CoreError::Full)?;
        debug_assert!(ctx.is_drained() && ctx.icount == 0);

        let template = &self.slots[idx].template;
        ctx.rob.resize(template.rob_size);
        ctx.lsq.resize(template.lsq_size);
        ctx.ifq.resize(template.ifq_size);
        ctx.queues.resize(template.rob_size, template.lsq_size);

        let int = self.regfile.lease(RegBank::Int, NUM_INT_REGS);
        let fp = self.regfile.lease(RegBank::Fp, NUM_FP_REGS);
        ctx.rename.install(&int, &fp);

        let slot = SlotId(idx);
        self.slots[idx].occupant = Some(ctx.id);
        ctx.residence = Some(Residence {
            core: self.id,
            slot,
        });
        debug!(core = self.id, slot = idx, ctx = %ctx.id, "admitted context");
        Ok(slot)
    }

    /// Evicts `ctx` and returns its architected registers to the free pool.
    ///
    /// The context must be drained: no ROB entries and no issue-queue slots.
    ///
    /// # Errors
    ///
    /// `CoreError::NotResident` if `ctx` is not admitted to this core.
    ///
    /// # Panics
    ///
    /// Panics if the context still has instructions in flight.
    pub fn eject_context(&mut self, ctx: &mut Context) -> Result<SlotId, CoreError> {
        let slot = match ctx.residence {
            Some(r) if r.core == self.id => r.slot,
            _ => return Err(CoreError::NotResident(ctx.id.0)),
        };
        assert!(
            ctx.rob.is_empty() && ctx.icount == 0,
            "ejecting {} with {} ROB entries and icount {}",
            ctx.id,
            ctx.rob.len(),
            ctx.icount
        );
        debug_assert_eq!(self.slots[slot.0].occupant, Some(ctx.id));

        let regs = ctx.rename.take_all();
        self.regfile.check_in(&regs);
        self.slots[slot.0].occupant = None;
        ctx.residence = None;
        debug!(core = self.id, slot = slot.0, ctx = %ctx.id, "ejected context");
        Ok(slot)
    }
}

/// Moves `ctx` from core `from` to core `to`.
///
/// Flushes all in-flight work, ejects from `from` and admits into `to`. The
/// returned report counts the squashed instructions; the caller retracts them
/// from its instruction counters, also when admission fails.
///
/// # Errors
///
/// `TransferError::Eject` if `ctx` is not resident on `from` (nothing is
/// flushed). `TransferError::Admission` if `to` rejects the context; the eject
/// is not undone and the context stays detached from every core.
pub fn transfer_context(
    ctx: &mut Context,
    from: &mut Core,
    to: &mut Core,
    mem: &mut dyn Memory,
) -> Result<SquashReport, TransferError> {
    if ctx.residence.is_none_or(|r| r.core != from.id) {
        return Err(TransferError::Eject(CoreError::NotResident(ctx.id.0)));
    }
    let report = flush_context(from, ctx, mem);
    let _ = from.eject_context(ctx).map_err(TransferError::Eject)?;

    match to.add_context(ctx) {
        Ok(slot) => {
            debug!(
                ctx = %ctx.id,
                from = from.id,
                to = to.id,
                slot = slot.0,
                squashed = report.squashed,
                "transferred context"
            );
            Ok(report)
        }
        Err(source) => {
            warn!(
                ctx = %ctx.id,
                from = from.id,
                to = to.id,
                %source,
                "admission failed after eject; context left detached"
            );
            Err(TransferError::Admission {
                source,
                squashed: report.squashed,
            })
        }
    }
}
