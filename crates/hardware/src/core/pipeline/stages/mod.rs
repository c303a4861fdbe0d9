//! Pipeline stage implementations.
//!
//! Each stage is a free function over one core and one of its contexts:
//! 1. **Fetch:** Follows the predicted path into the fetch queue.
//! 2. **Dispatch:** Renames, executes functionally and enqueues for issue.
//! 3. **Issue:** Wakes entries whose operands are scheduled and grants units.
//! 4. **Writeback:** Completes entries and resolves mispredictions.
//! 5. **Commit:** Retires in program order, taking faults and exits.

/// Commit stage implementation.
pub mod commit;

/// Dispatch stage implementation.
pub mod dispatch;

/// Fetch stage implementation.
pub mod fetch;

/// Wakeup and issue stage implementation.
pub mod issue;

/// Writeback stage implementation.
pub mod writeback;

pub use commit::commit_stage;
pub use dispatch::dispatch_stage;
pub use fetch::fetch_stage;
pub use issue::issue_stage;
pub use writeback::writeback_stage;

use crate::common::constants::NOT_READY;
use crate::core::context::Context;
use crate::core::pipeline::regfile::{PhysReg, PhysRegFile};
use crate::core::pipeline::wakeup::{QueueRef, WakeKey};

/// Cycle at which every source is available, or `None` while a producer has
/// not issued yet.
pub(crate) fn operands_ready_at(regfile: &PhysRegFile, src: &[Option<PhysReg>; 2]) -> Option<u64> {
    src.iter().flatten().try_fold(0, |acc: u64, &reg| {
        let ready = regfile.get(reg).ready_cycle;
        (ready != NOT_READY).then(|| acc.max(ready))
    })
}

/// Places an entry on the issue queue if its operand timing is known, else on
/// the waiting queue for another look next cycle. Out-of-order issue only.
pub(crate) fn schedule(
    regfile: &PhysRegFile,
    ctx: &mut Context,
    link: QueueRef,
    earliest: u64,
    cycle: u64,
) {
    let Some(src) = ctx.entry(link).map(|e| e.src) else {
        return;
    };
    match operands_ready_at(regfile, &src) {
        Some(ready) => ctx
            .queues
            .issue
            .insert(link, WakeKey::Cycle(ready.max(earliest))),
        None => ctx.queues.waiting.insert(link, WakeKey::Cycle(cycle + 1)),
    }
}
