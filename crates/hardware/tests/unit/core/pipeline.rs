//! Stage-level behavior of one context: wakeup timing, in-order versus
//! out-of-order issue, in-order commit and exceptions.

use pretty_assertions::assert_eq;
use rstest::rstest;
use smtsim_core::common::constants::INSTRUCTION_SIZE;
use smtsim_core::common::error::Fault;
use smtsim_core::common::reg::RegBank;
use smtsim_core::config::Config;
use smtsim_core::core::RunState;
use smtsim_core::core::pipeline::buffer::EntryHandle;
use smtsim_core::core::pipeline::entry::EntryStatus;
use smtsim_core::core::pipeline::regfile::RegState;
use smtsim_core::isa::instruction::{Inst, MemWidth, Opcode};

use crate::common::builder::program::{ProgramBuilder, TEXT_BASE};
use crate::common::harness::TestContext;

fn status(t: &TestContext, h: EntryHandle) -> EntryStatus {
    t.ctx.rob.get(h).unwrap().status
}

fn ticks(t: &mut TestContext, n: u64) {
    for _ in 0..n {
        t.tick();
    }
}

fn harness(inorder_issue: bool) -> TestContext {
    let mut config = Config::default();
    config.core.inorder_issue = inorder_issue;
    TestContext::new(&config)
}

#[test]
fn dependent_chain_waits_for_producer_latency() {
    let mut t = harness(false);
    let _li = t.dispatch(Inst::li(5, 3));
    let mul = t.dispatch(Inst::op(Opcode::Mul, 6, 5, 5));
    let add = t.dispatch(Inst::op(Opcode::Add, 7, 6, 0));

    // li issues at 1; mul at 2 with latency 3; add when mul's result is ready.
    ticks(&mut t, 3);
    assert_eq!(status(&t, mul), EntryStatus::Issued);
    let mul_dest = t.ctx.rob.get(mul).unwrap().physreg.unwrap();
    assert_eq!(t.core.regfile.get(mul_dest).ready_cycle, 5);

    ticks(&mut t, 2);
    assert_eq!(status(&t, add), EntryStatus::Queued);
    ticks(&mut t, 1);
    assert_eq!(status(&t, add), EntryStatus::Issued);
    let add_dest = t.ctx.rob.get(add).unwrap().physreg.unwrap();
    assert_eq!(t.core.regfile.get(add_dest).ready_cycle, 6);
    assert_eq!(t.ctx.regs.int(7), 9);
}

#[rstest]
#[case::out_of_order(false, 2)]
#[case::in_order(true, 6)]
fn independent_work_passes_a_stalled_consumer_only_out_of_order(
    #[case] inorder_issue: bool,
    #[case] ticks_until_issued: u64,
) {
    let mut t = harness(inorder_issue);
    let _li = t.dispatch(Inst::li(5, 3));
    let _mul = t.dispatch(Inst::op(Opcode::Mul, 6, 5, 5));
    let _add = t.dispatch(Inst::op(Opcode::Add, 7, 6, 0));
    let independent = t.dispatch(Inst::li(8, 1));

    ticks(&mut t, ticks_until_issued - 1);
    assert_eq!(status(&t, independent), EntryStatus::Queued);
    ticks(&mut t, 1);
    assert_ne!(status(&t, independent), EntryStatus::Queued);
}

#[test]
fn commit_is_in_program_order() {
    let mut t = harness(false);
    let first = t.dispatch(Inst::li(5, 3));
    let old_x5 = t.ctx.rob.get(first).unwrap().old_physreg.unwrap();
    let new_x5 = t.ctx.rob.get(first).unwrap().physreg.unwrap();
    let _mul = t.dispatch(Inst::op(Opcode::Mul, 6, 5, 5));
    let young = t.dispatch(Inst::li(7, 1));

    ticks(&mut t, 4);
    assert_eq!(t.stats.committed, 1);
    assert_eq!(t.core.regfile.state(old_x5), RegState::Free);
    assert_eq!(t.core.regfile.state(new_x5), RegState::Architected);
    // The young li completed long ago but waits behind the multiply.
    assert_eq!(status(&t, young), EntryStatus::Completed);

    ticks(&mut t, 2);
    assert_eq!(t.stats.committed, 1);
    ticks(&mut t, 1);
    assert_eq!(t.stats.committed, 3);
    assert!(t.ctx.rob.is_empty());
    assert_eq!(t.core.live_insts, 0);
    assert_eq!(t.ctx.icount, 0);
    assert_eq!(t.counters.total(), 3);
}

#[test]
fn memory_operation_completes_both_halves_before_commit() {
    let mut t = harness(false);
    let _ = t.dispatch(Inst::li(5, 0x100));
    let _ = t.dispatch(Inst::li(6, 0x55));
    let store = t.dispatch(Inst::store(MemWidth::Word, 6, 5, 0));
    let load = t.dispatch(Inst::load(MemWidth::Word, 7, 5, 0));
    assert_eq!(t.ctx.regs.int(7), 0x55);
    assert_eq!(t.ctx.lsq.len(), 2);
    let load_half = t.ctx.rob.get(load).unwrap().partner.unwrap();
    assert_eq!(t.ctx.lsq.get(load_half).unwrap().partner, Some(load));
    assert!(t.ctx.rob.get(store).unwrap().ea_comp);

    t.run(40);
    assert_eq!(t.stats.committed, 4);
    assert_eq!(t.stats.inst_store, 1);
    assert_eq!(t.stats.inst_load, 1);
    assert!(t.ctx.lsq.is_empty());
    // Only the context's 32 architected registers are held.
    assert_eq!(
        t.core.regfile.free_count(RegBank::Int),
        t.core.regfile.size(RegBank::Int) - 32
    );
}

#[test]
fn mispredicted_branch_squashes_wrong_path() {
    let program = ProgramBuilder::default()
        .li(5, 1)
        .branch_to(Opcode::Bne, 5, 0, 4)
        .li(10, 99)
        .syscall()
        .li(10, 7)
        .syscall()
        .build();
    let mut t = harness(false).with_program(program);
    t.run(100);

    assert_eq!(t.ctx.state, RunState::Exited(7));
    assert_eq!(t.stats.branch_mispredictions, 1);
    assert!(t.stats.squashed >= 2);
    assert_eq!(t.stats.committed, 4);
    assert_eq!(t.counters.total(), t.stats.committed);
}

#[test]
fn fetch_fault_is_taken_at_commit() {
    let program = ProgramBuilder::default().li(5, 1).li(6, 2).build();
    let mut t = harness(false).with_program(program);
    t.run(100);

    assert_eq!(
        t.ctx.state,
        RunState::Faulted(Fault::Fetch {
            pc: TEXT_BASE + 2 * INSTRUCTION_SIZE
        })
    );
    assert_eq!(t.stats.committed, 2);
    assert_eq!(t.stats.faults, 1);
    assert!(t.ctx.is_drained());
    assert_eq!(t.ctx.regs.int(6), 2);
}
