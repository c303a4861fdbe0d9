//! SimStats unit tests.
//!
//! Verifies default initialization, stall attribution, the instruction mix
//! and the formatted summary.

use pretty_assertions::assert_eq;
use smtsim_core::common::error::Stall;
use smtsim_core::common::reg::RegBank;
use smtsim_core::core::ContextId;
use smtsim_core::core::pipeline::entry::InflightEntry;
use smtsim_core::isa::instruction::{Inst, MemWidth, Opcode};
use smtsim_core::stats::{InstCounters, SimStats};

#[test]
fn default_stats_all_zero() {
    let stats = SimStats::default();
    assert_eq!(stats.cycles, 0);
    assert_eq!(stats.committed, 0);
    assert!(stats.committed_per_thread.is_empty());
    assert_eq!(stats.branch_mispredictions, 0);
    assert_eq!(stats.squashed, 0);
    assert_eq!(stats.flushes, 0);
    assert_eq!(stats.faults, 0);
    assert!(stats.summary().ipc.abs() < f64::EPSILON);
}

#[test]
fn stalls_are_attributed_by_cause() {
    let mut stats = SimStats::default();
    stats.record_stall(Stall::RobFull);
    stats.record_stall(Stall::RobFull);
    stats.record_stall(Stall::LsqFull);
    stats.record_stall(Stall::IssueQueueFull);
    stats.record_stall(Stall::NoFreeRegister(RegBank::Fp));
    stats.record_stall(Stall::FetchQueueEmpty);

    assert_eq!(stats.stalls_rob, 2);
    assert_eq!(stats.stalls_lsq, 1);
    assert_eq!(stats.stalls_issue_queue, 1);
    assert_eq!(stats.stalls_regs, 1);
    assert_eq!(stats.stalls_fetch, 1);
    // Empty fetch queue is not a resource stall.
    assert_eq!(stats.summary().dispatch_stalls, 5);
}

#[test]
fn commit_mix_covers_every_class() {
    let mut stats = SimStats::default();
    let ctx = ContextId(0);
    let insts = [
        Inst::load(MemWidth::Byte, 1, 2, 0),
        Inst::store(MemWidth::Half, 1, 2, 0),
        Inst::fload(1, 2, 0),
        Inst::fstore(1, 2, 0),
        Inst::op(Opcode::FMul, 1, 2, 3),
        Inst::branch(Opcode::Bne, 1, 2, 8),
        Inst::ret(1),
        Inst::op(Opcode::Div, 1, 2, 3),
        Inst::syscall(),
    ];
    for (seq, inst) in insts.into_iter().enumerate() {
        stats.record_commit(ctx, &InflightEntry::new(inst, 0, seq as u64, 4, 0));
    }

    assert_eq!(stats.inst_load, 1);
    assert_eq!(stats.inst_store, 1);
    assert_eq!(stats.inst_fp_load, 1);
    assert_eq!(stats.inst_fp_store, 1);
    assert_eq!(stats.inst_fp_arith, 1);
    assert_eq!(stats.inst_branch, 2);
    assert_eq!(stats.inst_alu, 1);
    assert_eq!(stats.inst_system, 1);
    assert_eq!(stats.committed, insts.len() as u64);
    assert_eq!(stats.committed_by(ctx), insts.len() as u64);
    assert_eq!(stats.committed_by(ContextId(1)), 0);
}

#[test]
fn summary_formats_headline_numbers() {
    let stats = SimStats {
        cycles: 200,
        committed: 100,
        branch_mispredictions: 3,
        squashed: 17,
        flushes: 1,
        ..SimStats::default()
    };
    let summary = stats.summary();
    assert!((summary.ipc - 0.5).abs() < f64::EPSILON);

    let text = summary.to_string();
    assert!(text.contains("sim_cycles               200"));
    assert!(text.contains("sim_ipc                  0.5000"));
    assert!(text.contains("rollback.squashed        17"));
    assert_eq!(text.lines().count(), 8);
}

#[test]
fn counters_track_dispatch_minus_squash() {
    let mut counters = InstCounters::new();
    let (a, b) = (ContextId(0), ContextId(1));
    for _ in 0..5 {
        counters.record_dispatch(a);
    }
    counters.record_dispatch(b);
    counters.retract(a, 5);
    counters.retract(b, 0);
    assert_eq!(counters.total(), 1);
    assert_eq!(counters.thread(a), 0);
    assert_eq!(counters.thread(b), 1);
    assert_eq!(counters.thread(ContextId(7)), 0);
}
