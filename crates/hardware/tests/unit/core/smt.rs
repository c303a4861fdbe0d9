//! Context admission, eviction and transfer between cores.

use pretty_assertions::assert_eq;
use smtsim_core::common::error::{CoreError, Stall, TransferError};
use smtsim_core::common::reg::RegBank;
use smtsim_core::config::Config;
use smtsim_core::core::pipeline::regfile::RegState;
use smtsim_core::core::{Context, ContextId, Core, transfer_context};
use smtsim_core::isa::instruction::{Inst, MemWidth};
use smtsim_core::soc::memory::FlatMemory;

use crate::common::harness::TestContext;

fn config(max_contexts: usize, rename_registers: usize) -> Config {
    let mut config = Config::default();
    config.core.max_contexts = max_contexts;
    config.core.rename_registers = rename_registers;
    config
}

#[test]
fn admission_fills_slots_in_order() {
    let mut core = Core::new(0, &config(2, 8));
    let mut a = Context::new(ContextId(0), 0);
    let mut b = Context::new(ContextId(1), 0);
    let mut c = Context::new(ContextId(2), 0);

    assert_eq!(core.add_context(&mut a).unwrap().0, 0);
    assert_eq!(core.add_context(&mut b).unwrap().0, 1);
    assert_eq!(core.add_context(&mut c), Err(CoreError::Full));
    assert!(!c.is_resident());
    assert_eq!(core.add_context(&mut a), Err(CoreError::AlreadyAdmitted(0)));

    let occupants: Vec<ContextId> = core.occupants().map(|(_, id)| id).collect();
    assert_eq!(occupants, vec![ContextId(0), ContextId(1)]);
    // Both reserves are leased: only rename registers remain.
    assert_eq!(core.regfile.renamable(RegBank::Int), 8);
    assert_eq!(core.regfile.free_count(RegBank::Int), 8);
}

#[test]
fn eviction_frees_the_slot_for_another_context() {
    let mut core = Core::new(0, &config(1, 8));
    let mut a = Context::new(ContextId(0), 0);
    let mut b = Context::new(ContextId(1), 0);
    let _ = core.add_context(&mut a).unwrap();
    let leased: Vec<_> = (0..32)
        .filter_map(|n| a.rename.get(smtsim_core::common::reg::ArchReg::int(n)))
        .collect();

    assert_eq!(core.eject_context(&mut a).unwrap().0, 0);
    assert!(a.rename.is_empty());
    for reg in leased {
        assert_eq!(core.regfile.state(reg), RegState::Free);
    }
    assert_eq!(core.eject_context(&mut a), Err(CoreError::NotResident(0)));
    assert_eq!(core.add_context(&mut b).unwrap().0, 0);
}

#[test]
fn eject_from_wrong_core_is_rejected() {
    let cfg = config(1, 8);
    let mut core0 = Core::new(0, &cfg);
    let mut core1 = Core::new(1, &cfg);
    let mut a = Context::new(ContextId(0), 0);
    let _ = core0.add_context(&mut a).unwrap();
    assert_eq!(core1.eject_context(&mut a), Err(CoreError::NotResident(0)));
    assert!(a.is_resident());
}

#[test]
#[should_panic(expected = "ejecting ctx0 with 1 ROB entries")]
fn eject_with_inflight_work_panics() {
    let mut t = TestContext::default();
    let _ = t.dispatch(Inst::li(5, 1));
    let _ = t.core.eject_context(&mut t.ctx);
}

#[test]
fn register_exhaustion_stalls_without_side_effects() {
    let mut t = TestContext::new(&config(2, 2));
    let _ = t.dispatch(Inst::li(5, 1));
    let _ = t.dispatch(Inst::li(6, 2));
    assert_eq!(t.core.regfile.renamable(RegBank::Int), 0);

    t.push_fetched(Inst::li(7, 3));
    assert_eq!(t.try_dispatch(), Err(Stall::NoFreeRegister(RegBank::Int)));
    assert_eq!(t.ctx.rob.len(), 2);
    assert_eq!(t.ctx.ifq.len(), 1);
    assert_eq!(t.ctx.regs.int(7), 0);
    assert_eq!(t.ctx.next_seq, 2);

    // Instructions without a destination still dispatch.
    let _ = t.ctx.ifq.pop_front();
    t.push_fetched(Inst::store(MemWidth::Word, 5, 0, 0x100));
    assert!(t.try_dispatch().is_ok());
}

#[test]
fn full_rob_and_lsq_stall_dispatch() {
    let mut t = TestContext::with_buffers(2, 1);
    let _ = t.dispatch(Inst::store(MemWidth::Word, 0, 0, 0x100));
    t.push_fetched(Inst::load(MemWidth::Word, 5, 0, 0x100));
    assert_eq!(t.try_dispatch(), Err(Stall::LsqFull));

    let _ = t.ctx.ifq.pop_front();
    let _ = t.dispatch(Inst::li(5, 1));
    t.push_fetched(Inst::li(6, 1));
    assert_eq!(t.try_dispatch(), Err(Stall::RobFull));
}

#[test]
fn transfer_moves_context_and_retracts_nothing_on_eject_error() {
    let cfg = config(1, 16);
    let mut core0 = Core::new(0, &cfg);
    let mut core1 = Core::new(1, &cfg);
    let mut mem = FlatMemory::new(0, 0x1000);
    let mut a = Context::new(ContextId(0), 0x40);
    let _ = core0.add_context(&mut a).unwrap();

    // Not on core1: nothing is flushed.
    assert_eq!(
        transfer_context(&mut a, &mut core1, &mut core0, &mut mem),
        Err(TransferError::Eject(CoreError::NotResident(0)))
    );
    assert_eq!(a.residence.unwrap().core, 0);

    let report = transfer_context(&mut a, &mut core0, &mut core1, &mut mem).unwrap();
    assert_eq!(report.squashed, 0);
    assert_eq!(a.residence.unwrap().core, 1);
    assert_eq!(core0.occupants().count(), 0);
    assert_eq!(core1.occupants().count(), 1);
    assert_eq!(core0.regfile.free_count(RegBank::Int), core0.regfile.size(RegBank::Int));
}

#[test]
fn transfer_to_full_core_leaves_context_detached() {
    let cfg = config(1, 16);
    let mut core0 = Core::new(0, &cfg);
    let mut core1 = Core::new(1, &cfg);
    let mut mem = FlatMemory::new(0, 0x1000);
    let mut a = Context::new(ContextId(0), 0x40);
    let mut b = Context::new(ContextId(1), 0x80);
    let _ = core0.add_context(&mut a).unwrap();
    let _ = core1.add_context(&mut b).unwrap();

    let err = transfer_context(&mut a, &mut core0, &mut core1, &mut mem).unwrap_err();
    assert_eq!(
        err,
        TransferError::Admission {
            source: CoreError::Full,
            squashed: 0
        }
    );
    assert!(!a.is_resident());
    assert_eq!(core0.occupants().count(), 0);
    assert_eq!(core1.occupants().count(), 1);

    // The detached context can be admitted again by hand.
    assert!(core0.add_context(&mut a).is_ok());
}
