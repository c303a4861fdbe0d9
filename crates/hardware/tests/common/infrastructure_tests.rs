use super::builder::program::{ProgramBuilder, TEXT_BASE};
use super::harness::TestContext;
use super::mocks::ras::MockReturnStack;
use smtsim_core::core::units::ras::ReturnAddressStack;
use smtsim_core::isa::instruction::Opcode;
use smtsim_core::isa::program::InstSource;

// ─── ProgramBuilder ────────────────────────────────────────────────────────

#[test]
fn builder_places_instructions_at_consecutive_addresses() {
    let program = ProgramBuilder::default().li(5, 1).li(6, 2).syscall().build();
    assert_eq!(program.base(), TEXT_BASE);
    assert_eq!(program.len(), 3);
    assert_eq!(program.fetch(TEXT_BASE + 8).unwrap().opcode, Opcode::Syscall);
    assert!(program.fetch(TEXT_BASE + 12).is_none());
}

#[test]
fn builder_branch_offsets_are_relative_to_the_branch() {
    let program = ProgramBuilder::default()
        .li(5, 0)
        .branch_to(Opcode::Beq, 0, 0, 0)
        .jump_to(4)
        .call_to(1, 0)
        .build();
    assert_eq!(program.fetch(TEXT_BASE + 4).unwrap().imm, -4);
    assert_eq!(program.fetch(TEXT_BASE + 8).unwrap().imm, 8);
    assert_eq!(program.fetch(TEXT_BASE + 12).unwrap().imm, -12);
}

// ─── TestContext ───────────────────────────────────────────────────────────

#[test]
fn harness_admits_one_context() {
    let t = TestContext::default();
    assert!(t.ctx.is_resident());
    assert_eq!(t.core.occupants().count(), 1);
    assert_eq!(t.ctx.rob.capacity(), t.core.slot(t.slot()).unwrap().template.rob_size);
}

#[test]
fn harness_dispatch_executes_functionally() {
    let mut t = TestContext::default();
    let _ = t.dispatch(smtsim_core::isa::instruction::Inst::li(5, 42));
    assert_eq!(t.ctx.regs.int(5), 42);
    assert_eq!(t.ctx.rob.len(), 1);
    assert_eq!(t.counters.total(), 1);
}

// ─── Mocks ─────────────────────────────────────────────────────────────────

#[test]
fn mock_return_stack_records_calls() {
    let mut ras = MockReturnStack::new();
    let _ = ras.expect_push().withf(|&addr| addr == 0x40).times(1).return_const(());
    let _ = ras.expect_pop().times(1).return_const(0x40u64);
    ras.push(0x40);
    assert_eq!(ras.pop(), 0x40);
}
