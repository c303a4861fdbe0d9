use smtsim_core::common::constants::INSTRUCTION_SIZE;
use smtsim_core::isa::instruction::{Inst, MemWidth, Opcode};
use smtsim_core::isa::program::Program;

/// Base address used by test programs unless stated otherwise.
pub const TEXT_BASE: u64 = 0x1000;

/// Assembles a `Program` one instruction at a time.
///
/// Branch helpers take the *index* of the target instruction and compute the
/// byte offset from the instruction being emitted.
pub struct ProgramBuilder {
    base: u64,
    insts: Vec<Inst>,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new(TEXT_BASE)
    }
}

impl ProgramBuilder {
    pub fn new(base: u64) -> Self {
        Self {
            base,
            insts: Vec::new(),
        }
    }

    /// Index the next instruction will have.
    pub fn here(&self) -> usize {
        self.insts.len()
    }

    /// Address of instruction `idx`.
    pub fn pc_of(&self, idx: usize) -> u64 {
        self.base + idx as u64 * INSTRUCTION_SIZE
    }

    fn offset_to(&self, target: usize) -> i64 {
        (target as i64 - self.insts.len() as i64) * INSTRUCTION_SIZE as i64
    }

    pub fn inst(mut self, inst: Inst) -> Self {
        self.insts.push(inst);
        self
    }

    pub fn li(self, rd: u8, imm: i64) -> Self {
        self.inst(Inst::li(rd, imm))
    }

    pub fn addi(self, rd: u8, rs1: u8, imm: i64) -> Self {
        self.inst(Inst::addi(rd, rs1, imm))
    }

    pub fn add(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.inst(Inst::op(Opcode::Add, rd, rs1, rs2))
    }

    pub fn mul(self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.inst(Inst::op(Opcode::Mul, rd, rs1, rs2))
    }

    pub fn load(self, width: MemWidth, rd: u8, rs1: u8, imm: i64) -> Self {
        self.inst(Inst::load(width, rd, rs1, imm))
    }

    pub fn store(self, width: MemWidth, rs2: u8, rs1: u8, imm: i64) -> Self {
        self.inst(Inst::store(width, rs2, rs1, imm))
    }

    /// Conditional branch to instruction `target`.
    pub fn branch_to(self, opcode: Opcode, rs1: u8, rs2: u8, target: usize) -> Self {
        let offset = self.offset_to(target);
        self.inst(Inst::branch(opcode, rs1, rs2, offset))
    }

    /// Unconditional jump to instruction `target`.
    pub fn jump_to(self, target: usize) -> Self {
        let offset = self.offset_to(target);
        self.inst(Inst::jump(offset))
    }

    /// Call to instruction `target`, linking into `rd`.
    pub fn call_to(self, rd: u8, target: usize) -> Self {
        let offset = self.offset_to(target);
        self.inst(Inst::call(rd, offset))
    }

    pub fn ret(self, rs1: u8) -> Self {
        self.inst(Inst::ret(rs1))
    }

    pub fn syscall(self) -> Self {
        self.inst(Inst::syscall())
    }

    pub fn build(self) -> Program {
        Program::new(self.base, self.insts)
    }
}
