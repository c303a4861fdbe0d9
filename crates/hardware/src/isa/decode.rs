//! Pure opcode classification.
//!
//! Rename, dispatch and issue all need to know which operands an instruction
//! reads and writes and which functional unit executes it. `classify` answers
//! that from the opcode alone so it can be called anywhere without state.

use crate::common::reg::RegType;
use crate::isa::instruction::Opcode;

/// Functional unit class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FuClass {
    /// Integer ALU (also computes effective addresses).
    IntAlu,
    /// Integer multiplier.
    IntMul,
    /// Integer divider.
    IntDiv,
    /// FP adder.
    FpAdd,
    /// FP multiplier.
    FpMul,
    /// FP divider.
    FpDiv,
    /// Load/store port.
    MemPort,
    /// Branch unit.
    Branch,
}

impl FuClass {
    /// Every class, in pool order.
    pub const ALL: [Self; 8] = [
        Self::IntAlu,
        Self::IntMul,
        Self::IntDiv,
        Self::FpAdd,
        Self::FpMul,
        Self::FpDiv,
        Self::MemPort,
        Self::Branch,
    ];

    /// Position of this class in [`FuClass::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Dotted configuration path of this class's unit count.
    pub const fn config_name(self) -> &'static str {
        match self {
            Self::IntAlu => "fu.int_alu.count",
            Self::IntMul => "fu.int_mul.count",
            Self::IntDiv => "fu.int_div.count",
            Self::FpAdd => "fu.fp_add.count",
            Self::FpMul => "fu.fp_mul.count",
            Self::FpDiv => "fu.fp_div.count",
            Self::MemPort => "fu.mem_port.count",
            Self::Branch => "fu.branch.count",
        }
    }
}

/// Operand and resource classification of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpClass {
    /// Type of the `rs1` operand.
    pub src1: RegType,
    /// Type of the `rs2` operand.
    pub src2: RegType,
    /// Type of the `rd` destination.
    pub dest: RegType,
    /// Reads memory.
    pub is_load: bool,
    /// Writes memory.
    pub is_store: bool,
    /// Unit that performs the operation (the memory half for loads/stores).
    pub fu: FuClass,
}

impl OpClass {
    const fn new(src1: RegType, src2: RegType, dest: RegType, fu: FuClass) -> Self {
        Self {
            src1,
            src2,
            dest,
            is_load: false,
            is_store: false,
            fu,
        }
    }

    const fn load(dest: RegType) -> Self {
        Self {
            is_load: true,
            ..Self::new(RegType::Int, RegType::None, dest, FuClass::MemPort)
        }
    }

    const fn store(data: RegType) -> Self {
        Self {
            is_store: true,
            ..Self::new(RegType::Int, data, RegType::None, FuClass::MemPort)
        }
    }

    /// Loads and stores are split into an address entry and a memory entry.
    #[inline]
    pub const fn is_mem(&self) -> bool {
        self.is_load || self.is_store
    }
}

/// Classifies an opcode.
pub const fn classify(opcode: Opcode) -> OpClass {
    use FuClass as F;
    use RegType::{Fp, Int, None as Nil};

    match opcode {
        Opcode::Nop | Opcode::Syscall => OpClass::new(Nil, Nil, Nil, F::IntAlu),
        Opcode::Add
        | Opcode::Sub
        | Opcode::And
        | Opcode::Or
        | Opcode::Xor
        | Opcode::Sll
        | Opcode::Srl => OpClass::new(Int, Int, Int, F::IntAlu),
        Opcode::Addi => OpClass::new(Int, Nil, Int, F::IntAlu),
        Opcode::Mul => OpClass::new(Int, Int, Int, F::IntMul),
        Opcode::Div => OpClass::new(Int, Int, Int, F::IntDiv),
        Opcode::FAdd => OpClass::new(Fp, Fp, Fp, F::FpAdd),
        Opcode::FMul => OpClass::new(Fp, Fp, Fp, F::FpMul),
        Opcode::FDiv => OpClass::new(Fp, Fp, Fp, F::FpDiv),
        Opcode::FMvToFp => OpClass::new(Int, Nil, Fp, F::IntAlu),
        Opcode::FMvToInt => OpClass::new(Fp, Nil, Int, F::IntAlu),
        Opcode::Load(_) => OpClass::load(Int),
        Opcode::FLoad => OpClass::load(Fp),
        Opcode::Store(_) => OpClass::store(Int),
        Opcode::FStore => OpClass::store(Fp),
        Opcode::Beq | Opcode::Bne | Opcode::Blt => OpClass::new(Int, Int, Nil, F::Branch),
        Opcode::Jump => OpClass::new(Nil, Nil, Nil, F::Branch),
        Opcode::Call => OpClass::new(Nil, Nil, Int, F::Branch),
        Opcode::Ret => OpClass::new(Int, Nil, Nil, F::Branch),
    }
}
