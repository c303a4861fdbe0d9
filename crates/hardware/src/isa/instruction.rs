//! Instruction records.
//!
//! Instructions are stored pre-decoded: an `Opcode` plus register numbers and a
//! sign-extended immediate. There is no binary encoding; programs are built
//! from the constructors below.

/// Width of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemWidth {
    /// 1 byte.
    Byte,
    /// 2 bytes.
    Half,
    /// 4 bytes.
    Word,
    /// 8 bytes.
    Double,
}

impl MemWidth {
    /// Access size in bytes.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
            Self::Double => 8,
        }
    }

    /// Width of an access of `bytes` bytes, if it is a legal size.
    pub const fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(Self::Byte),
            2 => Some(Self::Half),
            4 => Some(Self::Word),
            8 => Some(Self::Double),
            _ => None,
        }
    }
}

/// Operation performed by an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// No operation.
    Nop,
    /// `rd = rs1 + rs2`
    Add,
    /// `rd = rs1 - rs2`
    Sub,
    /// `rd = rs1 & rs2`
    And,
    /// `rd = rs1 | rs2`
    Or,
    /// `rd = rs1 ^ rs2`
    Xor,
    /// `rd = rs1 << (rs2 & 63)`
    Sll,
    /// `rd = rs1 >> (rs2 & 63)` (logical)
    Srl,
    /// `rd = rs1 + imm`
    Addi,
    /// `rd = rs1 * rs2` (low 64 bits)
    Mul,
    /// `rd = rs1 / rs2` (signed; division by zero yields all ones)
    Div,
    /// `fd = fs1 + fs2`
    FAdd,
    /// `fd = fs1 * fs2`
    FMul,
    /// `fd = fs1 / fs2`
    FDiv,
    /// `fd = bits(rs1)`
    FMvToFp,
    /// `rd = bits(fs1)`
    FMvToInt,
    /// `rd = zext(mem[rs1 + imm])`
    Load(MemWidth),
    /// `mem[rs1 + imm] = rs2`
    Store(MemWidth),
    /// `fd = mem64[rs1 + imm]`
    FLoad,
    /// `mem64[rs1 + imm] = fs2`
    FStore,
    /// Branch to `pc + imm` if `rs1 == rs2`.
    Beq,
    /// Branch to `pc + imm` if `rs1 != rs2`.
    Bne,
    /// Branch to `pc + imm` if `rs1 < rs2` (signed).
    Blt,
    /// Jump to `pc + imm`.
    Jump,
    /// `rd = pc + 4`, jump to `pc + imm`.
    Call,
    /// Jump to `rs1`.
    Ret,
    /// Exit the thread with the value of `a0`.
    Syscall,
}

impl Opcode {
    /// Conditional branch.
    #[inline]
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::Beq | Self::Bne | Self::Blt)
    }

    /// Any instruction that may redirect the program counter.
    #[inline]
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::Beq | Self::Bne | Self::Blt | Self::Jump | Self::Call | Self::Ret
        )
    }
}

/// A pre-decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inst {
    /// Operation.
    pub opcode: Opcode,
    /// Destination register number.
    pub rd: u8,
    /// First source register number.
    pub rs1: u8,
    /// Second source register number.
    pub rs2: u8,
    /// Sign-extended immediate.
    pub imm: i64,
}

impl Default for Inst {
    fn default() -> Self {
        Self::nop()
    }
}

impl Inst {
    /// Creates an instruction from raw fields.
    pub const fn new(opcode: Opcode, rd: u8, rs1: u8, rs2: u8, imm: i64) -> Self {
        Self {
            opcode,
            rd,
            rs1,
            rs2,
            imm,
        }
    }

    /// `nop`
    pub const fn nop() -> Self {
        Self::new(Opcode::Nop, 0, 0, 0, 0)
    }

    /// Register-register integer or FP operation.
    pub const fn op(opcode: Opcode, rd: u8, rs1: u8, rs2: u8) -> Self {
        Self::new(opcode, rd, rs1, rs2, 0)
    }

    /// `addi rd, rs1, imm`
    pub const fn addi(rd: u8, rs1: u8, imm: i64) -> Self {
        Self::new(Opcode::Addi, rd, rs1, 0, imm)
    }

    /// `li rd, imm` (alias of `addi rd, r0, imm`)
    pub const fn li(rd: u8, imm: i64) -> Self {
        Self::addi(rd, 0, imm)
    }

    /// Integer load of `width` bytes into `rd` from `rs1 + imm`.
    pub const fn load(width: MemWidth, rd: u8, rs1: u8, imm: i64) -> Self {
        Self::new(Opcode::Load(width), rd, rs1, 0, imm)
    }

    /// Integer store of the low `width` bytes of `rs2` to `rs1 + imm`.
    pub const fn store(width: MemWidth, rs2: u8, rs1: u8, imm: i64) -> Self {
        Self::new(Opcode::Store(width), 0, rs1, rs2, imm)
    }

    /// FP load of 8 bytes into `fd` from `rs1 + imm`.
    pub const fn fload(fd: u8, rs1: u8, imm: i64) -> Self {
        Self::new(Opcode::FLoad, fd, rs1, 0, imm)
    }

    /// FP store of `fs2` to `rs1 + imm`.
    pub const fn fstore(fs2: u8, rs1: u8, imm: i64) -> Self {
        Self::new(Opcode::FStore, 0, rs1, fs2, imm)
    }

    /// Conditional branch with a byte offset relative to its own PC.
    pub const fn branch(opcode: Opcode, rs1: u8, rs2: u8, offset: i64) -> Self {
        Self::new(opcode, 0, rs1, rs2, offset)
    }

    /// `j offset`
    pub const fn jump(offset: i64) -> Self {
        Self::new(Opcode::Jump, 0, 0, 0, offset)
    }

    /// `call offset`, linking into `rd`.
    pub const fn call(rd: u8, offset: i64) -> Self {
        Self::new(Opcode::Call, rd, 0, 0, offset)
    }

    /// `ret` through `rs1`.
    pub const fn ret(rs1: u8) -> Self {
        Self::new(Opcode::Ret, 0, rs1, 0, 0)
    }

    /// `syscall` (exit with `a0`).
    pub const fn syscall() -> Self {
        Self::new(Opcode::Syscall, 0, 0, 0, 0)
    }
}
