use num_derive::{FromPrimitive, ToPrimitive};
use std::str::FromStr;

/// The universal unit of VM memory, register, and operand storage.
///
/// Arithmetic on a `Word` wraps (two's-complement); `CMP` is the sole
/// opcode that reinterprets a `Word` as signed.
pub type Word = u64;

/// A register index in the fixed register file.
///
/// `R0..R15` are general-purpose; the rest carry VM-internal meaning but
/// are still addressable by a guest program through ordinary register
/// operands.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum RegisterId {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
    /// Instruction pointer, in words.
    IP,
    /// Monotonic instruction counter.
    IC,
    /// Stack pointer: word offset from `SBP`.
    SP,
    /// Stack base pointer: word address of the stack's top-of-memory.
    SBP,
    /// Remainder left behind by the last `DIV`.
    RMD,
}

pub const REGISTER_COUNT: usize = 21;

#[derive(Debug, thiserror::Error)]
#[error("\"{0}\" is not a register name")]
pub struct ParseRegisterError(String);

impl FromStr for RegisterId {
    type Err = ParseRegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use RegisterId::*;
        Ok(match s {
            "R0" => R0,
            "R1" => R1,
            "R2" => R2,
            "R3" => R3,
            "R4" => R4,
            "R5" => R5,
            "R6" => R6,
            "R7" => R7,
            "R8" => R8,
            "R9" => R9,
            "R10" => R10,
            "R11" => R11,
            "R12" => R12,
            "R13" => R13,
            "R14" => R14,
            "R15" => R15,
            "IP" => IP,
            "IC" => IC,
            "SP" => SP,
            "SBP" => SBP,
            "RMD" => RMD,
            _ => return Err(ParseRegisterError(s.to_string())),
        })
    }
}

/// The full opcode set. Arity and effect are documented on the dispatcher
/// in [`crate::dispatch`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Opcode {
    NOP,
    HALT,
    PUSH,
    POP,
    ADD,
    SUB,
    MUL,
    DIV,
    SHL,
    SHR,
    MOD,
    INC,
    DEC,
    NOT,
    CMP,
    MOV,
    CALL,
    RET,
    JMP,
    JEQ,
    JNE,
    JNZ,
    RDRAND,
}

impl FromStr for Opcode {
    type Err = ParseRegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Opcode::*;
        Ok(match s {
            "NOP" => NOP,
            "HALT" => HALT,
            "PUSH" => PUSH,
            "POP" => POP,
            "ADD" => ADD,
            "SUB" => SUB,
            "MUL" => MUL,
            "DIV" => DIV,
            "SHL" => SHL,
            "SHR" => SHR,
            "MOD" => MOD,
            "INC" => INC,
            "DEC" => DEC,
            "NOT" => NOT,
            "CMP" => CMP,
            "MOV" => MOV,
            "CALL" => CALL,
            "RET" => RET,
            "JMP" => JMP,
            "JEQ" => JEQ,
            "JNE" => JNE,
            "JNZ" => JNZ,
            "RDRAND" => RDRAND,
            _ => return Err(ParseRegisterError(s.to_string())),
        })
    }
}

bitflags::bitflags! {
    /// Addressing mode bits for a single operand. Exactly one of
    /// `LITERAL`/`MEMORY`/`REGISTER` is set; `INDIRECT` may additionally be
    /// set, except together with `LITERAL`.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct AddressingMode: u8 {
        const INDIRECT = 0b0001;
        const LITERAL  = 0b0010;
        const MEMORY   = 0b0100;
        const REGISTER = 0b1000;
    }
}

impl AddressingMode {
    /// Whether this is a legal combination per the spec: exactly one
    /// primary mode, and `INDIRECT` never paired with `LITERAL`.
    pub fn is_valid(self) -> bool {
        let primaries = self & (Self::LITERAL | Self::MEMORY | Self::REGISTER);
        let primary_count = primaries.bits().count_ones();
        if primary_count != 1 {
            return false;
        }
        !(self.contains(Self::LITERAL) && self.contains(Self::INDIRECT))
    }
}
