//! A built-in example program: Euclid's algorithm computing `gcd(R0, R1)`
//! into `R0`. Lifted verbatim (addresses and inputs included) from the
//! `load_example` demo in the original implementation this crate's
//! specification was distilled from, so the `tinyvm-asm` CLI's no-file
//! mode and this crate's integration tests can share one known-good
//! program.

use crate::instruction::{encode, Instruction, InstructionData};
use crate::word::{AddressingMode, Opcode, RegisterId, Word};

/// Program base address the demo expects to be loaded at.
pub const PROGRAM_BASE: Word = 1032;

/// Stack base pointer the demo expects to be initialized with.
pub const STACK_BASE: Word = 1024;

const GCD_LOOP: Word = PROGRAM_BASE + 4; // 1036
const MAIN: Word = PROGRAM_BASE + 24; // 1056

fn lit(v: Word) -> (AddressingMode, Word) {
    (AddressingMode::LITERAL, v)
}

fn reg(id: RegisterId) -> (AddressingMode, Word) {
    (AddressingMode::REGISTER, id as Word)
}

fn instr0(opcode: Opcode) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [AddressingMode::LITERAL; 3],
        operands: [0; 3],
    }
}

fn instr1(opcode: Opcode, a: (AddressingMode, Word)) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [a.0, AddressingMode::LITERAL, AddressingMode::LITERAL],
        operands: [a.1, 0, 0],
    }
}

fn instr2(opcode: Opcode, a: (AddressingMode, Word), b: (AddressingMode, Word)) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [a.0, b.0, AddressingMode::LITERAL],
        operands: [a.1, b.1, 0],
    }
}

fn instr3(
    opcode: Opcode,
    a: (AddressingMode, Word),
    b: (AddressingMode, Word),
    c: (AddressingMode, Word),
) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [a.0, b.0, c.0],
        operands: [a.1, b.1, c.1],
    }
}

/// Euclid's algorithm: `gcd(1071, 462) == 21`. Loads at [`PROGRAM_BASE`];
/// the stack must be initialized with [`STACK_BASE`] before running.
pub fn euclid_program() -> Vec<InstructionData> {
    let program = [
        // 1032: jmp main
        instr1(Opcode::JMP, lit(MAIN)),
        // 1036: gcd_loop:
        // R2 = R1
        instr2(Opcode::MOV, reg(RegisterId::R2), reg(RegisterId::R1)),
        // R1 = R0 mod R1
        instr3(
            Opcode::MOD,
            reg(RegisterId::R1),
            reg(RegisterId::R0),
            reg(RegisterId::R1),
        ),
        // R0 = R2
        instr2(Opcode::MOV, reg(RegisterId::R0), reg(RegisterId::R2)),
        // loop while R1 != 0
        instr2(Opcode::JNZ, lit(GCD_LOOP), reg(RegisterId::R1)),
        // return
        instr0(Opcode::RET),
        // 1056: main:
        instr2(Opcode::MOV, reg(RegisterId::R0), lit(1071)),
        instr2(Opcode::MOV, reg(RegisterId::R1), lit(462)),
        instr1(Opcode::CALL, lit(GCD_LOOP)),
        instr0(Opcode::HALT),
    ];

    program.iter().map(encode).collect()
}
