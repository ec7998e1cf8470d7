//! The operand resolver (spec.md §4.2): for each of an instruction's up to
//! three operands, computes the effective value (`fetch`) or the
//! effective storage location (`store`) under that operand's addressing
//! mode.

use crate::context::{read_checked, write_checked, VmContext};
use crate::error::VmFault;
use crate::instruction::Instruction;
use crate::word::{AddressingMode, Word};

/// Read the effective value of operand `index`.
pub fn fetch(ctx: &VmContext, instr: &Instruction, index: usize) -> Result<Word, VmFault> {
    let mode = instr.addressing[index];
    let operand = instr.operands[index];

    let mut value = if mode.contains(AddressingMode::LITERAL) {
        operand
    } else if mode.contains(AddressingMode::MEMORY) {
        read_checked(ctx.memory(), operand)?
    } else if mode.contains(AddressingMode::REGISTER) {
        register_at(ctx, operand)?
    } else {
        unreachable!("decode() rejects addressing modes with no primary bit set")
    };

    if mode.contains(AddressingMode::INDIRECT) {
        value = read_checked(ctx.memory(), value)?;
    }

    Ok(value)
}

/// Write `value` to the effective location of operand `index`.
pub fn store(
    ctx: &mut VmContext,
    instr: &Instruction,
    index: usize,
    value: Word,
) -> Result<(), VmFault> {
    let mode = instr.addressing[index];
    let operand = instr.operands[index];

    if mode.contains(AddressingMode::LITERAL) {
        return Err(VmFault::IllegalAssignmentToLiteral);
    }

    let target_address = if mode.contains(AddressingMode::INDIRECT) {
        if mode.contains(AddressingMode::REGISTER) {
            register_at(ctx, operand)?
        } else {
            read_checked(ctx.memory(), operand)?
        }
    } else if mode.contains(AddressingMode::REGISTER) {
        return set_register_checked(ctx, operand, value);
    } else {
        operand
    };

    write_checked(ctx.memory_mut(), target_address, value)
}

fn register_at(ctx: &VmContext, index: Word) -> Result<Word, VmFault> {
    ctx.register_at(index as usize).ok_or(VmFault::OutOfBounds {
        address: index,
        limit: crate::word::REGISTER_COUNT as Word,
    })
}

fn set_register_checked(ctx: &mut VmContext, index: Word, value: Word) -> Result<(), VmFault> {
    if ctx.set_register_at(index as usize, value) {
        Ok(())
    } else {
        Err(VmFault::OutOfBounds {
            address: index,
            limit: crate::word::REGISTER_COUNT as Word,
        })
    }
}
