//! The instruction codec: packing a decoded [`Instruction`] into four
//! machine words and back, per the control-word layout in spec.md §3.

use crate::constants::{
    ADDRESSING0_SHIFT, ADDRESSING1_SHIFT, ADDRESSING2_SHIFT, BYTE_MASK, FLAGS_SHIFT, OPCODE_SHIFT,
};
use crate::word::{AddressingMode, Opcode, Word};
use num_traits::{FromPrimitive, ToPrimitive};

/// Four consecutive machine words: a control word followed by three
/// operand words, exactly as they sit in linear memory.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InstructionData {
    pub words: [Word; 4],
}

/// A decoded instruction, ready for dispatch.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub flags: u8,
    pub addressing: [AddressingMode; 3],
    pub operands: [Word; 3],
}

/// Pack a decoded instruction into its four-word wire form.
///
/// No validation is performed here: callers are trusted to produce
/// well-formed instructions (see [`AddressingMode::is_valid`] for the
/// check decoders should apply instead).
pub fn encode(instr: &Instruction) -> InstructionData {
    let opcode_bits = instr.opcode.to_u64().expect("Opcode fits in a u32");
    let control = (opcode_bits << OPCODE_SHIFT)
        | ((instr.flags as u64) << FLAGS_SHIFT)
        | ((instr.addressing[0].bits() as u64) << ADDRESSING0_SHIFT)
        | ((instr.addressing[1].bits() as u64) << ADDRESSING1_SHIFT)
        | ((instr.addressing[2].bits() as u64) << ADDRESSING2_SHIFT);

    InstructionData {
        words: [control, instr.operands[0], instr.operands[1], instr.operands[2]],
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode value {0}")]
    UnknownOpcode(u64),
    #[error("operand {index} has an invalid addressing-mode combination: {mode:?}")]
    InvalidAddressingMode {
        index: usize,
        mode: AddressingMode,
    },
}

/// Unpack a four-word instruction. Reverses [`encode`] exactly, and
/// additionally rejects addressing-mode combinations the spec calls
/// invalid (see [`AddressingMode::is_valid`]).
pub fn decode(data: &InstructionData) -> Result<Instruction, DecodeError> {
    let control = data.words[0];

    let opcode_value = control >> OPCODE_SHIFT;
    let opcode = Opcode::from_u64(opcode_value).ok_or(DecodeError::UnknownOpcode(opcode_value))?;

    let flags = ((control >> FLAGS_SHIFT) & BYTE_MASK) as u8;

    let addressing = [
        AddressingMode::from_bits_truncate(((control >> ADDRESSING0_SHIFT) & BYTE_MASK) as u8),
        AddressingMode::from_bits_truncate(((control >> ADDRESSING1_SHIFT) & BYTE_MASK) as u8),
        AddressingMode::from_bits_truncate(((control >> ADDRESSING2_SHIFT) & BYTE_MASK) as u8),
    ];

    for (index, mode) in addressing.iter().enumerate() {
        if !mode.is_valid() {
            return Err(DecodeError::InvalidAddressingMode {
                index,
                mode: *mode,
            });
        }
    }

    Ok(Instruction {
        opcode,
        flags,
        addressing,
        operands: [data.words[1], data.words[2], data.words[3]],
    })
}

/// Read four consecutive words starting at `offset` out of `memory`,
/// without reinterpreting them. Storage is an array of host-native
/// words, so this is well-defined regardless of host endianness.
pub fn read_from_memory(memory: &[Word], offset: usize) -> InstructionData {
    InstructionData {
        words: [
            memory[offset],
            memory[offset + 1],
            memory[offset + 2],
            memory[offset + 3],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_simple() {
        let instr = Instruction {
            opcode: Opcode::ADD,
            flags: 0,
            addressing: [
                AddressingMode::REGISTER,
                AddressingMode::LITERAL,
                AddressingMode::MEMORY | AddressingMode::INDIRECT,
            ],
            operands: [3, 42, 7],
        };

        let data = encode(&instr);
        let decoded = decode(&data).unwrap();
        assert_eq!(decoded, instr);
    }

    #[test]
    fn control_word_layout() {
        let instr = Instruction {
            opcode: Opcode::CMP,
            flags: 0,
            addressing: [
                AddressingMode::REGISTER,
                AddressingMode::LITERAL,
                AddressingMode::LITERAL,
            ],
            operands: [0, 0, 0],
        };
        let data = encode(&instr);
        let word0 = data.words[0];

        assert_eq!((word0 & 0xFFFF_FFFF_0000_0000) >> 32, Opcode::CMP as u64);
        assert_eq!(
            (word0 & 0x0000_0000_00FF_0000) >> 16,
            AddressingMode::REGISTER.bits() as u64
        );
        assert_eq!(
            (word0 & 0x0000_0000_0000_FF00) >> 8,
            AddressingMode::LITERAL.bits() as u64
        );
        assert_eq!(
            word0 & 0x0000_0000_0000_00FF,
            AddressingMode::LITERAL.bits() as u64
        );
    }

    #[test]
    fn decode_rejects_ambiguous_mode() {
        let mut data = encode(&Instruction {
            opcode: Opcode::NOP,
            flags: 0,
            addressing: [AddressingMode::LITERAL; 3],
            operands: [0; 3],
        });
        // Force operand 0 into LITERAL | INDIRECT, which is invalid.
        data.words[0] |= ((AddressingMode::INDIRECT.bits() as u64) << ADDRESSING0_SHIFT) as Word;

        assert!(matches!(
            decode(&data),
            Err(DecodeError::InvalidAddressingMode { index: 0, .. })
        ));
    }

    #[test]
    fn decode_rejects_unknown_opcode() {
        let data = InstructionData {
            words: [0xFFFF_FFFFu64 << 32, 0, 0, 0],
        };
        assert!(matches!(decode(&data), Err(DecodeError::UnknownOpcode(_))));
    }
}
