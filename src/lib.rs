//! TinyVM: a register-based virtual machine with a flat linear memory
//! and a fixed-width four-word instruction encoding.
//!
//! The core pipeline is [`context::VmContext`] (register file, memory,
//! lifecycle state) driven by [`dispatch::run`] / [`dispatch::step`],
//! which fetch-decode-execute loop over [`instruction::Instruction`]s
//! resolved through [`operand::fetch`] / [`operand::store`]. A VM fault
//! ([`error::VmFault`]) is always fatal to the current run.

pub mod constants;
pub mod context;
pub mod demo;
pub mod dispatch;
pub mod error;
pub mod instruction;
pub mod memory;
pub mod operand;
pub mod word;

pub use context::{RunState, VmContext};
pub use dispatch::{execute, run, step};
pub use error::VmFault;
pub use instruction::{decode, encode, DecodeError, Instruction, InstructionData};
pub use word::{AddressingMode, Opcode, RegisterId, Word};
