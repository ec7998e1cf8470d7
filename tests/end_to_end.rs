//! End-to-end scenarios driving the VM the way a loaded program would:
//! through the public `tinyvm` surface only, no internal helpers.

use tinyvm::{AddressingMode, Instruction, Opcode, RegisterId, VmContext, VmFault};

fn lit(v: u64) -> (AddressingMode, u64) {
    (AddressingMode::LITERAL, v)
}

fn reg(id: RegisterId) -> (AddressingMode, u64) {
    (AddressingMode::REGISTER, id as u64)
}

fn nullary(opcode: Opcode) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [AddressingMode::LITERAL; 3],
        operands: [0; 3],
    }
}

fn unary(opcode: Opcode, a: (AddressingMode, u64)) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [a.0, AddressingMode::LITERAL, AddressingMode::LITERAL],
        operands: [a.1, 0, 0],
    }
}

fn binary(opcode: Opcode, a: (AddressingMode, u64), b: (AddressingMode, u64)) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [a.0, b.0, AddressingMode::LITERAL],
        operands: [a.1, b.1, 0],
    }
}

fn ternary(
    opcode: Opcode,
    a: (AddressingMode, u64),
    b: (AddressingMode, u64),
    c: (AddressingMode, u64),
) -> Instruction {
    Instruction {
        opcode,
        flags: 0,
        addressing: [a.0, b.0, c.0],
        operands: [a.1, b.1, c.1],
    }
}

fn boot(instrs: &[Instruction]) -> VmContext {
    let mut ctx = VmContext::new();
    ctx.init_stack(512);
    ctx.set_program_base(0);
    let encoded: Vec<_> = instrs.iter().map(tinyvm::encode).collect();
    ctx.load_program(&encoded).unwrap();
    ctx
}

#[test]
fn stack_round_trip() {
    let mut ctx = boot(&[
        unary(Opcode::PUSH, lit(7)),
        unary(Opcode::PUSH, lit(9)),
        unary(Opcode::POP, reg(RegisterId::R1)),
        unary(Opcode::POP, reg(RegisterId::R0)),
        nullary(Opcode::HALT),
    ]);

    tinyvm::run(&mut ctx).unwrap();

    assert_eq!(ctx.register(RegisterId::R0), 7);
    assert_eq!(ctx.register(RegisterId::R1), 9);
    assert_eq!(ctx.register(RegisterId::SP), 0);
}

#[test]
fn indirection_store() {
    // MOV [R0] #42 with R0 == 200 (register-indirect): R0's *value* is the
    // memory address written through, so this lands at memory[200].
    let mut ctx = boot(&[
        binary(
            Opcode::MOV,
            (AddressingMode::REGISTER | AddressingMode::INDIRECT, RegisterId::R0 as u64),
            lit(42),
        ),
        nullary(Opcode::HALT),
    ]);
    ctx.set_register(RegisterId::R0, 200);

    tinyvm::run(&mut ctx).unwrap();

    assert_eq!(ctx.memory().read(200), Some(42));
}

#[test]
fn division_and_remainder() {
    let mut ctx = boot(&[
        ternary(Opcode::DIV, reg(RegisterId::R0), lit(17), lit(5)),
        nullary(Opcode::HALT),
    ]);

    tinyvm::run(&mut ctx).unwrap();

    assert_eq!(ctx.register(RegisterId::R0), 3);
    assert_eq!(ctx.register(RegisterId::RMD), 2);
}

#[test]
fn division_by_zero_faults() {
    let mut ctx = boot(&[ternary(Opcode::DIV, reg(RegisterId::R0), lit(1), lit(0))]);

    let result = tinyvm::run(&mut ctx);

    assert_eq!(result, Err(VmFault::DivideByZero));
    assert_eq!(ctx.state(), tinyvm::RunState::Faulted);
}

#[test]
fn cmp_sign_convention() {
    let mut ctx = boot(&[
        ternary(Opcode::CMP, reg(RegisterId::R0), lit(3), lit(5)),
        nullary(Opcode::HALT),
    ]);
    tinyvm::run(&mut ctx).unwrap();
    assert_eq!(ctx.register(RegisterId::R0), 1);

    let mut ctx = boot(&[
        ternary(Opcode::CMP, reg(RegisterId::R0), lit(5), lit(3)),
        nullary(Opcode::HALT),
    ]);
    tinyvm::run(&mut ctx).unwrap();
    assert_eq!(ctx.register(RegisterId::R0), u64::MAX);

    let mut ctx = boot(&[
        ternary(Opcode::CMP, reg(RegisterId::R0), lit(4), lit(4)),
        nullary(Opcode::HALT),
    ]);
    tinyvm::run(&mut ctx).unwrap();
    assert_eq!(ctx.register(RegisterId::R0), 0);
}

#[test]
fn unknown_opcode_faults_at_decode_time() {
    let mut ctx = VmContext::new();
    ctx.init_stack(512);
    ctx.set_program_base(0);
    // Not a valid Opcode discriminant: decode must reject it cleanly.
    ctx.memory_mut().write(0, 0xFFFF_FFFFu64 << 32);
    ctx.start_running();

    let result = tinyvm::step(&mut ctx);

    assert!(matches!(result, Err(VmFault::InvalidInstruction(_))));
}

#[test]
fn running_program_past_memory_faults_out_of_bounds() {
    let mut ctx = VmContext::new();
    ctx.set_program_base((tinyvm::constants::VM_MEMORY_SIZE - 2) as u64);
    ctx.start_running();

    let result = tinyvm::step(&mut ctx);

    assert!(matches!(result, Err(VmFault::OutOfBounds { .. })));
}
