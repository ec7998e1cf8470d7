//! The opcode dispatcher and run loop (spec.md §4.4/§4.6).

use log::{error, trace};
use rand::Rng;

use crate::context::VmContext;
use crate::error::VmFault;
use crate::instruction::Instruction;
use crate::operand::{fetch, store};
use crate::word::{Opcode, RegisterId, Word};

const O_A: usize = 0;
const O_B: usize = 1;
const O_C: usize = 2;

/// Execute one already-fetched-and-decoded instruction. Does not touch
/// `IP` except where the opcode itself redirects control flow (`CALL`,
/// `RET`, `JMP`, `JEQ`, `JNE`, `JNZ`) — the fetch/advance bookkeeping is
/// the run loop's job (see [`step`]).
pub fn execute(ctx: &mut VmContext, instr: &Instruction) -> Result<(), VmFault> {
    match instr.opcode {
        Opcode::NOP => {}

        Opcode::HALT => ctx.halt(),

        Opcode::PUSH => {
            let a = fetch(ctx, instr, O_A)?;
            ctx.push(a)?;
        }

        Opcode::POP => {
            let value = ctx.pop()?;
            store(ctx, instr, O_A, value)?;
        }

        Opcode::ADD => {
            let (b, c) = fetch_bc(ctx, instr)?;
            store(ctx, instr, O_A, b.wrapping_add(c))?;
        }

        Opcode::SUB => {
            let (b, c) = fetch_bc(ctx, instr)?;
            store(ctx, instr, O_A, b.wrapping_sub(c))?;
        }

        Opcode::MUL => {
            let (b, c) = fetch_bc(ctx, instr)?;
            store(ctx, instr, O_A, b.wrapping_mul(c))?;
        }

        Opcode::DIV => {
            let (b, c) = fetch_bc(ctx, instr)?;
            if c == 0 {
                return Err(VmFault::DivideByZero);
            }
            store(ctx, instr, O_A, b / c)?;
            ctx.set_register(RegisterId::RMD, b % c);
        }

        Opcode::MOD => {
            let (b, c) = fetch_bc(ctx, instr)?;
            if c == 0 {
                return Err(VmFault::DivideByZero);
            }
            store(ctx, instr, O_A, b % c)?;
        }

        Opcode::SHL => {
            let (b, c) = fetch_bc(ctx, instr)?;
            store(ctx, instr, O_A, b.wrapping_shl((c & 63) as u32))?;
        }

        Opcode::SHR => {
            let (b, c) = fetch_bc(ctx, instr)?;
            store(ctx, instr, O_A, b.wrapping_shr((c & 63) as u32))?;
        }

        Opcode::INC => {
            let a = fetch(ctx, instr, O_A)?;
            store(ctx, instr, O_A, a.wrapping_add(1))?;
        }

        Opcode::DEC => {
            let a = fetch(ctx, instr, O_A)?;
            store(ctx, instr, O_A, a.wrapping_sub(1))?;
        }

        Opcode::NOT => {
            let a = fetch(ctx, instr, O_A)?;
            store(ctx, instr, O_A, !a)?;
        }

        Opcode::CMP => {
            let (b, c) = fetch_bc(ctx, instr)?;
            let (b, c) = (b as i64, c as i64);
            let result: i64 = if c < b {
                -1
            } else if c > b {
                1
            } else {
                0
            };
            store(ctx, instr, O_A, result as Word)?;
        }

        Opcode::MOV => {
            let b = fetch(ctx, instr, O_B)?;
            store(ctx, instr, O_A, b)?;
        }

        Opcode::CALL => {
            let a = fetch(ctx, instr, O_A)?;
            ctx.push(ctx.register(RegisterId::IP))?;
            ctx.set_register(RegisterId::IP, a);
        }

        Opcode::RET => {
            let ip = ctx.pop()?;
            ctx.set_register(RegisterId::IP, ip);
        }

        Opcode::JMP => {
            let a = fetch(ctx, instr, O_A)?;
            ctx.set_register(RegisterId::IP, a);
        }

        Opcode::JEQ => {
            let a = fetch(ctx, instr, O_A)?;
            let (b, c) = fetch_bc(ctx, instr)?;
            if b == c {
                ctx.set_register(RegisterId::IP, a);
            }
        }

        Opcode::JNE => {
            let a = fetch(ctx, instr, O_A)?;
            let (b, c) = fetch_bc(ctx, instr)?;
            if b != c {
                ctx.set_register(RegisterId::IP, a);
            }
        }

        Opcode::JNZ => {
            let a = fetch(ctx, instr, O_A)?;
            let b = fetch(ctx, instr, O_B)?;
            if b != 0 {
                ctx.set_register(RegisterId::IP, a);
            }
        }

        Opcode::RDRAND => {
            let (mut min, mut max) = fetch_bc(ctx, instr)?;
            if min == 0 && max == 0 {
                max = Word::MAX;
            }
            if min > max {
                std::mem::swap(&mut min, &mut max);
            }
            let value = ctx.rng_mut().gen_range(min..=max);
            store(ctx, instr, O_A, value)?;
        }
    }

    Ok(())
}

fn fetch_bc(ctx: &VmContext, instr: &Instruction) -> Result<(Word, Word), VmFault> {
    Ok((fetch(ctx, instr, O_B)?, fetch(ctx, instr, O_C)?))
}

/// Run one fetch-decode-execute cycle (spec.md §4.6):
/// 1. fetch four words at `memory[IP]`,
/// 2. decode,
/// 3. advance `IP` by 4 (so `CALL` sees the *following* instruction as
///    its return address),
/// 4. execute,
/// 5. increment `IC`.
///
/// Returns `Ok(true)` if the VM is still running afterwards, `Ok(false)`
/// if it halted, and `Err` on a fault — after which the context is left
/// in the `Faulted` state and must not be stepped again without a reset.
pub fn step(ctx: &mut VmContext) -> Result<bool, VmFault> {
    let result = (|| {
        let instr = ctx.fetch_decode()?;
        ctx.advance_ip();
        trace!("executing {:?} at ic={}", instr.opcode, ctx.register(RegisterId::IC));
        execute(ctx, &instr)?;
        ctx.increment_ic();
        Ok(ctx.is_running())
    })();

    if let Err(ref fault) = result {
        error!("VM fault: {fault}");
        ctx.fault();
    }

    result
}

/// Run until the VM halts or faults.
pub fn run(ctx: &mut VmContext) -> Result<(), VmFault> {
    ctx.start_running();
    while step(ctx)? {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{encode, Instruction};
    use crate::word::AddressingMode;

    fn nullary(opcode: Opcode) -> Instruction {
        Instruction {
            opcode,
            flags: 0,
            addressing: [AddressingMode::LITERAL; 3],
            operands: [0; 3],
        }
    }

    fn binary_reg_lit(opcode: Opcode, rd: Word, a: Word, b: Word) -> Instruction {
        Instruction {
            opcode,
            flags: 0,
            addressing: [
                AddressingMode::REGISTER,
                AddressingMode::LITERAL,
                AddressingMode::LITERAL,
            ],
            operands: [rd, a, b],
        }
    }

    fn load_and_init(ctx: &mut VmContext, instrs: &[Instruction]) {
        let encoded: Vec<_> = instrs.iter().map(encode).collect();
        ctx.set_program_base(0);
        ctx.init_stack(64);
        ctx.load_program(&encoded).unwrap();
    }

    #[test]
    fn every_instruction_increments_ic() {
        let mut ctx = VmContext::new();
        load_and_init(
            &mut ctx,
            &[binary_reg_lit(Opcode::ADD, 0, 1, 2), nullary(Opcode::HALT)],
        );
        run(&mut ctx).unwrap();
        assert_eq!(ctx.register(RegisterId::IC), 2);
    }

    #[test]
    fn div_by_zero_faults() {
        let mut ctx = VmContext::new();
        load_and_init(&mut ctx, &[binary_reg_lit(Opcode::DIV, 0, 1, 0)]);
        assert_eq!(run(&mut ctx), Err(VmFault::DivideByZero));
        assert_eq!(ctx.state(), crate::context::RunState::Faulted);
    }

    #[test]
    fn div_writes_quotient_and_remainder() {
        let mut ctx = VmContext::new();
        load_and_init(
            &mut ctx,
            &[binary_reg_lit(Opcode::DIV, 0, 17, 5), nullary(Opcode::HALT)],
        );
        run(&mut ctx).unwrap();
        assert_eq!(ctx.register(RegisterId::R0), 3);
        assert_eq!(ctx.register(RegisterId::RMD), 2);
    }

    #[test]
    fn call_then_ret_restores_return_address() {
        let mut ctx = VmContext::new();
        // 0: CALL #8; 4: HALT; 8: RET
        let instrs = [
            Instruction {
                opcode: Opcode::CALL,
                flags: 0,
                addressing: [AddressingMode::LITERAL; 3],
                operands: [8, 0, 0],
            },
            nullary(Opcode::HALT),
            nullary(Opcode::RET),
        ];
        load_and_init(&mut ctx, &instrs);
        ctx.start_running();
        step(&mut ctx).unwrap(); // CALL
        assert_eq!(ctx.register(RegisterId::IP), 8);
        step(&mut ctx).unwrap(); // RET
        assert_eq!(ctx.register(RegisterId::IP), 4);
    }

    #[test]
    fn cmp_sign_convention() {
        let mut ctx = VmContext::new();
        load_and_init(
            &mut ctx,
            &[binary_reg_lit(Opcode::CMP, 0, 3, 5), nullary(Opcode::HALT)],
        );
        run(&mut ctx).unwrap();
        assert_eq!(ctx.register(RegisterId::R0), 1);
    }

    #[test]
    fn cmp_negative_wraps_as_unsigned() {
        let mut ctx = VmContext::new();
        load_and_init(
            &mut ctx,
            &[binary_reg_lit(Opcode::CMP, 0, 5, 3), nullary(Opcode::HALT)],
        );
        run(&mut ctx).unwrap();
        assert_eq!(ctx.register(RegisterId::R0), Word::MAX);
    }
}
