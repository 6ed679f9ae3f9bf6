//! Super-instruction handlers
//!
//! Each handler leaves the stack, memory and pc exactly as the covered
//! opcode sequence would. Stack room for the highest intermediate height is
//! checked before anything is pushed, so a group never fails half way
//! through with a partial effect.

use crate::error::{EvmError, EvmResult};
use crate::interpreter::Interpreter;
use crate::opcode::Op;
use crate::word::{self, Word};

#[inline]
fn push_arg(arg: &Word, index: usize) -> Word {
    Word::from(arg.0[index])
}

impl Interpreter {
    pub(super) fn execute_fused(&mut self, op: Op, arg: &Word) -> EvmResult<()> {
        let stack = &mut self.stack;
        match op {
            Op::Swap1Pop => {
                stack.require(2)?;
                let top = stack.pop()?;
                *stack.peek_mut()? = top;
            }
            Op::Swap2Pop => {
                stack.require(3)?;
                let top = stack.pop()?;
                *stack.back_mut(1)? = top;
            }
            Op::Push1Push1 => {
                stack.ensure_room(2)?;
                stack.push(push_arg(arg, 0))?;
                stack.push(push_arg(arg, 1))?;
            }
            Op::Push1Add => {
                stack.ensure_room(1)?;
                let top = stack.peek_mut()?;
                *top = top.overflowing_add(push_arg(arg, 0)).0;
            }
            Op::Push1Shl => {
                stack.ensure_room(1)?;
                let top = stack.peek_mut()?;
                *top = word::shl(&push_arg(arg, 0), top);
            }
            Op::Push1Dup1 => {
                stack.ensure_room(2)?;
                let value = push_arg(arg, 0);
                stack.push(value)?;
                stack.push(value)?;
            }
            Op::Push2Jump => {
                stack.ensure_room(1)?;
                return self.jump_to(&push_arg(arg, 0));
            }
            Op::Push2Jumpi => {
                stack.ensure_room(1)?;
                let cond = stack.pop()?;
                if !cond.is_zero() {
                    return self.jump_to(&push_arg(arg, 0));
                }
            }
            Op::Swap2Swap1 => {
                stack.swap(2)?;
                stack.swap(1)?;
            }
            Op::Dup2Mstore => {
                stack.require(2)?;
                stack.ensure_room(1)?;
                let value = stack.pop()?;
                let offset = *stack.peek()?;
                return self.mstore(&offset, &value);
            }
            Op::Dup2Lt => {
                stack.require(2)?;
                stack.ensure_room(1)?;
                let below = *stack.back(1)?;
                let top = stack.peek_mut()?;
                *top = word::from_bool(below < *top);
            }
            Op::PopPop => {
                stack.pop_n::<2>()?;
            }
            Op::PopJump => {
                let [_, dest] = stack.pop_n::<2>()?;
                return self.jump_to(&dest);
            }
            Op::IsZeroPush2Jumpi => {
                stack.require(1)?;
                stack.ensure_room(1)?;
                let value = stack.pop()?;
                if value.is_zero() {
                    return self.jump_to(&push_arg(arg, 0));
                }
            }
            Op::Swap2Swap1PopJump => {
                let [a, _, c] = stack.pop_n::<3>()?;
                stack.push(a)?;
                return self.jump_to(&c);
            }
            Op::Swap1PopSwap2Swap1 => {
                let [a, _, c, d] = stack.pop_n::<4>()?;
                stack.push(a)?;
                stack.push(d)?;
                stack.push(c)?;
            }
            Op::PopSwap2Swap1Pop => {
                let [_, b, _, d] = stack.pop_n::<4>()?;
                stack.push(b)?;
                stack.push(d)?;
            }
            Op::Push1Push4Dup3 => {
                stack.ensure_room(3)?;
                stack.require(1)?;
                stack.push(push_arg(arg, 0))?;
                stack.push(push_arg(arg, 1))?;
                stack.dup(3)?;
            }
            Op::AndSwap1PopSwap2Swap1 => {
                let [a, b, _, d, e] = stack.pop_n::<5>()?;
                stack.push(a & b)?;
                stack.push(e)?;
                stack.push(d)?;
            }
            Op::Push1Push1Push1ShlSub => {
                stack.ensure_room(3)?;
                let shifted = word::shl(&push_arg(arg, 2), &push_arg(arg, 1));
                stack.push(shifted.overflowing_sub(push_arg(arg, 0)).0)?;
            }
            Op::Basic(opcode) => return Err(EvmError::InvalidOpcode(opcode.byte())),
            Op::Invalid(byte) => return Err(EvmError::InvalidOpcode(byte)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::code::Code;
    use crate::config::Config;
    use crate::context::{BlockContext, TxContext};
    use crate::error::EvmError;
    use crate::evm::Evm;
    use crate::instructions::test_utils::*;
    use crate::interpreter::{FrameResult, Interpreter, Status};
    use crate::opcode::Op;
    use crate::word::Word;
    use lfvm_state::MemoryStateDb;
    use std::sync::Arc;

    fn run_both(code: &[u8]) -> (FrameResult, FrameResult) {
        let run_one = |fusion: bool| {
            let mut state = MemoryStateDb::new();
            let block = BlockContext::default();
            let tx = TxContext::default();
            let mut evm = Evm::new(&mut state, &block, &tx, Config::default());
            Interpreter::new(
                Arc::new(Code::decode(code.to_vec(), fusion)),
                call_context(100_000),
            )
            .run(&mut evm)
        };
        (run_one(true), run_one(false))
    }

    fn assert_fuses_to(code: &[u8], op: Op) {
        let decoded = Code::decode(code.to_vec(), true);
        assert!(
            decoded.instructions().iter().any(|ins| ins.op == op),
            "{} not found",
            op
        );
    }

    fn assert_same(code: &[u8]) -> FrameResult {
        let (fused, plain) = run_both(code);
        assert_eq!(fused, plain);
        fused
    }

    // Pushes 1..=5 (top is 5)
    const FIVE: [u8; 10] = [0x60, 1, 0x60, 2, 0x60, 3, 0x60, 4, 0x60, 5];

    fn after_five(tail: &[u8]) -> Vec<u8> {
        let mut code = FIVE.to_vec();
        code.extend_from_slice(tail);
        with_return(&code)
    }

    #[test]
    fn test_swap_pop_groups() {
        for (tail, op) in [
            (&[0x90, 0x50][..], Op::Swap1Pop),
            (&[0x91, 0x50][..], Op::Swap2Pop),
            (&[0x91, 0x90][..], Op::Swap2Swap1),
            (&[0x50, 0x50][..], Op::PopPop),
            (&[0x90, 0x50, 0x91, 0x90][..], Op::Swap1PopSwap2Swap1),
            (&[0x50, 0x91, 0x90, 0x50][..], Op::PopSwap2Swap1Pop),
            (&[0x16, 0x90, 0x50, 0x91, 0x90][..], Op::AndSwap1PopSwap2Swap1),
        ] {
            let code = after_five(tail);
            assert_fuses_to(&code, op);
            let result = assert_same(&code);
            assert_eq!(result.status, Status::Returned, "{}", op);
        }
    }

    #[test]
    fn test_swap1_pop_value() {
        // 1 2 3 4 5 SWAP1 POP -> top is 5
        assert_eq!(returned(&assert_same(&after_five(&[0x90, 0x50]))), Word::from(5u64));
    }

    #[test]
    fn test_and_swap1_pop_swap2_swap1_value() {
        // [1 2 3 4 5] -> AND -> [1 2 3 4] -> ... -> [4 1 2]
        let result = assert_same(&after_five(&[0x16, 0x90, 0x50, 0x91, 0x90]));
        assert_eq!(returned(&result), Word::from(2u64));
    }

    #[test]
    fn test_push_groups() {
        let cases: [(&[u8], Op, u64); 5] = [
            // PUSH1 7 PUSH1 9 ADD
            (&[0x60, 7, 0x60, 9, 0x01], Op::Push1Push1, 16),
            // DUP1 keeps the pushes apart so PUSH1+ADD can match
            (&[0x60, 2, 0x80, 0x60, 4, 0x01], Op::Push1Add, 6),
            (&[0x60, 3, 0x80, 0x60, 4, 0x1b], Op::Push1Shl, 48),
            (&[0x60, 6, 0x80, 0x01], Op::Push1Dup1, 12),
            // PUSH1 1 PUSH1 2 PUSH1 3 SHL SUB
            (&[0x60, 1, 0x60, 2, 0x60, 3, 0x1b, 0x03], Op::Push1Push1Push1ShlSub, 15),
        ];
        for (body, op, expected) in cases {
            let code = with_return(body);
            assert_fuses_to(&code, op);
            assert_eq!(returned(&assert_same(&code)), Word::from(expected), "{}", op);
        }
    }

    #[test]
    fn test_push1_push4_dup3() {
        // PUSH1 9 DUP1 PUSH1 1 PUSH4 2 DUP3 -> top 9
        let code = with_return(&[0x60, 9, 0x80, 0x60, 1, 0x63, 0, 0, 0, 2, 0x82]);
        assert_fuses_to(&code, Op::Push1Push4Dup3);
        assert_eq!(returned(&assert_same(&code)), Word::from(9u64));
    }

    #[test]
    fn test_dup2_groups() {
        // PUSH1 0x20 DUP1 PUSH1 5 DUP2 MSTORE PUSH1 0x20 MLOAD
        let code = with_return(&[0x60, 0x20, 0x80, 0x60, 5, 0x81, 0x52, 0x60, 0x20, 0x51]);
        assert_fuses_to(&code, Op::Dup2Mstore);
        assert_eq!(returned(&assert_same(&code)), Word::from(5u64));

        // PUSH1 3 DUP1 PUSH1 5 DUP2 LT -> 3 < 5
        let code = with_return(&[0x60, 3, 0x80, 0x60, 5, 0x81, 0x10]);
        assert_fuses_to(&code, Op::Dup2Lt);
        assert_eq!(returned(&assert_same(&code)), Word::one());
    }

    #[test]
    fn test_jump_groups() {
        // PUSH2 0x0005 JUMP INVALID JUMPDEST PUSH1 1
        let code = with_return(&[0x61, 0x00, 0x05, 0x56, 0xfe, 0x5b, 0x60, 0x01]);
        assert_fuses_to(&code, Op::Push2Jump);
        assert_eq!(returned(&assert_same(&code)), Word::one());

        // PUSH1 1 DUP1 PUSH2 0x0008 JUMPI INVALID JUMPDEST
        let code = with_return(&[0x60, 1, 0x80, 0x61, 0x00, 0x08, 0x57, 0xfe, 0x5b]);
        assert_fuses_to(&code, Op::Push2Jumpi);
        assert_eq!(returned(&assert_same(&code)), Word::one());

        // PUSH1 0 DUP1 ISZERO PUSH2 0x0009 JUMPI INVALID JUMPDEST
        let code = with_return(&[0x60, 0, 0x80, 0x15, 0x61, 0x00, 0x09, 0x57, 0xfe, 0x5b]);
        assert_fuses_to(&code, Op::IsZeroPush2Jumpi);
        assert_eq!(returned(&assert_same(&code)), Word::zero());

        // PUSH1 7 PUSH1 8 DUP1 POP JUMP INVALID JUMPDEST
        let code = with_return(&[0x60, 7, 0x60, 8, 0x80, 0x50, 0x56, 0xfe, 0x5b]);
        assert_fuses_to(&code, Op::PopJump);
        assert_eq!(returned(&assert_same(&code)), Word::from(7u64));

        // PUSH1 0x0b PUSH1 4 DUP1 SWAP2 SWAP1 POP JUMP INVALID ... JUMPDEST
        let code = with_return(&[0x60, 0x0b, 0x60, 4, 0x80, 0x91, 0x90, 0x50, 0x56, 0xfe, 0xfe, 0x5b]);
        assert_fuses_to(&code, Op::Swap2Swap1PopJump);
        assert_eq!(returned(&assert_same(&code)), Word::from(4u64));
    }

    #[test]
    fn test_fused_underflow() {
        let (fused, plain) = run_both(&[0x90, 0x50]);
        assert_eq!(fused.status, Status::Failed(EvmError::StackUnderflow));
        assert_eq!(fused, plain);
    }

    #[test]
    fn test_fused_overflow_leaves_no_partial_effect() {
        // 1023 x PC then PUSH1 1 PUSH1 2
        let mut code = vec![0x58; 1023];
        code.extend_from_slice(&[0x60, 1, 0x60, 2]);
        let (fused, plain) = run_both(&code);
        assert_eq!(fused.status, Status::Failed(EvmError::StackOverflow));
        assert_eq!(fused, plain);
    }

    #[test]
    fn test_fused_jump_to_bad_target() {
        let (fused, plain) = run_both(&[0x61, 0x00, 0x04, 0x56, 0x00]);
        assert_eq!(fused.status, Status::Failed(EvmError::InvalidJump(4)));
        assert_eq!(fused, plain);
    }
}
