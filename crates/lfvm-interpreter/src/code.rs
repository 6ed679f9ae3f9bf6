//! Decoded programs
//!
//! Raw bytecode is decoded once into a list of [`Instruction`]s with push
//! data already extracted. With fusion enabled a second pass replaces the
//! opcode sequences of [`Op::FUSED`] by single super-instructions.
//!
//! Push arguments of a fused group are packed into the limbs of `arg` in
//! program order (`arg.0[0]` holds the first push). Every push inside a
//! group is at most four bytes wide, so a limb always suffices.

use crate::error::{EvmError, EvmResult};
use crate::gas::static_gas;
use crate::opcode::{Op, Opcode};
use crate::word::Word;
use primitive_types::U256;
use std::collections::HashMap;
use std::fmt;

/// One dispatch step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Operation to execute
    pub op: Op,
    /// Push data (single PUSH) or packed push data (fused group)
    pub arg: Word,
    /// Byte offset of the first covered opcode
    pub pc: u32,
    /// Sum of the static gas of the covered opcodes
    pub gas: u32,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05x}: {}", self.pc, self.op)?;
        match self.op {
            Op::Basic(op) if op.push_size() > 0 => write!(f, " 0x{:x}", self.arg),
            op if op.is_fused() && !self.arg.is_zero() => {
                let pushes = op.components().iter().filter(|c| c.push_size() > 0).count();
                for limb in &self.arg.0[..pushes] {
                    write!(f, " 0x{:x}", limb)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// A decoded program with its jump table
#[derive(Debug, Clone)]
pub struct Code {
    bytes: Vec<u8>,
    instructions: Vec<Instruction>,
    jumpdests: HashMap<usize, usize>,
}

impl Code {
    /// Decode `bytes`, fusing super-instructions when `fusion` is set
    pub fn decode(bytes: Vec<u8>, fusion: bool) -> Self {
        let basic = decode_basic(&bytes);
        let instructions = if fusion { fuse(&basic) } else { basic };
        let jumpdests = instructions
            .iter()
            .enumerate()
            .filter(|(_, ins)| ins.op == Op::Basic(Opcode::JUMPDEST))
            .map(|(index, ins)| (ins.pc as usize, index))
            .collect();
        Self {
            bytes,
            instructions,
            jumpdests,
        }
    }

    /// Raw bytecode
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decoded instructions
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction at `index`
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Number of decoded instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program is empty
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction index of the JUMPDEST at byte offset `dest`
    pub fn jump_target(&self, dest: &Word) -> EvmResult<usize> {
        if dest.bits() > 32 {
            return Err(EvmError::InvalidJump(usize::MAX));
        }
        let dest = dest.low_u64() as usize;
        self.jumpdests
            .get(&dest)
            .copied()
            .ok_or(EvmError::InvalidJump(dest))
    }
}

fn decode_basic(bytes: &[u8]) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut pc = 0usize;
    while pc < bytes.len() {
        let byte = bytes[pc];
        let (op, arg, width) = match Opcode::from_byte(byte) {
            Some(opcode) => {
                let size = opcode.push_size();
                let arg = if size > 0 { push_data(bytes, pc + 1, size) } else { Word::zero() };
                (Op::Basic(opcode), arg, 1 + size)
            }
            None => (Op::Invalid(byte), Word::zero(), 1),
        };
        out.push(Instruction {
            op,
            arg,
            pc: pc as u32,
            gas: op_gas(op),
        });
        pc += width;
    }
    out
}

// Immediate of a PUSH; bytes past the end of code read as zero
fn push_data(bytes: &[u8], start: usize, size: usize) -> Word {
    let mut buf = [0u8; 32];
    let available = bytes.len().saturating_sub(start).min(size);
    buf[32 - size..32 - size + available].copy_from_slice(&bytes[start..start + available]);
    Word::from_big_endian(&buf)
}

fn op_gas(op: Op) -> u32 {
    op.components().iter().map(|c| static_gas(*c) as u32).sum()
}

fn fuse(basic: &[Instruction]) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(basic.len());
    let mut i = 0;
    while i < basic.len() {
        match match_group(&basic[i..]) {
            Some(op) => {
                let group = &basic[i..i + op.components().len()];
                let mut limbs = [0u64; 4];
                let mut next = 0;
                for ins in group {
                    if let Op::Basic(opcode) = ins.op {
                        if opcode.push_size() > 0 {
                            limbs[next] = ins.arg.low_u64();
                            next += 1;
                        }
                    }
                }
                out.push(Instruction {
                    op,
                    arg: U256(limbs),
                    pc: group[0].pc,
                    gas: op_gas(op),
                });
                i += group.len();
            }
            None => {
                out.push(basic[i]);
                i += 1;
            }
        }
    }
    out
}

fn match_group(rest: &[Instruction]) -> Option<Op> {
    Op::FUSED.into_iter().find(|fused| {
        let parts = fused.components();
        parts.len() <= rest.len()
            && parts
                .iter()
                .zip(rest)
                .all(|(want, ins)| ins.op == Op::Basic(*want))
    })
}
