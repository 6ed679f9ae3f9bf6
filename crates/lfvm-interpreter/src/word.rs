//! 256-bit word arithmetic
//!
//! Everything wraps modulo 2^256. Signed helpers read the top bit as the
//! two's-complement sign.

use primitive_types::{U256, U512};

/// The interpreter's native value type
pub type Word = U256;

/// Word from a boolean (1 or 0)
pub fn from_bool(value: bool) -> Word {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}

/// Big-endian bytes
pub fn to_bytes32(value: &Word) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

/// Clamp to `u64`, saturating at `u64::MAX`
pub fn saturating_u64(value: &Word) -> u64 {
    if value.bits() > 64 {
        u64::MAX
    } else {
        value.low_u64()
    }
}

/// Clamp to `usize`, saturating at `usize::MAX`
pub fn saturating_usize(value: &Word) -> usize {
    usize::try_from(saturating_u64(value)).unwrap_or(usize::MAX)
}

fn is_negative(value: &Word) -> bool {
    value.bit(255)
}

fn twos_complement(value: Word) -> Word {
    (!value).overflowing_add(U256::one()).0
}

fn low_half(value: U512) -> Word {
    U256([value.0[0], value.0[1], value.0[2], value.0[3]])
}

/// Signed division; division by zero yields zero
pub fn sdiv(a: &Word, b: &Word) -> Word {
    if b.is_zero() {
        return U256::zero();
    }
    let a_neg = is_negative(a);
    let b_neg = is_negative(b);
    let abs_a = if a_neg { twos_complement(*a) } else { *a };
    let abs_b = if b_neg { twos_complement(*b) } else { *b };
    let quotient = abs_a / abs_b;
    if a_neg != b_neg {
        twos_complement(quotient)
    } else {
        quotient
    }
}

/// Signed modulo; the result takes the sign of the dividend
pub fn smod(a: &Word, b: &Word) -> Word {
    if b.is_zero() {
        return U256::zero();
    }
    let a_neg = is_negative(a);
    let abs_a = if a_neg { twos_complement(*a) } else { *a };
    let abs_b = if is_negative(b) { twos_complement(*b) } else { *b };
    let rem = abs_a % abs_b;
    if a_neg {
        twos_complement(rem)
    } else {
        rem
    }
}

/// Unsigned division; division by zero yields zero
pub fn div(a: &Word, b: &Word) -> Word {
    if b.is_zero() {
        U256::zero()
    } else {
        a / b
    }
}

/// Unsigned modulo; modulo zero yields zero
pub fn rem(a: &Word, b: &Word) -> Word {
    if b.is_zero() {
        U256::zero()
    } else {
        a % b
    }
}

/// `(a + b) % n` without intermediate overflow
pub fn addmod(a: &Word, b: &Word, n: &Word) -> Word {
    if n.is_zero() {
        return U256::zero();
    }
    low_half((U512::from(*a) + U512::from(*b)) % U512::from(*n))
}

/// `(a * b) % n` without intermediate overflow
pub fn mulmod(a: &Word, b: &Word, n: &Word) -> Word {
    if n.is_zero() {
        return U256::zero();
    }
    low_half(a.full_mul(*b) % U512::from(*n))
}

/// Wrapping exponentiation
pub fn exp(base: &Word, exponent: &Word) -> Word {
    base.overflowing_pow(*exponent).0
}

/// Number of significant bytes of an exponent, for EXP gas
pub fn byte_len(value: &Word) -> u64 {
    (value.bits() as u64 + 7) / 8
}

/// Extend the sign of the byte at index `b` (0 = least significant)
pub fn signextend(b: &Word, x: &Word) -> Word {
    if *b >= U256::from(31u64) {
        return *x;
    }
    let bit = b.low_u64() as usize * 8 + 7;
    let mask = (U256::one() << bit) - U256::one();
    if x.bit(bit) {
        *x | !mask
    } else {
        *x & mask
    }
}

/// Byte `i` of `x`, counting from the most significant byte
pub fn byte(i: &Word, x: &Word) -> Word {
    if *i >= U256::from(32u64) {
        return U256::zero();
    }
    let shift = (31 - i.low_u64() as usize) * 8;
    (*x >> shift) & U256::from(0xffu64)
}

/// Logical shift left
pub fn shl(shift: &Word, value: &Word) -> Word {
    if *shift >= U256::from(256u64) {
        U256::zero()
    } else {
        *value << shift.low_u64() as usize
    }
}

/// Logical shift right
pub fn shr(shift: &Word, value: &Word) -> Word {
    if *shift >= U256::from(256u64) {
        U256::zero()
    } else {
        *value >> shift.low_u64() as usize
    }
}

/// Arithmetic shift right
pub fn sar(shift: &Word, value: &Word) -> Word {
    let negative = is_negative(value);
    if *shift >= U256::from(256u64) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let shift = shift.low_u64() as usize;
    if negative {
        !((!*value) >> shift)
    } else {
        *value >> shift
    }
}

/// Signed less-than
pub fn slt(a: &Word, b: &Word) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => a < b,
    }
}

/// Signed greater-than
pub fn sgt(a: &Word, b: &Word) -> bool {
    slt(b, a)
}
