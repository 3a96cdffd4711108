//! Exact evaluation of operators over constants.
//!
//! These functions give each operator its arithmetic. They never guess:
//! anything undefined (division by zero, a negative shift, bitwise
//! operations on floats) is reported as a [`NumericError`].

use num_traits::{One, Zero};

use crate::number::{Number, NumericError};
use crate::operator::Operator;

/// Default word width for `rol` and `ror`, the ARM register width.
pub const DEFAULT_WORD_BITS: u32 = 32;

/// Evaluates a unary operator.
///
/// # Errors
///
/// Returns an error if the operator is undefined for the operand, or if
/// `op` is not unary.
pub fn unary(op: Operator, value: &Number) -> Result<Number, NumericError> {
    match op {
        Operator::BitNot => value.bit_not(),
        Operator::Not => Ok(Number::from_bool(!value.is_truthy())),
        _ => Err(NumericError::NotFoldable(op)),
    }
}

/// Evaluates a binary operator. `word_bits` is the rotation width.
///
/// # Errors
///
/// Returns an error if the operator is undefined for the operands, or if
/// `op` is not binary.
pub fn binary(
    op: Operator,
    lhs: &Number,
    rhs: &Number,
    word_bits: u32,
) -> Result<Number, NumericError> {
    use std::cmp::Ordering;

    let ordering = || lhs.numeric_cmp(rhs);
    match op {
        Operator::TrueDiv => lhs.true_div(rhs),
        Operator::FloorDiv => lhs.floor_div(rhs),
        Operator::Mod => lhs.modulo(rhs),
        Operator::Pow => lhs.pow(rhs),
        Operator::Shr => lhs.shr(rhs),
        Operator::Rol => lhs.rotate_left(rhs, word_bits),
        Operator::Ror => lhs.rotate_right(rhs, word_bits),
        Operator::Eq => Ok(Number::from_bool(ordering() == Some(Ordering::Equal))),
        Operator::Ne => Ok(Number::from_bool(ordering() != Some(Ordering::Equal))),
        Operator::Lt => Ok(Number::from_bool(ordering() == Some(Ordering::Less))),
        Operator::Le => Ok(Number::from_bool(matches!(
            ordering(),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        _ => Err(NumericError::NotFoldable(op)),
    }
}

/// Combines `acc` with `count` copies of `value` under a semigroup operator.
///
/// Repetition is folded without iterating: `+` scales, `*` raises to a
/// power, `& | && ||` are idempotent and `^` cancels in pairs.
///
/// # Errors
///
/// Returns an error if the operator is undefined for the operands, or if
/// `op` is not a semigroup operator.
pub fn accumulate(
    op: Operator,
    acc: &Number,
    value: &Number,
    count: u64,
) -> Result<Number, NumericError> {
    match op {
        Operator::Add => Ok(acc + &value.scale(count)),
        Operator::Mul => Ok(acc * &value.pow_count(count)?),
        Operator::BitAnd => acc.bit_and(value),
        Operator::BitOr => acc.bit_or(value),
        Operator::BitXor if count % 2 == 0 => Ok(acc.clone()),
        Operator::BitXor => acc.bit_xor(value),
        Operator::And => Ok(Number::from_bool(acc.is_truthy() && value.is_truthy())),
        Operator::Or => Ok(Number::from_bool(acc.is_truthy() || value.is_truthy())),
        _ => Err(NumericError::NotFoldable(op)),
    }
}

/// Returns the identity element of a semigroup operator.
///
/// `0` for `+ ^ | ||`, `1` for `*` and `&&` (true), and `-1` (all bits
/// set) for `&`.
#[must_use]
pub fn identity(op: Operator) -> Option<Number> {
    match op {
        Operator::Add | Operator::BitXor | Operator::BitOr | Operator::Or => Some(Number::zero()),
        Operator::Mul | Operator::And => Some(Number::one()),
        Operator::BitAnd => Some(Number::from(-1i64)),
        _ => None,
    }
}
