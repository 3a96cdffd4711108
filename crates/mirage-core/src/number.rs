//! Numeric payloads of constants.
//!
//! A [`Number`] is either an unbounded integer (wrapping `dashu::IBig`) or
//! an IEEE-754 double. The kind is part of the value: `Int(1)` and
//! `Float(1.0)` are different constants, and no operation here converts a
//! float back into an integer.
//!
//! Booleans are the integers `1` and `0`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul};

use dashu::base::BitTest;
use dashu::integer::IBig;
use num_traits::{One, Zero};
use thiserror::Error;

use crate::operator::Operator;

/// The largest integer result, in bits, that exponentiation will produce.
pub const MAX_RESULT_BITS: u32 = 1 << 24;

/// The kind of a [`Number`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumberKind {
    /// Arbitrary precision integer.
    Int,
    /// Double precision float.
    Float,
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberKind::Int => f.write_str("integer"),
            NumberKind::Float => f.write_str("float"),
        }
    }
}

/// Reasons an operation is undefined over its operands.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NumericError {
    /// Division, modulo or a negative power of zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A shift or rotation by a negative amount.
    #[error("negative shift amount")]
    NegativeShift,

    /// The operator is not defined for numbers of this kind.
    #[error("operand of kind {0} is not supported")]
    UnsupportedOperand(NumberKind),

    /// Rotation width outside `1..=64`.
    #[error("invalid word width {0}")]
    InvalidWidth(u32),

    /// An integer result would exceed [`MAX_RESULT_BITS`].
    #[error("result exceeds {MAX_RESULT_BITS} bits")]
    ResultTooLarge,

    /// A float result is NaN although no operand was.
    #[error("result is not a number")]
    NotANumber,

    /// The operator has no constant evaluation.
    #[error("operator `{0}` cannot be evaluated")]
    NotFoldable(Operator),
}

/// A constant value.
#[derive(Clone)]
pub enum Number {
    /// An integer of unbounded magnitude.
    Int(IBig),
    /// A double precision float.
    Float(f64),
}

impl Number {
    /// Creates the integer `1` or `0`.
    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        Number::Int(if value { IBig::ONE } else { IBig::ZERO })
    }

    /// Returns the kind of this number.
    #[must_use]
    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Int(_) => NumberKind::Int,
            Number::Float(_) => NumberKind::Float,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<&IBig> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(_) => None,
        }
    }

    /// Returns true if this is the integer `value`.
    #[must_use]
    pub fn is_int(&self, value: i64) -> bool {
        matches!(self, Number::Int(v) if *v == IBig::from(value))
    }

    /// Truthiness: non-zero integers and floats other than `0.0` are true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !self.is_zero()
    }

    /// Returns true if the value is strictly below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        match self {
            Number::Int(v) => *v < IBig::ZERO,
            Number::Float(v) => *v < 0.0,
        }
    }

    /// Converts to the nearest double.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int(v) => int_to_f64(v),
            Number::Float(v) => *v,
        }
    }

    /// Returns the additive inverse.
    #[must_use]
    pub fn negate(&self) -> Number {
        match self {
            Number::Int(v) => Number::Int(-v),
            Number::Float(v) => Number::Float(-v),
        }
    }

    /// Computes `self` added to itself `count` times.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scale(&self, count: u64) -> Number {
        match self {
            Number::Int(v) => Number::Int(v * &IBig::from(count)),
            Number::Float(v) => Number::Float(v * count as f64),
        }
    }

    /// Bitwise and over two's complement integers.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::UnsupportedOperand`] for floats.
    pub fn bit_and(&self, other: &Number) -> Result<Number, NumericError> {
        let (a, b) = both_ints(self, other)?;
        Ok(Number::Int(a.clone() & b.clone()))
    }

    /// Bitwise or over two's complement integers.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::UnsupportedOperand`] for floats.
    pub fn bit_or(&self, other: &Number) -> Result<Number, NumericError> {
        let (a, b) = both_ints(self, other)?;
        Ok(Number::Int(a.clone() | b.clone()))
    }

    /// Bitwise exclusive or over two's complement integers.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::UnsupportedOperand`] for floats.
    pub fn bit_xor(&self, other: &Number) -> Result<Number, NumericError> {
        let (a, b) = both_ints(self, other)?;
        Ok(Number::Int(a.clone() ^ b.clone()))
    }

    /// Bitwise complement, `-x - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::UnsupportedOperand`] for floats.
    pub fn bit_not(&self) -> Result<Number, NumericError> {
        match self {
            Number::Int(v) => Ok(Number::Int(-v - IBig::ONE)),
            Number::Float(_) => Err(NumericError::UnsupportedOperand(NumberKind::Float)),
        }
    }

    /// True division. The result is always a float, even for integers.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::DivisionByZero`] if the divisor is zero.
    pub fn true_div(&self, other: &Number) -> Result<Number, NumericError> {
        if other.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        Ok(Number::Float(self.to_f64() / other.to_f64()))
    }

    /// Floor division, rounding toward negative infinity.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::DivisionByZero`] if the divisor is zero.
    pub fn floor_div(&self, other: &Number) -> Result<Number, NumericError> {
        if other.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(floor_div_rem(a, b).0)),
            _ => Ok(Number::Float((self.to_f64() / other.to_f64()).floor())),
        }
    }

    /// Modulo whose result takes the sign of the divisor.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::DivisionByZero`] if the divisor is zero.
    pub fn modulo(&self, other: &Number) -> Result<Number, NumericError> {
        if other.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(floor_div_rem(a, b).1)),
            _ => {
                let (a, b) = (self.to_f64(), other.to_f64());
                let mut r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    r += b;
                }
                Ok(Number::Float(r))
            }
        }
    }

    /// Exponentiation.
    ///
    /// An integer raised to a non-negative integer stays an integer; every
    /// other combination is computed in floating point.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::DivisionByZero`] for a negative power of zero,
    /// [`NumericError::ResultTooLarge`] for oversized integer results and
    /// [`NumericError::NotANumber`] when a float result is NaN.
    pub fn pow(&self, exp: &Number) -> Result<Number, NumericError> {
        match (self, exp) {
            (Number::Int(base), Number::Int(e)) if *e >= IBig::ZERO => {
                let e = usize::try_from(e.clone()).map_err(|_| NumericError::ResultTooLarge)?;
                int_pow(base, e).map(Number::Int)
            }
            _ => {
                let (b, e) = (self.to_f64(), exp.to_f64());
                if b == 0.0 && e < 0.0 {
                    return Err(NumericError::DivisionByZero);
                }
                let r = b.powf(e);
                if r.is_nan() && !b.is_nan() && !e.is_nan() {
                    Err(NumericError::NotANumber)
                } else {
                    Ok(Number::Float(r))
                }
            }
        }
    }

    /// Computes `self` multiplied by itself `count` times.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::ResultTooLarge`] for oversized integer results.
    #[allow(clippy::cast_precision_loss)]
    pub fn pow_count(&self, count: u64) -> Result<Number, NumericError> {
        match self {
            Number::Int(v) => {
                let count = usize::try_from(count).map_err(|_| NumericError::ResultTooLarge)?;
                int_pow(v, count).map(Number::Int)
            }
            Number::Float(v) => Ok(Number::Float(v.powf(count as f64))),
        }
    }

    /// Arithmetic right shift, rounding toward negative infinity.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::NegativeShift`] for a negative amount and
    /// [`NumericError::UnsupportedOperand`] for floats.
    pub fn shr(&self, amount: &Number) -> Result<Number, NumericError> {
        let (value, amount) = both_ints(self, amount)?;
        if *amount < IBig::ZERO {
            return Err(NumericError::NegativeShift);
        }
        match usize::try_from(amount.clone()) {
            Ok(n) => Ok(Number::Int(value.clone() >> n)),
            // Shifting past every bit leaves only the sign.
            Err(_) if *value < IBig::ZERO => Ok(Number::Int(IBig::from(-1))),
            Err(_) => Ok(Number::Int(IBig::ZERO)),
        }
    }

    /// Rotates the low `width` bits of `self` left by `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::NegativeShift`] for a negative amount,
    /// [`NumericError::InvalidWidth`] for a width outside `1..=64` and
    /// [`NumericError::UnsupportedOperand`] for floats.
    pub fn rotate_left(&self, amount: &Number, width: u32) -> Result<Number, NumericError> {
        let (word, k) = rotation_operands(self, amount, width)?;
        Ok(Number::Int(IBig::from(rotate_word(word, k, width))))
    }

    /// Rotates the low `width` bits of `self` right by `amount`.
    ///
    /// # Errors
    ///
    /// Same as [`Number::rotate_left`].
    pub fn rotate_right(&self, amount: &Number, width: u32) -> Result<Number, NumericError> {
        let (word, k) = rotation_operands(self, amount, width)?;
        Ok(Number::Int(IBig::from(rotate_word(word, (width - k) % width, width))))
    }

    /// Compares numerically across kinds. Returns `None` if either side is NaN.
    #[must_use]
    pub fn numeric_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

fn both_ints<'a>(a: &'a Number, b: &'a Number) -> Result<(&'a IBig, &'a IBig), NumericError> {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => Ok((a, b)),
        _ => Err(NumericError::UnsupportedOperand(NumberKind::Float)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn int_to_f64(value: &IBig) -> f64 {
    match i64::try_from(value.clone()) {
        Ok(v) => v as f64,
        // Decimal parsing rounds correctly and saturates to infinity.
        Err(_) => value.to_string().parse().unwrap_or(f64::NAN),
    }
}

fn floor_div_rem(a: &IBig, b: &IBig) -> (IBig, IBig) {
    let q = a / b;
    let r = a % b;
    if r != IBig::ZERO && (r < IBig::ZERO) != (*b < IBig::ZERO) {
        (q - IBig::ONE, r + b)
    } else {
        (q, r)
    }
}

fn int_pow(base: &IBig, exp: usize) -> Result<IBig, NumericError> {
    // |base ** exp| < 2 ** (bit_len(base) * exp)
    let bits = base.bit_len();
    if exp > 1 && bits > 1 && bits.saturating_mul(exp) > MAX_RESULT_BITS as usize {
        return Err(NumericError::ResultTooLarge);
    }
    Ok(base.pow(exp))
}

fn rotation_operands(
    value: &Number,
    amount: &Number,
    width: u32,
) -> Result<(u64, u32), NumericError> {
    if !(1..=64).contains(&width) {
        return Err(NumericError::InvalidWidth(width));
    }
    let (value, amount) = both_ints(value, amount)?;
    if *amount < IBig::ZERO {
        return Err(NumericError::NegativeShift);
    }
    let mask = (IBig::ONE << width as usize) - IBig::ONE;
    let word = u64::try_from(value.clone() & mask).map_err(|_| NumericError::ResultTooLarge)?;
    let k = u32::try_from(amount % &IBig::from(width)).map_err(|_| NumericError::ResultTooLarge)?;
    Ok((word, k))
}

fn rotate_word(word: u64, k: u32, width: u32) -> u64 {
    if k == 0 {
        return word;
    }
    let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
    ((word << k) | (word >> (width - k))) & mask
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Number::Int(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Number::Float(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    /// Structural order: integers before floats, then by value.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(b),
            (Number::Float(a), Number::Float(b)) => a.total_cmp(b),
            (Number::Int(_), Number::Float(_)) => Ordering::Less,
            (Number::Float(_), Number::Int(_)) => Ordering::Greater,
        }
    }
}

// Any float operand makes the result a float.
impl Add<&Number> for &Number {
    type Output = Number;

    fn add(self, rhs: &Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Number::Int(a + b),
            _ => Number::Float(self.to_f64() + rhs.to_f64()),
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        &self + &rhs
    }
}

impl Mul<&Number> for &Number {
    type Output = Number;

    fn mul(self, rhs: &Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => Number::Int(a * b),
            _ => Number::Float(self.to_f64() * rhs.to_f64()),
        }
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        &self * &rhs
    }
}

impl Zero for Number {
    fn zero() -> Self {
        Number::Int(IBig::ZERO)
    }

    /// True for the integer `0` and for `±0.0`.
    fn is_zero(&self) -> bool {
        match self {
            Number::Int(v) => *v == IBig::ZERO,
            Number::Float(v) => *v == 0.0,
        }
    }
}

impl One for Number {
    fn one() -> Self {
        Number::Int(IBig::ONE)
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "Int({v})"),
            Number::Float(v) => write!(f, "Float({v:?})"),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            // `{:?}` keeps the trailing `.0` that marks a float.
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<IBig> for Number {
    fn from(value: IBig) -> Self {
        Number::Int(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(IBig::from(value))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(IBig::from(value))
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::Int(IBig::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Int(IBig::from(value))
    }
}

impl From<bool> for Number {
    fn from(value: bool) -> Self {
        Number::from_bool(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}
