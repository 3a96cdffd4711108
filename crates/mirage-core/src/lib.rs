//! # mirage-core
//!
//! Expression trees for the Mirage symbolic engine.
//!
//! This crate provides:
//! - Immutable, reference-counted expression nodes with structural sharing
//! - Multiset child storage for commutative semigroup operators
//! - Exact constant arithmetic over unbounded integers and doubles
//!
//! ## Design Principles
//!
//! - **Immutability**: trees are never mutated, so any subtree can be shared
//!   between trees and threads
//! - **Canonical equality**: `a + b` equals `b + a`; ordered operators keep
//!   their operand order
//! - **No silent numerics**: integer and float kinds never mix implicitly and
//!   undefined operations are errors

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod display;
pub mod error;
pub mod eval;
pub mod expr;
pub mod multiset;
pub mod number;
pub mod operator;

#[cfg(test)]
mod proptests;

pub use error::ExprError;
pub use expr::{Children, Expr, ExprNode, Operation, Symbol};
pub use multiset::Multiset;
pub use number::{Number, NumberKind, NumericError};
pub use operator::{Arity, Operator, OperatorClass};
