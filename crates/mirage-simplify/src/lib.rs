//! # mirage-simplify
//!
//! Rule-based simplification of Mirage expression trees.
//!
//! This crate provides:
//! - A [`Rule`] trait and an ordered, operator-indexed [`RuleRegistry`]
//! - A process-wide default registry, frozen after first use
//! - A bottom-up fixpoint engine with a rewrite step bound
//! - The built-in rule families: semigroup cleanup, constant folding,
//!   comparison normalization and factoring
//!
//! ## Rewriting Strategy
//!
//! Children are simplified before their parent, and the first applicable
//! rule wins. The engine repeats until a full pass changes nothing, so the
//! result is a fixpoint: simplifying it again returns it unchanged.
//!
//! ```
//! use mirage_core::Expr;
//! use mirage_simplify::simplify;
//!
//! let x = Expr::symbol("x");
//! let e = (x.clone() + Expr::int(1)) + Expr::int(2);
//! assert_eq!(simplify(&e).unwrap(), x + Expr::int(3));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod engine;
pub mod error;
pub mod registry;
pub mod rule;
pub mod rules;

#[cfg(test)]
mod proptests;

pub use engine::{
    simplify, RewriteStep, SimplificationStats, Simplifier, SimplifierConfig, Simplify,
};
pub use error::SimplifyError;
pub use registry::RuleRegistry;
pub use rule::{Rule, RuleContext, Trigger};
