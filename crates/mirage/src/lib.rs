//! # Mirage
//!
//! Symbolic arithmetic for lifting machine code into readable expressions.
//!
//! Instruction semantics are built as expression trees over registers and
//! memory placeholders, then simplified to a canonical form so that
//! equivalent computations compare equal.
//!
//! ## Features
//!
//! - **Immutable Trees**: `Arc`-shared nodes, safe to simplify from many threads
//! - **Exact Constants**: unbounded integers and doubles that never mix silently
//! - **Open Rule Set**: register custom rewrite rules next to the built-in ones
//!
//! ## Quick Start
//!
//! ```
//! use mirage::prelude::*;
//!
//! let (x, y) = (Expr::symbol("x"), Expr::symbol("y"));
//! let flag = (x.clone() - y.clone()).cmp_lt(Expr::int(0));
//! assert_eq!(flag.simplify().unwrap(), x.cmp_lt(y));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use mirage_core as core;
pub use mirage_simplify as simplify;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use mirage_core::{Expr, ExprError, Number, NumericError, Operator};
    pub use mirage_simplify::{
        simplify, Rule, RuleContext, RuleRegistry, Simplifier, SimplifierConfig, Simplify,
        SimplifyError, Trigger,
    };
}
