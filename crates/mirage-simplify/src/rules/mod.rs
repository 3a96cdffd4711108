//! Built-in rewrite rules.
//!
//! Rules are organized by family:
//! - [`semigroup`]: flattening, idempotence and involution
//! - [`fold_constant`]: evaluation of constant subexpressions
//! - [`compare`]: comparison normalization
//! - [`distributive`]: grouping of repeated terms and factoring

pub mod compare;
pub mod distributive;
pub mod fold_constant;
pub mod semigroup;

use crate::registry::RuleRegistry;

/// Registers every built-in family in the default order.
///
/// Structural cleanup runs first so folding sees flat constant sets, and
/// factoring runs last so it only sees terms that are already folded.
pub fn register_defaults(registry: &mut RuleRegistry) {
    semigroup::register(registry);
    fold_constant::register(registry);
    compare::register(registry);
    distributive::register(registry);
}
