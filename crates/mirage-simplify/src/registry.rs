//! Rule registry and the process-wide default registry.
//!
//! A [`RuleRegistry`] keeps rules in registration order and indexes them by
//! the operators their triggers cover, so the engine only looks at rules
//! that can apply to a node. The global registry is built once and then
//! only read, which lets any number of threads simplify concurrently.

use std::fmt;
use std::sync::{Arc, OnceLock};

use mirage_core::Operator;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::rule::Rule;
use crate::rules;

/// An ordered collection of rewrite rules.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    dispatch: FxHashMap<Operator, SmallVec<[usize; 8]>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in rule families, in their
    /// default order.
    #[must_use]
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        rules::register_defaults(&mut registry);
        registry
    }

    /// Appends a rule. Rules registered earlier are tried first.
    pub fn register(&mut self, rule: impl Rule + 'static) -> &mut Self {
        self.register_shared(Arc::new(rule))
    }

    /// Appends a shared rule.
    pub fn register_shared(&mut self, rule: Arc<dyn Rule>) -> &mut Self {
        let index = self.rules.len();
        let trigger = rule.trigger();
        for op in Operator::ALL {
            if trigger.covers(op) {
                self.dispatch.entry(op).or_default().push(index);
            }
        }
        self.rules.push(rule);
        self
    }

    /// Iterates the rules offered a node with operator `op`, in registration
    /// order.
    pub fn candidates(&self, op: Operator) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.dispatch
            .get(&op)
            .into_iter()
            .flatten()
            .map(|&index| self.rules[index].as_ref())
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rule names in registration order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rule_names())
            .finish()
    }
}

static GLOBAL: OnceLock<RuleRegistry> = OnceLock::new();

/// Installs `registry` as the process-wide registry.
///
/// Must happen before the first simplification that uses the global
/// registry; afterwards the registry is frozen.
///
/// # Errors
///
/// Gives the registry back if a global registry is already in place.
pub fn install(registry: RuleRegistry) -> Result<(), RuleRegistry> {
    let rules = registry.len();
    GLOBAL.set(registry)?;
    debug!(rules, "installed global rule registry");
    Ok(())
}

/// Returns the process-wide registry, building the default one on first use.
pub fn global() -> &'static RuleRegistry {
    GLOBAL.get_or_init(|| {
        let registry = RuleRegistry::with_default_rules();
        debug!(rules = registry.len(), "built default rule registry");
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimplifyError;
    use crate::rule::{RuleContext, Trigger};
    use mirage_core::{Expr, Operation};

    struct Named(&'static str, Trigger);

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn trigger(&self) -> Trigger {
            self.1
        }

        fn matches(&self, _node: &Operation, _ctx: &RuleContext<'_>) -> bool {
            false
        }

        fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
            Ok(Expr::from(node.clone()))
        }
    }

    #[test]
    fn test_dispatch_by_trigger() {
        let mut registry = RuleRegistry::new();
        registry
            .register(Named("first", Trigger::Operator(Operator::Add)))
            .register(Named("any", Trigger::Any))
            .register(Named("cmp", Trigger::AnyOf(&[Operator::Lt, Operator::Le])));

        let add: Vec<_> = registry.candidates(Operator::Add).map(Rule::name).collect();
        assert_eq!(add, ["first", "any"]);
        let lt: Vec<_> = registry.candidates(Operator::Lt).map(Rule::name).collect();
        assert_eq!(lt, ["any", "cmp"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_registry_has_no_candidates() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.candidates(Operator::Mul).count(), 0);
    }

    #[test]
    fn test_default_rules_start_with_semigroup_family() {
        let registry = RuleRegistry::with_default_rules();
        let names = registry.rule_names();
        assert_eq!(names.first(), Some(&"flatten"));
        assert_eq!(names.last(), Some(&"distribute"));
    }
}
