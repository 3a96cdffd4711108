//! The main simplification engine.
//!
//! Simplification is bottom-up rewriting to a fixpoint. Each pass visits
//! the tree in post-order: the children of a node are normalized first,
//! then the first applicable rule (in registry order) rewrites the node and
//! the result is normalized again. Passes repeat until one of them fires no
//! rule. A step bound turns a non-terminating rule set into an error.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use mirage_core::eval::DEFAULT_WORD_BITS;
use mirage_core::{Expr, Operation, Operator};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::error::SimplifyError;
use crate::registry::{self, RuleRegistry};
use crate::rule::{Rule, RuleContext};

/// Configuration for the simplification engine.
#[derive(Clone, Debug)]
pub struct SimplifierConfig {
    /// Maximum number of rule applications per call.
    pub max_steps: usize,
    /// Number of recent steps kept for [`SimplifyError::NonTerminatingRewrite`].
    pub trace_len: usize,
    /// Word width used when folding `rol` and `ror`.
    pub word_bits: u32,
    /// Deepest expression the engine will traverse, including nodes built
    /// by rewrites.
    pub max_depth: usize,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            trace_len: 8,
            word_bits: DEFAULT_WORD_BITS,
            max_depth: 256,
        }
    }
}

/// One rule application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteStep {
    /// Name of the rule that fired.
    pub rule: &'static str,
    /// The node before the rewrite.
    pub before: Expr,
    /// The replacement.
    pub after: Expr,
}

impl fmt::Display for RewriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} => {}", self.rule, self.before, self.after)
    }
}

/// Statistics about the simplification process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimplificationStats {
    /// Number of rule applications.
    pub steps: usize,
    /// Number of passes over the tree, including the final quiet one.
    pub passes: usize,
    /// True if any rule fired.
    pub simplified: bool,
    /// Applications per rule name.
    pub rule_hits: BTreeMap<&'static str, usize>,
}

/// The main simplification engine.
///
/// A simplifier borrows its registry read-only, so it is cheap to create and
/// can be shared across threads.
#[derive(Clone, Debug)]
pub struct Simplifier<'r> {
    config: SimplifierConfig,
    registry: &'r RuleRegistry,
}

impl Default for Simplifier<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplifier<'static> {
    /// Creates a simplifier over the global registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(registry::global())
    }
}

impl<'r> Simplifier<'r> {
    /// Creates a simplifier over an explicit registry.
    #[must_use]
    pub fn with_registry(registry: &'r RuleRegistry) -> Self {
        Self {
            config: SimplifierConfig::default(),
            registry,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: SimplifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SimplifierConfig {
        &self.config
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    /// Simplifies an expression to its fixpoint under the registry's rules.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule meets an undefined constant operation, a
    /// rule builds a malformed node, the tree is nested deeper than
    /// [`SimplifierConfig::max_depth`], or no fixpoint is reached within
    /// [`SimplifierConfig::max_steps`] rewrites.
    pub fn simplify(&self, expr: &Expr) -> Result<Expr, SimplifyError> {
        self.simplify_with_stats(expr).map(|(simplified, _)| simplified)
    }

    /// Simplifies and returns both the result and statistics.
    ///
    /// # Errors
    ///
    /// Same as [`Simplifier::simplify`].
    pub fn simplify_with_stats(
        &self,
        expr: &Expr,
    ) -> Result<(Expr, SimplificationStats), SimplifyError> {
        Rewriter::new(self.registry, &self.config).run(expr)
    }
}

/// Simplifies `expr` with the global registry and default configuration.
///
/// # Errors
///
/// Same as [`Simplifier::simplify`].
pub fn simplify(expr: &Expr) -> Result<Expr, SimplifyError> {
    Simplifier::new().simplify(expr)
}

/// Method-call access to the global simplifier.
pub trait Simplify {
    /// Simplifies `self` with the global registry.
    ///
    /// # Errors
    ///
    /// Same as [`Simplifier::simplify`].
    fn simplify(&self) -> Result<Expr, SimplifyError>;
}

impl Simplify for Expr {
    fn simplify(&self) -> Result<Expr, SimplifyError> {
        simplify(self)
    }
}

/// State of a single simplification call.
struct Rewriter<'s> {
    registry: &'s RuleRegistry,
    config: &'s SimplifierConfig,
    // Normal forms found during the current pass, keyed by parent operator.
    memo: FxHashMap<(Option<Operator>, Expr), Expr>,
    recent: VecDeque<RewriteStep>,
    stats: SimplificationStats,
    fired: bool,
    depth: usize,
}

impl<'s> Rewriter<'s> {
    fn new(registry: &'s RuleRegistry, config: &'s SimplifierConfig) -> Self {
        Self {
            registry,
            config,
            memo: FxHashMap::default(),
            recent: VecDeque::with_capacity(config.trace_len),
            stats: SimplificationStats::default(),
            fired: false,
            depth: 0,
        }
    }

    fn run(mut self, expr: &Expr) -> Result<(Expr, SimplificationStats), SimplifyError> {
        let depth = expr.depth();
        if depth > self.config.max_depth {
            warn!(depth, limit = self.config.max_depth, "expression too deep to simplify");
            return Err(self.too_deep());
        }

        let mut current = expr.clone();
        loop {
            self.memo.clear();
            self.fired = false;
            self.stats.passes += 1;

            let next = self.normalize(&current, None)?;
            debug!(
                pass = self.stats.passes,
                steps = self.stats.steps,
                size = next.size(),
                "simplification pass finished"
            );
            if !self.fired {
                self.stats.simplified = self.stats.steps > 0;
                return Ok((next, self.stats));
            }
            current = next;
        }
    }

    fn normalize(&mut self, expr: &Expr, parent: Option<Operator>) -> Result<Expr, SimplifyError> {
        if expr.is_atomic() {
            return Ok(expr.clone());
        }
        // Rewrites may deepen the tree past what the entry check saw.
        if self.depth >= self.config.max_depth {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let result = self.normalize_operation(expr, parent);
        self.depth -= 1;
        result
    }

    fn normalize_operation(
        &mut self,
        expr: &Expr,
        parent: Option<Operator>,
    ) -> Result<Expr, SimplifyError> {
        let key = (parent, expr.clone());
        if let Some(done) = self.memo.get(&key) {
            return Ok(done.clone());
        }

        let ctx = RuleContext::new(parent, self.config);
        let mut current = expr.clone();
        loop {
            current = self.normalize_children(&current)?;
            let Some(node) = current.as_operation() else {
                break;
            };
            let Some((rule, next)) = self.first_rewrite(node, &ctx)? else {
                break;
            };
            self.record(rule, &current, &next)?;
            current = next;
        }

        self.memo.insert((parent, current.clone()), current.clone());
        self.memo.insert(key, current.clone());
        Ok(current)
    }

    fn normalize_children(&mut self, expr: &Expr) -> Result<Expr, SimplifyError> {
        let Some(node) = expr.as_operation() else {
            return Ok(expr.clone());
        };
        let op = node.op();
        let mut changed = false;
        let rebuilt = node.try_map_children(|child| {
            let next = self.normalize(child, Some(op))?;
            changed |= next != *child;
            Ok::<_, SimplifyError>(next)
        })?;
        Ok(if changed { Expr::from(rebuilt) } else { expr.clone() })
    }

    fn first_rewrite(
        &self,
        node: &Operation,
        ctx: &RuleContext<'_>,
    ) -> Result<Option<(&'s dyn Rule, Expr)>, SimplifyError> {
        for rule in self.registry.candidates(node.op()) {
            if !rule.matches(node, ctx) {
                continue;
            }
            let next = rule.rewrite(node, ctx)?;
            if next.as_operation() != Some(node) {
                return Ok(Some((rule, next)));
            }
        }
        Ok(None)
    }

    fn record(
        &mut self,
        rule: &dyn Rule,
        before: &Expr,
        after: &Expr,
    ) -> Result<(), SimplifyError> {
        let name = rule.name();
        trace!(rule = name, %before, %after, "rewrite");

        self.fired = true;
        self.stats.steps += 1;
        *self.stats.rule_hits.entry(name).or_insert(0) += 1;

        if self.config.trace_len > 0 {
            if self.recent.len() == self.config.trace_len {
                self.recent.pop_front();
            }
            self.recent.push_back(RewriteStep {
                rule: name,
                before: before.clone(),
                after: after.clone(),
            });
        }

        if self.stats.steps > self.config.max_steps {
            warn!(limit = self.config.max_steps, "rewrite step bound exceeded");
            return Err(SimplifyError::NonTerminatingRewrite {
                limit: self.config.max_steps,
                recent: self.recent.drain(..).collect(),
            });
        }
        Ok(())
    }

    fn too_deep(&self) -> SimplifyError {
        SimplifyError::TooDeep {
            limit: self.config.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Trigger;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    #[test]
    fn test_default_config() {
        let config = SimplifierConfig::default();
        assert_eq!(config.max_steps, 10_000);
        assert_eq!(config.word_bits, 32);
        assert_eq!(config.max_depth, 256);
    }

    #[test]
    fn test_atoms_are_fixpoints() {
        let registry = RuleRegistry::with_default_rules();
        let simplifier = Simplifier::with_registry(&registry);
        let (result, stats) = simplifier.simplify_with_stats(&x()).unwrap();
        assert_eq!(result, x());
        assert_eq!(stats.steps, 0);
        assert_eq!(stats.passes, 1);
        assert!(!stats.simplified);
    }

    #[test]
    fn test_empty_registry_is_identity() {
        let registry = RuleRegistry::new();
        let expr = Expr::int(1) + Expr::int(2);
        let result = Simplifier::with_registry(&registry).simplify(&expr).unwrap();
        assert_eq!(result, expr);
    }

    #[test]
    fn test_stats_count_rule_hits() {
        let registry = RuleRegistry::with_default_rules();
        let simplifier = Simplifier::with_registry(&registry);
        let expr = (x() + Expr::int(1)) + Expr::int(2);
        let (result, stats) = simplifier.simplify_with_stats(&expr).unwrap();
        assert_eq!(result, x() + Expr::int(3));
        assert!(stats.simplified);
        assert_eq!(stats.rule_hits.get("flatten"), Some(&1));
        assert_eq!(stats.rule_hits.get("fold-nary"), Some(&1));
        assert_eq!(stats.steps, stats.rule_hits.values().sum::<usize>());
    }

    struct Swap;

    impl Rule for Swap {
        fn name(&self) -> &'static str {
            "swap"
        }

        fn trigger(&self) -> Trigger {
            Trigger::Operator(Operator::Lt)
        }

        fn matches(&self, _node: &Operation, _ctx: &RuleContext<'_>) -> bool {
            true
        }

        fn rewrite(
            &self,
            node: &Operation,
            _ctx: &RuleContext<'_>,
        ) -> Result<Expr, SimplifyError> {
            let (lhs, rhs) = node.operands().unwrap();
            Ok(rhs.clone().cmp_lt(lhs.clone()))
        }
    }

    #[test]
    fn test_step_bound_reports_recent_steps() {
        let mut registry = RuleRegistry::new();
        registry.register(Swap);
        let config = SimplifierConfig {
            max_steps: 5,
            trace_len: 3,
            ..SimplifierConfig::default()
        };
        let simplifier = Simplifier::with_registry(&registry).with_config(config);
        let err = simplifier
            .simplify(&x().cmp_lt(Expr::symbol("y")))
            .unwrap_err();
        match err {
            SimplifyError::NonTerminatingRewrite { limit, recent } => {
                assert_eq!(limit, 5);
                assert_eq!(recent.len(), 3);
                assert!(recent.iter().all(|step| step.rule == "swap"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unchanged_rewrite_does_not_fire() {
        struct Noop;

        impl Rule for Noop {
            fn name(&self) -> &'static str {
                "noop"
            }

            fn trigger(&self) -> Trigger {
                Trigger::Any
            }

            fn matches(&self, _node: &Operation, _ctx: &RuleContext<'_>) -> bool {
                true
            }

            fn rewrite(
                &self,
                node: &Operation,
                _ctx: &RuleContext<'_>,
            ) -> Result<Expr, SimplifyError> {
                Ok(Expr::from(node.clone()))
            }
        }

        let mut registry = RuleRegistry::new();
        registry.register(Noop);
        let expr = x() + Expr::int(1);
        let (result, stats) = Simplifier::with_registry(&registry)
            .simplify_with_stats(&expr)
            .unwrap();
        assert_eq!(result, expr);
        assert_eq!(stats.steps, 0);
    }

    fn nested(depth: usize) -> Expr {
        (1..depth).fold(x(), |inner, level| {
            let op = if level % 2 == 0 { Operator::Add } else { Operator::Mul };
            Expr::operation(op, [inner, x()]).unwrap()
        })
    }

    #[test]
    fn test_deep_expression_is_rejected() {
        let registry = RuleRegistry::with_default_rules();
        let simplifier = Simplifier::with_registry(&registry);
        let err = simplifier.simplify(&nested(10_000)).unwrap_err();
        assert!(matches!(err, SimplifyError::TooDeep { limit: 256 }));
        assert_eq!(err.to_string(), "expression nesting exceeds 256 levels");

        assert!(simplifier.simplify(&nested(100)).is_ok());
    }

    struct Grow;

    impl Rule for Grow {
        fn name(&self) -> &'static str {
            "grow"
        }

        fn trigger(&self) -> Trigger {
            Trigger::Operator(Operator::BitNot)
        }

        fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
            node.child(0).is_some_and(Expr::is_atomic)
        }

        fn rewrite(
            &self,
            node: &Operation,
            _ctx: &RuleContext<'_>,
        ) -> Result<Expr, SimplifyError> {
            Ok(!!Expr::from(node.clone()))
        }
    }

    #[test]
    fn test_rewrites_cannot_deepen_past_the_bound() {
        let mut registry = RuleRegistry::new();
        registry.register(Grow);
        let config = SimplifierConfig {
            max_depth: 8,
            ..SimplifierConfig::default()
        };
        let err = Simplifier::with_registry(&registry)
            .with_config(config)
            .simplify(&!x())
            .unwrap_err();
        assert!(matches!(err, SimplifyError::TooDeep { limit: 8 }));
    }
}
