//! Rule engine
//!
//! The engine owns the enabled rules and a node-kind dispatch table. Analysis
//! walks one tree in document order and hands every node to the rules
//! registered for its kind. Fixing applies a single diagnostic's rewrite and
//! re-parses the result, so spans of any other pending diagnostic must be
//! recomputed by analyzing the new tree.

use std::collections::HashMap;

use glint_core::{
    Compilation, CsSyntaxKind, Diagnostic, DiagnosticSink, RuleSelection, SemanticFacts, Severity,
    SyntaxTree,
};

use crate::registry::RuleRegistry;
use crate::rule::{FixOutcome, Rule};

/// Upper bound for [`Engine::fix_all`] when the caller does not pick one
pub const DEFAULT_MAX_FIX_ITERATIONS: usize = 100;

/// Result of [`Engine::fix_all`]
#[derive(Debug, Clone)]
pub struct FixReport {
    pub tree: SyntaxTree,
    /// Rule ids of the applied fixes, in application order
    pub applied: Vec<String>,
    /// Analysis passes run, the final one included
    pub iterations: usize,
    /// Diagnostics of the final tree
    pub remaining: Vec<Diagnostic>,
}

impl FixReport {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Enabled rules and the node kinds they listen to
#[derive(Debug, Clone, Default)]
pub struct Engine {
    rules: Vec<(Rule, Severity)>,
    dispatch: HashMap<CsSyntaxKind, Vec<usize>>,
}

impl Engine {
    /// Engine running the rules `selection` enables, at their configured severity
    pub fn new(registry: &RuleRegistry, selection: &RuleSelection) -> Self {
        let mut engine = Self::default();
        for rule in registry.iter() {
            if let Some(severity) = selection.severity(rule.id) {
                engine.add(*rule, severity);
            }
        }
        tracing::debug!(
            rules = engine.rules.len(),
            kinds = engine.dispatch.len(),
            "Built rule dispatch table"
        );
        engine
    }

    /// Engine running the rules enabled by default
    pub fn with_defaults(registry: &RuleRegistry) -> Self {
        Self::new(registry, &RuleSelection::defaults(&registry.rule_infos()))
    }

    /// Engine running a single rule at its default severity, enabled or not
    pub fn for_rule(rule: Rule) -> Self {
        let mut engine = Self::default();
        engine.add(rule, rule.default_severity);
        engine
    }

    fn add(&mut self, rule: Rule, severity: Severity) {
        let index = self.rules.len();
        for kind in rule.node_kinds {
            self.dispatch.entry(*kind).or_default().push(index);
        }
        self.rules.push((rule, severity));
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().map(|(r, _)| r).find(|r| r.id == id)
    }

    /// Run every enabled rule over `tree`
    ///
    /// Diagnostics come back sorted by position; a rule reports a span once.
    pub fn analyze(&self, tree: &SyntaxTree, facts: &dyn SemanticFacts) -> Vec<Diagnostic> {
        let mut sink = DiagnosticSink::new();
        if self.rules.is_empty() {
            return sink.into_sorted();
        }

        for node in tree.root().descendants() {
            let Some(indices) = self.dispatch.get(&node.kind()) else {
                continue;
            };
            for &index in indices {
                let (rule, severity) = &self.rules[index];
                if let Some(found) = (rule.matcher)(&node, facts) {
                    tracing::trace!(rule = rule.id, span = ?found.span, "Rule matched");
                    sink.report(found.into_diagnostic(rule, *severity));
                }
            }
        }
        sink.into_sorted()
    }

    /// [`Engine::analyze`] against a fresh compilation of `tree`
    pub fn check(&self, tree: &SyntaxTree) -> Vec<Diagnostic> {
        let compilation = Compilation::new(tree);
        self.analyze(tree, &compilation)
    }

    /// Apply the fix for one diagnostic
    ///
    /// The result is re-parsed. A fix that turns a valid tree into one with
    /// parse errors is discarded and reported as `Unchanged`.
    pub fn fix_one(&self, tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
        let Some(rule) = self.rule(&diagnostic.rule_id) else {
            tracing::debug!(rule = %diagnostic.rule_id, "No enabled rule for diagnostic");
            return FixOutcome::Unchanged;
        };
        let Some(fixed) = rule.fix(tree, diagnostic).into_tree() else {
            tracing::debug!(rule = rule.id, span = ?diagnostic.span, "Fix did not apply");
            return FixOutcome::Unchanged;
        };

        let reparsed = fixed.reparse();
        if reparsed.has_errors() && !tree.has_errors() {
            tracing::warn!(
                rule = rule.id,
                errors = ?reparsed.errors(),
                "Discarding fix that produced invalid syntax"
            );
            return FixOutcome::Unchanged;
        }
        FixOutcome::Changed(reparsed)
    }

    /// Apply fixes one at a time, re-analyzing after each, until none applies
    pub fn fix_all(&self, tree: &SyntaxTree, max_iterations: usize) -> FixReport {
        let mut current = tree.clone();
        let mut applied = Vec::new();
        let mut iterations = 0;

        let remaining = loop {
            iterations += 1;
            let diagnostics = self.check(&current);
            if iterations > max_iterations {
                tracing::warn!(max_iterations, "Stopping fixes at the iteration limit");
                break diagnostics;
            }

            let next = diagnostics
                .iter()
                .filter(|d| self.rule(&d.rule_id).is_some_and(Rule::is_fixable))
                .find_map(|d| {
                    self.fix_one(&current, d)
                        .into_tree()
                        .map(|tree| (d.rule_id.clone(), tree))
                });
            match next {
                Some((rule_id, fixed)) => {
                    tracing::debug!(rule = %rule_id, iteration = iterations, "Applied fix");
                    applied.push(rule_id);
                    current = fixed;
                }
                None => break diagnostics,
            }
        };

        FixReport {
            tree: current,
            applied,
            iterations,
            remaining,
        }
    }
}
