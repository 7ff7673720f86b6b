//! The rule value and what its functions exchange with the engine

use glint_core::cst::trivia::significant_range;
use glint_core::cst::{CsSyntaxKind, GreenNode, NodeOrToken, TextRange};
use glint_core::diagnostics::format_message;
use glint_core::{
    Diagnostic, Payload, PropertyBag, RuleCategory, RuleInfo, SemanticFacts, Severity, SyntaxNode,
    SyntaxToken, SyntaxTree,
};

/// Decide whether `node` is an instance of the rule's anti-pattern
pub type Matcher = fn(&SyntaxNode, &dyn SemanticFacts) -> Option<RuleMatch>;

/// Rewrite the code a diagnostic points at
pub type Fixer = fn(&SyntaxTree, &Diagnostic) -> FixOutcome;

/// A rule, created once and never modified
///
/// `node_kinds` lists the node kinds the matcher wants to see; the engine
/// never calls it for anything else.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Stable, category-coded id such as `GL1001`
    pub id: &'static str,
    /// Kebab-case name accepted by configuration
    pub name: &'static str,
    pub title: &'static str,
    /// Message template with `{0}`-style placeholders
    pub message: &'static str,
    pub category: RuleCategory,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
    pub node_kinds: &'static [CsSyntaxKind],
    pub matcher: Matcher,
    pub fixer: Option<Fixer>,
    /// Annotated example of the anti-pattern, spans marked with `[|...|]`
    pub sample: &'static str,
    /// `sample` after every fix was applied
    pub sample_fixed: Option<&'static str>,
}

impl Rule {
    pub fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id,
            name: self.name,
            category: self.category,
            default_severity: self.default_severity,
            enabled_by_default: self.enabled_by_default,
        }
    }

    pub fn is_fixable(&self) -> bool {
        self.fixer.is_some()
    }

    pub fn handles(&self, kind: CsSyntaxKind) -> bool {
        self.node_kinds.contains(&kind)
    }

    /// Run the matcher on one node
    pub fn check(&self, node: &SyntaxNode, facts: &dyn SemanticFacts) -> Option<Diagnostic> {
        if !self.handles(node.kind()) {
            return None;
        }
        let found = (self.matcher)(node, facts)?;
        Some(found.into_diagnostic(self, self.default_severity))
    }

    /// Apply the fixer, `Unchanged` for rules without one
    pub fn fix(&self, tree: &SyntaxTree, diagnostic: &Diagnostic) -> FixOutcome {
        match self.fixer {
            Some(fixer) if diagnostic.rule_id == self.id => fixer(tree, diagnostic),
            _ => FixOutcome::Unchanged,
        }
    }
}

/// What a matcher found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub span: TextRange,
    /// Values for the message placeholders
    pub args: Vec<String>,
    pub properties: PropertyBag,
}

impl RuleMatch {
    pub fn new(span: TextRange) -> Self {
        Self {
            span,
            args: Vec::new(),
            properties: PropertyBag::new(),
        }
    }

    /// Match covering a node without its boundary trivia
    pub fn node(node: &SyntaxNode) -> Self {
        Self::new(significant_range(node))
    }

    pub fn token(token: &SyntaxToken) -> Self {
        Self::new(token.text_range())
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_payload<P: Payload>(mut self, payload: &P) -> Self {
        payload.encode(&mut self.properties);
        self
    }

    pub fn into_diagnostic(self, rule: &Rule, severity: Severity) -> Diagnostic {
        Diagnostic::new(
            rule.id,
            severity,
            format_message(rule.message, &self.args),
            self.span,
        )
        .with_properties(self.properties)
    }
}

/// Result of a fixer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Changed(SyntaxTree),
    /// The target was not found or no longer has the expected shape
    Unchanged,
}

impl FixOutcome {
    pub fn from_green(green: Option<GreenNode>) -> Self {
        match green {
            Some(green) => Self::Changed(SyntaxTree::from_green(green)),
            None => Self::Unchanged,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    pub fn into_tree(self) -> Option<SyntaxTree> {
        match self {
            Self::Changed(tree) => Some(tree),
            Self::Unchanged => None,
        }
    }
}

/// Find the node of `kind` whose significant range is exactly `span`
///
/// Fixers use this to get back from a diagnostic to a node of their own tree.
pub fn find_node(root: &SyntaxNode, span: TextRange, kind: CsSyntaxKind) -> Option<SyntaxNode> {
    if !root.text_range().contains_range(span) {
        return None;
    }
    let start = match root.covering_element(span) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent()?,
    };
    start
        .ancestors()
        .take_while(|n| n.text_range().contains_range(span))
        .find(|n| n.kind() == kind && significant_range(n) == span)
}

/// Find the token of `kind` at exactly `span`
pub fn find_token(root: &SyntaxNode, span: TextRange, kind: CsSyntaxKind) -> Option<SyntaxToken> {
    if !root.text_range().contains_range(span) {
        return None;
    }
    root.covering_element(span)
        .into_token()
        .filter(|t| t.kind() == kind && t.text_range() == span)
}
