//! Glint Rules
//!
//! Rules are plain data: a [`Rule`] bundles its registration facts with a
//! matcher and an optional fixer, both ordinary functions. The [`Engine`]
//! walks a tree once in document order and hands every node to the rules
//! registered for its kind.
//!
//! Shared building blocks for rule authors:
//!
//! - [`call_matcher`] - decide whether a call binds to a well-known method
//! - [`chain`] - flatten `Append`/`Prepend`/`Concat` chains into ordered elements
//! - [`policies`] - trivia-preserving rewrites reused across rules

pub mod builtin;
pub mod call_matcher;
pub mod chain;
pub mod engine;
pub mod policies;
pub mod registry;
pub mod rule;

pub use builtin::BuiltinRules;
pub use call_matcher::{Dispatch, OverloadFilter, WellKnownMethod};
pub use engine::{DEFAULT_MAX_FIX_ITERATIONS, Engine, FixReport};
pub use registry::{RuleRegistry, RuleRow};
pub use rule::{FixOutcome, Fixer, Matcher, Rule, RuleMatch};
