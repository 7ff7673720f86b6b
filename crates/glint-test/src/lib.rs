//! Glint Test Harness
//!
//! Verifies rules against annotated samples. A sample is ordinary source
//! text in which every span the rule must flag is wrapped in `[|` and `|]`:
//!
//! ```text
//! var words = [|"a b".Split(' ').ToArray()|];
//! ```
//!
//! The harness checks that the flagged spans are exactly the marked ones,
//! that applying the fixes yields an independently written expected text
//! byte for byte, and that the fixed text is clean.

pub mod annotated;
pub mod error;
pub mod harness;

pub use annotated::AnnotatedSource;
pub use error::VerificationError;
pub use harness::{
    assert_diagnostics, assert_fix, assert_no_diagnostics, assert_rule_sample, verify_diagnostics,
    verify_fix, verify_no_diagnostics, verify_rule_sample,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
