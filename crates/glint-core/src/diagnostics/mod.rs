//! Diagnostics produced by rules
//!
//! A [`Diagnostic`] records where a rule matched, never what it matched: it
//! holds a text span and a [`PropertyBag`] of primitive values, so a fix can
//! be applied against a tree that was parsed again after analysis.
//!
//! Rules that hand facts to their fix declare a [`Payload`] type. The payload
//! is written into the bag when the diagnostic is created and decoded again
//! by the fix; a payload that no longer decodes makes the fix a no-op.

mod renderer;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rowan::{TextRange, TextSize};
use serde::{Deserialize, Serialize};

pub use renderer::{DiagnosticRenderer, OutputFormat, render_unified_diff};

/// Reporting level of a diagnostic
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported to tooling only, never printed
    Hidden,
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String-to-string facts attached to a diagnostic
///
/// Keys are kept sorted so encoded bags compare and serialize
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, String>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert_bool(&mut self, key: impl Into<String>, value: bool) {
        self.insert(key, if value { "true" } else { "false" });
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Store a span as `start..end`
    pub fn insert_range(&mut self, key: impl Into<String>, range: TextRange) {
        self.insert(
            key,
            format!("{}..{}", u32::from(range.start()), u32::from(range.end())),
        );
    }

    pub fn get_range(&self, key: &str) -> Option<TextRange> {
        decode_range(self.get(key)?)
    }

    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.parse().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn decode_range(text: &str) -> Option<TextRange> {
    let (start, end) = text.split_once("..")?;
    let start: u32 = start.parse().ok()?;
    let end: u32 = end.parse().ok()?;
    (start <= end).then(|| TextRange::new(TextSize::from(start), TextSize::from(end)))
}

/// Typed facts a rule passes from its matcher to its fix
///
/// Implementations encode themselves as primitive properties only; spans,
/// names and flags, never syntax nodes.
pub trait Payload: Sized {
    fn encode(&self, bag: &mut PropertyBag);

    /// `None` when a property is missing or malformed
    fn decode(bag: &PropertyBag) -> Option<Self>;
}

/// Payload of rules whose fix needs nothing beyond the span
impl Payload for () {
    fn encode(&self, _bag: &mut PropertyBag) {}

    fn decode(_bag: &PropertyBag) -> Option<Self> {
        Some(())
    }
}

/// A finding of one rule at one span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub rule_id: String,
    #[serde(with = "range_serde")]
    pub span: TextRange,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "PropertyBag::is_empty")]
    pub properties: PropertyBag,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        span: TextRange,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            span,
            message: message.into(),
            severity,
            properties: PropertyBag::new(),
        }
    }

    pub fn with_properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_payload<P: Payload>(mut self, payload: &P) -> Self {
        payload.encode(&mut self.properties);
        self
    }

    pub fn payload<P: Payload>(&self) -> Option<P> {
        P::decode(&self.properties)
    }

    /// Line and column of the span within `source`
    pub fn location(&self, file: &Path, index: &LineIndex) -> Location {
        index.location(file, self.span)
    }
}

/// Render a message template with positional `{0}`, `{1}`, ... placeholders
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), arg);
    }
    out
}

/// Diagnostics of one analysis run
///
/// Keeps at most one diagnostic per rule and span, sorted by position.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic; returns false if the rule already reported this span
    pub fn report(&mut self, diagnostic: Diagnostic) -> bool {
        let duplicate = self
            .diagnostics
            .iter()
            .any(|d| d.rule_id == diagnostic.rule_id && d.span == diagnostic.span);
        if duplicate {
            tracing::trace!(rule = %diagnostic.rule_id, span = ?diagnostic.span, "Dropping duplicate diagnostic");
            return false;
        }
        self.diagnostics.push(diagnostic);
        true
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics ordered by span start, then rule id
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by(|a, b| {
            a.span
                .start()
                .cmp(&b.span.start())
                .then_with(|| a.span.end().cmp(&b.span.end()))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });
        self.diagnostics
    }
}

/// Position of a span in a file, 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub offset: usize,
    pub length: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Byte offset to line/column mapping for one source text
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text: String,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            line_starts,
            text: text.to_string(),
        }
    }

    /// 1-based line and column; columns count characters
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[line];
        let column = self
            .text
            .get(start..offset)
            .map_or(offset - start, |s| s.chars().count());
        (line + 1, column + 1)
    }

    pub fn location(&self, file: &Path, span: TextRange) -> Location {
        let start = usize::from(span.start());
        let end = usize::from(span.end());
        let (line, column) = self.line_col(start);
        let (end_line, end_column) = self.line_col(end);
        Location {
            file: file.to_path_buf(),
            line,
            column,
            end_line,
            end_column,
            offset: start,
            length: end - start,
        }
    }

    /// Text of a 1-based line without its line break
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len());
        self.text
            .get(start..end)
            .map(|l| l.trim_end_matches(['\n', '\r']))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

mod range_serde {
    use rowan::TextRange;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Span {
        start: u32,
        end: u32,
    }

    pub fn serialize<S: Serializer>(range: &TextRange, serializer: S) -> Result<S::Ok, S::Error> {
        Span {
            start: range.start().into(),
            end: range.end().into(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TextRange, D::Error> {
        let span = Span::deserialize(deserializer)?;
        if span.start > span.end {
            return Err(serde::de::Error::custom("span start is after its end"));
        }
        Ok(TextRange::new(span.start.into(), span.end.into()))
    }
}
