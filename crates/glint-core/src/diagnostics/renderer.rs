//! Diagnostic and diff rendering for terminal and machine output

use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use super::{Diagnostic, LineIndex, Location, PropertyBag, Severity};
use crate::console::{Color, Console};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per diagnostic, optionally followed by a code frame
    #[default]
    Text,
    /// A JSON array of all diagnostics
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDiagnostic<'a> {
    location: Location,
    rule_id: &'a str,
    severity: Severity,
    message: &'a str,
    #[serde(skip_serializing_if = "PropertyBag::is_empty")]
    properties: &'a PropertyBag,
}

/// Renders the diagnostics of analyzed files
pub struct DiagnosticRenderer {
    console: Console,
    output_format: OutputFormat,
    code_frames: bool,
}

impl DiagnosticRenderer {
    /// Renderer with automatic color detection for text output
    pub fn new(format: OutputFormat) -> Self {
        let console = match format {
            OutputFormat::Json => Console::no_colors(),
            OutputFormat::Text => Console::new(),
        };
        Self {
            console,
            output_format: format,
            code_frames: false,
        }
    }

    pub fn no_colors(format: OutputFormat) -> Self {
        Self {
            console: Console::no_colors(),
            output_format: format,
            code_frames: false,
        }
    }

    /// Show the offending source line under each text diagnostic
    pub fn with_code_frames(mut self, enabled: bool) -> Self {
        self.code_frames = enabled;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.output_format
    }

    /// Text rendering of one file's diagnostics; hidden ones are skipped
    pub fn render_file(&self, path: &Path, source: &str, diagnostics: &[Diagnostic]) -> String {
        let index = LineIndex::new(source);
        let mut output = String::new();
        for diagnostic in diagnostics
            .iter()
            .filter(|d| d.severity != Severity::Hidden)
        {
            let location = diagnostic.location(path, &index);
            output.push_str(&self.render_line(&location, diagnostic));
            output.push('\n');
            if self.code_frames
                && let Some(frame) = self.render_code_frame(&index, &location, diagnostic.severity)
            {
                output.push_str(&frame);
            }
        }
        output
    }

    /// JSON array over several files' diagnostics
    pub fn render_json<'a>(
        &self,
        files: impl IntoIterator<Item = (&'a Path, &'a str, &'a [Diagnostic])>,
    ) -> String {
        let mut entries = Vec::new();
        for (path, source, diagnostics) in files {
            let index = LineIndex::new(source);
            entries.extend(diagnostics.iter().map(|d| JsonDiagnostic {
                location: d.location(path, &index),
                rule_id: &d.rule_id,
                severity: d.severity,
                message: &d.message,
                properties: &d.properties,
            }));
        }
        serde_json::to_string_pretty(&entries)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
    }

    /// `path:line:col: severity[rule_id]: message`
    fn render_line(&self, location: &Location, diagnostic: &Diagnostic) -> String {
        let severity = self
            .console
            .colorize(diagnostic.severity.as_str(), severity_color(diagnostic.severity));
        let rule_id = self
            .console
            .colorize(&format!("[{}]", diagnostic.rule_id), Color::Dim);
        format!(
            "{}: {severity}{rule_id}: {}",
            self.console.colorize(&location.to_string(), Color::Bold),
            diagnostic.message
        )
    }

    fn render_code_frame(
        &self,
        index: &LineIndex,
        location: &Location,
        severity: Severity,
    ) -> Option<String> {
        let line = index.line_text(location.line)?;
        let gutter = location.line.to_string();
        let pad = " ".repeat(gutter.len());
        let width = if location.end_line == location.line {
            location.end_column.saturating_sub(location.column)
        } else {
            line.chars().count().saturating_sub(location.column - 1)
        };

        let bar = self.console.colorize("|", Color::Blue);
        let mut frame = format!("{pad} {bar}\n");
        frame.push_str(&format!(
            "{} {bar} {line}\n",
            self.console.colorize(&gutter, Color::Blue)
        ));
        frame.push_str(&format!(
            "{pad} {bar} {}{}\n",
            " ".repeat(location.column - 1),
            self.console
                .colorize(&"^".repeat(width.max(1)), severity_color(severity))
        ));
        Some(frame)
    }

    /// Unified diff between a file's text before and after fixes
    pub fn render_diff(&self, path: &Path, before: &str, after: &str) -> String {
        render_unified_diff(&self.console, path, before, after)
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
        Severity::Hidden => Color::Dim,
    }
}

/// Unified diff with three lines of context; empty when the texts are equal
pub fn render_unified_diff(console: &Console, path: &Path, before: &str, after: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    let groups = diff.grouped_ops(3);
    if groups.is_empty() {
        return String::new();
    }

    let mut output = String::new();
    output.push_str(&console.colorize(&format!("--- a/{}", path.display()), Color::Bold));
    output.push('\n');
    output.push_str(&console.colorize(&format!("+++ b/{}", path.display()), Color::Bold));
    output.push('\n');

    for group in &groups {
        let old_start = group[0].old_range().start;
        let new_start = group[0].new_range().start;
        let old_len: usize = group.iter().map(|op| op.old_range().len()).sum();
        let new_len: usize = group.iter().map(|op| op.new_range().len()).sum();
        output.push_str(&console.colorize(
            &format!(
                "@@ -{},{old_len} +{},{new_len} @@",
                old_start + 1,
                new_start + 1
            ),
            Color::Cyan,
        ));
        output.push('\n');

        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ('-', Some(Color::Red)),
                    ChangeTag::Insert => ('+', Some(Color::Green)),
                    ChangeTag::Equal => (' ', None),
                };
                let line = format!("{sign}{}", change.value().trim_end_matches(['\n', '\r']));
                match color {
                    Some(color) => output.push_str(&console.colorize(&line, color)),
                    None => output.push_str(&line),
                }
                output.push('\n');
            }
        }
    }

    output
}
