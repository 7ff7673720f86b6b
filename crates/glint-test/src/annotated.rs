//! `[|...|]` span markers

use glint_core::cst::{TextRange, TextSize};

use crate::error::VerificationError;

pub const OPEN: &str = "[|";
pub const CLOSE: &str = "|]";

/// Source text with the marked spans removed from it and recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSource {
    pub text: String,
    /// Marked ranges of `text`, in order
    pub spans: Vec<TextRange>,
}

impl AnnotatedSource {
    /// Strip markers from `annotated`
    ///
    /// Markers may not nest, and every `[|` needs a matching `|]`.
    pub fn parse(annotated: &str) -> Result<Self, VerificationError> {
        let mut text = String::with_capacity(annotated.len());
        let mut spans = Vec::new();
        let mut open: Option<TextSize> = None;
        let mut rest = annotated;

        loop {
            let next_open = rest.find(OPEN);
            let next_close = rest.find(CLOSE);
            let (index, is_open) = match (next_open, next_close) {
                (None, None) => break,
                (Some(o), Some(c)) if c < o => (c, false),
                (Some(o), _) => (o, true),
                (None, Some(c)) => (c, false),
            };
            text.push_str(&rest[..index]);
            let position = text_size(text.len());
            let offset = annotated.len() - rest.len() + index;
            match (is_open, open) {
                (true, None) => open = Some(position),
                (false, Some(start)) => {
                    spans.push(TextRange::new(start, position));
                    open = None;
                }
                _ => return Err(VerificationError::UnbalancedMarker { offset }),
            }
            rest = &rest[index + OPEN.len()..];
        }

        if open.is_some() {
            return Err(VerificationError::UnbalancedMarker {
                offset: annotated.len(),
            });
        }
        text.push_str(rest);
        Ok(Self { text, spans })
    }

    pub fn has_markers(&self) -> bool {
        !self.spans.is_empty()
    }

    /// The marked texts, in order
    pub fn marked_texts(&self) -> Vec<&str> {
        self.spans.iter().map(|span| &self.text[*span]).collect()
    }
}

fn text_size(len: usize) -> TextSize {
    TextSize::try_from(len).unwrap_or(TextSize::from(u32::MAX))
}
