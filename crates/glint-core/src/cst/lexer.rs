//! Trivia-preserving lexer
//!
//! Every byte of input ends up in exactly one token, so the token texts
//! concatenated in order reproduce the input. Whitespace, newlines and
//! comments are emitted as trivia tokens; the parser decides which token
//! each run of trivia belongs to.

use crate::cst::CsSyntaxKind;
use std::ops::Range;

/// Byte range into the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Punctuation, longest spelling first within each leading character
const PUNCTUATION: &[(&str, CsSyntaxKind)] = &[
    ("=>", CsSyntaxKind::FatArrow),
    ("==", CsSyntaxKind::EqEq),
    ("=", CsSyntaxKind::Eq),
    ("!=", CsSyntaxKind::BangEq),
    ("!", CsSyntaxKind::Bang),
    ("<=", CsSyntaxKind::LtEq),
    ("<", CsSyntaxKind::Lt),
    (">=", CsSyntaxKind::GtEq),
    (">", CsSyntaxKind::Gt),
    ("&&", CsSyntaxKind::AmpAmp),
    ("&", CsSyntaxKind::Amp),
    ("||", CsSyntaxKind::PipePipe),
    ("|", CsSyntaxKind::Pipe),
    ("++", CsSyntaxKind::PlusPlus),
    ("+=", CsSyntaxKind::PlusEq),
    ("+", CsSyntaxKind::Plus),
    ("--", CsSyntaxKind::MinusMinus),
    ("-=", CsSyntaxKind::MinusEq),
    ("-", CsSyntaxKind::Minus),
    ("*=", CsSyntaxKind::StarEq),
    ("*", CsSyntaxKind::Star),
    ("/=", CsSyntaxKind::SlashEq),
    ("/", CsSyntaxKind::Slash),
    ("%", CsSyntaxKind::Percent),
    ("^", CsSyntaxKind::Caret),
    ("~", CsSyntaxKind::Tilde),
    ("??", CsSyntaxKind::QuestionQuestion),
    ("?", CsSyntaxKind::Question),
    ("..", CsSyntaxKind::DotDot),
    (".", CsSyntaxKind::Dot),
    (",", CsSyntaxKind::Comma),
    (";", CsSyntaxKind::Semicolon),
    (":", CsSyntaxKind::Colon),
    ("{", CsSyntaxKind::LBrace),
    ("}", CsSyntaxKind::RBrace),
    ("(", CsSyntaxKind::LParen),
    (")", CsSyntaxKind::RParen),
    ("[", CsSyntaxKind::LBracket),
    ("]", CsSyntaxKind::RBracket),
];

/// Lex input preserving all trivia
///
/// The returned stream always ends with a zero-width `Eof` token.
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;

    while i < len {
        let Some((current, size)) = next_char(input, i) else {
            break;
        };
        let start = i;

        let kind = match current {
            '\n' => {
                i += 1;
                CsSyntaxKind::Newline
            }
            '\r' => {
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                CsSyntaxKind::Newline
            }
            ' ' | '\t' => {
                while i < len && matches!(bytes[i], b' ' | b'\t') {
                    i += 1;
                }
                CsSyntaxKind::Whitespace
            }
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < len && bytes[i] != b'\n' {
                    if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                        break;
                    }
                    i += 1;
                }
                CsSyntaxKind::LineComment
            }
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                match input[i + 2..].find("*/") {
                    Some(offset) => i = i + 2 + offset + 2,
                    None => {
                        errors.push(LexerError::new("Unterminated block comment", span(start, len)));
                        i = len;
                    }
                }
                CsSyntaxKind::BlockComment
            }
            c if c == '_' || c.is_alphabetic() => {
                i = scan_identifier(input, i);
                CsSyntaxKind::from_keyword(&input[start..i]).unwrap_or(CsSyntaxKind::Ident)
            }
            c if c.is_ascii_digit() => {
                let (end, kind) = scan_number(bytes, i);
                i = end;
                kind
            }
            '$' if bytes.get(i + 1) == Some(&b'"') => {
                let (end, error) = scan_interpolated_string(input, i);
                errors.extend(error);
                i = end;
                CsSyntaxKind::InterpolatedString
            }
            '@' if bytes.get(i + 1) == Some(&b'"') => {
                let (end, error) = scan_verbatim_string(input, i);
                errors.extend(error);
                i = end;
                CsSyntaxKind::StringLiteral
            }
            '"' => {
                let (end, error) = scan_quoted(input, i, b'"');
                errors.extend(error);
                i = end;
                CsSyntaxKind::StringLiteral
            }
            '\'' => {
                let (end, error) = scan_quoted(input, i, b'\'');
                errors.extend(error);
                i = end;
                CsSyntaxKind::CharLiteral
            }
            _ => match PUNCTUATION.iter().find(|(text, _)| input[i..].starts_with(text)) {
                Some((text, kind)) => {
                    i += text.len();
                    *kind
                }
                None => {
                    errors.push(LexerError::new(
                        format!("Unexpected character '{current}'"),
                        span(start, start + size),
                    ));
                    i += size;
                    CsSyntaxKind::Error
                }
            },
        };

        tokens.push(CstToken::new(kind, &input[start..i], span(start, i)));
    }

    tokens.push(CstToken::new(CsSyntaxKind::Eof, "", span(len, len)));
    (tokens, errors)
}

fn scan_identifier(input: &str, mut i: usize) -> usize {
    while let Some((c, size)) = next_char(input, i) {
        if c == '_' || c.is_alphanumeric() {
            i += size;
        } else {
            break;
        }
    }
    i
}

fn scan_number(bytes: &[u8], mut i: usize) -> (usize, CsSyntaxKind) {
    let mut kind = CsSyntaxKind::IntLiteral;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
        i += 1;
    }
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        kind = CsSyntaxKind::RealLiteral;
        i += 1;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
            i += 1;
        }
    }
    if i < bytes.len() {
        match bytes[i] {
            b'f' | b'F' | b'd' | b'D' | b'm' | b'M' => {
                kind = CsSyntaxKind::RealLiteral;
                i += 1;
            }
            b'l' | b'L' | b'u' | b'U' => i += 1,
            _ => {}
        }
    }
    (i, kind)
}

/// Scan a `"..."` or `'...'` literal with backslash escapes
fn scan_quoted(input: &str, start: usize, quote: u8) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b if b == quote => return (i + 1, None),
            _ => i += 1,
        }
    }
    let end = i.min(bytes.len());
    (
        end,
        Some(LexerError::new("Unterminated literal", span(start, end))),
    )
}

fn scan_verbatim_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut i = start + 2;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return (i + 1, None);
        }
        i += 1;
    }
    (
        bytes.len(),
        Some(LexerError::new(
            "Unterminated verbatim string",
            span(start, bytes.len()),
        )),
    )
}

/// Scan `$"..."`, skipping over string literals nested inside holes
fn scan_interpolated_string(input: &str, start: usize) -> (usize, Option<LexerError>) {
    let bytes = input.as_bytes();
    let mut i = start + 2;
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if depth == 0 && bytes.get(i + 1) == Some(&b'{') => i += 2,
            b'}' if depth == 0 && bytes.get(i + 1) == Some(&b'}') => i += 2,
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b'"' if depth > 0 => {
                let (end, _) = scan_quoted(input, i, b'"');
                i = end;
            }
            b'"' => return (i + 1, None),
            b'\\' if depth == 0 => i += 2,
            b'\n' if depth == 0 => break,
            _ => i += 1,
        }
    }
    let end = i.min(bytes.len());
    (
        end,
        Some(LexerError::new(
            "Unterminated interpolated string",
            span(start, end),
        )),
    )
}

fn next_char(input: &str, index: usize) -> Option<(char, usize)> {
    input[index..].chars().next().map(|c| (c, c.len_utf8()))
}

fn span(start: usize, end: usize) -> CstSpan {
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<CsSyntaxKind> {
        lex_with_trivia(input).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lossless_concatenation() {
        let source = "var x = $\"{a} \\\"b\\\"\" + 'c'; // tail\r\n/* block */ y..z";
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty(), "{errors:?}");
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_trivia_kinds() {
        assert_eq!(
            kinds("a \t// c\r\n/* d */\n"),
            vec![
                CsSyntaxKind::Ident,
                CsSyntaxKind::Whitespace,
                CsSyntaxKind::LineComment,
                CsSyntaxKind::Newline,
                CsSyntaxKind::BlockComment,
                CsSyntaxKind::Newline,
                CsSyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_longest_punctuation_wins() {
        assert_eq!(
            kinds("=>==..?"),
            vec![
                CsSyntaxKind::FatArrow,
                CsSyntaxKind::EqEq,
                CsSyntaxKind::DotDot,
                CsSyntaxKind::Question,
                CsSyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers_and_member_access() {
        assert_eq!(
            kinds("3.0 1.ToString"),
            vec![
                CsSyntaxKind::RealLiteral,
                CsSyntaxKind::Whitespace,
                CsSyntaxKind::IntLiteral,
                CsSyntaxKind::Dot,
                CsSyntaxKind::Ident,
                CsSyntaxKind::Eof,
            ]
        );
    }

    #[test]
    fn test_interpolated_string_with_nested_quotes() {
        let (tokens, errors) = lex_with_trivia(r#"$"{string.Join(",", xs)} done""#);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, CsSyntaxKind::InterpolatedString);
        assert_eq!(tokens[1].kind, CsSyntaxKind::Eof);
    }

    #[test]
    fn test_unterminated_comment_reports_error() {
        let (tokens, errors) = lex_with_trivia("a /* open");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[2].text, "/* open");
    }

    #[test]
    fn test_unknown_character() {
        let (tokens, errors) = lex_with_trivia("a # b");
        assert_eq!(errors.len(), 1);
        assert_eq!(tokens[2].kind, CsSyntaxKind::Error);
    }
}
