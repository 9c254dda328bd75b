//! Single-pass scanner for control tokens embedded in chat text.
//!
//! Recognises `==END_DAY==`, `==RESET==` and `{label:calories}`. A brace
//! group that is not a well-formed food token is ordinary text.

use std::ops::Range;

use crate::constants::{END_DAY_TOKEN, RESET_TOKEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    EndDay,
    Reset,
    Food { label: String, calories: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range in the scanned text.
    pub span: Range<usize>,
}

/// Scan `text` once, left to right. Tokens never overlap.
pub fn scan(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'=' => {
                let rest = &text[i..];
                let kind = if rest.starts_with(END_DAY_TOKEN) {
                    Some((TokenKind::EndDay, END_DAY_TOKEN.len()))
                } else if rest.starts_with(RESET_TOKEN) {
                    Some((TokenKind::Reset, RESET_TOKEN.len()))
                } else {
                    None
                };
                match kind {
                    Some((kind, len)) => {
                        tokens.push(Token {
                            kind,
                            span: i..i + len,
                        });
                        i += len;
                    }
                    None => i += 1,
                }
            }
            b'{' => match food_at(text, i) {
                Some(token) => {
                    i = token.span.end;
                    tokens.push(token);
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    tokens
}

/// Try to read `{label:digits}` starting at the `{` at `start`.
fn food_at(text: &str, start: usize) -> Option<Token> {
    let close = start + 1 + text[start + 1..].find('}')?;
    let inner = &text[start + 1..close];
    let colon = inner.rfind(':')?;
    let (label, digits) = (&inner[..colon], &inner[colon + 1..]);
    if label.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let calories = digits.parse::<u32>().ok()?;
    Some(Token {
        kind: TokenKind::Food {
            label: label.to_string(),
            calories,
        },
        span: start..close + 1,
    })
}

/// Remove the given token spans from `text`.
///
/// Whitespace after a removed token is dropped when the kept text already
/// ends in whitespace, so "ate {cake:300} today" becomes "ate today". The
/// result is trimmed. With no tokens the text is returned untouched.
pub fn strip(text: &str, tokens: &[Token]) -> String {
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut after_token = false;

    for token in tokens {
        push_segment(&mut out, &text[cursor..token.span.start], after_token);
        cursor = token.span.end;
        after_token = true;
    }
    push_segment(&mut out, &text[cursor..], after_token);

    out.trim().to_string()
}

fn push_segment(out: &mut String, segment: &str, after_token: bool) {
    let joins_whitespace = out.is_empty() || out.ends_with(char::is_whitespace);
    if after_token && joins_whitespace {
        out.push_str(segment.trim_start());
    } else {
        out.push_str(segment);
    }
}

/// Scan and strip in one call.
pub fn strip_tokens(text: &str) -> String {
    strip(text, &scan(text))
}
