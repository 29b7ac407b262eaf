//! Identifier and argument scanning over raw source text.
//!
//! The scanner must never surface an identifier that sits inside a single- or
//! double-quoted string, and it must treat `\"`-style escapes as part of the
//! string. It also refuses candidates in field-access position (`s.name`,
//! `p->name`) so that struct fields sharing a macro's name are left intact.

use crate::error::PreprocessError;
use std::ops::Range;

/// Check if a character can start an identifier (letter or underscore)
pub(crate) const fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (letter, digit, or underscore)
pub(crate) const fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check if a string is a well-formed identifier
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if is_identifier_start(c)) && chars.all(is_identifier_continue)
}

/// Scan past a string literal whose opening quote sits just before `start`.
/// Returns the byte index of the first character after the closing quote.
/// A backslash consumes the following character.
pub(crate) fn find_string_end(
    text: &str,
    start: usize,
    quote: char,
) -> Result<usize, PreprocessError> {
    let mut chars = text[start..].char_indices();
    while let Some((off, c)) = chars.next() {
        if c == quote {
            return Ok(start + off + c.len_utf8());
        }
        if c == '\\' {
            chars.next();
        }
    }
    Err(PreprocessError::UnterminatedString(
        text[start..].trim().to_string(),
    ))
}

/// Byte range of the identifier run starting at `start`.
fn identifier_run(text: &str, start: usize) -> Range<usize> {
    let mut end = start;
    for (off, c) in text[start..].char_indices() {
        if !is_identifier_continue(c) {
            break;
        }
        end = start + off + c.len_utf8();
    }
    start..end
}

/// Find the next identifier at or after byte offset `from` that is a
/// candidate for macro replacement: outside every string literal, on a word
/// boundary, and not in field-access position on either side.
pub(crate) fn next_identifier(
    text: &str,
    from: usize,
) -> Result<Option<Range<usize>>, PreprocessError> {
    let mut i = from;
    let mut prev = text[..from].chars().next_back();
    while i < text.len() {
        let Some(c) = text[i..].chars().next() else {
            break;
        };
        if c == '"' || c == '\'' {
            i = find_string_end(text, i + c.len_utf8(), c)?;
            prev = Some(c);
            continue;
        }
        if is_identifier_continue(c) {
            let run = identifier_run(text, i);
            let candidate = is_identifier_start(c) && !prev.is_some_and(is_identifier_continue);
            let preceded = matches!(prev, Some('.') | Some('>'));
            let followed = text[run.end..].starts_with('.') || text[run.end..].starts_with("->");
            if candidate && !preceded && !followed {
                return Ok(Some(run));
            }
            // digit-led runs like 0x1, and suppressed field names, are
            // stepped over whole so their tails never become candidates
            prev = text[..run.end].chars().next_back();
            i = run.end;
            continue;
        }
        prev = Some(c);
        i += c.len_utf8();
    }
    Ok(None)
}

/// Where an argument-list scan ended up.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ArgSpan {
    /// No `(` follows the identifier
    None,
    /// `(` found, but its matching `)` is not in the buffer
    Unterminated,
    /// Argument list delimited by the parens at these byte offsets
    Found {
        /// Offset of the opening `(`
        open: usize,
        /// Offset of the matching `)`
        close: usize,
    },
}

/// Look for a parenthesized argument list starting at `from`, skipping
/// leading whitespace (newlines included, for invocations glued across
/// physical lines).
pub(crate) fn find_arguments(text: &str, from: usize) -> Result<ArgSpan, PreprocessError> {
    let mut i = from;
    loop {
        let Some(c) = text[i..].chars().next() else {
            return Ok(ArgSpan::None);
        };
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }
        if c != '(' {
            return Ok(ArgSpan::None);
        }
        break;
    }
    match find_paren_end(text, i + 1)? {
        Some(end) => Ok(ArgSpan::Found {
            open: i,
            close: end - 1,
        }),
        None => Ok(ArgSpan::Unterminated),
    }
}

/// Find the `)` matching an already-consumed `(`, respecting nesting and
/// quoted strings. Returns the index just past it, or `None` if the buffer
/// ends first.
fn find_paren_end(text: &str, from: usize) -> Result<Option<usize>, PreprocessError> {
    let mut depth = 1usize;
    let mut i = from;
    while let Some(c) = text[i..].chars().next() {
        match c {
            '(' => {
                depth += 1;
                i += 1;
            }
            ')' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Ok(Some(i));
                }
            }
            '"' | '\'' => i = find_string_end(text, i + c.len_utf8(), c)?,
            _ => i += c.len_utf8(),
        }
    }
    Ok(None)
}

/// Split the text inside an argument list on top-level commas. Commas nested
/// in parentheses or strings do not split; every argument is trimmed.
pub(crate) fn split_arguments(inner: &str) -> Result<Vec<String>, PreprocessError> {
    let mut args = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < inner.len() {
        let Some(c) = inner[i..].chars().next() else {
            break;
        };
        match c {
            '"' | '\'' => i = find_string_end(inner, i + c.len_utf8(), c)?,
            '(' => {
                // the enclosing span was balanced, so a match is present
                i = find_paren_end(inner, i + 1)?.unwrap_or(inner.len());
            }
            ',' => {
                args.push(inner[start..i].trim().to_string());
                start = i + 1;
                i += 1;
            }
            _ => i += c.len_utf8(),
        }
    }
    args.push(inner[start..].trim().to_string());
    Ok(args)
}
