//! Shell-style word splitting shared by command parsing and completion.
//!
//! Quoting follows the usual POSIX shell conventions: single quotes keep
//! everything literal, double quotes allow backslash escapes, and a bare
//! backslash escapes the next character. Commas outside quotes separate
//! multi-assignment segments.

use thiserror::Error;

/// Errors from strict word splitting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A quote opened with this character was never closed
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    /// The input ended right after a backslash
    #[error("trailing backslash")]
    TrailingEscape,
}

#[derive(Default)]
struct Scan {
    words: Vec<String>,
    open_quote: Option<char>,
    dangling_escape: bool,
}

fn scan(input: &str) -> Scan {
    let mut out = Scan::default();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push(ch);
            escape = false;
            in_word = true;
            continue;
        }
        match (quote, ch) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), c) => current.push(c),
            (Some('"'), '"') => quote = None,
            (Some('"'), '\\') => escape = true,
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, '\\') => {
                escape = true;
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    out.words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        out.words.push(current);
    }
    out.open_quote = quote;
    out.dangling_escape = escape;
    out
}

/// Split `input` into words, rejecting unterminated quotes and escapes.
pub fn split_words(input: &str) -> Result<Vec<String>, LexError> {
    let scanned = scan(input);
    if let Some(q) = scanned.open_quote {
        return Err(LexError::UnterminatedQuote(q));
    }
    if scanned.dangling_escape {
        return Err(LexError::TrailingEscape);
    }
    Ok(scanned.words)
}

/// Split `input` into words, treating an unterminated quote as running to
/// the end of input. Used while the operator is still typing.
pub fn split_words_lenient(input: &str) -> Vec<String> {
    scan(input).words
}

/// Split on commas that are outside quotes.
///
/// Returns each segment with its byte offset into `input`.
pub fn split_segments(input: &str) -> Vec<(usize, &str)> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escape = false;

    for (idx, ch) in input.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match (quote, ch) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('"'), '\\') | (None, '\\') => escape = true,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(ch),
            (None, ',') => {
                segments.push((start, &input[start..idx]));
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push((start, &input[start..]));
    segments
}
