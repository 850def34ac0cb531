//! Tokenizer for input lines
//!
//! Splits one raw line into whitespace-separated words with shell-style
//! quoting: single quotes (literal), double quotes (backslash may escape
//! `"` and `\`), and backslash escapes outside quotes. Deliberately NOT a
//! shell grammar: no globbing, no variable expansion, no operators.
//! Metacharacters like `|`, `;`, `$` and `>` are ordinary word characters
//! here and reach the dispatched command as literal argument text.

use thiserror::Error;

/// Tokenization failure for a malformed input line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated single quote")]
    UnterminatedSingleQuote,

    #[error("unterminated double quote")]
    UnterminatedDoubleQuote,

    #[error("trailing backslash")]
    TrailingBackslash,
}

/// Split a line into words.
///
/// Returns an empty vector for a blank line. A quoted empty string (`""` or
/// `''`) yields an empty word, so `echo ""` has one argument.
pub fn tokenize(input: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        // Skip inter-word whitespace
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut word = String::new();
        while let Some(&ch) = chars.peek() {
            match ch {
                c if c.is_whitespace() => break,
                '\'' => {
                    chars.next();
                    read_single_quoted(&mut chars, &mut word)?;
                }
                '"' => {
                    chars.next();
                    read_double_quoted(&mut chars, &mut word)?;
                }
                '\\' => {
                    chars.next();
                    match chars.next() {
                        Some(escaped) => word.push(escaped),
                        None => return Err(ParseError::TrailingBackslash),
                    }
                }
                _ => {
                    chars.next();
                    word.push(ch);
                }
            }
        }
        words.push(word);
    }

    Ok(words)
}

/// Consume up to the closing `'`. No escapes inside single quotes.
fn read_single_quoted(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    word: &mut String,
) -> Result<(), ParseError> {
    for ch in chars.by_ref() {
        if ch == '\'' {
            return Ok(());
        }
        word.push(ch);
    }
    Err(ParseError::UnterminatedSingleQuote)
}

/// Consume up to the closing `"`. Backslash escapes `"` and `\`; any other
/// backslash sequence is kept verbatim.
fn read_double_quoted(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    word: &mut String,
) -> Result<(), ParseError> {
    while let Some(ch) = chars.next() {
        match ch {
            '"' => return Ok(()),
            '\\' => match chars.next() {
                Some(c @ ('"' | '\\')) => word.push(c),
                Some(c) => {
                    word.push('\\');
                    word.push(c);
                }
                None => return Err(ParseError::UnterminatedDoubleQuote),
            },
            _ => word.push(ch),
        }
    }
    Err(ParseError::UnterminatedDoubleQuote)
}
