//! JSON token-boundary scanning.
//!
//! These helpers find where JSON tokens start; they do not validate
//! documents.

use bstr::ByteSlice;

use crate::{Source, SourceError, discard::ASCII_SPACE};

/// Skips whitespace and returns the next byte without consuming it.
///
/// Returns `0` when the input ends first.
pub fn next_token(src: &mut Source<'_>) -> u8 {
    while src.error().is_none() {
        let window = src.peek();
        if let Some(i) = window.find_not_byteset(ASCII_SPACE) {
            let b = window[i];
            src.consume_n(i);
            return b;
        }
        src.consume();
    }
    0
}

/// Consumes a `[`, reporting a syntax error if the next token is anything
/// else.
pub fn consume_array_start(src: &mut Source<'_>) {
    consume_token(src, b'[', "expect [");
}

/// Consumes a `{`, reporting a syntax error if the next token is anything
/// else.
pub fn consume_object_start(src: &mut Source<'_>) {
    consume_token(src, b'{', "expect {");
}

fn consume_token(src: &mut Source<'_>, token: u8, message: &'static str) {
    if next_token(src) == token {
        src.consume_n(1);
    } else {
        src.report_error(SourceError::syntax(message));
    }
}

/// Consumes the string literal `"expected"` if it is the next token.
///
/// Only strings without escapes can match. On mismatch nothing but the
/// leading whitespace is consumed and no error is reported.
pub fn expect_plain_string(src: &mut Source<'_>, expected: &str) -> bool {
    if next_token(src) != b'"' {
        return false;
    }
    src.attempt(|src| {
        let matched = src.expect1(b'"') && src.expect(expected.as_bytes()) && src.expect1(b'"');
        matched.then_some(())
    })
    .is_some()
}
