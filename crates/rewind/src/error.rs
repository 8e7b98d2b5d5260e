use std::{borrow::Cow, io};

use thiserror::Error;

/// The sticky condition carried by a [`Source`](crate::Source).
///
/// Only [`SourceError::EndOfInput`] is benign: it means the input ran out at a
/// boundary where the caller asked for nothing more. Every other variant is a
/// real failure and is reported by [`Source::fatal_error`](crate::Source::fatal_error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The input is exhausted and the window is empty.
    #[error("end of input")]
    EndOfInput,
    /// More bytes were demanded than the input holds.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// A source was constructed over zero bytes.
    #[error("source input is empty")]
    EmptyInput,
    /// A rollback or delete was requested with no savepoint outstanding.
    #[error("no savepoint in stack")]
    NoSavepoint,
    /// The lexer found no prefix token for the upcoming input.
    #[error("can not parse")]
    CannotParse,
    /// Expression nesting exceeded [`ParserOptions::max_depth`](crate::ParserOptions::max_depth).
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
    /// A structural failure reported by a token or helper.
    #[error("syntax error: {0}")]
    Syntax(Cow<'static, str>),
    /// The underlying stream failed.
    #[error("read failed: {message}")]
    Io {
        /// Kind of the original I/O error.
        kind: io::ErrorKind,
        /// Rendered message of the original I/O error.
        message: String,
    },
}

impl SourceError {
    /// Builds a [`SourceError::Syntax`] from a static or owned message.
    pub fn syntax(message: impl Into<Cow<'static, str>>) -> Self {
        SourceError::Syntax(message.into())
    }

    /// Returns `true` for the benign end-of-input condition.
    #[must_use]
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, SourceError::EndOfInput)
    }
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_kind() {
        let err = SourceError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(
            err,
            SourceError::Io {
                kind: io::ErrorKind::BrokenPipe,
                message: "pipe closed".into(),
            }
        );
        assert_eq!(err.to_string(), "read failed: pipe closed");
    }

    #[test]
    fn only_end_of_input_is_benign() {
        assert!(SourceError::EndOfInput.is_end_of_input());
        assert!(!SourceError::UnexpectedEndOfInput.is_end_of_input());
        assert_eq!(
            SourceError::syntax("expect [").to_string(),
            "syntax error: expect ["
        );
    }
}
