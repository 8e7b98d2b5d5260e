//! A rewindable byte source for hand-written parsers.
//!
//! [`Source`] is a cursor over either an in-memory buffer or a
//! [`std::io::Read`] stream. It offers unbounded look-ahead, nested
//! savepoints that can be rolled back to even after the stream has moved on,
//! and a sticky error slot that separates a clean end of input from a real
//! failure. Memory stays bounded to the active window plus whatever the
//! outstanding savepoints still need.
//!
//! On top of it sit a precedence-climbing engine ([`Parser`]) driven by a
//! grammar's [`Lexer`], and a few small scanners ([`discard`], [`read`],
//! [`pjson`]) built only from the source's public operations.
//!
//! ```rust
//! use rewind::{Source, SourceError, discard, read};
//!
//! let mut src = Source::from_reader(&b"  width = 640"[..], 4).unwrap();
//! discard::space(&mut src);
//!
//! let mut key = Vec::new();
//! read::any_except2(&mut src, &mut key, b' ', b'=');
//! discard::space(&mut src);
//! assert!(src.expect1(b'='));
//! discard::space(&mut src);
//!
//! assert_eq!(key, b"width");
//! assert_eq!(read::uint64(&mut src), 640);
//! assert_eq!(src.error(), Some(&SourceError::EndOfInput));
//! ```

mod error;
mod options;
mod pratt;
mod source;

pub mod discard;
pub mod pjson;
pub mod read;
pub mod rune;

#[cfg(test)]
mod tests;

pub use error::SourceError;
pub use options::{ParserOptions, SourceOptions};
pub use pratt::{
    DEFAULT_PRECEDENCE, Diagnostics, InfixToken, Lexer, NoopDiagnostics, Parser, Phase, Precedence,
    PrefixToken, TracingDiagnostics, parse, parse_source, parse_str,
};
pub use source::Source;
