//! Precedence climbing over a [`Source`].
//!
//! A grammar is a [`Lexer`] that classifies the upcoming input as a
//! [`PrefixToken`] or an [`InfixToken`] with a binding power. The engine owns
//! no grammar knowledge: tokens consume their own input and recurse through
//! the [`Parser`] they are handed, choosing the floor for the operand they
//! parse.
//!
//! An infix token is accepted only while its binding power is strictly
//! greater than the floor. A left-associative operator therefore recurses with
//! its own binding power as the new floor, and a right-associative one with
//! one less.
//!
//! ```rust
//! use rewind::{InfixToken, Lexer, Parser, Precedence, PrefixToken, Source, parse_str};
//!
//! struct Digit;
//! struct Plus;
//! struct Sum;
//!
//! impl PrefixToken<Sum> for Digit {
//!     fn prefix_parse(&self, _: &Parser<'_, Sum>, src: &mut Source<'_>) -> i64 {
//!         i64::from(src.read1() - b'0')
//!     }
//! }
//!
//! impl InfixToken<Sum> for Plus {
//!     fn infix_parse(&self, parser: &Parser<'_, Sum>, src: &mut Source<'_>, left: i64) -> i64 {
//!         src.expect1(b'+');
//!         left + parser.parse(src, 1)
//!     }
//! }
//!
//! impl Lexer for Sum {
//!     type Value = i64;
//!
//!     fn prefix_token(&self, src: &mut Source<'_>) -> Option<&dyn PrefixToken<Self>> {
//!         src.peek1().is_ascii_digit().then_some(&Digit as &dyn PrefixToken<Self>)
//!     }
//!
//!     fn infix_token(&self, src: &mut Source<'_>) -> Option<(&dyn InfixToken<Self>, Precedence)> {
//!         (src.peek1() == b'+').then_some((&Plus as &dyn InfixToken<Self>, 1))
//!     }
//! }
//!
//! assert_eq!(parse_str("1+2+3", &Sum), Ok(6));
//! ```

mod diagnostics;

use std::{
    any::type_name,
    cell::{Cell, RefCell},
    mem,
};

pub use diagnostics::{Diagnostics, NoopDiagnostics, Phase, TracingDiagnostics};

use crate::{ParserOptions, Source, SourceError};

/// Binding power of an infix token.
pub type Precedence = u32;

/// Lowest binding power a grammar would normally assign; any infix token at
/// this level or above is accepted from a floor of zero.
pub const DEFAULT_PRECEDENCE: Precedence = 1;

/// Maps the front of a source to the token that handles it.
///
/// Implementations should only peek. Consuming input is the token's job.
pub trait Lexer {
    /// Value produced by the grammar's tokens. The default is returned when
    /// parsing cannot proceed.
    type Value: Default;

    /// Token that can start an expression at the current position.
    fn prefix_token(&self, src: &mut Source<'_>) -> Option<&dyn PrefixToken<Self>>;

    /// Token that can continue an expression at the current position, with
    /// its binding power.
    fn infix_token(&self, src: &mut Source<'_>) -> Option<(&dyn InfixToken<Self>, Precedence)>;
}

/// A token that produces a value with no left-hand context.
pub trait PrefixToken<L: Lexer + ?Sized> {
    /// Consumes the token and whatever operand it owns.
    fn prefix_parse(&self, parser: &Parser<'_, L>, src: &mut Source<'_>) -> L::Value;

    /// Name reported to [`Diagnostics`].
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// A token that combines an already parsed left-hand value with more input.
pub trait InfixToken<L: Lexer + ?Sized> {
    /// Consumes the operator and its right-hand side.
    fn infix_parse(
        &self,
        parser: &Parser<'_, L>,
        src: &mut Source<'_>,
        left: L::Value,
    ) -> L::Value;

    /// Name reported to [`Diagnostics`].
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// A configured precedence-climbing run over one lexer.
///
/// The parser is shared by reference with every token so that tokens can
/// recurse through [`Parser::parse`]. It tracks the recursion depth and keeps
/// one scratch buffer per depth for tokens that need to collect bytes.
pub struct Parser<'l, L: Lexer + ?Sized> {
    lexer: &'l L,
    diagnostics: &'l dyn Diagnostics,
    options: ParserOptions,
    depth: Cell<usize>,
    scratch: RefCell<Vec<Vec<u8>>>,
}

impl<'l, L: Lexer + ?Sized> Parser<'l, L> {
    /// Creates a parser with default options and no diagnostics.
    pub fn new(lexer: &'l L) -> Self {
        Self {
            lexer,
            diagnostics: &NoopDiagnostics,
            options: ParserOptions::default(),
            depth: Cell::new(0),
            scratch: RefCell::new(Vec::new()),
        }
    }

    /// Routes dispatch events to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: &'l dyn Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// The grammar this parser runs.
    pub fn lexer(&self) -> &'l L {
        self.lexer
    }

    /// Number of [`Parser::parse`] calls currently on the stack.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Parses one expression whose infix operators bind tighter than `floor`.
    ///
    /// Stops without consuming at the first infix token whose binding power
    /// is not above `floor`, when the lexer has no infix token, or as soon as
    /// the source carries any error, benign end-of-input included. A missing
    /// prefix token reports [`SourceError::CannotParse`] and yields the
    /// default value.
    pub fn parse(&self, src: &mut Source<'_>, floor: Precedence) -> L::Value {
        let depth = self.depth.get();
        if let Some(max) = self.options.max_depth.filter(|&max| depth >= max) {
            src.report_error(SourceError::TooDeep(max));
            return L::Value::default();
        }
        self.depth.set(depth + 1);
        let value = self.climb(src, floor);
        self.depth.set(depth);
        value
    }

    fn climb(&self, src: &mut Source<'_>, floor: Precedence) -> L::Value {
        let Some(prefix) = self.lexer.prefix_token(src) else {
            self.diagnostics.no_prefix(src.position());
            src.report_error(SourceError::CannotParse);
            return L::Value::default();
        };
        let name = prefix.name();
        self.diagnostics.prefix(Phase::Enter, name);
        let mut left = prefix.prefix_parse(self, src);
        self.diagnostics.prefix(Phase::Exit, name);

        loop {
            if src.error().is_some() {
                return left;
            }
            let Some((infix, binding)) = self.lexer.infix_token(src) else {
                return left;
            };
            let name = infix.name();
            if floor >= binding {
                self.diagnostics.precedence_skip(name, floor, binding);
                return left;
            }
            self.diagnostics.infix(Phase::Enter, name);
            left = infix.infix_parse(self, src, left);
            self.diagnostics.infix(Phase::Exit, name);
        }
    }

    /// Parses from a floor of zero and classifies the outcome.
    ///
    /// Benign end-of-input counts as success.
    ///
    /// # Errors
    ///
    /// Returns a clone of the source's fatal error, if any.
    pub fn parse_source(&self, src: &mut Source<'_>) -> Result<L::Value, SourceError> {
        let value = self.parse(src, 0);
        match src.fatal_error() {
            Some(err) => Err(err.clone()),
            None => Ok(value),
        }
    }

    /// Runs `f` with an empty byte buffer reserved for the current depth.
    ///
    /// The buffer keeps its allocation across calls, so tokens that collect
    /// bytes (identifiers, string bodies) stop allocating once the pool has
    /// warmed up. Nested parses get their own buffer.
    pub fn with_scratch<T>(&self, f: impl FnOnce(&mut Vec<u8>) -> T) -> T {
        let slot = self.depth.get();
        let mut buf = {
            let mut pool = self.scratch.borrow_mut();
            if pool.len() <= slot {
                pool.resize_with(slot + 1, Vec::new);
            }
            mem::take(&mut pool[slot])
        };
        buf.clear();
        let out = f(&mut buf);
        if let Some(entry) = self.scratch.borrow_mut().get_mut(slot) {
            *entry = buf;
        }
        out
    }
}

/// Parses one expression from `src` with a fresh [`Parser`].
pub fn parse<L: Lexer + ?Sized>(src: &mut Source<'_>, lexer: &L, floor: Precedence) -> L::Value {
    Parser::new(lexer).parse(src, floor)
}

/// Parses one expression from `src`, treating benign end-of-input as success.
///
/// # Errors
///
/// See [`Parser::parse_source`].
pub fn parse_source<L: Lexer + ?Sized>(
    src: &mut Source<'_>,
    lexer: &L,
) -> Result<L::Value, SourceError> {
    Parser::new(lexer).parse_source(src)
}

/// Parses one expression from a string.
///
/// # Errors
///
/// Returns [`SourceError::EmptyInput`] for an empty string, otherwise see
/// [`Parser::parse_source`].
pub fn parse_str<L: Lexer + ?Sized>(input: &str, lexer: &L) -> Result<L::Value, SourceError> {
    let mut src = Source::try_from(input)?;
    parse_source(&mut src, lexer)
}
