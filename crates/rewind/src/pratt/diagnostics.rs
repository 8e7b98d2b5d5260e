use tracing::debug;

use super::Precedence;

/// Whether a dispatch event happens before or after the token runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The token is about to consume input.
    Enter,
    /// The token returned its value.
    Exit,
}

/// Observer for the parser's token dispatch.
///
/// Every method has an empty default body, so an implementation only
/// overrides the events it cares about. Token names come from
/// [`PrefixToken::name`](super::PrefixToken::name) and
/// [`InfixToken::name`](super::InfixToken::name).
pub trait Diagnostics {
    /// A prefix token is entered or exited.
    fn prefix(&self, _phase: Phase, _token: &'static str) {}

    /// An infix token is entered or exited.
    fn infix(&self, _phase: Phase, _token: &'static str) {}

    /// An infix token was found but left unconsumed because its binding power
    /// does not exceed the current floor.
    fn precedence_skip(&self, _token: &'static str, _floor: Precedence, _binding: Precedence) {}

    /// The lexer had no prefix token for the input at `position`.
    fn no_prefix(&self, _position: usize) {}
}

/// Ignores every event. This is what [`Parser::new`](super::Parser::new) uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

/// Forwards every event to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn prefix(&self, phase: Phase, token: &'static str) {
        debug!(?phase, token, "prefix");
    }

    fn infix(&self, phase: Phase, token: &'static str) {
        debug!(?phase, token, "infix");
    }

    fn precedence_skip(&self, token: &'static str, floor: Precedence, binding: Precedence) {
        debug!(token, floor, binding, "precedence skip");
    }

    fn no_prefix(&self, position: usize) {
        debug!(position, "no prefix token");
    }
}
