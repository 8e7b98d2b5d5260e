//! UTF-8 leading-byte classification and single code point decoding.
//!
//! Decoding never panics and never blocks: malformed or truncated input
//! decodes to `U+FFFD` with a length of one byte, so a scanner can always make
//! progress past garbage.

/// Replacement character returned for malformed input.
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Classification of a UTF-8 leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    /// `0x00..=0x7F`, a complete one-byte code point.
    Ascii,
    /// `0xC2..=0xDF`, starts a two-byte sequence.
    Two,
    /// `0xE0..=0xEF`, starts a three-byte sequence.
    Three,
    /// `0xF0..=0xF4`, starts a four-byte sequence.
    Four,
    /// A continuation byte or a byte that never appears in UTF-8.
    Invalid,
}

impl Lead {
    /// Classifies `byte` as the first byte of a UTF-8 sequence.
    #[must_use]
    pub fn of(byte: u8) -> Self {
        match byte {
            0x00..=0x7F => Lead::Ascii,
            0xC2..=0xDF => Lead::Two,
            0xE0..=0xEF => Lead::Three,
            0xF0..=0xF4 => Lead::Four,
            _ => Lead::Invalid,
        }
    }

    /// Number of bytes the sequence occupies. Invalid leads count as one byte.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            Lead::Ascii | Lead::Invalid => 1,
            Lead::Two => 2,
            Lead::Three => 3,
            Lead::Four => 4,
        }
    }
}

/// Decodes the first code point of `bytes`, returning it with its encoded
/// length.
///
/// An empty slice yields `(REPLACEMENT, 0)`.
#[must_use]
pub fn decode(bytes: &[u8]) -> (char, usize) {
    match bstr::decode_utf8(bytes) {
        (Some(ch), len) => (ch, len),
        (None, 0) => (REPLACEMENT, 0),
        (None, _) => (REPLACEMENT, 1),
    }
}
