/// Configuration for stream-backed sources.
///
/// In-memory sources ignore these options: the whole input is the window from
/// the start.
///
/// # Examples
///
/// ```rust
/// use rewind::{Source, SourceOptions};
///
/// let options = SourceOptions {
///     chunk_size: 2,
///     ..Default::default()
/// };
/// let mut src = Source::with_options(&b"abcd"[..], options).unwrap();
/// assert_eq!(src.peek(), b"ab");
/// assert_eq!(src.peek_n(3), b"abc");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SourceOptions {
    /// Maximum number of bytes requested from the stream per pull.
    ///
    /// A chunk size of zero can never yield a byte, so construction fails
    /// with [`SourceError::EmptyInput`](crate::SourceError::EmptyInput).
    /// Values above [`SourceOptions::MAX_CHUNK_SIZE`] are capped to it.
    ///
    /// # Default
    ///
    /// `4096`
    pub chunk_size: usize,
}

impl SourceOptions {
    /// Default pull size in bytes.
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;

    /// Largest pull size a source will allocate for, 1 MiB.
    pub const MAX_CHUNK_SIZE: usize = 1 << 20;
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Configuration for the precedence-climbing engine.
///
/// # Default
///
/// No depth limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserOptions {
    /// Maximum nesting of [`Parser::parse`](crate::Parser::parse) calls.
    ///
    /// When a nested call would exceed the limit, the parser reports
    /// [`SourceError::TooDeep`](crate::SourceError::TooDeep) on the source and
    /// returns the default value instead of recursing.
    ///
    /// # Default
    ///
    /// `None`
    pub max_depth: Option<usize>,
}
