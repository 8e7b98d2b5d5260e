//! Source: a rewindable cursor over an in-memory buffer or a pull stream.
//!
//! Storage
//! - All materialized bytes live in one tape. An in-memory source borrows the
//!   caller's slice as its tape and never pulls. A stream-backed source owns
//!   its tape and reads up to `chunk_size` bytes per pull into a reused pull
//!   buffer, then appends only the bytes it got to the tape's tail.
//! - The window is `tape[cursor..window_end]`. Chunks already pulled but not
//!   yet exposed (after a rollback) are tracked by their end offsets; a refill
//!   replays the next recorded chunk before it ever touches the stream.
//!
//! Savepoints
//! - A savepoint records `(cursor, window_end)`. Bytes behind the oldest
//!   outstanding savepoint are never compacted away, so every chunk pulled
//!   after it is still in the tape and rollback is a pure cursor move.
//! - With no savepoint outstanding, consumed bytes are dropped before each
//!   pull. Memory stays bounded to the active window plus whatever the
//!   outstanding savepoints pin.
//!
//! Errors
//! - The error slot is sticky. Only the benign end-of-input may be replaced,
//!   typically escalated to unexpected end-of-input when a caller demanded
//!   more than the input holds. Rollback clears it.
//! - Running out of stream is tracked apart from the error slot. End-of-input
//!   is reported when the window actually empties, so look-ahead checks do
//!   not leave an error behind.
//!
//! Invariants
//! - After every public call, the window is non-empty unless an error is set.
//! - Slices handed out by `peek*`/`read_n` borrow the source and therefore
//!   cannot outlive the next mutating call. Use [`Source::copy_n`] to keep
//!   bytes.

mod savepoint;

use std::{
    any::Any,
    borrow::Cow,
    fmt,
    io::{self, Read},
};

use bstr::BStr;
use savepoint::{Savepoint, SavepointStack};
use tracing::trace;

use crate::{
    SourceError, SourceOptions,
    rune::{self, Lead},
};

/// A rewindable byte cursor with sticky errors and savepoints.
///
/// Typical scanner loop:
/// ```rust
/// use rewind::Source;
///
/// let mut src = Source::from_reader(&b"  hello"[..], 2).unwrap();
/// while src.error().is_none() && src.peek1() == b' ' {
///     src.consume_n(1);
/// }
/// assert_eq!(src.read_n(5), b"hello");
/// assert!(src.error().unwrap().is_end_of_input());
/// ```
pub struct Source<'src> {
    tape: Cow<'src, [u8]>,
    cursor: usize,
    window_end: usize,
    // End offsets of every chunk held in the tape, ascending.
    chunk_ends: Vec<usize>,
    // Absolute offset of `tape[0]`.
    base: usize,

    reader: Option<Box<dyn Read + 'src>>,
    // Zeroed once; each pull reads into it and copies the filled prefix.
    pull_buf: Box<[u8]>,
    exhausted: bool,

    error: Option<SourceError>,
    savepoints: SavepointStack,
    attachment: Option<Box<dyn Any>>,
}

impl<'src> Source<'src> {
    /// Creates a source over a finite byte sequence.
    ///
    /// The whole input becomes the window; no bytes are copied.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::EmptyInput`] if `input` is empty.
    pub fn new(input: &'src [u8]) -> Result<Self, SourceError> {
        if input.is_empty() {
            return Err(SourceError::EmptyInput);
        }
        Ok(Self::over_tape(Cow::Borrowed(input), None, Box::default()))
    }

    /// Creates a source that pulls at most `chunk_size` bytes at a time from
    /// `reader`.
    ///
    /// `chunk_size` is capped at [`SourceOptions::MAX_CHUNK_SIZE`].
    ///
    /// # Errors
    ///
    /// Fails if the first pull yields no byte: the read error if there was
    /// one, [`SourceError::EmptyInput`] otherwise.
    pub fn from_reader<R: Read + 'src>(reader: R, chunk_size: usize) -> Result<Self, SourceError> {
        Self::with_options(reader, SourceOptions { chunk_size })
    }

    /// Creates a stream-backed source from explicit [`SourceOptions`].
    ///
    /// # Errors
    ///
    /// See [`Source::from_reader`].
    pub fn with_options<R: Read + 'src>(
        reader: R,
        options: SourceOptions,
    ) -> Result<Self, SourceError> {
        let chunk_size = options.chunk_size.min(SourceOptions::MAX_CHUNK_SIZE);
        let mut src = Self::over_tape(
            Cow::Owned(Vec::with_capacity(chunk_size)),
            Some(Box::new(reader)),
            vec![0; chunk_size].into_boxed_slice(),
        );
        if src.fill(0) {
            Ok(src)
        } else {
            Err(src.error.take().unwrap_or(SourceError::EmptyInput))
        }
    }

    fn over_tape(
        tape: Cow<'src, [u8]>,
        reader: Option<Box<dyn Read + 'src>>,
        pull_buf: Box<[u8]>,
    ) -> Self {
        let len = tape.len();
        Self {
            tape,
            cursor: 0,
            window_end: len,
            chunk_ends: if len == 0 { Vec::new() } else { vec![len] },
            base: 0,
            exhausted: reader.is_none(),
            reader,
            pull_buf,
            error: None,
            savepoints: SavepointStack::default(),
            attachment: None,
        }
    }

    /// Re-points this source at a new in-memory input.
    ///
    /// Savepoints, errors, and any stream are dropped; the attachment is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::EmptyInput`] and leaves the source untouched if
    /// `input` is empty.
    pub fn reset(&mut self, input: &'src [u8]) -> Result<(), SourceError> {
        if input.is_empty() {
            return Err(SourceError::EmptyInput);
        }
        self.tape = Cow::Borrowed(input);
        self.cursor = 0;
        self.window_end = input.len();
        self.chunk_ends.clear();
        self.chunk_ends.push(input.len());
        self.base = 0;
        self.reader = None;
        self.exhausted = true;
        self.error = None;
        self.savepoints.clear();
        Ok(())
    }

    // --- Window & refill ---------------------------------------------------

    #[inline]
    fn available(&self) -> usize {
        self.window_end - self.cursor
    }

    /// Exposes one more chunk behind the window, replaying a recorded chunk if
    /// there is one and pulling from the stream otherwise.
    ///
    /// Bytes from `keep` onwards survive compaction. Returns `false` when
    /// nothing more could be exposed; a read failure is reported as the sticky
    /// error, running out of stream only sets `exhausted`.
    fn fill(&mut self, keep: usize) -> bool {
        if let Some(&end) = self.chunk_ends.get(self.next_chunk()) {
            trace!(
                position = self.base + self.window_end,
                bytes = end - self.window_end,
                "replaying chunk"
            );
            self.window_end = end;
            return true;
        }
        if self.exhausted {
            return false;
        }
        self.compact(keep);

        let (Some(reader), Cow::Owned(tape)) = (self.reader.as_mut(), &mut self.tape) else {
            self.exhausted = true;
            return false;
        };
        let buf = &mut self.pull_buf[..];
        let pulled = loop {
            match reader.read(buf) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                other => break other,
            }
        };
        let start = tape.len();
        let n = pulled.as_ref().map_or(0, |&n| n.min(buf.len()));
        tape.extend_from_slice(&buf[..n]);

        match pulled {
            Ok(0) => {
                trace!(position = self.base + start, "stream exhausted");
                self.exhausted = true;
                false
            }
            Ok(_) => {
                trace!(position = self.base + start, bytes = n, "pulled chunk");
                self.chunk_ends.push(start + n);
                self.window_end = start + n;
                true
            }
            Err(err) => {
                trace!(%err, "pull failed");
                self.report_error(err.into());
                false
            }
        }
    }

    /// Index of the first recorded chunk ending past the window.
    fn next_chunk(&self) -> usize {
        let window_end = self.window_end;
        self.chunk_ends.partition_point(|&end| end <= window_end)
    }

    /// Drops consumed bytes that neither `keep` nor a savepoint still needs.
    fn compact(&mut self, keep: usize) {
        debug_assert!(keep <= self.cursor);
        let limit = self.savepoints.floor().unwrap_or(keep).min(keep);
        if limit == 0 {
            return;
        }
        let Cow::Owned(tape) = &mut self.tape else {
            return;
        };
        tape.drain(..limit);
        self.cursor -= limit;
        self.window_end -= limit;
        self.base += limit;
        self.chunk_ends.retain_mut(|end| {
            if *end > limit {
                *end -= limit;
                true
            } else {
                false
            }
        });
        self.savepoints.shift(limit);
        trace!(bytes = limit, "compacted tape");
    }

    /// Restores the window invariant after the cursor moved.
    fn settle(&mut self, keep: usize) {
        if self.cursor < self.window_end || self.error.is_some() {
            return;
        }
        if !self.fill(keep) && self.error.is_none() {
            self.report_error(SourceError::EndOfInput);
        }
    }

    /// Grows the window until it holds `n` bytes. Never reports end-of-input.
    fn ensure(&mut self, n: usize, keep: usize) -> bool {
        while self.available() < n {
            if self.error.is_some() || !self.fill(keep) {
                return false;
            }
        }
        true
    }

    // --- Peek --------------------------------------------------------------

    /// Returns the next byte without consuming it.
    ///
    /// On an exhausted source this returns `0` and escalates the sticky error
    /// to [`SourceError::UnexpectedEndOfInput`]; check [`Source::error`]
    /// before relying on the byte.
    pub fn peek1(&mut self) -> u8 {
        if self.available() == 0 && !self.ensure(1, self.cursor) {
            self.report_error(SourceError::UnexpectedEndOfInput);
            return 0;
        }
        self.tape[self.cursor]
    }

    /// Returns the current window without pulling anything.
    #[must_use]
    pub fn peek(&self) -> &[u8] {
        &self.tape[self.cursor..self.window_end]
    }

    /// Returns the next `n` bytes without consuming them, pulling as needed.
    ///
    /// If fewer than `n` bytes exist, returns what there is and reports
    /// [`SourceError::UnexpectedEndOfInput`].
    pub fn peek_n(&mut self, n: usize) -> &[u8] {
        if !self.ensure(n, self.cursor) {
            self.report_error(SourceError::UnexpectedEndOfInput);
        }
        let end = self.window_end.min(self.cursor.saturating_add(n));
        &self.tape[self.cursor..end]
    }

    /// Pulls the rest of the stream into the window and returns it.
    pub fn peek_all(&mut self) -> &[u8] {
        while self.error.is_none() && self.fill(self.cursor) {}
        self.peek()
    }

    /// Decodes the next code point without consuming it.
    ///
    /// Returns the code point and its encoded length. Malformed input yields
    /// `(U+FFFD, 1)`; an exhausted source yields `(U+FFFD, 0)`.
    pub fn peek_rune(&mut self) -> (char, usize) {
        let width = Lead::of(self.peek1()).width();
        rune::decode(self.peek_n(width))
    }

    /// Returns the raw bytes of the next code point without decoding them.
    pub fn peek_utf8(&mut self) -> &[u8] {
        let width = Lead::of(self.peek1()).width();
        self.peek_n(width)
    }

    // --- Read & consume ----------------------------------------------------

    /// Returns the next byte and advances past it.
    ///
    /// Shares the exhausted-source policy of [`Source::peek1`].
    pub fn read1(&mut self) -> u8 {
        let b = self.peek1();
        if self.available() > 0 {
            self.cursor += 1;
            self.settle(self.cursor);
        }
        b
    }

    /// Returns the next `n` bytes and advances past them.
    ///
    /// If fewer than `n` bytes exist, returns and consumes what there is and
    /// reports [`SourceError::UnexpectedEndOfInput`].
    pub fn read_n(&mut self, n: usize) -> &[u8] {
        if !self.ensure(n, self.cursor) {
            self.report_error(SourceError::UnexpectedEndOfInput);
        }
        let take = n.min(self.available());
        self.cursor += take;
        // Compaction may shift the tape but keeps the bytes just read.
        self.settle(self.cursor - take);
        &self.tape[self.cursor - take..self.cursor]
    }

    /// Reads everything left in the input.
    pub fn read_all(&mut self) -> &[u8] {
        self.peek_all();
        let take = self.available();
        self.cursor = self.window_end;
        self.settle(self.cursor - take);
        &self.tape[self.cursor - take..self.cursor]
    }

    /// Decodes the next code point and advances past it.
    pub fn read_rune(&mut self) -> (char, usize) {
        let (ch, len) = self.peek_rune();
        self.consume_n(len);
        (ch, len)
    }

    /// Discards the whole current window.
    pub fn consume(&mut self) {
        self.cursor = self.window_end;
        self.settle(self.cursor);
    }

    /// Discards `n` bytes without materializing them all at once.
    ///
    /// Reports [`SourceError::UnexpectedEndOfInput`] if the input ends first.
    pub fn consume_n(&mut self, n: usize) {
        let mut remaining = n;
        loop {
            let available = self.available();
            if remaining <= available {
                self.cursor += remaining;
                self.settle(self.cursor);
                return;
            }
            self.cursor = self.window_end;
            remaining -= available;
            if self.error.is_some() || !self.fill(self.cursor) {
                self.report_error(SourceError::UnexpectedEndOfInput);
                return;
            }
        }
    }

    /// Discards `n` bytes like [`Source::consume_n`], appending them to
    /// `space`. Returns the number of bytes copied.
    pub fn copy_n(&mut self, space: &mut Vec<u8>, n: usize) -> usize {
        let mut remaining = n;
        loop {
            let take = remaining.min(self.available());
            space.extend_from_slice(&self.tape[self.cursor..self.cursor + take]);
            remaining -= take;
            if remaining == 0 {
                self.cursor += take;
                self.settle(self.cursor);
                return n;
            }
            self.cursor = self.window_end;
            if self.error.is_some() || !self.fill(self.cursor) {
                self.report_error(SourceError::UnexpectedEndOfInput);
                return n - remaining;
            }
        }
    }

    // --- Expect ------------------------------------------------------------

    /// Consumes `literal` if the input continues with it.
    ///
    /// On mismatch, or when the input is too short, nothing is consumed, no
    /// error is reported, and `false` is returned.
    pub fn expect(&mut self, literal: &[u8]) -> bool {
        if !self.ensure(literal.len(), self.cursor) {
            return false;
        }
        if !self.tape[self.cursor..].starts_with(literal) {
            return false;
        }
        self.cursor += literal.len();
        self.settle(self.cursor);
        true
    }

    /// Consumes `b1` if it is the next byte.
    pub fn expect1(&mut self, b1: u8) -> bool {
        self.expect(&[b1])
    }

    /// Consumes `b1 b2` if they are the next bytes.
    pub fn expect2(&mut self, b1: u8, b2: u8) -> bool {
        self.expect(&[b1, b2])
    }

    /// Consumes `b1 b2 b3` if they are the next bytes.
    pub fn expect3(&mut self, b1: u8, b2: u8, b3: u8) -> bool {
        self.expect(&[b1, b2, b3])
    }

    /// Consumes `b1 b2 b3 b4` if they are the next bytes.
    pub fn expect4(&mut self, b1: u8, b2: u8, b3: u8, b4: u8) -> bool {
        self.expect(&[b1, b2, b3, b4])
    }

    // --- Savepoints --------------------------------------------------------

    /// Marks the current position so a later rollback can return to it.
    ///
    /// Every chunk pulled from here on is retained until the savepoint is
    /// rolled back to or deleted.
    pub fn store_savepoint(&mut self) {
        self.savepoints.push(Savepoint {
            cursor: self.cursor,
            window_end: self.window_end,
        });
        trace!(
            depth = self.savepoints.len(),
            position = self.position(),
            "stored savepoint"
        );
    }

    /// Pops the latest savepoint and returns the cursor to it.
    ///
    /// Restores the window exactly, clears the sticky error, and replays the
    /// retained chunks on later refills. Reports [`SourceError::NoSavepoint`]
    /// if the stack is empty.
    pub fn rollback_to_savepoint(&mut self) {
        let Some(savepoint) = self.savepoints.pop() else {
            self.report_error(SourceError::NoSavepoint);
            return;
        };
        self.cursor = savepoint.cursor;
        self.window_end = savepoint.window_end;
        self.error = None;
        trace!(
            depth = self.savepoints.len(),
            position = self.position(),
            "rolled back to savepoint"
        );
        self.settle(self.cursor);
    }

    /// Forgets the latest savepoint and keeps the current state.
    ///
    /// Reports [`SourceError::NoSavepoint`] if the stack is empty.
    pub fn delete_savepoint(&mut self) {
        if self.savepoints.pop().is_none() {
            self.report_error(SourceError::NoSavepoint);
            return;
        }
        trace!(depth = self.savepoints.len(), "deleted savepoint");
    }

    /// Number of outstanding savepoints.
    #[must_use]
    pub fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }

    /// Runs `f` speculatively.
    ///
    /// The source is rolled back if `f` returns `None` or leaves a fatal
    /// error behind; otherwise the savepoint is deleted and the result kept.
    /// `f` must leave the savepoint stack as it found it.
    ///
    /// A source that already carries a fatal error is left alone and `f` is
    /// not run.
    pub fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.fatal_error().is_some() {
            return None;
        }
        self.store_savepoint();
        match f(self) {
            Some(value) if self.fatal_error().is_none() => {
                self.delete_savepoint();
                Some(value)
            }
            _ => {
                self.rollback_to_savepoint();
                None
            }
        }
    }

    // --- Errors ------------------------------------------------------------

    /// Sets the sticky error unless a non-benign error is already set.
    pub fn report_error(&mut self, err: SourceError) {
        if matches!(self.error, None | Some(SourceError::EndOfInput)) {
            trace!(%err, position = self.position(), "reporting error");
            self.error = Some(err);
        }
    }

    /// The sticky condition, including the benign end-of-input.
    #[must_use]
    pub fn error(&self) -> Option<&SourceError> {
        self.error.as_ref()
    }

    /// The sticky condition, ignoring the benign end-of-input.
    #[must_use]
    pub fn fatal_error(&self) -> Option<&SourceError> {
        self.error.as_ref().filter(|err| !err.is_end_of_input())
    }

    /// Clears the sticky error.
    ///
    /// If the window is empty the source looks for more input right away, so
    /// end-of-input may be reported again immediately.
    pub fn clear_error(&mut self) {
        self.error = None;
        self.settle(self.cursor);
    }

    /// Absolute byte offset of the cursor from the start of the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.base + self.cursor
    }

    // --- Attachment --------------------------------------------------------

    /// Stores a caller context value, replacing any previous one.
    pub fn attach<T: Any>(&mut self, value: T) {
        self.attachment = Some(Box::new(value));
    }

    /// Borrows the attachment if it is a `T`.
    #[must_use]
    pub fn attachment<T: Any>(&self) -> Option<&T> {
        self.attachment.as_deref()?.downcast_ref()
    }

    /// Mutably borrows the attachment if it is a `T`.
    pub fn attachment_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.attachment.as_deref_mut()?.downcast_mut()
    }

    /// Removes and returns the attachment if it is a `T`.
    pub fn detach<T: Any>(&mut self) -> Option<T> {
        let boxed = self.attachment.take()?;
        match boxed.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.attachment = Some(other);
                None
            }
        }
    }
}

impl<'src> TryFrom<&'src [u8]> for Source<'src> {
    type Error = SourceError;

    fn try_from(input: &'src [u8]) -> Result<Self, Self::Error> {
        Source::new(input)
    }
}

impl<'src> TryFrom<&'src str> for Source<'src> {
    type Error = SourceError;

    fn try_from(input: &'src str) -> Result<Self, Self::Error> {
        Source::new(input.as_bytes())
    }
}

impl fmt::Debug for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("window", &BStr::new(self.peek()))
            .field("position", &self.position())
            .field("exhausted", &self.exhausted)
            .field("error", &self.error)
            .field("savepoints", &self.savepoints.len())
            .finish_non_exhaustive()
    }
}

// Test-only inspection helpers.
#[cfg(test)]
impl Source<'_> {
    pub(crate) fn test_tape_len(&self) -> usize {
        self.tape.len()
    }

    pub(crate) fn test_pull_buf_len(&self) -> usize {
        self.pull_buf.len()
    }

    pub(crate) fn test_pending_chunks(&self) -> usize {
        self.chunk_ends.len() - self.next_chunk()
    }
}
