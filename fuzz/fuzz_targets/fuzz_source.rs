#![no_main]
//! Differential fuzzing of `rewind::Source` against a cursor over a `Vec`.
//!
//! The stream is fragmented by the fuzzer, so every refill, replay and
//! compaction path gets exercised while the model only ever moves an index.

use std::io::{self, Read};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind::{Source, SourceError, rune};

#[derive(Arbitrary, Debug)]
enum Op {
    Peek1,
    Read1,
    PeekN(u8),
    ReadN(u8),
    ConsumeN(u8),
    CopyN(u8),
    Consume,
    Expect(Vec<u8>),
    PeekRune,
    ReadRune,
    Store,
    Rollback,
    Delete,
    ReadAll,
}

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    chunk_size: u8,
    fragments: Vec<u8>,
    ops: Vec<Op>,
}

struct Fragmented<'a> {
    data: &'a [u8],
    fragments: &'a [u8],
    turn: usize,
}

impl Read for Fragmented<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = match self.fragments {
            [] => buf.len(),
            sizes => 1 + usize::from(sizes[self.turn % sizes.len()]),
        };
        self.turn += 1;
        let n = limit.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// The reference: an index into the input plus the same error rules.
struct Model<'a> {
    data: &'a [u8],
    pos: usize,
    error: Option<SourceError>,
    savepoints: Vec<usize>,
}

impl<'a> Model<'a> {
    fn report(&mut self, err: SourceError) {
        if matches!(self.error, None | Some(SourceError::EndOfInput)) {
            self.error = Some(err);
        }
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn settle(&mut self) {
        if self.pos == self.data.len() && self.error.is_none() {
            self.error = Some(SourceError::EndOfInput);
        }
    }

    fn peek_n(&mut self, n: usize) -> &'a [u8] {
        let rest = self.rest();
        if n > rest.len() {
            self.report(SourceError::UnexpectedEndOfInput);
        }
        &rest[..n.min(rest.len())]
    }

    fn consume_n(&mut self, n: usize) -> &'a [u8] {
        let taken = self.peek_n(n);
        self.pos += taken.len();
        self.settle();
        taken
    }

    fn peek1(&mut self) -> u8 {
        self.peek_n(1).first().copied().unwrap_or(0)
    }

    fn peek_rune(&mut self) -> (char, usize) {
        let width = rune::Lead::of(self.peek1()).width();
        rune::decode(self.peek_n(width))
    }

    fn expect(&mut self, literal: &[u8]) -> bool {
        if !self.rest().starts_with(literal) {
            return false;
        }
        self.pos += literal.len();
        self.settle();
        true
    }
}

fuzz_target!(|input: Input| {
    let Input {
        data,
        chunk_size,
        fragments,
        ops,
    } = input;
    let reader = Fragmented {
        data: &data,
        fragments: &fragments,
        turn: 0,
    };
    let chunk_size = 1 + usize::from(chunk_size % 32);
    let mut src = match Source::from_reader(reader, chunk_size) {
        Ok(src) => src,
        Err(err) => {
            assert!(data.is_empty());
            assert_eq!(err, SourceError::EmptyInput);
            return;
        }
    };
    let mut model = Model {
        data: &data,
        pos: 0,
        error: None,
        savepoints: Vec::new(),
    };

    for op in &ops {
        match op {
            Op::Peek1 => assert_eq!(src.peek1(), model.peek1()),
            Op::Read1 => {
                let expected = model.peek1();
                if model.pos < data.len() {
                    model.consume_n(1);
                }
                assert_eq!(src.read1(), expected);
            }
            Op::PeekN(n) => {
                let n = usize::from(*n);
                assert_eq!(src.peek_n(n), model.peek_n(n));
            }
            Op::ReadN(n) => {
                let n = usize::from(*n);
                assert_eq!(src.read_n(n), model.consume_n(n));
            }
            Op::ConsumeN(n) => {
                let n = usize::from(*n);
                src.consume_n(n);
                model.consume_n(n);
            }
            Op::CopyN(n) => {
                let n = usize::from(*n);
                let mut space = Vec::new();
                let copied = src.copy_n(&mut space, n);
                let expected = model.consume_n(n);
                assert_eq!(copied, expected.len());
                assert_eq!(space, expected);
            }
            Op::Consume => {
                let window = src.peek().len();
                src.consume();
                model.consume_n(window);
            }
            Op::Expect(literal) => {
                let literal = &literal[..literal.len().min(4)];
                assert_eq!(src.expect(literal), model.expect(literal));
            }
            Op::PeekRune => assert_eq!(src.peek_rune(), model.peek_rune()),
            Op::ReadRune => {
                let expected = model.peek_rune();
                model.consume_n(expected.1);
                assert_eq!(src.read_rune(), expected);
            }
            Op::Store => {
                src.store_savepoint();
                model.savepoints.push(model.pos);
            }
            // Unbalanced pops leave a sticky error the model does not track.
            Op::Rollback => {
                let Some(pos) = model.savepoints.pop() else {
                    continue;
                };
                src.rollback_to_savepoint();
                model.pos = pos;
                model.error = None;
                model.settle();
            }
            Op::Delete => {
                if model.savepoints.pop().is_some() {
                    src.delete_savepoint();
                }
            }
            Op::ReadAll => {
                let expected = model.rest();
                model.pos = data.len();
                model.settle();
                assert_eq!(src.read_all(), expected);
            }
        }

        assert_eq!(src.position(), model.pos, "{op:?}");
        assert_eq!(src.error(), model.error.as_ref(), "{op:?}");
        assert_eq!(src.savepoint_depth(), model.savepoints.len());
        assert!(model.rest().starts_with(src.peek()));
        if src.error().is_none() {
            assert!(!src.peek().is_empty(), "{op:?}");
        }
    }
});
