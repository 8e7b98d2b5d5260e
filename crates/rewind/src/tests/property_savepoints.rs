use quickcheck::QuickCheck;

use super::chunk_reader::{Op, fragmented, test_count};
use crate::{Source, SourceError};

type TwoPhaseProp = fn(Vec<u8>, u8, Vec<usize>, Vec<Op>, Vec<Op>) -> bool;

#[derive(Debug, PartialEq)]
struct Snapshot {
    window: Vec<u8>,
    position: usize,
    error: Option<SourceError>,
}

fn snapshot(src: &Source<'_>) -> Snapshot {
    Snapshot {
        window: src.peek().to_vec(),
        position: src.position(),
        error: src.error().cloned(),
    }
}

/// Property: rolling back restores the window, the position, and the error
/// state, and the rest of the input reads back intact.
#[test]
fn checkpoint_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(
        data: Vec<u8>,
        chunk_size: u8,
        sizes: Vec<usize>,
        before: Vec<Op>,
        after: Vec<Op>,
    ) -> bool {
        let Some(mut src) = fragmented(&data, chunk_size, sizes) else {
            return true;
        };
        for op in &before {
            op.apply(&mut src);
        }
        if src.fatal_error().is_some() {
            return true;
        }
        let saved = snapshot(&src);
        src.store_savepoint();
        for op in &after {
            op.apply(&mut src);
        }
        src.rollback_to_savepoint();
        if snapshot(&src) != saved || src.savepoint_depth() != 0 {
            return false;
        }
        src.read_all() == &data[saved.position..]
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as TwoPhaseProp);
}

/// Property: with savepoints A then B outstanding, rolling back B and then A
/// restores each state regardless of how many pulls happened in between.
#[test]
fn nested_checkpoints_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(
        data: Vec<u8>,
        chunk_size: u8,
        sizes: Vec<usize>,
        first: Vec<Op>,
        second: Vec<Op>,
    ) -> bool {
        let Some(mut src) = fragmented(&data, chunk_size, sizes) else {
            return true;
        };
        let at_a = snapshot(&src);
        src.store_savepoint();
        for op in &first {
            op.apply(&mut src);
        }
        let at_b = snapshot(&src);
        src.store_savepoint();
        for op in &second {
            op.apply(&mut src);
        }

        src.rollback_to_savepoint();
        let back_at_b = snapshot(&src);
        if back_at_b.window != at_b.window || back_at_b.position != at_b.position {
            return false;
        }
        src.rollback_to_savepoint();
        snapshot(&src) == at_a && src.read_all() == &data[..]
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as TwoPhaseProp);
}

/// Property: outstanding savepoints pin the tape; once they are gone and the
/// cursor moves on, the tape shrinks back to the active window.
#[test]
fn compaction_after_savepoints_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(data: Vec<u8>, chunk_size: u8, ops: Vec<Op>) -> bool {
        let Some(mut src) = fragmented(&data, chunk_size, Vec::new()) else {
            return true;
        };
        src.store_savepoint();
        for op in &ops {
            op.apply(&mut src);
        }
        src.delete_savepoint();
        while src.error().is_none() {
            src.consume();
            if src.test_tape_len() > 16 {
                return false;
            }
        }
        src.position() <= data.len()
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<u8>, u8, Vec<Op>) -> bool);
}
