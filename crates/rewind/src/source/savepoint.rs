/// A recorded cursor position.
///
/// Both offsets index the owning source's tape. The chunks the checkpoint
/// would replay are the tape bytes past `window_end`; they stay in the tape for
/// as long as the checkpoint is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Savepoint {
    pub(crate) cursor: usize,
    pub(crate) window_end: usize,
}

/// Strict LIFO stack of savepoints.
///
/// Cursors only move backwards through a rollback, which pops, so entries are
/// ordered by cursor and the bottom entry is the oldest byte still needed.
#[derive(Debug, Default)]
pub(crate) struct SavepointStack {
    entries: Vec<Savepoint>,
}

impl SavepointStack {
    pub(crate) fn push(&mut self, savepoint: Savepoint) {
        debug_assert!(
            self.entries
                .last()
                .is_none_or(|top| top.cursor <= savepoint.cursor),
            "savepoints must be pushed in cursor order"
        );
        self.entries.push(savepoint);
    }

    pub(crate) fn pop(&mut self) -> Option<Savepoint> {
        self.entries.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// First tape offset any outstanding savepoint can roll back to.
    pub(crate) fn floor(&self) -> Option<usize> {
        self.entries.first().map(|sp| sp.cursor)
    }

    /// Rebases every entry after `by` bytes were dropped from the tape front.
    pub(crate) fn shift(&mut self, by: usize) {
        for sp in &mut self.entries {
            sp.cursor -= by;
            sp.window_end -= by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_is_the_oldest_entry() {
        let mut stack = SavepointStack::default();
        assert_eq!(stack.floor(), None);
        stack.push(Savepoint {
            cursor: 2,
            window_end: 4,
        });
        stack.push(Savepoint {
            cursor: 5,
            window_end: 8,
        });
        assert_eq!(stack.floor(), Some(2));

        stack.shift(2);
        assert_eq!(
            stack.pop(),
            Some(Savepoint {
                cursor: 3,
                window_end: 6,
            })
        );
        assert_eq!(stack.floor(), Some(0));
        assert_eq!(stack.len(), 1);
    }
}
