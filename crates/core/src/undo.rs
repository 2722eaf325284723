//! Undo Buffer

use crate::items::LineItem;

/// State captured by the most recent destructive cart action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoSnapshot {
    /// A single removed line, re-inserted on undo.
    RemovedLine(LineItem),
    /// The full line list before a clear, restored outright on undo.
    ClearedCart(Vec<LineItem>),
}

/// Single-slot holder for a pending [`UndoSnapshot`].
///
/// There is no history: a new destructive action overwrites whatever was
/// pending. The buffer never expires a snapshot on its own; when the
/// user-facing affordance lapses, the presentation layer calls
/// [`UndoBuffer::discard`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UndoBuffer {
    slot: Option<UndoSnapshot>,
}

impl UndoBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        UndoBuffer { slot: None }
    }

    /// Records a snapshot, replacing any pending one.
    pub fn record(&mut self, snapshot: UndoSnapshot) {
        self.slot = Some(snapshot);
    }

    /// Takes the pending snapshot, leaving the buffer empty.
    pub fn consume(&mut self) -> Option<UndoSnapshot> {
        self.slot.take()
    }

    /// Drops the pending snapshot without applying it.
    pub fn discard(&mut self) {
        self.slot = None;
    }

    /// Returns the pending snapshot, when one exists.
    pub fn pending(&self) -> Option<&UndoSnapshot> {
        self.slot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use crate::{fixtures, items::NewLineItem};

    use super::*;

    fn line(new: NewLineItem) -> LineItem {
        LineItem::try_from(new).expect("fixture line should validate")
    }

    #[test]
    fn starts_empty() {
        let buffer = UndoBuffer::new();

        assert_eq!(buffer.pending(), None);
    }

    #[test]
    fn consume_yields_the_snapshot_exactly_once() {
        let mut buffer = UndoBuffer::new();
        let snapshot = UndoSnapshot::RemovedLine(line(fixtures::socks(2)));
        buffer.record(snapshot.clone());

        assert_eq!(buffer.consume(), Some(snapshot));
        assert_eq!(buffer.consume(), None);
    }

    #[test]
    fn a_second_destructive_action_overwrites_the_first_snapshot() {
        let mut buffer = UndoBuffer::new();
        buffer.record(UndoSnapshot::RemovedLine(line(fixtures::socks(2))));

        let cleared = UndoSnapshot::ClearedCart(vec![line(fixtures::lamp(1))]);
        buffer.record(cleared.clone());

        assert_eq!(buffer.consume(), Some(cleared));
    }

    #[test]
    fn discard_drops_the_snapshot_without_applying_it() {
        let mut buffer = UndoBuffer::new();
        buffer.record(UndoSnapshot::ClearedCart(vec![line(fixtures::mug(1))]));

        buffer.discard();

        assert_eq!(buffer.pending(), None);
        assert_eq!(buffer.consume(), None);
    }
}
