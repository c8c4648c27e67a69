use crate::list::Snapshot;

/// A position in the sectioned snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPos {
    pub section: usize,
    pub row: usize,
}

impl RowPos {
    pub fn new(section: usize, row: usize) -> Self {
        RowPos { section, row }
    }
}

/// One row delta within a notification batch.
///
/// Positions use sequential-replay semantics: applying each delta in order
/// to a display model initialized from the pre-batch snapshot yields the
/// post-batch ordering. `Inserted` and `Deleted` positions refer to the
/// model state at the moment the delta is applied; `Moved` is remove at
/// `from`, then insert at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Inserted { at: RowPos },
    Deleted { at: RowPos },
    Updated { at: RowPos },
    Moved { from: RowPos, to: RowPos },
}

/// Receives one atomic batch of row deltas per committed store mutation.
///
/// Batches are delivered synchronously on the mutating call: the next
/// store mutation cannot begin until `did_change` has returned. The
/// snapshot passed to `change` is the post-batch snapshot, for
/// re-resolving row content.
pub trait ListObserver {
    fn will_change(&mut self);
    fn change(&mut self, change: &RowChange, snapshot: &Snapshot);
    fn did_change(&mut self);
}
