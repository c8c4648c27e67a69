use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::change::{ListObserver, RowChange, RowPos};
use crate::item::{Item, ItemDraft, ItemId};
use crate::sort::{SortKey, SortSpec};
use crate::store::{Committed, ItemStore};

/// Error type for list operations.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid sort key: {0}")]
    Query(String),
    #[error("position out of range: section {section}, row {row}")]
    IndexOutOfRange { section: usize, row: usize },
    #[error("an observer is already bound")]
    AlreadyBound,
}

impl ListError {
    fn store<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        ListError::StoreUnavailable(Box::new(err))
    }
}

/// One section of the snapshot.
///
/// Grouping is part of the shape, but the list currently produces a single
/// default section.
#[derive(Debug, Clone, Default)]
pub struct Section {
    rows: Vec<Item>,
}

impl Section {
    pub fn rows(&self) -> &[Item] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The full ordered set of items as currently known by the list.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    sections: Vec<Section>,
}

impl Snapshot {
    /// Detached shape: no sections at all (before `open`, or degraded).
    fn detached() -> Self {
        Snapshot {
            sections: Vec::new(),
        }
    }

    fn single_section(rows: Vec<Item>) -> Self {
        Snapshot {
            sections: vec![Section { rows }],
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn row_count(&self, section: usize) -> Result<usize, ListError> {
        self.sections
            .get(section)
            .map(Section::len)
            .ok_or(ListError::IndexOutOfRange { section, row: 0 })
    }

    pub fn item_at(&self, section: usize, row: usize) -> Result<&Item, ListError> {
        self.sections
            .get(section)
            .and_then(|s| s.rows.get(row))
            .ok_or(ListError::IndexOutOfRange { section, row })
    }
}

/// A live, sorted view over all items in a durable store.
///
/// `open` performs the single eager fetch; afterwards the snapshot is
/// maintained purely from commit deltas and the store is never re-polled.
/// All writes go through the list and `save` is the single commit point:
/// it commits the staged batch, installs the new snapshot and drains one
/// `will_change`/`did_change` bracket to the bound observer before
/// returning. That keeps the model single-writer and non-reentrant: the
/// next mutation cannot begin until the batch is fully applied.
pub struct LiveList<S: ItemStore> {
    store: S,
    sort: Option<SortSpec>,
    snapshot: Snapshot,
    observer: Option<Rc<RefCell<dyn ListObserver>>>,
}

impl<S: ItemStore> LiveList<S> {
    /// Wraps a store. The list stays detached (zero sections) until `open`.
    pub fn new(store: S) -> Self {
        LiveList {
            store,
            sort: None,
            snapshot: Snapshot::detached(),
            observer: None,
        }
    }

    /// Establishes the query and performs the eager fetch.
    ///
    /// Fails with [`ListError::Query`] on an unknown sort key and with
    /// [`ListError::StoreUnavailable`] if the fetch fails; on failure the
    /// list degrades to the detached shape and the caller may retry.
    /// Reopening (retry or sort switch) resets the snapshot without
    /// emitting row deltas; the display layer reloads in full.
    pub fn open(&mut self, sort_key: &str, ascending: bool) -> Result<(), ListError> {
        let key =
            SortKey::parse(sort_key).ok_or_else(|| ListError::Query(sort_key.to_string()))?;
        let spec = SortSpec::new(key, ascending);
        match self.store.fetch(&spec) {
            Ok(rows) => {
                self.sort = Some(spec);
                self.snapshot = Snapshot::single_section(rows);
                Ok(())
            }
            Err(err) => {
                log::warn!("eager fetch failed, list degraded to empty: {err}");
                self.sort = None;
                self.snapshot = Snapshot::detached();
                Err(ListError::store(err))
            }
        }
    }

    /// True once `open` has succeeded and the list has not been degraded.
    pub fn is_open(&self) -> bool {
        self.sort.is_some()
    }

    /// The sort currently in effect, if open.
    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn section_count(&self) -> usize {
        self.snapshot.section_count()
    }

    pub fn row_count(&self, section: usize) -> Result<usize, ListError> {
        self.snapshot.row_count(section)
    }

    pub fn item_at(&self, section: usize, row: usize) -> Result<&Item, ListError> {
        self.snapshot.item_at(section, row)
    }

    /// Installs the single observer.
    ///
    /// The subscription slot holds at most one observer for the lifetime
    /// of the list; a second bind fails with [`ListError::AlreadyBound`].
    pub fn bind(&mut self, observer: Rc<RefCell<dyn ListObserver>>) -> Result<(), ListError> {
        if self.observer.is_some() {
            return Err(ListError::AlreadyBound);
        }
        self.observer = Some(observer);
        Ok(())
    }

    /// Stages a creation. Durable and visible only after `save`.
    pub fn create(&mut self, draft: ItemDraft) -> Result<Item, ListError> {
        self.store.create(draft).map_err(ListError::store)
    }

    /// Stages a whole-record edit.
    pub fn update(&mut self, id: &ItemId, draft: ItemDraft) -> Result<(), ListError> {
        self.store.update(id, draft).map_err(ListError::store)
    }

    /// Stages a removal.
    pub fn delete(&mut self, id: &ItemId) -> Result<(), ListError> {
        self.store.delete(id).map_err(ListError::store)
    }

    /// Commits pending writes and drains the resulting delta batch.
    ///
    /// On a never-opened list the commit still happens, but the snapshot
    /// stays detached and nothing is notified. A batch that produces no
    /// deltas produces no notifications either.
    pub fn save(&mut self) -> Result<(), ListError> {
        let commits = self.store.save().map_err(ListError::store)?;
        if commits.is_empty() {
            return Ok(());
        }
        let Some(sort) = self.sort else {
            return Ok(());
        };

        let old_rows = match self.snapshot.sections.first() {
            Some(section) => section.rows.clone(),
            None => Vec::new(),
        };
        let (new_rows, touched) = apply_commits(&old_rows, &commits, &sort);
        let changes = diff_rows(&old_rows, &new_rows, &touched);
        self.snapshot = Snapshot::single_section(new_rows);
        log::debug!("committed batch: {} delta(s)", changes.len());

        if changes.is_empty() {
            return Ok(());
        }
        if let Some(observer) = self.observer.clone() {
            let mut observer = observer.borrow_mut();
            observer.will_change();
            for change in &changes {
                observer.change(change, &self.snapshot);
            }
            observer.did_change();
        }
        Ok(())
    }

    /// Consumes the list, returning the store (shutdown path).
    pub fn into_store(self) -> S {
        self.store
    }
}

/// Applies a commit set to the previous row set, returning the re-sorted
/// rows plus the ids whose content changed.
fn apply_commits(
    old_rows: &[Item],
    commits: &[Committed],
    sort: &SortSpec,
) -> (Vec<Item>, HashSet<ItemId>) {
    let mut table: IndexMap<ItemId, Item> = old_rows
        .iter()
        .cloned()
        .map(|item| (item.id, item))
        .collect();
    let mut touched = HashSet::new();
    for commit in commits {
        match commit {
            Committed::Created(item) => {
                table.insert(item.id, item.clone());
            }
            Committed::Updated(item) => {
                table.insert(item.id, item.clone());
                touched.insert(item.id);
            }
            Committed::Deleted(id) => {
                table.shift_remove(id);
                touched.remove(id);
            }
        }
    }
    let mut rows: Vec<Item> = table.into_values().collect();
    sort.sort_rows(&mut rows);
    (rows, touched)
}

/// Computes the sequential-replay delta batch turning `old` into `new`.
///
/// Deltas come out as deletions, then insertions, then moves, then content
/// updates. Content updates are only reported for surviving rows that
/// received no structural delta of their own, at their post-batch row.
fn diff_rows(old: &[Item], new: &[Item], touched: &HashSet<ItemId>) -> Vec<RowChange> {
    let old_ids: Vec<ItemId> = old.iter().map(|item| item.id).collect();
    let new_ids: Vec<ItemId> = new.iter().map(|item| item.id).collect();
    let old_set: HashSet<ItemId> = old_ids.iter().copied().collect();
    let new_set: HashSet<ItemId> = new_ids.iter().copied().collect();

    let mut working = old_ids.clone();
    let mut changes = Vec::new();

    // Deletions, in snapshot order.
    for id in &old_ids {
        if new_set.contains(id) {
            continue;
        }
        if let Some(at) = working.iter().position(|w| w == id) {
            working.remove(at);
            changes.push(RowChange::Deleted {
                at: RowPos::new(0, at),
            });
        }
    }

    // Insertions, ascending by final position.
    for (row, id) in new_ids.iter().enumerate() {
        if old_set.contains(id) {
            continue;
        }
        working.insert(row, *id);
        changes.push(RowChange::Inserted {
            at: RowPos::new(0, row),
        });
    }

    // Moves: walk the final ordering and pull each misplaced row into place.
    let mut moved = HashSet::new();
    for (row, id) in new_ids.iter().enumerate() {
        if working[row] == *id {
            continue;
        }
        let Some(from) = working.iter().position(|w| w == id) else {
            continue;
        };
        working.remove(from);
        working.insert(row, *id);
        moved.insert(*id);
        changes.push(RowChange::Moved {
            from: RowPos::new(0, from),
            to: RowPos::new(0, row),
        });
    }

    // Content refreshes for rows that stayed structurally in place.
    for (row, id) in new_ids.iter().enumerate() {
        if touched.contains(id) && old_set.contains(id) && !moved.contains(id) {
            changes.push(RowChange::Updated {
                at: RowPos::new(0, row),
            });
        }
    }

    changes
}
