use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;

use crate::item::{Item, ItemDraft, ItemId};
use crate::sort::SortSpec;

/// A durable store of items with stage-then-commit write semantics.
///
/// `create`/`update`/`delete` stage writes; nothing is durable (or visible
/// to `fetch`) until `save` commits the batch. `save` returns the commit
/// set so the caller can compute row deltas against a prior snapshot.
///
/// Stores assign `id` and `created` at creation time; `created` values are
/// strictly increasing within one store.
pub trait ItemStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All committed items, ordered by the given spec.
    fn fetch(&self, sort: &SortSpec) -> Result<Vec<Item>, Self::Error>;

    /// Stages a creation and returns the item with its assigned identity.
    fn create(&mut self, draft: ItemDraft) -> Result<Item, Self::Error>;

    /// Stages a whole-record edit of the writable fields.
    fn update(&mut self, id: &ItemId, draft: ItemDraft) -> Result<(), Self::Error>;

    /// Stages a removal.
    fn delete(&mut self, id: &ItemId) -> Result<(), Self::Error>;

    /// Commits all pending writes and returns them in commit order.
    fn save(&mut self) -> Result<Vec<Committed>, Self::Error>;
}

/// One committed write, with enough detail to diff snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum Committed {
    Created(Item),
    Updated(Item),
    Deleted(ItemId),
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("no item with id {0}")]
    Missing(ItemId),
}

/// Staged write awaiting commit.
#[derive(Debug, Clone)]
enum Pending {
    Create(Item),
    Update(ItemId, ItemDraft),
    Delete(ItemId),
}

/// An in-memory store backed by an insertion-ordered map.
///
/// Useful for testing and as a reference implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: IndexMap<ItemId, Item>,
    pending: Vec<Pending>,
    last_created: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the id refers to a committed or pending-created item that no
    /// pending delete has removed.
    fn exists(&self, id: &ItemId) -> bool {
        let mut alive = self.items.contains_key(id);
        for write in &self.pending {
            match write {
                Pending::Create(item) if item.id == *id => alive = true,
                Pending::Delete(deleted) if deleted == id => alive = false,
                _ => {}
            }
        }
        alive
    }

    fn next_created(&mut self) -> u64 {
        let created = now_millis().max(self.last_created + 1);
        self.last_created = created;
        created
    }
}

impl ItemStore for MemoryStore {
    type Error = MemoryStoreError;

    fn fetch(&self, sort: &SortSpec) -> Result<Vec<Item>, Self::Error> {
        let mut rows: Vec<Item> = self.items.values().cloned().collect();
        sort.sort_rows(&mut rows);
        Ok(rows)
    }

    fn create(&mut self, draft: ItemDraft) -> Result<Item, Self::Error> {
        let item = Item {
            id: ItemId::generate(),
            title: draft.title,
            price: draft.price,
            details: draft.details,
            created: self.next_created(),
        };
        self.pending.push(Pending::Create(item.clone()));
        Ok(item)
    }

    fn update(&mut self, id: &ItemId, draft: ItemDraft) -> Result<(), Self::Error> {
        if !self.exists(id) {
            return Err(MemoryStoreError::Missing(*id));
        }
        self.pending.push(Pending::Update(*id, draft));
        Ok(())
    }

    fn delete(&mut self, id: &ItemId) -> Result<(), Self::Error> {
        if !self.exists(id) {
            return Err(MemoryStoreError::Missing(*id));
        }
        self.pending.push(Pending::Delete(*id));
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<Committed>, Self::Error> {
        let mut commits = Vec::with_capacity(self.pending.len());
        for write in std::mem::take(&mut self.pending) {
            match write {
                Pending::Create(item) => {
                    self.items.insert(item.id, item.clone());
                    commits.push(Committed::Created(item));
                }
                Pending::Update(id, draft) => {
                    let item = self
                        .items
                        .get_mut(&id)
                        .ok_or(MemoryStoreError::Missing(id))?;
                    item.title = draft.title;
                    item.price = draft.price;
                    item.details = draft.details;
                    commits.push(Committed::Updated(item.clone()));
                }
                Pending::Delete(id) => {
                    self.items
                        .shift_remove(&id)
                        .ok_or(MemoryStoreError::Missing(id))?;
                    commits.push(Committed::Deleted(id));
                }
            }
        }
        Ok(commits)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
