//! Fjall-backed item store for Covet.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use covet_core::{Committed, Item, ItemDraft, ItemId, ItemStore, SortSpec};
use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use thiserror::Error;

pub const DEFAULT_KEYSPACE: &str = "items";

#[derive(Debug, Error)]
pub enum FjallError {
    #[error("fjall error: {0}")]
    Fjall(#[from] fjall::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
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

/// A persistent item store backed by Fjall.
///
/// Records are JSON-encoded and keyed by item id. Staged writes live in
/// memory until `save` commits them to the keyspace.
pub struct FjallStore {
    keyspace: Keyspace,
    _database: Database, // Keep keyspace alive
    pending: Vec<Pending>,
    last_created: u64,
}

impl FjallStore {
    /// Opens a Fjall store at the given path using the default keyspace.
    ///
    /// Creates the database if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FjallError> {
        Self::open_keyspace(path, DEFAULT_KEYSPACE)
    }

    /// Opens a Fjall store at the given path with a specific keyspace name.
    ///
    /// Creates the database and keyspace if they don't exist.
    pub fn open_keyspace(path: impl AsRef<Path>, keyspace: &str) -> Result<Self, FjallError> {
        let database = Database::builder(path).open()?;
        let keyspace = database.keyspace(keyspace, || KeyspaceCreateOptions::default())?;
        let mut store = Self {
            keyspace,
            _database: database,
            pending: Vec::new(),
            last_created: 0,
        };
        // Existing records bound the next created timestamp from below.
        for item in store.scan()? {
            store.last_created = store.last_created.max(item.created);
        }
        Ok(store)
    }

    fn key(id: &ItemId) -> String {
        id.to_string()
    }

    fn scan(&self) -> Result<Vec<Item>, FjallError> {
        let mut rows = Vec::new();
        for pair in self.keyspace.iter() {
            let (_key, value) = pair.into_inner()?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    fn read(&self, id: &ItemId) -> Result<Option<Item>, FjallError> {
        match self.keyspace.get(Self::key(id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, item: &Item) -> Result<(), FjallError> {
        let bytes = serde_json::to_vec(item)?;
        self.keyspace.insert(Self::key(&item.id), bytes)?;
        Ok(())
    }

    /// True if the id refers to a committed or pending-created item that no
    /// pending delete has removed.
    fn exists(&self, id: &ItemId) -> Result<bool, FjallError> {
        let mut alive = self.keyspace.contains_key(Self::key(id))?;
        for write in &self.pending {
            match write {
                Pending::Create(item) if item.id == *id => alive = true,
                Pending::Delete(deleted) if deleted == id => alive = false,
                _ => {}
            }
        }
        Ok(alive)
    }

    fn next_created(&mut self) -> u64 {
        let created = now_millis().max(self.last_created + 1);
        self.last_created = created;
        created
    }
}

impl ItemStore for FjallStore {
    type Error = FjallError;

    fn fetch(&self, sort: &SortSpec) -> Result<Vec<Item>, Self::Error> {
        let mut rows = self.scan()?;
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
        if !self.exists(id)? {
            return Err(FjallError::Missing(*id));
        }
        self.pending.push(Pending::Update(*id, draft));
        Ok(())
    }

    fn delete(&mut self, id: &ItemId) -> Result<(), Self::Error> {
        if !self.exists(id)? {
            return Err(FjallError::Missing(*id));
        }
        self.pending.push(Pending::Delete(*id));
        Ok(())
    }

    fn save(&mut self) -> Result<Vec<Committed>, Self::Error> {
        let mut commits = Vec::with_capacity(self.pending.len());
        for write in std::mem::take(&mut self.pending) {
            match write {
                Pending::Create(item) => {
                    self.write(&item)?;
                    commits.push(Committed::Created(item));
                }
                Pending::Update(id, draft) => {
                    let mut item = self.read(&id)?.ok_or(FjallError::Missing(id))?;
                    item.title = draft.title;
                    item.price = draft.price;
                    item.details = draft.details;
                    self.write(&item)?;
                    commits.push(Committed::Updated(item));
                }
                Pending::Delete(id) => {
                    self.keyspace.remove(Self::key(&id))?;
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
