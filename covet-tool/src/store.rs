//! Store abstraction for runtime dispatch.

use std::path::Path;

use covet_core::{Committed, Item, ItemDraft, ItemId, ItemStore, MemoryStore, SortSpec};
use covet_fjall::FjallStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnyStoreError {
    #[error("memory error: {0}")]
    Memory(#[from] covet_core::MemoryStoreError),
    #[error("fjall error: {0}")]
    Fjall(#[from] covet_fjall::FjallError),
}

/// Runtime-dispatched store.
pub enum AnyStore {
    Memory(MemoryStore),
    Fjall(FjallStore),
}

impl AnyStore {
    pub fn open_memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub fn open_fjall(path: impl AsRef<Path>) -> Result<Self, AnyStoreError> {
        Ok(Self::Fjall(FjallStore::open(path)?))
    }
}

impl ItemStore for AnyStore {
    type Error = AnyStoreError;

    fn fetch(&self, sort: &SortSpec) -> Result<Vec<Item>, Self::Error> {
        match self {
            AnyStore::Memory(s) => s.fetch(sort).map_err(Into::into),
            AnyStore::Fjall(s) => s.fetch(sort).map_err(Into::into),
        }
    }

    fn create(&mut self, draft: ItemDraft) -> Result<Item, Self::Error> {
        match self {
            AnyStore::Memory(s) => s.create(draft).map_err(Into::into),
            AnyStore::Fjall(s) => s.create(draft).map_err(Into::into),
        }
    }

    fn update(&mut self, id: &ItemId, draft: ItemDraft) -> Result<(), Self::Error> {
        match self {
            AnyStore::Memory(s) => s.update(id, draft).map_err(Into::into),
            AnyStore::Fjall(s) => s.update(id, draft).map_err(Into::into),
        }
    }

    fn delete(&mut self, id: &ItemId) -> Result<(), Self::Error> {
        match self {
            AnyStore::Memory(s) => s.delete(id).map_err(Into::into),
            AnyStore::Fjall(s) => s.delete(id).map_err(Into::into),
        }
    }

    fn save(&mut self) -> Result<Vec<Committed>, Self::Error> {
        match self {
            AnyStore::Memory(s) => s.save().map_err(Into::into),
            AnyStore::Fjall(s) => s.save().map_err(Into::into),
        }
    }
}
