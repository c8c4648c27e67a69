use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an item, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A wishlist entry.
///
/// `id` and `created` are assigned by the store and never change; the
/// remaining fields are edited wholesale through an [`ItemDraft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub price: f64,
    pub details: Option<String>,
    /// Unix timestamp millis, assigned at creation. The default sort key.
    pub created: u64,
}

/// The writable fields of an item, used for creation and whole-record edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub price: f64,
    pub details: Option<String>,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        ItemDraft {
            title: title.into(),
            price,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
