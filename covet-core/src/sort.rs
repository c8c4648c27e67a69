use std::cmp::Ordering;

use crate::item::Item;

/// Field an item query is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Created,
    Title,
    Price,
}

impl SortKey {
    /// Resolves a textual key name, as accepted by `LiveList::open`.
    pub fn parse(name: &str) -> Option<SortKey> {
        match name {
            "created" => Some(SortKey::Created),
            "title" => Some(SortKey::Title),
            "price" => Some(SortKey::Price),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SortKey::Created => "created",
            SortKey::Title => "title",
            SortKey::Price => "price",
        }
    }
}

/// A sort key plus direction.
///
/// Equal keys always fall back to id order, applied after the direction is
/// taken into account, so repeated fetches of an unchanged store yield the
/// same sequence in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortSpec {
    pub fn new(key: SortKey, ascending: bool) -> Self {
        SortSpec { key, ascending }
    }

    /// Total order over items under this spec.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let primary = match self.key {
            SortKey::Created => a.created.cmp(&b.created),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Price => a.price.total_cmp(&b.price),
        };
        let directed = if self.ascending {
            primary
        } else {
            primary.reverse()
        };
        directed.then_with(|| a.id.cmp(&b.id))
    }

    /// Sorts rows in place under this spec.
    pub fn sort_rows(&self, rows: &mut [Item]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}
