//! Covet is an observable persisted wishlist store.
//!
//! Core concepts:
//! - **Item**: the persisted entity (title, price, details, creation time)
//! - **ItemStore**: the durable store boundary with stage-then-commit writes
//! - **LiveList**: a live, sorted view over a store that turns every commit
//!   batch into row deltas against the previous snapshot
//! - **ListObserver / RowChange**: the notification protocol, one atomic
//!   `will_change`/`did_change` bracket per commit
//! - **ListPresenter / DisplaySurface**: translates deltas into display-list
//!   edits and populates rows on demand
//!
//! # Example
//!
//! ```
//! use covet_core::{ItemDraft, LiveList, MemoryStore};
//!
//! let mut list = LiveList::new(MemoryStore::new());
//! list.open("created", false).unwrap();
//!
//! list.create(ItemDraft::new("MacBook Pro", 1800.0)).unwrap();
//! list.save().unwrap();
//!
//! assert_eq!(list.row_count(0).unwrap(), 1);
//! assert_eq!(list.item_at(0, 0).unwrap().title, "MacBook Pro");
//! ```

mod change;
mod item;
mod list;
mod presenter;
mod sort;
mod store;

pub use change::{ListObserver, RowChange, RowPos};
pub use item::{Item, ItemDraft, ItemId};
pub use list::{ListError, LiveList, Section, Snapshot};
pub use presenter::{DisplayFields, DisplaySurface, ListPresenter, format_price};
pub use sort::{SortKey, SortSpec};
pub use store::{Committed, ItemStore, MemoryStore, MemoryStoreError};
