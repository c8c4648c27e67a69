use crate::change::{ListObserver, RowChange, RowPos};
use crate::item::Item;
use crate::list::{ListError, LiveList, Snapshot};
use crate::store::ItemStore;

/// Formatted content for one display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    pub title: String,
    pub price: String,
    pub details: String,
}

impl DisplayFields {
    /// Maps an item to its three display fields. The only transformation
    /// is the locale-independent price rendering.
    pub fn from_item(item: &Item) -> Self {
        DisplayFields {
            title: item.title.clone(),
            price: format_price(item.price),
            details: item.details.clone().unwrap_or_default(),
        }
    }
}

/// Locale-independent price rendering with two fraction digits.
pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// The list-rendering surface driven by the presenter.
///
/// Rows arriving via `insert_row` stay unpopulated until the display
/// layer's next render pass pulls [`ListPresenter::populate`];
/// `refresh_row` delivers reformatted content directly.
pub trait DisplaySurface {
    fn begin_batch_edit(&mut self);
    fn end_batch_edit(&mut self);
    fn insert_row(&mut self, at: RowPos);
    fn delete_row(&mut self, at: RowPos);
    fn refresh_row(&mut self, at: RowPos, fields: DisplayFields);
}

/// Bridges list notifications into display-list edits and row population.
///
/// Carries no business logic and holds no reference back to the list;
/// callers pass the bound list to the read-side helpers.
pub struct ListPresenter<D: DisplaySurface> {
    surface: D,
}

impl<D: DisplaySurface> ListPresenter<D> {
    pub fn new(surface: D) -> Self {
        ListPresenter { surface }
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    /// Resolves a row and maps it for display.
    pub fn populate<S: ItemStore>(
        &self,
        list: &LiveList<S>,
        section: usize,
        row: usize,
    ) -> Result<DisplayFields, ListError> {
        Ok(DisplayFields::from_item(list.item_at(section, row)?))
    }

    pub fn section_count<S: ItemStore>(&self, list: &LiveList<S>) -> usize {
        list.section_count()
    }

    pub fn row_count<S: ItemStore>(
        &self,
        list: &LiveList<S>,
        section: usize,
    ) -> Result<usize, ListError> {
        list.row_count(section)
    }
}

impl<D: DisplaySurface> ListObserver for ListPresenter<D> {
    fn will_change(&mut self) {
        self.surface.begin_batch_edit();
    }

    fn change(&mut self, change: &RowChange, snapshot: &Snapshot) {
        match *change {
            RowChange::Inserted { at } => self.surface.insert_row(at),
            RowChange::Deleted { at } => self.surface.delete_row(at),
            RowChange::Updated { at } => match snapshot.item_at(at.section, at.row) {
                Ok(item) => self.surface.refresh_row(at, DisplayFields::from_item(item)),
                Err(err) => log::warn!("refresh skipped, stale position {at:?}: {err}"),
            },
            // A move reaches the surface as delete-then-insert.
            RowChange::Moved { from, to } => {
                self.surface.delete_row(from);
                self.surface.insert_row(to);
            }
        }
    }

    fn did_change(&mut self) {
        self.surface.end_batch_edit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;
    use crate::store::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Begin,
        End,
        Insert(RowPos),
        Delete(RowPos),
        Refresh(RowPos, String),
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl DisplaySurface for RecordingSurface {
        fn begin_batch_edit(&mut self) {
            self.ops.push(Op::Begin);
        }

        fn end_batch_edit(&mut self) {
            self.ops.push(Op::End);
        }

        fn insert_row(&mut self, at: RowPos) {
            self.ops.push(Op::Insert(at));
        }

        fn delete_row(&mut self, at: RowPos) {
            self.ops.push(Op::Delete(at));
        }

        fn refresh_row(&mut self, at: RowPos, fields: DisplayFields) {
            self.ops.push(Op::Refresh(at, fields.title));
        }
    }

    fn bound_pair() -> (
        LiveList<MemoryStore>,
        Rc<RefCell<ListPresenter<RecordingSurface>>>,
    ) {
        let presenter = Rc::new(RefCell::new(ListPresenter::new(
            RecordingSurface::default(),
        )));
        let mut list = LiveList::new(MemoryStore::new());
        list.open("created", false).unwrap();
        list.bind(presenter.clone()).unwrap();
        (list, presenter)
    }

    fn ops(presenter: &Rc<RefCell<ListPresenter<RecordingSurface>>>) -> Vec<Op> {
        presenter.borrow().surface().ops.clone()
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(1800.0), "1800.00");
        assert_eq!(format_price(300.5), "300.50");
        assert_eq!(format_price(0.0), "0.00");
    }

    #[test]
    fn display_fields_default_empty_details() {
        let item = Item {
            id: crate::item::ItemId::generate(),
            title: "MacBook Pro".to_string(),
            price: 1800.0,
            details: None,
            created: 1,
        };
        let fields = DisplayFields::from_item(&item);
        assert_eq!(fields.title, "MacBook Pro");
        assert_eq!(fields.price, "1800.00");
        assert_eq!(fields.details, "");
    }

    #[test]
    fn insert_brackets_one_batch() {
        let (mut list, presenter) = bound_pair();
        list.create(ItemDraft::new("MacBook Pro", 1800.0)).unwrap();
        list.save().unwrap();

        assert_eq!(
            ops(&presenter),
            vec![Op::Begin, Op::Insert(RowPos::new(0, 0)), Op::End]
        );
    }

    #[test]
    fn delete_reaches_surface() {
        let (mut list, presenter) = bound_pair();
        let item = list.create(ItemDraft::new("gone", 1.0)).unwrap();
        list.save().unwrap();

        list.delete(&item.id).unwrap();
        list.save().unwrap();

        let ops = ops(&presenter);
        assert_eq!(
            ops[3..],
            [Op::Begin, Op::Delete(RowPos::new(0, 0)), Op::End]
        );
    }

    #[test]
    fn update_refreshes_with_new_content() {
        let (mut list, presenter) = bound_pair();
        let item = list.create(ItemDraft::new("old title", 1.0)).unwrap();
        list.save().unwrap();

        list.update(&item.id, ItemDraft::new("new title", 1.0))
            .unwrap();
        list.save().unwrap();

        let ops = ops(&presenter);
        assert_eq!(
            ops[3..],
            [
                Op::Begin,
                Op::Refresh(RowPos::new(0, 0), "new title".to_string()),
                Op::End
            ]
        );
    }

    #[test]
    fn move_is_delete_then_insert_at_surface() {
        let presenter = Rc::new(RefCell::new(ListPresenter::new(
            RecordingSurface::default(),
        )));
        let mut list = LiveList::new(MemoryStore::new());
        list.open("title", true).unwrap();

        let alpha = list.create(ItemDraft::new("alpha", 1.0)).unwrap();
        list.create(ItemDraft::new("mid", 2.0)).unwrap();
        list.save().unwrap();
        list.bind(presenter.clone()).unwrap();

        // Renaming reorders under the title sort.
        list.update(&alpha.id, ItemDraft::new("zzz", 1.0)).unwrap();
        list.save().unwrap();

        let ops = ops(&presenter);
        assert_eq!(ops.first(), Some(&Op::Begin));
        assert_eq!(ops.last(), Some(&Op::End));
        let deletes = ops.iter().filter(|op| matches!(op, Op::Delete(_))).count();
        let inserts = ops.iter().filter(|op| matches!(op, Op::Insert(_))).count();
        assert_eq!(deletes, 1);
        assert_eq!(inserts, 1);
        let delete_idx = ops.iter().position(|op| matches!(op, Op::Delete(_))).unwrap();
        let insert_idx = ops.iter().position(|op| matches!(op, Op::Insert(_))).unwrap();
        assert!(delete_idx < insert_idx);
    }

    #[test]
    fn populate_resolves_and_formats() {
        let (mut list, presenter) = bound_pair();
        list.create(ItemDraft::new("Bose Headphones", 300.0)).unwrap();
        list.save().unwrap();

        let fields = presenter.borrow().populate(&list, 0, 0).unwrap();
        assert_eq!(fields.title, "Bose Headphones");
        assert_eq!(fields.price, "300.00");
    }

    #[test]
    fn populate_out_of_range() {
        let (list, presenter) = bound_pair();
        let err = presenter.borrow().populate(&list, 0, 0).unwrap_err();
        assert!(matches!(err, ListError::IndexOutOfRange { .. }));
    }

    #[test]
    fn count_delegation() {
        let (mut list, presenter) = bound_pair();
        list.create(ItemDraft::new("one", 1.0)).unwrap();
        list.save().unwrap();

        let presenter = presenter.borrow();
        assert_eq!(presenter.section_count(&list), 1);
        assert_eq!(presenter.row_count(&list, 0).unwrap(), 1);
    }
}
