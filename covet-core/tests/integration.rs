//! Scenario tests driving the full chain: store, live list, presenter,
//! display surface.

use std::cell::RefCell;
use std::rc::Rc;

use covet_core::{
    DisplayFields, DisplaySurface, ItemDraft, ListError, ListObserver, ListPresenter, LiveList,
    MemoryStore, RowChange, RowPos, Snapshot,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Will,
    Change(RowChange),
    Did,
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl ListObserver for Recorder {
    fn will_change(&mut self) {
        self.events.push(Event::Will);
    }

    fn change(&mut self, change: &RowChange, _snapshot: &Snapshot) {
        self.events.push(Event::Change(*change));
    }

    fn did_change(&mut self) {
        self.events.push(Event::Did);
    }
}

/// A display model that applies presenter edits literally. Inserted rows
/// stay unpopulated until a render pass fills them in.
#[derive(Default)]
struct ModelSurface {
    rows: Vec<Option<String>>,
    in_batch: bool,
    batches: usize,
}

impl DisplaySurface for ModelSurface {
    fn begin_batch_edit(&mut self) {
        assert!(!self.in_batch, "nested batch");
        self.in_batch = true;
        self.batches += 1;
    }

    fn end_batch_edit(&mut self) {
        assert!(self.in_batch, "unbalanced batch end");
        self.in_batch = false;
    }

    fn insert_row(&mut self, at: RowPos) {
        assert!(self.in_batch, "edit outside batch");
        self.rows.insert(at.row, None);
    }

    fn delete_row(&mut self, at: RowPos) {
        assert!(self.in_batch, "edit outside batch");
        self.rows.remove(at.row);
    }

    fn refresh_row(&mut self, at: RowPos, fields: DisplayFields) {
        assert!(self.in_batch, "edit outside batch");
        self.rows[at.row] = Some(fields.title);
    }
}

fn recorded_list() -> (LiveList<MemoryStore>, Rc<RefCell<Recorder>>) {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut list = LiveList::new(MemoryStore::new());
    list.open("created", false).unwrap();
    list.bind(recorder.clone()).unwrap();
    (list, recorder)
}

fn presented_list() -> (
    LiveList<MemoryStore>,
    Rc<RefCell<ListPresenter<ModelSurface>>>,
) {
    let presenter = Rc::new(RefCell::new(ListPresenter::new(ModelSurface::default())));
    let mut list = LiveList::new(MemoryStore::new());
    list.open("created", false).unwrap();
    list.bind(presenter.clone()).unwrap();
    (list, presenter)
}

/// Fills unpopulated surface rows the way a render pass would.
fn render_pass(list: &LiveList<MemoryStore>, presenter: &Rc<RefCell<ListPresenter<ModelSurface>>>) {
    let count = list.row_count(0).unwrap_or(0);
    for row in 0..count {
        if presenter.borrow().surface().rows[row].is_none() {
            let fields = presenter.borrow().populate(list, 0, row).unwrap();
            presenter.borrow_mut().surface_mut().rows[row] = Some(fields.title);
        }
    }
}

fn surface_titles(presenter: &Rc<RefCell<ListPresenter<ModelSurface>>>) -> Vec<String> {
    presenter
        .borrow()
        .surface()
        .rows
        .iter()
        .map(|row| row.clone().unwrap_or_default())
        .collect()
}

#[test]
fn empty_store_opens_to_one_empty_section() {
    let mut list = LiveList::new(MemoryStore::new());
    list.open("created", false).unwrap();

    assert_eq!(list.section_count(), 1);
    assert_eq!(list.row_count(0).unwrap(), 0);

    let err = list.item_at(0, 0).unwrap_err();
    assert!(matches!(
        err,
        ListError::IndexOutOfRange { section: 0, row: 0 }
    ));
}

#[test]
fn single_insert_notifies_at_row_zero() {
    let (mut list, recorder) = recorded_list();

    list.create(
        ItemDraft::new("MacBook Pro", 1800.0)
            .with_details("I just can't believe, i want to buy this piece of tech."),
    )
    .unwrap();
    list.save().unwrap();

    assert_eq!(
        recorder.borrow().events,
        vec![
            Event::Will,
            Event::Change(RowChange::Inserted {
                at: RowPos::new(0, 0)
            }),
            Event::Did,
        ]
    );
    assert_eq!(list.row_count(0).unwrap(), 1);
    assert_eq!(list.item_at(0, 0).unwrap().title, "MacBook Pro");
}

#[test]
fn three_inserts_order_newest_first() {
    let (mut list, _recorder) = recorded_list();

    list.create(ItemDraft::new("first", 1.0)).unwrap();
    list.save().unwrap();
    list.create(ItemDraft::new("second", 2.0)).unwrap();
    list.save().unwrap();
    list.create(ItemDraft::new("third", 3.0)).unwrap();
    list.save().unwrap();

    let titles: Vec<&str> = (0..3)
        .map(|row| list.item_at(0, row).unwrap().title.as_str())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    // Ordering invariant: adjacent rows are newest-first.
    for row in 0..2 {
        assert!(
            list.item_at(0, row).unwrap().created >= list.item_at(0, row + 1).unwrap().created
        );
    }
}

#[test]
fn delete_row_one_notifies_and_shrinks() {
    let (mut list, recorder) = recorded_list();
    for title in ["a", "b", "c"] {
        list.create(ItemDraft::new(title, 1.0)).unwrap();
    }
    list.save().unwrap();
    assert_eq!(list.row_count(0).unwrap(), 3);
    recorder.borrow_mut().events.clear();

    let victim = list.item_at(0, 1).unwrap().id;
    list.delete(&victim).unwrap();
    list.save().unwrap();

    assert_eq!(
        recorder.borrow().events,
        vec![
            Event::Will,
            Event::Change(RowChange::Deleted {
                at: RowPos::new(0, 1)
            }),
            Event::Did,
        ]
    );
    assert_eq!(list.row_count(0).unwrap(), 2);
}

#[test]
fn title_update_refreshes_current_row() {
    let (mut list, recorder) = recorded_list();
    for title in ["a", "b", "c"] {
        list.create(ItemDraft::new(title, 1.0)).unwrap();
    }
    list.save().unwrap();
    recorder.borrow_mut().events.clear();

    // Row 1 is "b" under the newest-first order.
    let target = list.item_at(0, 1).unwrap().id;
    list.update(&target, ItemDraft::new("b renamed", 1.0)).unwrap();
    list.save().unwrap();

    assert_eq!(
        recorder.borrow().events,
        vec![
            Event::Will,
            Event::Change(RowChange::Updated {
                at: RowPos::new(0, 1)
            }),
            Event::Did,
        ]
    );
    assert_eq!(list.item_at(0, 1).unwrap().title, "b renamed");
}

#[test]
fn counts_are_idempotent_between_batches() {
    let (mut list, _recorder) = recorded_list();
    list.create(ItemDraft::new("only", 1.0)).unwrap();
    list.save().unwrap();

    for _ in 0..4 {
        assert_eq!(list.section_count(), 1);
        assert_eq!(list.row_count(0).unwrap(), 1);
    }
}

#[test]
fn surface_mirrors_list_through_mutations() {
    let (mut list, presenter) = presented_list();

    // Grow one at a time, rendering between commits.
    for title in ["first", "second", "third"] {
        list.create(ItemDraft::new(title, 1.0)).unwrap();
        list.save().unwrap();
        render_pass(&list, &presenter);
    }
    assert_eq!(surface_titles(&presenter), vec!["third", "second", "first"]);

    // One batch with a delete and an update.
    let gone = list.item_at(0, 2).unwrap().id;
    let renamed = list.item_at(0, 0).unwrap().id;
    list.delete(&gone).unwrap();
    list.update(&renamed, ItemDraft::new("third, kept", 1.0))
        .unwrap();
    list.save().unwrap();
    render_pass(&list, &presenter);

    assert_eq!(surface_titles(&presenter), vec!["third, kept", "second"]);
    assert_eq!(presenter.borrow().surface().batches, 4);
}

#[test]
fn rename_under_title_sort_moves_surface_rows() {
    let presenter = Rc::new(RefCell::new(ListPresenter::new(ModelSurface::default())));
    let mut list = LiveList::new(MemoryStore::new());
    list.open("title", true).unwrap();

    let alpha = list.create(ItemDraft::new("alpha", 1.0)).unwrap();
    list.create(ItemDraft::new("mid", 2.0)).unwrap();
    list.create(ItemDraft::new("zed", 3.0)).unwrap();
    list.save().unwrap();
    list.bind(presenter.clone()).unwrap();
    render_pass(&list, &presenter);
    assert_eq!(surface_titles(&presenter), vec!["alpha", "mid", "zed"]);

    list.update(&alpha.id, ItemDraft::new("zzz", 1.0)).unwrap();
    list.save().unwrap();
    render_pass(&list, &presenter);

    assert_eq!(surface_titles(&presenter), vec!["mid", "zed", "zzz"]);
}

#[test]
fn one_commit_is_one_batch() {
    let (mut list, presenter) = presented_list();

    list.create(ItemDraft::new("a", 1.0)).unwrap();
    list.create(ItemDraft::new("b", 2.0)).unwrap();
    list.create(ItemDraft::new("c", 3.0)).unwrap();
    list.save().unwrap();

    assert_eq!(presenter.borrow().surface().batches, 1);
    assert_eq!(presenter.borrow().surface().rows.len(), 3);
}
