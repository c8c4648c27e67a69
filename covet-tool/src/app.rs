//! Wishlist screen state machine.

use std::cell::RefCell;
use std::io::{self, stdout};
use std::rc::Rc;

use covet_core::{DisplayFields, ItemDraft, ItemId, ListError, ListPresenter, LiveList};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::store::AnyStore;
use crate::surface::RowBuffer;
use crate::ui;

/// Sort cycle driven by the `s` key: key name plus direction.
pub const SORT_CYCLE: [(&str, bool); 3] = [("created", false), ("title", true), ("price", true)];

/// Which field of the entry form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Price,
    Details,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Price,
            FormField::Price => FormField::Details,
            FormField::Details => FormField::Title,
        }
    }
}

/// An in-progress add or edit.
pub struct Form {
    /// `None` when adding, the edited item's id otherwise.
    pub target: Option<ItemId>,
    pub field: FormField,
    pub title: String,
    pub price: String,
    pub details: String,
}

impl Form {
    fn blank() -> Self {
        Form {
            target: None,
            field: FormField::Title,
            title: String::new(),
            price: String::new(),
            details: String::new(),
        }
    }

    pub fn input(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Price => &self.price,
            FormField::Details => &self.details,
        }
    }

    fn input_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Price => &mut self.price,
            FormField::Details => &mut self.details,
        }
    }
}

/// Application state.
pub struct App {
    pub list: LiveList<AnyStore>,
    pub presenter: Rc<RefCell<ListPresenter<RowBuffer>>>,
    pub selected: usize,
    pub form: Option<Form>,
    pub sort_index: usize,
    pub should_quit: bool,
    pub last_error: Option<String>,
}

impl App {
    /// Wraps a store and performs the initial fetch.
    ///
    /// A failed fetch leaves an empty screen with the error shown; `r`
    /// retries it.
    pub fn new(store: AnyStore) -> Self {
        let presenter = Rc::new(RefCell::new(ListPresenter::new(RowBuffer::new())));
        let mut list = LiveList::new(store);
        let (key, ascending) = SORT_CYCLE[0];
        let last_error = list.open(key, ascending).err().map(|e| e.to_string());
        // First bind cannot fail.
        let _ = list.bind(presenter.clone());

        let mut app = App {
            list,
            presenter,
            selected: 0,
            form: None,
            sort_index: 0,
            should_quit: false,
            last_error,
        };
        app.reload_rows();
        app
    }

    /// Stages and commits the three demo entries.
    pub fn seed_demo(&mut self) -> Result<(), ListError> {
        self.list.create(ItemDraft::new("MacBook Pro", 1800.0).with_details(
            "I just can't believe, i want to buy this piece of tech which i don't know why is so costly.",
        ))?;
        self.list.create(ItemDraft::new("Bose Headphones", 300.0).with_details(
            "But man, its so nice to be able to block out everyone with the noise canceling tech. Again out of my Reach.",
        ))?;
        self.list.create(ItemDraft::new("Tesla Model S", 110000.0).with_details(
            "This car is accident proof and can fly for maximum of 35 minutes. I can't afford to buy it even in my dreams.",
        ))?;
        self.list.save()
    }

    /// Run the TUI application.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            terminal.draw(|frame| ui::render(frame, self))?;

            if self.should_quit {
                break;
            }

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        if self.form.is_some() {
            self.handle_form_key(code);
            return;
        }
        self.last_error = None;

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.row_count() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('a') => {
                self.form = Some(Form::blank());
            }
            KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('s') => self.cycle_sort(),
            KeyCode::Char('r') => self.reopen(),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.form = None;
            }
            KeyCode::Enter => {
                let on_last = matches!(
                    self.form.as_ref().map(|form| form.field),
                    Some(FormField::Details)
                );
                if on_last {
                    self.submit_form();
                } else if let Some(form) = self.form.as_mut() {
                    form.field = form.field.next();
                }
            }
            KeyCode::Tab => {
                if let Some(form) = self.form.as_mut() {
                    form.field = form.field.next();
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = self.form.as_mut() {
                    form.input_mut().pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.form.as_mut() {
                    form.input_mut().push(c);
                }
            }
            _ => {}
        }
    }

    fn begin_edit(&mut self) {
        match self.list.item_at(0, self.selected) {
            Ok(item) => {
                self.form = Some(Form {
                    target: Some(item.id),
                    field: FormField::Title,
                    title: item.title.clone(),
                    price: item.price.to_string(),
                    details: item.details.clone().unwrap_or_default(),
                });
            }
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };
        let price = match form.price.trim().parse::<f64>() {
            Ok(price) => price,
            Err(_) => {
                self.last_error = Some(format!("not a price: {}", form.price));
                self.form = Some(form);
                return;
            }
        };

        let mut draft = ItemDraft::new(form.title.trim(), price);
        let details = form.details.trim();
        if !details.is_empty() {
            draft = draft.with_details(details);
        }

        let outcome = match form.target {
            Some(id) => self.list.update(&id, draft),
            None => self.list.create(draft).map(|_| ()),
        };
        let outcome = outcome.and_then(|_| self.list.save());
        match outcome {
            Ok(()) => self.clamp_selection(),
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    fn delete_selected(&mut self) {
        let id = match self.list.item_at(0, self.selected) {
            Ok(item) => item.id,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return;
            }
        };
        if let Err(err) = self.delete_and_save(&id) {
            self.last_error = Some(err.to_string());
        }
        self.clamp_selection();
    }

    fn delete_and_save(&mut self, id: &ItemId) -> Result<(), ListError> {
        self.list.delete(id)?;
        self.list.save()
    }

    fn cycle_sort(&mut self) {
        self.sort_index = (self.sort_index + 1) % SORT_CYCLE.len();
        self.reopen();
    }

    /// Re-runs the eager fetch: sort switch, or retry after a failed open.
    fn reopen(&mut self) {
        let (key, ascending) = SORT_CYCLE[self.sort_index];
        if let Err(err) = self.list.open(key, ascending) {
            self.last_error = Some(err.to_string());
        }
        self.reload_rows();
    }

    /// Full surface reload; incremental edits take over afterwards.
    fn reload_rows(&mut self) {
        let rows = self.row_count();
        self.presenter.borrow_mut().surface_mut().reset(rows);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let rows = self.row_count();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    pub fn row_count(&self) -> usize {
        self.list.row_count(0).unwrap_or(0)
    }

    pub fn sort_label(&self) -> String {
        match self.list.sort() {
            Some(spec) => format!(
                "{} {}",
                spec.key.name(),
                if spec.ascending { "asc" } else { "desc" }
            ),
            None => "detached".to_string(),
        }
    }

    /// Returns the populated display rows, resolving any the surface has
    /// not cached yet.
    pub fn visible_rows(&mut self) -> Vec<DisplayFields> {
        let count = self.row_count();
        let mut out = Vec::with_capacity(count);
        for row in 0..count {
            let cached = self.presenter.borrow().surface().row(row).cloned();
            let fields = match cached {
                Some(fields) => fields,
                None => match self.presenter.borrow().populate(&self.list, 0, row) {
                    Ok(fields) => {
                        self.presenter
                            .borrow_mut()
                            .surface_mut()
                            .set_row(row, fields.clone());
                        fields
                    }
                    Err(_) => DisplayFields {
                        title: String::new(),
                        price: String::new(),
                        details: String::new(),
                    },
                },
            };
            out.push(fields);
        }
        out
    }
}
