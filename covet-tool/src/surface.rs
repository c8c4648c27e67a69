//! Retained row buffer implementing the display surface.

use covet_core::{DisplayFields, DisplaySurface, RowPos};

/// Display rows as last instructed by the presenter.
///
/// Rows inserted mid-batch are placeholders; the render pass populates
/// them on demand and caches the result here. A retained buffer applies
/// edits immediately, so the batch markers need no deferral.
#[derive(Debug, Default)]
pub struct RowBuffer {
    rows: Vec<Option<DisplayFields>>,
}

impl RowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, row: usize) -> Option<&DisplayFields> {
        self.rows.get(row).and_then(|slot| slot.as_ref())
    }

    pub fn set_row(&mut self, row: usize, fields: DisplayFields) {
        if let Some(slot) = self.rows.get_mut(row) {
            *slot = Some(fields);
        }
    }

    /// Full reload to the given row count (after an open or reopen).
    pub fn reset(&mut self, rows: usize) {
        self.rows = vec![None; rows];
    }
}

impl DisplaySurface for RowBuffer {
    fn begin_batch_edit(&mut self) {}

    fn end_batch_edit(&mut self) {}

    fn insert_row(&mut self, at: RowPos) {
        if at.row <= self.rows.len() {
            self.rows.insert(at.row, None);
        }
    }

    fn delete_row(&mut self, at: RowPos) {
        if at.row < self.rows.len() {
            self.rows.remove(at.row);
        }
    }

    fn refresh_row(&mut self, at: RowPos, fields: DisplayFields) {
        if let Some(slot) = self.rows.get_mut(at.row) {
            *slot = Some(fields);
        }
    }
}
