//! # Storage Module
//!
//! Append-only row stores for submitted surveys.
//!
//! - [`MemorySheet`]: in-process, for tests and dry runs
//! - [`RedbSheet`]: disk-backed via redb
//!
//! The remote spreadsheet store lives in the app layer because it needs
//! network access; it mirrors the same contract.

mod redb_sheet;

pub use redb_sheet::RedbSheet;

use crate::SurveyError;
use crate::batcher::SubmissionRow;

/// A destination for submission rows.
///
/// One call to [`SheetStore::append_rows`] appends a whole batch or nothing.
pub trait SheetStore {
    /// Append all rows, in order. Returns the number of rows written.
    fn append_rows(&mut self, rows: &[SubmissionRow]) -> Result<usize, SurveyError>;

    /// Total rows stored so far.
    fn row_count(&self) -> Result<usize, SurveyError>;

    /// Every stored row, in append order.
    fn rows(&self) -> Result<Vec<SubmissionRow>, SurveyError>;
}

/// In-memory row store.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    rows: Vec<SubmissionRow>,
    append_calls: usize,
}

impl MemorySheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `append_rows` calls received.
    #[must_use]
    pub fn append_calls(&self) -> usize {
        self.append_calls
    }
}

impl SheetStore for MemorySheet {
    fn append_rows(&mut self, rows: &[SubmissionRow]) -> Result<usize, SurveyError> {
        self.append_calls = self.append_calls.saturating_add(1);
        self.rows.extend_from_slice(rows);
        Ok(rows.len())
    }

    fn row_count(&self) -> Result<usize, SurveyError> {
        Ok(self.rows.len())
    }

    fn rows(&self) -> Result<Vec<SubmissionRow>, SurveyError> {
        Ok(self.rows.clone())
    }
}
