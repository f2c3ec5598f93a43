//! # redb-backed Row Storage
//!
//! A disk-backed submission sheet using the redb embedded database.
//!
//! Each `append_rows` call is one write transaction: the rows and the
//! row counter commit together, so a crash never leaves half a batch.

use crate::SurveyError;
use crate::batcher::SubmissionRow;
use crate::formats::{row_from_bytes, row_to_bytes};
use crate::storage::SheetStore;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for rows: sequence number -> encoded row bytes
const ROWS: TableDefinition<u64, &[u8]> = TableDefinition::new("rows");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_ROW_KEY: &str = "next_row";

/// A disk-backed row store using redb.
pub struct RedbSheet {
    /// The redb database handle.
    db: Database,
    /// Sequence number of the next appended row.
    next_row: u64,
}

impl std::fmt::Debug for RedbSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbSheet")
            .field("next_row", &self.next_row)
            .finish_non_exhaustive()
    }
}

impl RedbSheet {
    /// Open or create a sheet database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SurveyError> {
        let db =
            Database::create(path.as_ref()).map_err(|e| SurveyError::IoError(e.to_string()))?;

        // Initialize tables if they don't exist
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(ROWS)
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
            let _ = write_txn
                .open_table(METADATA)
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
            write_txn
                .commit()
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
        }

        let next_row = {
            let read_txn = db
                .begin_read()
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
            let table = read_txn
                .open_table(METADATA)
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
            table
                .get(NEXT_ROW_KEY)
                .map_err(|e| SurveyError::IoError(e.to_string()))?
                .map_or(0, |v| v.value())
        };

        Ok(Self { db, next_row })
    }
}

impl SheetStore for RedbSheet {
    fn append_rows(&mut self, rows: &[SubmissionRow]) -> Result<usize, SurveyError> {
        if rows.is_empty() {
            return Ok(0);
        }

        // Encode everything before the transaction opens.
        let encoded = rows
            .iter()
            .map(row_to_bytes)
            .collect::<Result<Vec<_>, _>>()?;

        let mut next = self.next_row;
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| SurveyError::IoError(e.to_string()))?;
        {
            let mut rows_table = write_txn
                .open_table(ROWS)
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
            for bytes in &encoded {
                rows_table
                    .insert(next, bytes.as_slice())
                    .map_err(|e| SurveyError::IoError(e.to_string()))?;
                next = next.saturating_add(1);
            }

            let mut meta_table = write_txn
                .open_table(METADATA)
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
            meta_table
                .insert(NEXT_ROW_KEY, next)
                .map_err(|e| SurveyError::IoError(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| SurveyError::IoError(e.to_string()))?;

        self.next_row = next;
        Ok(encoded.len())
    }

    fn row_count(&self) -> Result<usize, SurveyError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| SurveyError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(ROWS)
            .map_err(|e| SurveyError::IoError(e.to_string()))?;
        let len = table
            .len()
            .map_err(|e| SurveyError::IoError(e.to_string()))?;
        usize::try_from(len).map_err(|e| SurveyError::IoError(e.to_string()))
    }

    fn rows(&self) -> Result<Vec<SubmissionRow>, SurveyError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| SurveyError::IoError(e.to_string()))?;
        let table = read_txn
            .open_table(ROWS)
            .map_err(|e| SurveyError::IoError(e.to_string()))?;

        let mut rows = Vec::new();
        for entry in table
            .iter()
            .map_err(|e| SurveyError::IoError(e.to_string()))?
        {
            let (_, value) = entry.map_err(|e| SurveyError::IoError(e.to_string()))?;
            rows.push(row_from_bytes(value.value())?);
        }
        Ok(rows)
    }
}

// =============================================================================
// TESTS
// =============================================================================
