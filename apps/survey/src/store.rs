//! # Store Backends
//!
//! The destination for submitted rows, picked once at startup from
//! `[store].backend`.
//!
//! Submission always goes through [`submit`]: validate, build one batch,
//! append it in one call, and count the submission only if the append
//! succeeded.

use crate::config::{BackendKind, StoreConfig};
use crate::sheets::SheetsClient;
use std::sync::{Arc, Mutex, MutexGuard};
use survey_core::primitives::TIMESTAMP_FORMAT;
use survey_core::{
    MemorySheet, RedbSheet, Session, SheetStore, SubmissionBatch, SubmissionRow, SurveyError,
    ValidationPolicy,
};

/// Configured row store.
#[derive(Debug)]
pub enum SheetBackend {
    /// In-process rows.
    Memory(MemorySheet),
    /// redb file on disk. Appends run on the blocking pool.
    Local(Arc<Mutex<RedbSheet>>),
    /// Remote spreadsheet.
    Remote(SheetsClient),
}

impl SheetBackend {
    /// Open the backend described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, SurveyError> {
        let backend = match config.backend {
            BackendKind::Memory => SheetBackend::Memory(MemorySheet::new()),
            BackendKind::Local => {
                SheetBackend::Local(Arc::new(Mutex::new(RedbSheet::open(&config.path)?)))
            }
            BackendKind::Sheets => SheetBackend::Remote(SheetsClient::from_config(config)?),
        };
        tracing::info!(backend = backend.kind().as_str(), "Store backend ready");
        Ok(backend)
    }

    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            SheetBackend::Memory(_) => BackendKind::Memory,
            SheetBackend::Local(_) => BackendKind::Local,
            SheetBackend::Remote(_) => BackendKind::Sheets,
        }
    }

    /// Append one batch. Local failures are reported as store failures too.
    pub async fn append(&mut self, rows: &[SubmissionRow]) -> Result<usize, SurveyError> {
        let result = match self {
            SheetBackend::Memory(sheet) => sheet.append_rows(rows),
            SheetBackend::Local(sheet) => {
                let sheet = Arc::clone(sheet);
                let rows = rows.to_vec();
                tokio::task::spawn_blocking(move || lock_sheet(&sheet)?.append_rows(&rows))
                    .await
                    .map_err(|e| SurveyError::StoreFailure(format!("append task failed: {e}")))?
            }
            SheetBackend::Remote(client) => Ok(client.append_rows(rows).await?),
        };
        result.map_err(|e| match e {
            SurveyError::StoreFailure(_) => e,
            other => SurveyError::StoreFailure(other.to_string()),
        })
    }

    /// Rows held by a readable backend.
    pub fn rows(&self) -> Result<Vec<SubmissionRow>, SurveyError> {
        match self {
            SheetBackend::Memory(sheet) => sheet.rows(),
            SheetBackend::Local(sheet) => lock_sheet(sheet)?.rows(),
            SheetBackend::Remote(_) => Err(SurveyError::InvalidInput(
                "rows of a remote sheet cannot be listed; open the spreadsheet instead"
                    .to_string(),
            )),
        }
    }
}

fn lock_sheet(sheet: &Mutex<RedbSheet>) -> Result<MutexGuard<'_, RedbSheet>, SurveyError> {
    sheet
        .lock()
        .map_err(|_| SurveyError::IoError("local sheet lock poisoned".to_string()))
}

/// Local wall-clock time in the row timestamp format.
#[must_use]
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Validate, batch and append `session` to `backend`.
///
/// Validation failures return before the store is touched. On success the
/// returned session has its submission counter advanced.
pub async fn submit(
    session: &Session,
    backend: &mut SheetBackend,
    policy: ValidationPolicy,
    timestamp: &str,
) -> Result<(Session, SubmissionBatch), SurveyError> {
    let batch = session
        .prepare_submission(policy, timestamp)
        .inspect_err(|e| {
            if e.is_validation() {
                tracing::info!(kind = e.kind(), error = %e, "Submission incomplete");
            } else {
                tracing::warn!(kind = e.kind(), error = %e, "Submission rejected");
            }
        })?;

    match backend.append(batch.rows()).await {
        Ok(written) => {
            tracing::info!(
                rows = batch.len(),
                written,
                backend = backend.kind().as_str(),
                timestamp = batch.timestamp(),
                "Submission appended"
            );
            Ok((session.clone().record_submission(), batch))
        }
        Err(e) => {
            tracing::error!(
                rows = batch.len(),
                backend = backend.kind().as_str(),
                error = %e,
                "Submission append failed"
            );
            Err(e)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{AnswerKey, Criterion, Profile, Scale};

    const AIR: &str = "Calidad del Aire";
    const GASES: &str = "Monitoreo de gases";

    fn ready_session() -> Session {
        Session::default()
            .with_profile(Profile {
                name: "Ana".to_string(),
                profession: "Bióloga".to_string(),
                ..Profile::default()
            })
            .expect("profile")
            .select(AIR, &[GASES.to_string()])
            .expect("select")
            .begin_evaluation()
            .answer_all(
                Criterion::ALL
                    .iter()
                    .map(|&c| (AnswerKey::new(AIR, GASES, c), Some(Scale::Agree))),
            )
            .expect("answers")
    }

    #[test]
    fn timestamp_has_row_format() {
        let stamp = timestamp_now();
        assert_eq!(stamp.len(), "2025-01-01 00:00:00".len());
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
    }

    #[tokio::test]
    async fn submit_to_memory_counts_submission() {
        let mut backend = SheetBackend::Memory(MemorySheet::new());
        let (session, batch) = submit(
            &ready_session(),
            &mut backend,
            ValidationPolicy::default(),
            "2025-01-01 00:00:00",
        )
        .await
        .expect("submit");

        assert_eq!(batch.len(), 4);
        assert_eq!(session.submissions(), 1);
        assert_eq!(backend.rows().expect("rows").len(), 4);
    }

    #[test]
    fn default_store_needs_spreadsheet_id() {
        let result = SheetBackend::open(&StoreConfig::default());
        assert!(matches!(result, Err(SurveyError::StoreFailure(msg)) if msg.contains("spreadsheet_id")));
    }

    #[tokio::test]
    async fn local_append_runs_on_blocking_pool() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = StoreConfig {
            backend: BackendKind::Local,
            path: dir.path().join("rows.redb"),
            ..StoreConfig::default()
        };
        let mut backend = SheetBackend::open(&config).expect("open");

        for round in 1..=2 {
            let (session, batch) = submit(
                &ready_session(),
                &mut backend,
                ValidationPolicy::default(),
                "2025-01-01 00:00:00",
            )
            .await
            .expect("submit");
            assert_eq!(batch.len(), 4);
            assert_eq!(session.submissions(), 1);
            assert_eq!(backend.rows().expect("rows").len(), 4 * round);
        }
    }

    #[tokio::test]
    async fn invalid_session_never_reaches_store() {
        let mut backend = SheetBackend::Memory(MemorySheet::new());
        let session = Session::default().begin_evaluation();

        let result = submit(&session, &mut backend, ValidationPolicy::default(), "x").await;
        assert!(matches!(result, Err(SurveyError::ProfileIncomplete { .. })));
        assert!(backend.rows().expect("rows").is_empty());
    }

    #[tokio::test]
    async fn unreachable_remote_is_store_failure() {
        let client = SheetsClient::new(
            "http://127.0.0.1:9",
            "id",
            "Sheet1",
            "token",
            std::time::Duration::from_secs(2),
        )
        .expect("client");
        let mut backend = SheetBackend::Remote(client);

        let result = submit(
            &ready_session(),
            &mut backend,
            ValidationPolicy::default(),
            "2025-01-01 00:00:00",
        )
        .await;
        assert!(matches!(result, Err(SurveyError::StoreFailure(_))));
        assert!(backend.rows().is_err());
    }
}
