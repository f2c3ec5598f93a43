//! # CLI Command Implementations

use crate::api::{self, AppState, CatalogResponse};
use crate::config::{BackendKind, Config};
use crate::response::ResponseFile;
use crate::store::{self, SheetBackend, timestamp_now};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use survey_core::{Criterion, ROW_HEADER, RedbSheet, Scale, Session, SubmissionRow, SurveyError};

/// Resolve a user-supplied input path to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, SurveyError> {
    let canonical = path.canonicalize().map_err(|e| {
        SurveyError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(SurveyError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_row(row: &SubmissionRow) {
    println!("{}", row.cells().join(" | "));
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), SurveyError> {
    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);

    let catalog = config.survey.load_catalog()?;
    let backend = SheetBackend::open(&config.store)?;
    let policy = config.survey.policy();

    println!("Survey Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:         {}", host);
    println!("  Port:         {}", port);
    println!("  Store:        {}", backend.kind().as_str());
    println!("  Categories:   {}", catalog.len());
    println!("  Indicators:   {}", catalog.indicator_count());
    println!("  Name required: {}", policy.require_name);
    println!();
    println!("Endpoints:");
    println!("  GET  /catalog            - Form definition");
    println!("  GET  /session            - Session snapshot");
    println!("  PUT  /session/profile    - Respondent profile");
    println!("  PUT  /session/selection  - Category selection");
    println!("  POST /session/evaluate   - Start evaluation");
    println!("  PUT  /session/answers    - Set answers");
    println!("  POST /session/submit     - Submit");
    println!("  GET  /health             - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(Session::new(Arc::new(catalog)), backend, policy);
    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// Print the catalog, criteria and scale.
pub fn cmd_catalog(config: &Config, json_mode: bool, verbose: bool) -> Result<(), SurveyError> {
    let catalog = config.survey.load_catalog()?;

    if json_mode {
        let response = CatalogResponse::from_catalog(&catalog);
        print_json(&serde_json::to_value(&response).unwrap_or_default());
        return Ok(());
    }

    println!("Indicator Catalog");
    println!("=================");
    for category in catalog.categories() {
        println!("{} ({})", category.name, category.indicators.len());
        if verbose {
            for indicator in &category.indicators {
                println!("  - {}", indicator);
            }
        }
    }
    println!();
    println!(
        "Criteria: {}",
        Criterion::ALL.map(|c| c.label()).join(", ")
    );
    println!("Scale:    {}", Scale::ALL.map(|s| s.label()).join(", "));

    Ok(())
}

// =============================================================================
// SUBMIT COMMAND
// =============================================================================

/// Replay a response file and submit it once.
pub async fn cmd_submit(
    config: &Config,
    json_mode: bool,
    verbose: bool,
    file: &Path,
    dry_run: bool,
) -> Result<(), SurveyError> {
    let path = validate_file_path(file)?;
    let catalog = Arc::new(config.survey.load_catalog()?);
    let session = ResponseFile::from_path(&path)?.into_session(catalog)?;
    let policy = config.survey.policy();

    for warning in session.warnings() {
        tracing::warn!("{}", warning.message());
    }

    let timestamp = timestamp_now();
    let (batch, backend_name) = if dry_run {
        (session.prepare_submission(policy, &timestamp)?, "none")
    } else {
        let mut backend = SheetBackend::open(&config.store)?;
        let (_, batch) = store::submit(&session, &mut backend, policy, &timestamp).await?;
        (batch, backend.kind().as_str())
    };

    if json_mode {
        print_json(&serde_json::json!({
            "success": true,
            "dry_run": dry_run,
            "backend": backend_name,
            "timestamp": batch.timestamp(),
            "rows": batch.len(),
        }));
        return Ok(());
    }

    if verbose || dry_run {
        println!("{}", ROW_HEADER.join(" | "));
        for row in batch.rows() {
            print_row(row);
        }
        println!();
    }
    if dry_run {
        println!("Dry run: {} rows validated, nothing sent", batch.len());
    } else {
        println!(
            "Submitted {} rows to {} at {}",
            batch.len(),
            backend_name,
            batch.timestamp()
        );
    }

    Ok(())
}

// =============================================================================
// ROWS COMMAND
// =============================================================================

/// List stored rows, oldest first.
pub fn cmd_rows(
    config: &Config,
    json_mode: bool,
    verbose: bool,
    limit: Option<usize>,
) -> Result<(), SurveyError> {
    let backend = SheetBackend::open(&config.store)?;
    let rows = backend.rows()?;
    let skip = limit.map_or(0, |n| rows.len().saturating_sub(n));
    let shown = &rows[skip..];

    if json_mode {
        print_json(&serde_json::to_value(shown).unwrap_or_default());
        return Ok(());
    }

    println!("Stored rows: {} (showing {})", rows.len(), shown.len());
    if verbose {
        println!("{}", ROW_HEADER.join(" | "));
    }
    for row in shown {
        if verbose {
            print_row(row);
        } else {
            println!(
                "{}  {} / {} / {} = {}",
                row.timestamp, row.category, row.indicator, row.criterion, row.answer
            );
        }
    }

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create the local row database.
pub fn cmd_init(config: &Config, force: bool) -> Result<(), SurveyError> {
    if config.store.backend != BackendKind::Local {
        return Err(SurveyError::InvalidInput(format!(
            "init applies to the local backend, configured backend is '{}'",
            config.store.backend.as_str()
        )));
    }

    let path = &config.store.path;
    if path.exists() {
        if !force {
            return Err(SurveyError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(path).map_err(|e| {
            SurveyError::IoError(format!("Cannot remove '{}': {}", path.display(), e))
        })?;
    }

    RedbSheet::open(path)?;
    println!("Initialized new row database at {:?}", path);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
