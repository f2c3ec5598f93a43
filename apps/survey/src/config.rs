//! # Configuration
//!
//! `survey.toml` loading. Every field has a default. The default store is the
//! remote spreadsheet, so `[store].spreadsheet_id` and the token env var must
//! be set unless `backend` is switched to `local` or `memory`.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [store]
//! backend = "sheets"            # sheets | local | memory
//! spreadsheet_id = "1AbC..."
//! sheet = "Respuestas"
//! token_env = "SURVEY_SHEETS_TOKEN"
//!
//! [survey]
//! require_name = true
//! catalog_file = "catalog.toml"
//! ```
//!
//! Lookup order: `--config`, then `SURVEY_CONFIG`, then `./survey.toml`,
//! then built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use survey_core::{Catalog, Category, SurveyError, ValidationPolicy};

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "survey.toml";

/// Maximum size of a config or catalog file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub survey: SurveyConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Which store receives submitted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Remote spreadsheet over HTTP.
    #[default]
    Sheets,
    /// redb file on local disk.
    Local,
    /// In-process only; rows are lost on exit.
    Memory,
}

impl BackendKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sheets => "sheets",
            BackendKind::Local => "local",
            BackendKind::Memory => "memory",
        }
    }
}

/// Store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// redb file for the `local` backend.
    pub path: PathBuf,
    /// Base URL of the spreadsheet API.
    pub endpoint: String,
    pub spreadsheet_id: String,
    /// Target tab; rows are appended after its last row.
    pub sheet: String,
    /// Name of the env var holding the bearer token.
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: PathBuf::from("survey.redb"),
            endpoint: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: String::new(),
            sheet: "Sheet1".to_string(),
            token_env: "SURVEY_SHEETS_TOKEN".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Form behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Reject submissions without a respondent name.
    pub require_name: bool,
    /// TOML file replacing the built-in catalog.
    pub catalog_file: Option<PathBuf>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            require_name: true,
            catalog_file: None,
        }
    }
}

impl SurveyConfig {
    /// Validation policy derived from this section.
    #[must_use]
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            require_name: self.require_name,
        }
    }

    /// Load the configured catalog, or the built-in one.
    pub fn load_catalog(&self) -> Result<Catalog, SurveyError> {
        match &self.catalog_file {
            Some(path) => load_catalog_file(path),
            None => Ok(Catalog::builtin()),
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SurveyError> {
        toml::from_str(text).map_err(|e| SurveyError::InvalidInput(format!("config: {}", e)))
    }

    /// Resolve and load the configuration.
    ///
    /// An explicit path (flag or env var) must exist. The working-directory
    /// default is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SurveyError> {
        let from_env = std::env::var("SURVEY_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_toml_str(&read_limited(&path)?);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            tracing::info!("Loading config from: {}", default_path.display());
            return Self::from_toml_str(&read_limited(default_path)?);
        }

        tracing::info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
        Ok(Self::default())
    }
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    categories: Vec<Category>,
}

/// Load and validate a catalog from a TOML file.
///
/// ```toml
/// [[categories]]
/// name = "Calidad del Aire"
/// indicators = ["Monitoreo de gases"]
/// ```
pub fn load_catalog_file(path: &Path) -> Result<Catalog, SurveyError> {
    let text = read_limited(path)?;
    let file: CatalogFile = toml::from_str(&text)
        .map_err(|e| SurveyError::InvalidCatalog(format!("{}: {}", path.display(), e)))?;
    let catalog = Catalog::new(file.categories)?;
    tracing::info!(
        categories = catalog.len(),
        indicators = catalog.indicator_count(),
        "Loaded catalog from {}",
        path.display()
    );
    Ok(catalog)
}

/// Read a small text file, refusing anything over the size limit.
pub(crate) fn read_limited(path: &Path) -> Result<String, SurveyError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        SurveyError::IoError(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(SurveyError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| SurveyError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.store.backend, BackendKind::Sheets);
        assert!(config.store.spreadsheet_id.is_empty());
        assert!(config.survey.require_name);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
[store]
backend = "sheets"
spreadsheet_id = "abc"

[survey]
require_name = false
"#,
        )
        .expect("parse");

        assert_eq!(config.store.backend, BackendKind::Sheets);
        assert_eq!(config.store.spreadsheet_id, "abc");
        assert_eq!(config.store.token_env, "SURVEY_SHEETS_TOKEN");
        assert_eq!(config.server.port, 8080);
        assert!(!config.survey.policy().require_name);
    }

    #[test]
    fn unknown_backend_rejected() {
        let result = Config::from_toml_str("[store]\nbackend = \"ftp\"\n");
        assert!(matches!(result, Err(SurveyError::InvalidInput(_))));
    }

    #[test]
    fn catalog_file_loaded_and_validated() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
[[categories]]
name = "Ruido"
indicators = ["Mediciones de ruido", "Quejas recibidas"]
"#,
        )
        .expect("write");

        let survey = SurveyConfig {
            catalog_file: Some(path),
            ..SurveyConfig::default()
        };
        let catalog = survey.load_catalog().expect("catalog");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("Ruido", "Quejas recibidas"));
    }

    #[test]
    fn empty_catalog_file_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "categories = []\n").expect("write");

        assert!(matches!(
            load_catalog_file(&path),
            Err(SurveyError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn catalog_file_cannot_mimic_proposals() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
[[categories]]
name = "Ruido"
indicators = ["Mediciones de ruido", "(NUEVO) Quejas recibidas"]
"#,
        )
        .expect("write");

        let result = load_catalog_file(&path);
        assert!(matches!(result, Err(SurveyError::InvalidCatalog(msg)) if msg.contains("reserved prefix")));
    }
}
