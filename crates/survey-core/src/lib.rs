//! # survey-core
//!
//! The survey engine: catalog, selection, evaluation, validation and
//! row batching for the indicator survey.
//!
//! ## Layout
//!
//! - `types`: domain vocabulary (criteria, scale, profile, errors)
//! - `catalog` / `selection` / `evaluation`: the two survey stages
//! - `validator` / `batcher`: submission checks and row flattening
//! - `session`: the explicit per-respondent state
//! - `storage` / `formats`: append-only row stores and their encoding
//! - `system`: stage gating
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies
//! - Deterministic ordering everywhere (BTreeMap, catalog order)
//! - Remote stores are implemented by the app layer

// =============================================================================
// MODULES
// =============================================================================

pub mod batcher;
pub mod catalog;
pub mod evaluation;
pub mod formats;
pub mod primitives;
pub mod selection;
pub mod session;
pub mod storage;
pub mod system;
pub mod types;
pub mod validator;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AcademicLevel, AnswerKey, Criterion, Experience, Indicator, Profile, ProfileField,
    Provenance, Province, Scale, SurveyError,
};

// =============================================================================
// RE-EXPORTS: Survey Engine
// =============================================================================

pub use batcher::{ROW_HEADER, SubmissionBatch, SubmissionRow};
pub use catalog::{Catalog, Category};
pub use evaluation::{AnswerMap, CriterionAnswer, EvaluationCategory, EvaluationItem, EvaluationView};
pub use selection::{CategorySelection, SelectionSet, SelectionWarning};
pub use session::Session;
pub use storage::{MemorySheet, RedbSheet, SheetStore};
pub use validator::{CompletenessValidator, ValidationPolicy, count_missing};

// =============================================================================
// RE-EXPORTS: Formats and System
// =============================================================================

pub use formats::{MAX_ROW_PAYLOAD_SIZE, RowHeader, row_from_bytes, row_to_bytes};
pub use system::{Stage, StageCapability};
