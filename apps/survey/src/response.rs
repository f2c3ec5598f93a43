//! # Response Files
//!
//! A whole survey response written down as TOML, for `survey submit`.
//! The entry types are shared with the HTTP request bodies.
//!
//! ```toml
//! [profile]
//! name = "Ana"
//! profession = "Bióloga"
//! academic_level = "master"
//! province = "cartago"
//! experience = "five_to_ten"
//!
//! [[selection]]
//! category = "Calidad del Aire"
//! predefined = ["Monitoreo de gases"]
//! proposed = ["Monitoreo X"]
//!
//! [[answers]]
//! category = "Calidad del Aire"
//! indicator = "Monitoreo de gases"
//! criterion = "clarity"
//! answer = "agree"
//! ```

use crate::config::read_limited;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use survey_core::{AnswerKey, Catalog, Criterion, Profile, Scale, Session, SurveyError};

/// Selection of one category: predefined picks plus free-text slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub category: String,
    #[serde(default)]
    pub predefined: Vec<String>,
    #[serde(default)]
    pub proposed: Vec<String>,
}

impl SelectionEntry {
    /// Replace this category's picks and proposals in `session`.
    pub fn apply(&self, session: Session) -> Result<Session, SurveyError> {
        session
            .select(&self.category, &self.predefined)?
            .propose(&self.category, &self.proposed)
    }
}

/// One evaluation cell. `answer = None` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub category: String,
    pub indicator: String,
    pub criterion: Criterion,
    #[serde(default)]
    pub answer: Option<Scale>,
}

impl AnswerEntry {
    #[must_use]
    pub fn key(&self) -> AnswerKey {
        AnswerKey::new(self.category.as_str(), self.indicator.as_str(), self.criterion)
    }
}

/// A complete response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseFile {
    pub profile: Profile,
    pub selection: Vec<SelectionEntry>,
    pub answers: Vec<AnswerEntry>,
}

impl ResponseFile {
    /// Read a response file from disk.
    pub fn from_path(path: &Path) -> Result<Self, SurveyError> {
        let text = read_limited(path)?;
        toml::from_str(&text)
            .map_err(|e| SurveyError::InvalidInput(format!("{}: {}", path.display(), e)))
    }

    /// Replay the response through both stages.
    ///
    /// The returned session is in the evaluation stage, ready to submit.
    pub fn into_session(self, catalog: Arc<Catalog>) -> Result<Session, SurveyError> {
        let session = Session::new(catalog).with_profile(self.profile)?;
        let session = self
            .selection
            .iter()
            .try_fold(session, |session, entry| entry.apply(session))?;
        session
            .begin_evaluation()
            .answer_all(self.answers.iter().map(|a| (a.key(), a.answer)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
