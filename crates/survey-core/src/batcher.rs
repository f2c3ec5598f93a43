//! # Submission Batcher
//!
//! Flattens a validated session into write-once rows.
//!
//! One batch carries one timestamp for all of its rows and is appended to the
//! store in a single call, whatever the number of answers.

use crate::catalog::Catalog;
use crate::evaluation::AnswerMap;
use crate::primitives::ROW_WIDTH;
use crate::selection::SelectionSet;
use crate::{Criterion, Profile, SurveyError};
use serde::{Deserialize, Serialize};

/// Column headers, in cell order.
pub const ROW_HEADER: [&str; ROW_WIDTH] = [
    "timestamp",
    "name",
    "profession",
    "academic_level",
    "province",
    "experience",
    "category",
    "indicator",
    "provenance",
    "criterion",
    "answer",
];

// =============================================================================
// SUBMISSION ROW
// =============================================================================

/// One flattened record per answered (indicator, criterion) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub timestamp: String,
    pub name: String,
    pub profession: String,
    pub academic_level: String,
    pub province: String,
    pub experience: String,
    pub category: String,
    pub indicator: String,
    pub provenance: String,
    pub criterion: String,
    pub answer: String,
}

impl SubmissionRow {
    /// Borrow the row as its fixed-width cell tuple.
    #[must_use]
    pub fn cells(&self) -> [&str; ROW_WIDTH] {
        [
            &self.timestamp,
            &self.name,
            &self.profession,
            &self.academic_level,
            &self.province,
            &self.experience,
            &self.category,
            &self.indicator,
            &self.provenance,
            &self.criterion,
            &self.answer,
        ]
    }

    /// Owned cells, as sent to the remote store.
    #[must_use]
    pub fn to_cells(&self) -> Vec<String> {
        self.cells().iter().map(|c| (*c).to_string()).collect()
    }
}

// =============================================================================
// SUBMISSION BATCH
// =============================================================================

/// All rows of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionBatch {
    timestamp: String,
    rows: Vec<SubmissionRow>,
}

impl SubmissionBatch {
    /// Assemble rows for every answered cell of `selection`.
    ///
    /// Rows follow catalog order, then indicator order, then criterion order.
    /// Unanswered cells produce no row; callers validate beforehand.
    pub fn assemble(
        catalog: &Catalog,
        profile: &Profile,
        selection: &SelectionSet,
        answers: &AnswerMap,
        timestamp: &str,
    ) -> Result<Self, SurveyError> {
        if timestamp.trim().is_empty() {
            return Err(SurveyError::InvalidInput(
                "submission timestamp is empty".to_string(),
            ));
        }

        let mut rows = Vec::with_capacity(answers.len());
        for (category, chosen) in selection.iter_ordered(catalog) {
            for indicator in chosen.indicators() {
                for criterion in Criterion::ALL {
                    let Some(answer) = answers.lookup(category, &indicator.label, criterion)
                    else {
                        continue;
                    };
                    rows.push(SubmissionRow {
                        timestamp: timestamp.to_string(),
                        name: profile.name.clone(),
                        profession: profile.profession.clone(),
                        academic_level: profile.academic_level.label().to_string(),
                        province: profile.province.label().to_string(),
                        experience: profile.experience.label().to_string(),
                        category: category.to_string(),
                        indicator: indicator.label.clone(),
                        provenance: indicator.provenance.label().to_string(),
                        criterion: criterion.label().to_string(),
                        answer: answer.label().to_string(),
                    });
                }
            }
        }

        Ok(Self {
            timestamp: timestamp.to_string(),
            rows,
        })
    }

    /// The timestamp shared by every row.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub fn rows(&self) -> &[SubmissionRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerKey, Scale};

    const AIR: &str = "Calidad del Aire";
    const STAMP: &str = "2025-03-01 10:15:00";

    fn profile() -> Profile {
        Profile {
            name: "Ana".to_string(),
            profession: "Ingeniera Civil".to_string(),
            ..Profile::default()
        }
    }

    #[test]
    fn rows_follow_catalog_then_criterion_order() {
        let catalog = Catalog::builtin();
        let mut selection = SelectionSet::new();
        selection
            .choose(&catalog, "Patrimonio Cultural", &["Indicadores de Arqueología".to_string()])
            .expect("choose");
        selection
            .propose(&catalog, AIR, &["Polvo".to_string()])
            .expect("propose");

        let mut answers = AnswerMap::new();
        for (category, indicator) in [
            ("Patrimonio Cultural", "Indicadores de Arqueología"),
            (AIR, "(NUEVO) Polvo"),
        ] {
            for criterion in Criterion::ALL {
                answers.set(AnswerKey::new(category, indicator, criterion), Some(Scale::Agree));
            }
        }

        let batch =
            SubmissionBatch::assemble(&catalog, &profile(), &selection, &answers, STAMP).expect("batch");
        assert_eq!(batch.len(), 8);
        assert_eq!(batch.rows()[0].category, AIR);
        assert_eq!(batch.rows()[0].provenance, "Nuevo");
        assert_eq!(batch.rows()[0].criterion, "Claridad en Redacción");
        assert_eq!(batch.rows()[3].criterion, "Relevancia Control");
        assert_eq!(batch.rows()[4].category, "Patrimonio Cultural");
        assert!(batch.rows().iter().all(|r| r.timestamp == STAMP));
    }

    #[test]
    fn cells_are_in_wire_order() {
        let catalog = Catalog::builtin();
        let mut selection = SelectionSet::new();
        selection
            .choose(&catalog, AIR, &["Monitoreo de gases".to_string()])
            .expect("choose");
        let mut answers = AnswerMap::new();
        answers.set(
            AnswerKey::new(AIR, "Monitoreo de gases", Criterion::Measurability),
            Some(Scale::Disagree),
        );

        let batch =
            SubmissionBatch::assemble(&catalog, &profile(), &selection, &answers, STAMP).expect("batch");
        let cells = batch.rows()[0].cells();
        assert_eq!(
            cells,
            [
                STAMP,
                "Ana",
                "Ingeniera Civil",
                "Bachillerato",
                "San José",
                "No tengo experiencia en infraestructura",
                AIR,
                "Monitoreo de gases",
                "Predefinido",
                "Factibilidad de Medición",
                "En Desacuerdo (ED)",
            ]
        );
    }

    #[test]
    fn answers_outside_selection_are_not_emitted() {
        let catalog = Catalog::builtin();
        let mut answers = AnswerMap::new();
        answers.set(AnswerKey::new(AIR, "ghost", Criterion::Clarity), Some(Scale::Agree));

        let batch = SubmissionBatch::assemble(&catalog, &profile(), &SelectionSet::new(), &answers, STAMP)
            .expect("batch");
        assert!(batch.is_empty());
    }

    #[test]
    fn empty_timestamp_rejected() {
        let catalog = Catalog::builtin();
        let result = SubmissionBatch::assemble(
            &catalog,
            &profile(),
            &SelectionSet::new(),
            &AnswerMap::new(),
            " ",
        );
        assert!(matches!(result, Err(SurveyError::InvalidInput(_))));
    }
}
