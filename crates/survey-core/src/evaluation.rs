//! # Evaluation Stage
//!
//! Answers keyed by the composite `(category, indicator, criterion)` identity,
//! and the per-category view presented to the respondent.
//!
//! The view is rebuilt from the frozen selection on every request, so answers
//! given before a rejected submission reappear unchanged.

use crate::catalog::Catalog;
use crate::selection::SelectionSet;
use crate::{AnswerKey, Criterion, Indicator, Scale};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ANSWER MAP
// =============================================================================

/// Typed store of the respondent's answers.
///
/// Absence of a key means "unanswered". There is no default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    entries: BTreeMap<AnswerKey, Scale>,
}

impl AnswerMap {
    /// Create an empty answer map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear one answer. Returns the previous value.
    pub fn set(&mut self, key: AnswerKey, value: Option<Scale>) -> Option<Scale> {
        match value {
            Some(scale) => self.entries.insert(key, scale),
            None => self.entries.remove(&key),
        }
    }

    /// Get the answer for one cell.
    #[must_use]
    pub fn get(&self, key: &AnswerKey) -> Option<Scale> {
        self.entries.get(key).copied()
    }

    /// Get the answer for one cell by its parts.
    #[must_use]
    pub fn lookup(&self, category: &str, indicator: &str, criterion: Criterion) -> Option<Scale> {
        self.get(&AnswerKey::new(category, indicator, criterion))
    }

    /// Drop answers whose (category, indicator) is not in `selection`.
    pub fn retain_selected(&mut self, selection: &SelectionSet) {
        self.entries
            .retain(|k, _| selection.contains(&k.category, &k.indicator));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// EVALUATION VIEW
// =============================================================================

/// One criterion cell of an indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionAnswer {
    pub criterion: Criterion,
    pub answer: Option<Scale>,
}

/// One indicator with its four criterion cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub indicator: Indicator,
    pub answers: Vec<CriterionAnswer>,
}

impl EvaluationItem {
    /// Number of unanswered criteria.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.answers.iter().filter(|a| a.answer.is_none()).count()
    }
}

/// Indicators of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationCategory {
    pub name: String,
    pub items: Vec<EvaluationItem>,
}

/// Everything the respondent must rate, in catalog order.
///
/// Categories without any selected indicator are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationView {
    pub categories: Vec<EvaluationCategory>,
}

impl EvaluationView {
    /// Build the view from a selection and the current answers.
    #[must_use]
    pub fn build(catalog: &Catalog, selection: &SelectionSet, answers: &AnswerMap) -> Self {
        let categories = selection
            .iter_ordered(catalog)
            .map(|(name, chosen)| EvaluationCategory {
                name: name.to_string(),
                items: chosen
                    .indicators()
                    .map(|indicator| EvaluationItem {
                        indicator: indicator.clone(),
                        answers: Criterion::ALL
                            .iter()
                            .map(|&criterion| CriterionAnswer {
                                criterion,
                                answer: answers.lookup(name, &indicator.label, criterion),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { categories }
    }

    /// "Nothing to evaluate".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of indicators shown.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// Number of cells still unanswered.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .map(EvaluationItem::missing)
            .sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================
