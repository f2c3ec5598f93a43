//! # Selection Stage
//!
//! Per-category choice of predefined indicators plus up to two free-text
//! proposals.
//!
//! A category's predefined picks are stored in catalog order regardless of the
//! order they were submitted in, and proposals follow them. Identical picks or
//! proposals collapse into one entry.

use crate::catalog::Catalog;
use crate::primitives::{MAX_ADDITIONS_PER_CATEGORY, MAX_LABEL_LENGTH, RECOMMENDED_MIN_SELECTIONS};
use crate::{Indicator, SurveyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// CATEGORY SELECTION
// =============================================================================

/// Indicators chosen for one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelection {
    predefined: Vec<Indicator>,
    proposed: Vec<Indicator>,
}

impl CategorySelection {
    /// Predefined picks, in catalog order.
    #[must_use]
    pub fn predefined(&self) -> &[Indicator] {
        &self.predefined
    }

    /// Respondent proposals, in slot order.
    #[must_use]
    pub fn proposed(&self) -> &[Indicator] {
        &self.proposed
    }

    /// All indicators: predefined first, then proposals.
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> {
        self.predefined.iter().chain(self.proposed.iter())
    }

    /// Check if an indicator with this label is selected.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.indicators().any(|i| i.label == label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predefined.len() + self.proposed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predefined.is_empty() && self.proposed.is_empty()
    }
}

// =============================================================================
// WARNINGS
// =============================================================================

/// Advisory, non-blocking feedback on a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionWarning {
    /// Fewer predefined picks than recommended, but more than zero.
    BelowRecommended {
        category: String,
        selected: usize,
        recommended: usize,
    },
}

impl SelectionWarning {
    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            SelectionWarning::BelowRecommended {
                category,
                recommended,
                ..
            } => format!(
                "{category}: se recomienda seleccionar un mínimo de {recommended} indicadores"
            ),
        }
    }
}

// =============================================================================
// SELECTION SET
// =============================================================================

/// Mapping from category to the indicators chosen for evaluation.
///
/// Categories are keyed by name; presentation order always comes from the
/// catalog, see [`SelectionSet::iter_ordered`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    categories: BTreeMap<String, CategorySelection>,
}

impl SelectionSet {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the predefined picks of a category.
    ///
    /// Every label must be a predefined indicator of `category`.
    /// The whole call is rejected if any label is unknown.
    pub fn choose(
        &mut self,
        catalog: &Catalog,
        category: &str,
        labels: &[String],
    ) -> Result<(), SurveyError> {
        let known = catalog
            .indicators(category)
            .ok_or_else(|| SurveyError::UnknownCategory(category.to_string()))?;

        for label in labels {
            if label.trim().is_empty() || !known.iter().any(|k| k == label) {
                return Err(SurveyError::UnknownIndicator {
                    category: category.to_string(),
                    label: label.clone(),
                });
            }
        }

        let predefined = known
            .iter()
            .filter(|k| labels.contains(*k))
            .map(Indicator::predefined)
            .collect();

        self.entry(category).predefined = predefined;
        self.prune(category);
        Ok(())
    }

    /// Replace the free-text proposals of a category.
    ///
    /// Accepts at most [`MAX_ADDITIONS_PER_CATEGORY`] slots. Empty and
    /// whitespace-only slots are ignored.
    pub fn propose(
        &mut self,
        catalog: &Catalog,
        category: &str,
        slots: &[String],
    ) -> Result<(), SurveyError> {
        if catalog.category(category).is_none() {
            return Err(SurveyError::UnknownCategory(category.to_string()));
        }
        if slots.len() > MAX_ADDITIONS_PER_CATEGORY {
            return Err(SurveyError::InvalidInput(format!(
                "at most {} proposed indicators per category, got {}",
                MAX_ADDITIONS_PER_CATEGORY,
                slots.len()
            )));
        }

        let mut proposed: Vec<Indicator> = Vec::with_capacity(slots.len());
        for slot in slots {
            let Some(indicator) = Indicator::proposed(slot) else {
                continue;
            };
            if indicator.label.len() > MAX_LABEL_LENGTH {
                return Err(SurveyError::InvalidInput(format!(
                    "proposed indicator exceeds {} bytes",
                    MAX_LABEL_LENGTH
                )));
            }
            if !proposed.contains(&indicator) {
                proposed.push(indicator);
            }
        }

        self.entry(category).proposed = proposed;
        self.prune(category);
        Ok(())
    }

    /// Selection of one category, if it has any indicator.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&CategorySelection> {
        self.categories.get(category)
    }

    /// Check if `(category, label)` is selected.
    #[must_use]
    pub fn contains(&self, category: &str, label: &str) -> bool {
        self.get(category).is_some_and(|s| s.contains(label))
    }

    /// Check if no category has any indicator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.values().all(CategorySelection::is_empty)
    }

    /// Total number of indicators across all categories.
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.categories.values().map(CategorySelection::len).sum()
    }

    /// Non-empty categories in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategorySelection)> {
        self.categories
            .iter()
            .filter(|(_, s)| !s.is_empty())
            .map(|(name, s)| (name.as_str(), s))
    }

    /// Non-empty categories in catalog order.
    pub fn iter_ordered<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl Iterator<Item = (&'a str, &'a CategorySelection)> + 'a {
        catalog.categories().iter().filter_map(|c| {
            self.categories
                .get(&c.name)
                .filter(|s| !s.is_empty())
                .map(|s| (c.name.as_str(), s))
        })
    }

    /// Advisory warnings, in catalog order.
    #[must_use]
    pub fn warnings(&self, catalog: &Catalog) -> Vec<SelectionWarning> {
        self.iter_ordered(catalog)
            .filter_map(|(name, selection)| {
                let picked = selection.predefined().len();
                (picked > 0 && picked < RECOMMENDED_MIN_SELECTIONS).then(|| {
                    SelectionWarning::BelowRecommended {
                        category: name.to_string(),
                        selected: picked,
                        recommended: RECOMMENDED_MIN_SELECTIONS,
                    }
                })
            })
            .collect()
    }

    fn entry(&mut self, category: &str) -> &mut CategorySelection {
        self.categories.entry(category.to_string()).or_default()
    }

    fn prune(&mut self, category: &str) {
        if self.categories.get(category).is_some_and(CategorySelection::is_empty) {
            self.categories.remove(category);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
