//! # Completeness Validator
//!
//! Runs once per submission attempt. Checks, in order, and stops at the first
//! failing check:
//!
//! | Order | Check | Error |
//! |-------|-------|-------|
//! | 1 | Name and profession are non-empty | `ProfileIncomplete` |
//! | 2 | The frozen selection has at least one indicator | `EmptySelection` |
//! | 3 | Every (indicator, criterion) cell is answered | `IncompleteAnswers` |
//!
//! The third check counts every missing cell across the whole selection
//! before reporting.

use crate::evaluation::AnswerMap;
use crate::selection::SelectionSet;
use crate::{Criterion, Profile, ProfileField, SurveyError};
use serde::{Deserialize, Serialize};

// =============================================================================
// VALIDATION POLICY
// =============================================================================

/// Tunable parts of the validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Require a non-empty respondent name.
    pub require_name: bool,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self { require_name: true }
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Completeness Validator - pure function over profile, selection and answers.
#[derive(Debug, Clone, Default)]
pub struct CompletenessValidator {
    policy: ValidationPolicy,
}

impl CompletenessValidator {
    /// Create a validator with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with a custom policy.
    #[must_use]
    pub fn with_policy(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Run all checks in order.
    pub fn validate(
        &self,
        profile: &Profile,
        selection: &SelectionSet,
        answers: &AnswerMap,
    ) -> Result<(), SurveyError> {
        let missing_fields = self.missing_profile_fields(profile);
        if !missing_fields.is_empty() {
            return Err(SurveyError::ProfileIncomplete {
                missing: missing_fields,
            });
        }

        if selection.is_empty() {
            return Err(SurveyError::EmptySelection);
        }

        let missing = count_missing(selection, answers);
        if missing > 0 {
            return Err(SurveyError::IncompleteAnswers { missing });
        }

        Ok(())
    }

    /// Required profile fields that are blank.
    #[must_use]
    pub fn missing_profile_fields(&self, profile: &Profile) -> Vec<ProfileField> {
        let mut missing = Vec::new();
        if self.policy.require_name && profile.name.trim().is_empty() {
            missing.push(ProfileField::Name);
        }
        if profile.profession.trim().is_empty() {
            missing.push(ProfileField::Profession);
        }
        missing
    }
}

/// Number of unanswered (indicator, criterion) cells in `selection`.
#[must_use]
pub fn count_missing(selection: &SelectionSet, answers: &AnswerMap) -> usize {
    selection
        .iter()
        .flat_map(|(category, chosen)| {
            chosen.indicators().flat_map(move |indicator| {
                Criterion::ALL
                    .iter()
                    .map(move |&criterion| (category, indicator.label.as_str(), criterion))
            })
        })
        .filter(|(category, indicator, criterion)| {
            answers.lookup(category, indicator, *criterion).is_none()
        })
        .count()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::{AnswerKey, Scale};

    const AIR: &str = "Calidad del Aire";
    const GASES: &str = "Monitoreo de gases";

    fn complete_profile() -> Profile {
        Profile {
            name: "Ana".to_string(),
            profession: "Bióloga".to_string(),
            ..Profile::default()
        }
    }

    fn one_indicator() -> SelectionSet {
        let catalog = Catalog::builtin();
        let mut selection = SelectionSet::new();
        selection
            .choose(&catalog, AIR, &[GASES.to_string()])
            .expect("choose");
        selection
    }

    #[test]
    fn profile_checked_first() {
        let validator = CompletenessValidator::new();
        let result = validator.validate(&Profile::default(), &SelectionSet::new(), &AnswerMap::new());

        assert_eq!(
            result,
            Err(SurveyError::ProfileIncomplete {
                missing: vec![ProfileField::Name, ProfileField::Profession]
            })
        );
    }

    #[test]
    fn blank_profession_always_rejected() {
        let validator = CompletenessValidator::with_policy(ValidationPolicy {
            require_name: false,
        });
        let profile = Profile {
            profession: "  ".to_string(),
            ..complete_profile()
        };

        let result = validator.validate(&profile, &one_indicator(), &AnswerMap::new());
        assert!(matches!(result, Err(SurveyError::ProfileIncomplete { .. })));
    }

    #[test]
    fn name_optional_when_policy_allows() {
        let validator = CompletenessValidator::with_policy(ValidationPolicy {
            require_name: false,
        });
        let profile = Profile {
            name: String::new(),
            ..complete_profile()
        };
        assert!(validator.missing_profile_fields(&profile).is_empty());
    }

    #[test]
    fn empty_selection_second() {
        let validator = CompletenessValidator::new();
        let result = validator.validate(&complete_profile(), &SelectionSet::new(), &AnswerMap::new());
        assert_eq!(result, Err(SurveyError::EmptySelection));
    }

    #[test]
    fn missing_answers_counted() {
        let validator = CompletenessValidator::new();
        let selection = one_indicator();
        let mut answers = AnswerMap::new();
        answers.set(AnswerKey::new(AIR, GASES, Criterion::Clarity), Some(Scale::Agree));

        let result = validator.validate(&complete_profile(), &selection, &answers);
        assert_eq!(result, Err(SurveyError::IncompleteAnswers { missing: 3 }));
    }

    #[test]
    fn stray_answers_do_not_offset_missing_ones() {
        let selection = one_indicator();
        let mut answers = AnswerMap::new();
        for criterion in Criterion::ALL {
            answers.set(AnswerKey::new(AIR, "other", criterion), Some(Scale::Agree));
        }
        assert_eq!(count_missing(&selection, &answers), 4);
    }

    #[test]
    fn complete_passes() {
        let validator = CompletenessValidator::new();
        let selection = one_indicator();
        let mut answers = AnswerMap::new();
        for criterion in Criterion::ALL {
            answers.set(AnswerKey::new(AIR, GASES, criterion), Some(Scale::Neutral));
        }
        assert!(validator.validate(&complete_profile(), &selection, &answers).is_ok());
    }
}
