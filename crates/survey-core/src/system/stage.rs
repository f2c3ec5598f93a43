//! # Workflow Stages
//!
//! A session moves through two stages, once, in one direction:
//!
//! | Stage | Name | Entered by |
//! |-------|------|------------|
//! | Selecting | Selección de Indicadores | session creation |
//! | Evaluating | Evaluación de Indicadores | `Session::begin_evaluation` |
//!
//! ## Capability Gating
//!
//! Unlike an informational label, the stage gates operations at runtime.
//! [`StageCapability::permitted_in`] is consulted by every session
//! transformation before it touches state.

use serde::{Deserialize, Serialize};

// =============================================================================
// STAGE ENUM
// =============================================================================

/// Workflow stage of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Choosing and proposing indicators.
    #[default]
    Selecting,
    /// Rating the frozen selection.
    Evaluating,
}

impl Stage {
    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Selecting => "Selección de Indicadores",
            Stage::Evaluating => "Evaluación de Indicadores",
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Selecting => Some(Stage::Evaluating),
            Stage::Evaluating => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self, self.name())
    }
}

// =============================================================================
// STAGE CAPABILITY
// =============================================================================

/// Operations a session can perform, each bound to the stages it is allowed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageCapability {
    EditProfile,
    EditSelection,
    Answer,
    Submit,
}

impl StageCapability {
    /// Check if this capability is available in `stage`.
    #[must_use]
    pub fn permitted_in(&self, stage: Stage) -> bool {
        match self {
            StageCapability::EditProfile => true,
            StageCapability::EditSelection => stage == Stage::Selecting,
            StageCapability::Answer | StageCapability::Submit => stage == Stage::Evaluating,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
