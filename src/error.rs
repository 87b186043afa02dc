//! Error taxonomy for the analytics engine.
//!
//! Two failure families, matching the two analysis pipelines:
//!
//! - [`AnalysisError`] — department analysis rejected its input or hit an
//!   unexpected internal inconsistency. Raised to the caller, never swallowed.
//! - [`WorkflowAnalysisError`] — a mined pattern could not be turned into a
//!   workflow (unresolvable owner, inconsistent step data).
//!
//! Sub-computations with a well-defined degraded value (eigenvector
//! non-convergence, cyclic step dependencies) do NOT surface here; they are
//! logged and substituted in place.

use thiserror::Error;

/// Department-analysis failure: invalid input batch or internal inconsistency.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The activity batch itself is malformed (e.g. invalid email, duplicate
    /// person ID). Carries the root-cause description.
    #[error("invalid activity input: {0}")]
    InvalidInput(String),

    /// An activity references a participant ID that is not in the registry.
    #[error("activity '{activity_id}' references unknown participant '{person_id}'")]
    UnknownParticipant {
        activity_id: String,
        person_id: String,
    },
}

/// Workflow-construction failure for a mined pattern.
#[derive(Debug, Error)]
pub enum WorkflowAnalysisError {
    /// The underlying batch failed validation during mining.
    #[error("invalid mining input: {0}")]
    Input(#[from] AnalysisError),

    /// No participant could be resolved as the workflow owner.
    #[error("cannot resolve an owner for pattern '{pattern_id}'")]
    OwnerUnresolved { pattern_id: String },

    /// The pattern's matched activities are inconsistent with its shape.
    #[error("failed to build workflow from pattern '{pattern_id}': {reason}")]
    StepConstruction { pattern_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_display() {
        let err = AnalysisError::UnknownParticipant {
            activity_id: "a_1".into(),
            person_id: "p_404".into(),
        };
        assert_eq!(
            err.to_string(),
            "activity 'a_1' references unknown participant 'p_404'"
        );
    }

    #[test]
    fn test_workflow_error_display() {
        let err = WorkflowAnalysisError::OwnerUnresolved {
            pattern_id: "pattern_abc".into(),
        };
        assert!(err.to_string().contains("pattern_abc"));
    }
}
