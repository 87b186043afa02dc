//! Workflow mining data models.
//!
//! - [`ActivityPattern`] / [`PatternShape`] / [`PatternKind`] — mined
//!   recurring patterns (per-person sequences and team collaborations)
//! - [`StepLoad`] — per-step load figures feeding bottleneck detection
//! - [`WorkflowBottleneck`] — a flagged step with remediation suggestions
//! - [`WorkflowAnalysisReport`] — aggregated result of the full pipeline

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::Workflow;

// ============================================================================
// Patterns
// ============================================================================

/// Broad classification of a mined pattern, derived from its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Sequence mixes emails and documents
    DocumentCreation,
    /// Sequence contains meetings
    Meeting,
    /// Sequence contains emails only
    EmailCommunication,
    /// Sequence contains documents only
    DocumentManagement,
    General,
    /// Recurring same-participant group activity
    TeamCollaboration,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentCreation => write!(f, "document creation flow"),
            Self::Meeting => write!(f, "meeting flow"),
            Self::EmailCommunication => write!(f, "email communication flow"),
            Self::DocumentManagement => write!(f, "document management flow"),
            Self::General => write!(f, "general flow"),
            Self::TeamCollaboration => write!(f, "team collaboration"),
        }
    }
}

/// Shape-specific data of a mined pattern.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PatternShape {
    /// A recurring activity sequence of one person
    PersonSequence {
        person_email: String,
        /// Sequence items: `{type}` or `{type}_{first tag}`
        sequence: Vec<String>,
    },
    /// A recurring exact participant group
    Team {
        /// Sorted participant emails (the grouping key)
        participant_emails: Vec<String>,
    },
}

/// A recurring pattern mined from the activity batch.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityPattern {
    /// Deterministic identifier (`pattern_...` / `team_pattern_...`)
    pub id: String,
    pub kind: PatternKind,
    /// Accumulated mining weight: exact matches count 1.0, contiguous
    /// subsequence matches 0.5. Always ≥ the configured minimum frequency.
    pub weight: f64,
    /// IDs of the activities matched by this pattern
    pub activity_ids: Vec<String>,
    #[serde(flatten)]
    pub shape: PatternShape,
}

impl ActivityPattern {
    /// The sequence items for person patterns, `None` for team patterns.
    pub fn sequence(&self) -> Option<&[String]> {
        match &self.shape {
            PatternShape::PersonSequence { sequence, .. } => Some(sequence),
            PatternShape::Team { .. } => None,
        }
    }
}

// ============================================================================
// Bottleneck analysis
// ============================================================================

/// Load figures for one workflow step.
#[derive(Debug, Clone, Serialize)]
pub struct StepLoad {
    pub duration: f64,
    pub dependency_count: usize,
    pub is_assigned: bool,
    /// `duration × (dependency_count + 1)`
    pub load_factor: f64,
}

/// A workflow step flagged as a likely throughput constraint.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowBottleneck {
    pub workflow_id: String,
    pub workflow_name: String,
    pub step_id: String,
    pub step_name: String,
    /// Responsible person's name, or "unassigned"
    pub responsible: String,
    pub duration_hours: f64,
    pub is_critical: bool,
    pub load_factor: f64,
    pub recommendations: Vec<String>,
}

// ============================================================================
// Aggregated result
// ============================================================================

/// Result of the full mining pipeline: patterns, the workflows built from
/// them, their critical paths and the flagged bottleneck steps.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowAnalysisReport {
    pub patterns: Vec<ActivityPattern>,
    pub workflows: Vec<Workflow>,
    /// Critical-path step IDs per workflow, aligned with `workflows`
    pub critical_paths: Vec<BTreeSet<String>>,
    pub bottlenecks: Vec<WorkflowBottleneck>,
    pub computed_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================
