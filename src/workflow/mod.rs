//! Workflow mining and analysis.
//!
//! Mines recurring activity sequences and team patterns into explicit
//! workflow models, then runs dependency-aware critical-path and bottleneck
//! analysis over them.
//!
//! ## Architecture
//!
//! ```text
//! ActivityBatch ──► miner (sequences + team patterns) ──► ActivityPattern
//!                                                              │
//!                                                          builder
//!                                                              │
//!                                                          Workflow
//!                                                              │
//!                              critical_path ──► WorkflowAnalysisReport
//! ```
//!
//! ## Modules
//!
//! - [`models`] — pattern and bottleneck types, the aggregated report
//! - [`miner`] — `WorkflowAnalyzer` and sequence/team pattern detection
//! - [`builder`] — pattern → `Workflow` construction
//! - [`critical_path`] — longest-path scheduling and bottleneck rules

pub mod builder;
pub mod critical_path;
pub mod miner;
pub mod models;

pub use critical_path::{analyze_bottlenecks, critical_path, step_loads};
pub use miner::WorkflowAnalyzer;
pub use models::{
    ActivityPattern, PatternKind, PatternShape, StepLoad, WorkflowAnalysisReport,
    WorkflowBottleneck,
};

use chrono::Utc;

use crate::error::WorkflowAnalysisError;
use crate::models::ActivityBatch;

impl WorkflowAnalyzer {
    /// Full pipeline: detect patterns, build a workflow per pattern, compute
    /// critical paths and flag bottleneck steps.
    ///
    /// Batch-validation failures surface as
    /// [`AnalysisError`](crate::error::AnalysisError) (wrapped), workflow
    /// construction failures as [`WorkflowAnalysisError`]; a cyclic
    /// dependency graph degrades to an empty critical path instead of
    /// failing the report.
    pub fn analyze(
        &self,
        batch: &ActivityBatch,
    ) -> Result<WorkflowAnalysisReport, WorkflowAnalysisError> {
        let patterns = self.detect_patterns(batch)?;

        let mut workflows = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            workflows.push(self.build_workflow(pattern, batch)?);
        }

        let critical_paths = workflows.iter().map(critical_path).collect();
        let bottlenecks = analyze_bottlenecks(&workflows);

        Ok(WorkflowAnalysisReport {
            patterns,
            workflows,
            critical_paths,
            bottlenecks,
            computed_at: Utc::now(),
        })
    }
}
