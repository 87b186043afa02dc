//! orglens
//!
//! Organizational activity graph analytics:
//! - Department interaction graph with centrality and bottleneck diagnostics
//! - Activity sequence mining into workflow models with critical-path and
//!   bottleneck analysis
//! - Mermaid rendering of both network and workflow views
//!
//! The engine is synchronous and deterministic: each `analyze` call consumes
//! a read-only, pre-validated [`models::ActivityBatch`] and returns a fresh
//! report; no state survives between calls.
//!
//! ```no_run
//! use orglens::config::AnalysisSettings;
//! use orglens::department::DepartmentAnalyzer;
//! use orglens::models::ActivityBatch;
//! use orglens::workflow::WorkflowAnalyzer;
//!
//! # fn run(batch: ActivityBatch) -> anyhow::Result<()> {
//! let settings = AnalysisSettings::default();
//! let departments = DepartmentAnalyzer::new(settings.department).analyze(&batch)?;
//! let workflows = WorkflowAnalyzer::new(settings.workflow).analyze(&batch)?;
//! println!("{}", orglens::mermaid::department_network(&departments.graph));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod department;
pub mod error;
pub mod mermaid;
pub mod models;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export primary types for convenience
pub use config::{AnalysisSettings, DepartmentConfig, WorkflowConfig};
pub use department::{DepartmentAnalysis, DepartmentAnalyzer, DepartmentReport};
pub use error::{AnalysisError, WorkflowAnalysisError};
pub use models::{Activity, ActivityBatch, ActivityType, Person, Workflow, WorkflowStep};
pub use workflow::{WorkflowAnalysisReport, WorkflowAnalyzer};
