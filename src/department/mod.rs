//! Department interaction analysis.
//!
//! Builds a weighted directed department-interaction graph from an activity
//! batch and computes network centrality and structure diagnostics.
//!
//! ## Architecture
//!
//! ```text
//! ActivityBatch ──► builder (aggregate + materialize) ──► DepartmentGraph
//!                                                              │
//!                                                         algorithms
//!                                                              │
//!                                    analyzer ──► DepartmentAnalysis
//!                                                 (report + graph snapshot)
//! ```
//!
//! ## Modules
//!
//! - [`models`] — graph payloads, aggregation record, report types
//! - [`builder`] — interaction aggregation, graph materialization, matrix
//! - [`algorithms`] — centrality, clustering, connectivity, information paths
//! - [`analyzer`] — `DepartmentAnalyzer` entry point and classification rules

pub mod algorithms;
pub mod analyzer;
pub mod builder;
pub mod models;

pub use analyzer::DepartmentAnalyzer;
pub use builder::collaboration_matrix;
pub use models::{
    BottleneckDepartment, CentralityMetrics, CollaborationMatrix, CollaborationPattern,
    CommunicationFlow, CrossFunctionalActivity, DepartmentAnalysis, DepartmentGraph,
    DepartmentReport, FlowKind, GraphMetrics, InformationPath,
};
