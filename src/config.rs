//! Analysis settings.
//!
//! YAML-backed configuration with full defaulting: every section and field
//! is optional in the file, and a missing file falls back to defaults. The
//! same structs double as the programmatic tuning surface of the analyzers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level settings file structure.
///
/// ```yaml
/// department:
///   min_interaction_count: 3
///   strong_pair_threshold: 10
/// workflow:
///   min_pattern_frequency: 2.0
///   time_window_hours: 24
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub department: DepartmentConfig,
    pub workflow: WorkflowConfig,
}

/// Tuning parameters for department interaction analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DepartmentConfig {
    /// Minimum aggregated pair count for an interaction to materialize as a
    /// graph edge (or an internal-interaction node attribute).
    pub min_interaction_count: u32,
    /// Edge weight at which a pair counts as a strong collaboration pair.
    pub strong_pair_threshold: u32,
}

impl Default for DepartmentConfig {
    fn default() -> Self {
        Self {
            min_interaction_count: 3,
            strong_pair_threshold: 10,
        }
    }
}

/// Tuning parameters for workflow pattern mining.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Minimum accumulated weight (exact occurrences count 1.0, contiguous
    /// subsequences 0.5) for a sequence to qualify as a pattern.
    pub min_pattern_frequency: f64,
    /// Window within which activities after a sequence start are chained
    /// into the same candidate sequence.
    pub time_window_hours: i64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            min_pattern_frequency: 2.0,
            time_window_hours: 24,
        }
    }
}

impl AnalysisSettings {
    /// Load settings from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    /// Load from `path` when given, otherwise return defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AnalysisSettings::default();
        assert_eq!(settings.department.min_interaction_count, 3);
        assert_eq!(settings.department.strong_pair_threshold, 10);
        assert!((settings.workflow.min_pattern_frequency - 2.0).abs() < f64::EPSILON);
        assert_eq!(settings.workflow.time_window_hours, 24);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let settings: AnalysisSettings =
            serde_yaml::from_str("department:\n  min_interaction_count: 1\n").unwrap();
        assert_eq!(settings.department.min_interaction_count, 1);
        // untouched fields keep their defaults
        assert_eq!(settings.department.strong_pair_threshold, 10);
        assert_eq!(settings.workflow.time_window_hours, 24);
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orglens.yaml");
        std::fs::write(&path, "workflow:\n  min_pattern_frequency: 3.5\n").unwrap();

        let settings = AnalysisSettings::from_file(&path).unwrap();
        assert!((settings.workflow.min_pattern_frequency - 3.5).abs() < f64::EPSILON);

        let missing = AnalysisSettings::from_file(&dir.path().join("absent.yaml"));
        assert!(missing.is_err());
    }
}
