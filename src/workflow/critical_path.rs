//! Critical path and bottleneck analysis over workflow step dependencies.
//!
//! The step-dependency DAG is processed in topological order, accumulating
//! the maximum duration along any root-to-node path; every node on a
//! maximum-duration path belongs to the critical path. A cyclic dependency
//! graph degrades to an empty critical path with a warning — a bad workflow
//! must never take down the whole report.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

use crate::models::{Workflow, WorkflowStep};

use super::models::{StepLoad, WorkflowBottleneck};

/// Load factor above which a critical-path step counts as a bottleneck.
const CRITICAL_LOAD_THRESHOLD: f64 = 5.0;
/// Unassigned steps longer than this many hours count as bottlenecks.
const UNASSIGNED_DURATION_THRESHOLD: f64 = 2.0;
/// Steps with more dependencies than this count as bottlenecks.
const DEPENDENCY_COUNT_THRESHOLD: usize = 3;

// ============================================================================
// Critical path
// ============================================================================

/// Compute the set of step IDs on the workflow's critical (longest-duration)
/// path.
///
/// Steps with no dependencies are roots and start at their own duration;
/// every other step accumulates `max(predecessor) + own duration`. The
/// backward walk from each maximum-duration node follows every predecessor
/// whose accumulated value plus the successor's duration equals the
/// successor's accumulated value, so parallel equally-long paths are all
/// collected.
///
/// A dependency cycle yields an empty set (logged, not raised).
pub fn critical_path(workflow: &Workflow) -> BTreeSet<String> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    let mut duration: HashMap<NodeIndex, f64> = HashMap::new();

    for step in &workflow.steps {
        let idx = graph.add_node(step.id.as_str());
        index.insert(step.id.as_str(), idx);
        duration.insert(idx, step.duration_hours.unwrap_or(0.0));
    }
    for step in &workflow.steps {
        for dep in &step.dependencies {
            if let (Some(&from), Some(&to)) = (index.get(dep.as_str()), index.get(step.id.as_str()))
            {
                graph.add_edge(from, to, ());
            }
        }
    }

    if graph.node_count() == 0 {
        return BTreeSet::new();
    }

    let order = match toposort(&graph, None) {
        Ok(order) => order,
        Err(_) => {
            warn!(
                workflow = %workflow.id,
                "step dependencies contain a cycle; skipping critical path"
            );
            return BTreeSet::new();
        }
    };

    // Longest accumulated duration per node, in topological order.
    let mut accumulated: HashMap<NodeIndex, f64> = HashMap::new();
    for node in &order {
        let best_pred = graph
            .neighbors_directed(*node, Direction::Incoming)
            .map(|pred| accumulated[&pred])
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            });
        accumulated.insert(*node, best_pred.unwrap_or(0.0) + duration[node]);
    }

    let max_duration = accumulated
        .values()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    // Walk backward from every node achieving the maximum.
    let mut critical = BTreeSet::new();
    let mut to_visit: Vec<NodeIndex> = order
        .iter()
        .copied()
        .filter(|n| accumulated[n] == max_duration)
        .collect();

    while let Some(node) = to_visit.pop() {
        if !critical.insert(graph[node].to_string()) {
            continue;
        }
        for pred in graph.neighbors_directed(node, Direction::Incoming) {
            if accumulated[&pred] + duration[&node] == accumulated[&node] {
                to_visit.push(pred);
            }
        }
    }

    critical
}

// ============================================================================
// Step loads & bottlenecks
// ============================================================================

/// Per-step load figures: `load_factor = duration × (dependency_count + 1)`.
pub fn step_loads(workflow: &Workflow) -> BTreeMap<String, StepLoad> {
    workflow
        .steps
        .iter()
        .map(|step| {
            let duration = step.duration_hours.unwrap_or(0.0);
            let dependency_count = step.dependencies.len();
            (
                step.id.clone(),
                StepLoad {
                    duration,
                    dependency_count,
                    is_assigned: step.responsible.is_some(),
                    load_factor: duration * (dependency_count + 1) as f64,
                },
            )
        })
        .collect()
}

/// Whether a step qualifies as a bottleneck. Any one rule suffices:
/// on the critical path with a high load factor; unassigned and long; or
/// heavily depended.
pub fn is_bottleneck(step: &WorkflowStep, load: &StepLoad, critical: &BTreeSet<String>) -> bool {
    if critical.contains(&step.id) && load.load_factor > CRITICAL_LOAD_THRESHOLD {
        return true;
    }
    if step.responsible.is_none()
        && step.duration_hours.unwrap_or(0.0) > UNASSIGNED_DURATION_THRESHOLD
    {
        return true;
    }
    load.dependency_count > DEPENDENCY_COUNT_THRESHOLD
}

/// Rule-specific remediation suggestions for a flagged step.
pub fn step_recommendations(step: &WorkflowStep, load: &StepLoad) -> Vec<String> {
    let mut recommendations = Vec::new();

    if step.responsible.is_none() {
        recommendations.push("Assign an owner to this step".to_string());
    }
    if step.duration_hours.unwrap_or(0.0) > 4.0 {
        recommendations.push("Consider splitting this task into smaller steps".to_string());
    }
    if load.dependency_count > 2 {
        recommendations.push("Check whether prerequisite tasks can run in parallel".to_string());
    }
    if recommendations.is_empty() {
        recommendations
            .push("Review the step's prioritization and consider automating it".to_string());
    }

    recommendations
}

/// Flag bottleneck steps across all workflows, sorted by load factor
/// descending.
pub fn analyze_bottlenecks(workflows: &[Workflow]) -> Vec<WorkflowBottleneck> {
    let mut bottlenecks = Vec::new();

    for workflow in workflows {
        let critical = critical_path(workflow);
        let loads = step_loads(workflow);

        for step in &workflow.steps {
            let load = &loads[&step.id];
            if is_bottleneck(step, load, &critical) {
                bottlenecks.push(WorkflowBottleneck {
                    workflow_id: workflow.id.clone(),
                    workflow_name: workflow.name.clone(),
                    step_id: step.id.clone(),
                    step_name: step.name.clone(),
                    responsible: step
                        .responsible
                        .as_ref()
                        .map(|p| p.name.clone())
                        .unwrap_or_else(|| "unassigned".to_string()),
                    duration_hours: step.duration_hours.unwrap_or(0.0),
                    is_critical: critical.contains(&step.id),
                    load_factor: load.load_factor,
                    recommendations: step_recommendations(step, load),
                });
            }
        }
    }

    bottlenecks.sort_by(|a, b| b.load_factor.total_cmp(&a.load_factor));
    bottlenecks
}

// ============================================================================
// Tests
// ============================================================================
