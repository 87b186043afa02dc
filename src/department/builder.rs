//! Activity aggregation and graph materialization.
//!
//! Two passes, mirroring the aggregate-then-materialize split:
//!
//! 1. [`collect_interactions`] walks the batch once and accumulates
//!    canonical-pair counters (`(d1, d2)` with `d1 ≤ d2`; `(d, d)` for
//!    intra-department co-occurrence).
//! 2. [`build_graph`] materializes only the pairs at or above the
//!    configured threshold: cross pairs become directed edges, self pairs
//!    become node attributes, and node sizes come from the distinct
//!    participants of qualifying interactions.
//!
//! Both are pure functions from the batch to a fresh value; nothing is
//! cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::DepartmentConfig;
use crate::error::AnalysisError;
use crate::models::ActivityBatch;

use super::models::{
    CollaborationMatrix, DepartmentGraph, DepartmentInteraction, InteractionEdge, InteractionStats,
};

/// Canonical (sorted) department pair key.
pub type PairKey = (String, String);

/// Aggregate department co-occurrence counters over the whole batch.
///
/// For every activity:
/// - each unordered pair of distinct participant departments gets one
///   increment, with contributing activity ID, participant emails from both
///   sides and the activity type recorded;
/// - each department with ≥2 participants in the activity gets one
///   intra-department increment under the `(d, d)` key.
pub fn collect_interactions(
    batch: &ActivityBatch,
) -> Result<BTreeMap<PairKey, InteractionStats>, AnalysisError> {
    let mut interactions: BTreeMap<PairKey, InteractionStats> = BTreeMap::new();

    for activity in batch.activities() {
        let participants = batch.participants(activity)?;

        // Group participant emails by department.
        let mut by_dept: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for person in &participants {
            by_dept
                .entry(person.department.as_str())
                .or_default()
                .push(person.email.as_str());
        }

        // Cross-department pairs (canonical order comes free from BTreeMap).
        let departments: Vec<&str> = by_dept.keys().copied().collect();
        if departments.len() > 1 {
            for i in 0..departments.len() {
                for j in (i + 1)..departments.len() {
                    let (d1, d2) = (departments[i], departments[j]);
                    let stats = interactions
                        .entry((d1.to_string(), d2.to_string()))
                        .or_default();
                    stats.count += 1;
                    stats.activity_ids.push(activity.id.clone());
                    for email in by_dept[d1].iter().chain(by_dept[d2].iter()) {
                        stats.participants.insert((*email).to_string());
                    }
                    *stats
                        .activity_types
                        .entry(activity.activity_type)
                        .or_insert(0) += 1;
                }
            }
        }

        // Intra-department co-occurrence.
        for (dept, emails) in &by_dept {
            if emails.len() > 1 {
                let stats = interactions
                    .entry(((*dept).to_string(), (*dept).to_string()))
                    .or_default();
                stats.count += 1;
                stats.activity_ids.push(activity.id.clone());
                for email in emails {
                    stats.participants.insert((*email).to_string());
                }
                *stats
                    .activity_types
                    .entry(activity.activity_type)
                    .or_insert(0) += 1;
            }
        }
    }

    Ok(interactions)
}

/// Materialize the interaction graph from aggregated counters.
///
/// Only pairs with `count >= config.min_interaction_count` survive:
/// - `(d, d)` entries set the node's `internal_interactions`;
/// - cross pairs add one directed edge `d1 → d2` (canonical order) carrying
///   the weight, contributing-activity count and dominant activity type.
///
/// Node `size` is the number of distinct participant emails seen across the
/// department's qualifying interactions.
pub fn build_graph(
    interactions: &BTreeMap<PairKey, InteractionStats>,
    config: &DepartmentConfig,
) -> DepartmentGraph {
    let mut graph = DepartmentGraph::new();
    let mut dept_people: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for ((d1, d2), stats) in interactions {
        if stats.count < config.min_interaction_count {
            continue;
        }
        if d1 == d2 {
            graph.add_department(d1);
            if let Some(node) = graph.node_mut(d1) {
                node.internal_interactions = stats.count;
            }
            dept_people
                .entry(d1.as_str())
                .or_default()
                .extend(stats.participants.iter().map(String::as_str));
        } else {
            // Dominant type always exists: a qualifying pair saw ≥1 activity.
            let main_activity_type = stats
                .main_activity_type()
                .unwrap_or(crate::models::ActivityType::Other);
            graph.add_interaction(
                d1,
                d2,
                InteractionEdge {
                    weight: stats.count,
                    activities: stats.activity_ids.len(),
                    main_activity_type,
                },
            );
            for dept in [d1.as_str(), d2.as_str()] {
                dept_people
                    .entry(dept)
                    .or_default()
                    .extend(stats.participants.iter().map(String::as_str));
            }
        }
    }

    for (dept, people) in dept_people {
        if let Some(node) = graph.node_mut(dept) {
            node.size = people.len();
        }
    }

    graph
}

/// Report entries for the aggregated interactions, in canonical pair order.
pub fn interaction_entries(
    interactions: &BTreeMap<PairKey, InteractionStats>,
) -> Vec<DepartmentInteraction> {
    interactions
        .iter()
        .map(|((d1, d2), stats)| DepartmentInteraction {
            departments: (d1.clone(), d2.clone()),
            count: stats.count,
            activity_ids: stats.activity_ids.clone(),
            participants: stats.participants.iter().cloned().collect(),
            activity_types: stats.activity_types.clone(),
        })
        .collect()
}

/// Build the department × department collaboration matrix.
///
/// Diagonal = internal interactions, off-diagonal = directed edge weight
/// (0 when no edge). `total_interactions` is the sum of all edge weights,
/// which by construction equals the sum of the off-diagonal entries.
pub fn collaboration_matrix(graph: &DepartmentGraph) -> CollaborationMatrix {
    let departments = graph.departments();
    let mut matrix: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();

    for d1 in &departments {
        let row = matrix.entry(d1.clone()).or_default();
        for d2 in &departments {
            let value = if d1 == d2 {
                graph.node(d1).map(|n| n.internal_interactions).unwrap_or(0)
            } else {
                graph.edge(d1, d2).map(|e| e.weight).unwrap_or(0)
            };
            row.insert(d2.clone(), value);
        }
    }

    let total_interactions = graph
        .graph
        .edge_weights()
        .map(|e| e.weight)
        .sum();

    CollaborationMatrix {
        departments,
        matrix,
        total_interactions,
    }
}

// ============================================================================
// Tests
// ============================================================================
