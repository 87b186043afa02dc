//! Department analysis entry point.
//!
//! [`DepartmentAnalyzer::analyze`] runs the full pipeline over one batch:
//!
//! 1. Aggregate pair interactions ([`super::builder`])
//! 2. Infer communication flows and cross-functional activities
//! 3. Materialize the interaction graph
//! 4. Compute centrality and whole-graph metrics ([`super::algorithms`])
//! 5. Classify hubs, isolated departments, strong pairs, triangles and
//!    bottlenecks
//!
//! The analyzer holds only its configuration; every call rebuilds the graph
//! from scratch and hands it back inside the returned value, so repeated
//! analyses of different batches can never bleed into each other.

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::config::DepartmentConfig;
use crate::error::AnalysisError;
use crate::models::{generate_id, ActivityBatch, ActivityType};

use super::algorithms;
use super::builder;
use super::models::{
    BottleneckDepartment, CentralityMetrics, CollaborationPattern, CommunicationFlow,
    CrossFunctionalActivity, DepartmentAnalysis, DepartmentGraph, DepartmentReport, FlowKind,
};

/// How many subsequent activities are scanned for a follow-up flow.
const FLOW_LOOKAHEAD: usize = 10;
/// Maximum source → follow-up gap for a flow, in hours.
const FLOW_WINDOW_HOURS: f64 = 24.0;

const REASON_INTERMEDIARY: &str = "intermediary for many cross-department flows";
const REASON_SMALL_TEAM: &str = "small team serving many departments";
const REASON_INBOUND: &str = "inbound request concentration";

// ============================================================================
// Analyzer
// ============================================================================

/// Analyzes department-to-department interaction structure.
#[derive(Debug, Clone, Default)]
pub struct DepartmentAnalyzer {
    config: DepartmentConfig,
}

impl DepartmentAnalyzer {
    pub fn new(config: DepartmentConfig) -> Self {
        Self { config }
    }

    /// Run the full department analysis over one activity batch.
    ///
    /// Fails fast with [`AnalysisError`] on an inconsistent batch; for valid
    /// input (including an empty batch) every sub-computation is total and
    /// degenerate cases come back as zero counts and empty lists.
    pub fn analyze(&self, batch: &ActivityBatch) -> Result<DepartmentAnalysis, AnalysisError> {
        // 1. Aggregate raw pair interactions
        let interactions = builder::collect_interactions(batch)?;

        // 2. Activity-level inferences (independent of the threshold)
        let communication_flows = communication_flows(batch)?;
        let cross_functional_activities = cross_functional_activities(batch)?;

        // 3. Materialize the graph
        let graph = builder::build_graph(&interactions, &self.config);

        // 4. Metrics
        let centrality_metrics = centrality_metrics(&graph);
        let information_paths = algorithms::information_paths(&graph);
        let graph_metrics = algorithms::graph_metrics(&graph);

        // 5. Classification
        let bottleneck_departments = bottleneck_departments(&graph, &centrality_metrics);
        let collaboration_patterns =
            collaboration_patterns(&graph, self.config.strong_pair_threshold);

        info!(
            pairs = interactions.len(),
            departments = graph.node_count(),
            edges = graph.edge_count(),
            "department analysis complete"
        );

        let report = DepartmentReport {
            department_interactions: builder::interaction_entries(&interactions),
            communication_flows,
            cross_functional_activities,
            centrality_metrics,
            information_paths,
            bottleneck_departments,
            collaboration_patterns,
            graph_metrics,
            computed_at: Utc::now(),
        };

        Ok(DepartmentAnalysis { graph, report })
    }
}

// ============================================================================
// Centrality metrics assembly
// ============================================================================

/// Combine the centrality algorithms into one record per department.
pub fn centrality_metrics(graph: &DepartmentGraph) -> BTreeMap<String, CentralityMetrics> {
    let degree = algorithms::degree_centrality(graph);
    let betweenness = algorithms::betweenness_centrality(graph);
    let eigenvector = algorithms::eigenvector_centrality(graph);

    let g = &graph.graph;
    let mut metrics = BTreeMap::new();
    for idx in g.node_indices() {
        let name = &g[idx].name;
        metrics.insert(
            name.clone(),
            CentralityMetrics {
                degree_centrality: algorithms::round3(degree.get(name).copied().unwrap_or(0.0)),
                betweenness_centrality: algorithms::round3(
                    betweenness.get(name).copied().unwrap_or(0.0),
                ),
                eigenvector_centrality: algorithms::round3(
                    eigenvector.get(name).copied().unwrap_or(0.0),
                ),
                in_degree: g
                    .edges_directed(idx, petgraph::Direction::Incoming)
                    .count(),
                out_degree: g
                    .edges_directed(idx, petgraph::Direction::Outgoing)
                    .count(),
                total_interactions: outbound_weight(graph, idx),
            },
        );
    }
    metrics
}

fn outbound_weight(graph: &DepartmentGraph, idx: petgraph::graph::NodeIndex) -> u32 {
    use petgraph::visit::EdgeRef;
    graph
        .graph
        .edges_directed(idx, petgraph::Direction::Outgoing)
        .map(|e| e.weight().weight)
        .sum()
}

// ============================================================================
// Communication flows
// ============================================================================

/// Classify a source → follow-up activity pair into the flow taxonomy.
pub fn classify_flow(source: ActivityType, target: ActivityType) -> FlowKind {
    use ActivityType::*;
    match (source, target) {
        (Email, Meeting) => FlowKind::Coordination,
        (Meeting, Document) => FlowKind::DecisionDocumentation,
        (Document, Email) => FlowKind::DocumentSharing,
        (source, target) if source == target => FlowKind::Chain(source),
        _ => FlowKind::Generic,
    }
}

/// Infer communication flows: for each email or meeting, the first of the
/// next [`FLOW_LOOKAHEAD`] activities with overlapping departments within
/// [`FLOW_WINDOW_HOURS`] becomes its follow-up.
pub fn communication_flows(
    batch: &ActivityBatch,
) -> Result<Vec<CommunicationFlow>, AnalysisError> {
    let mut sorted: Vec<&crate::models::Activity> = batch.activities().iter().collect();
    sorted.sort_by_key(|a| a.timestamp);

    // Participant departments per activity, resolved once.
    let mut departments: Vec<BTreeSet<String>> = Vec::with_capacity(sorted.len());
    for activity in &sorted {
        let depts = batch
            .participants(activity)?
            .iter()
            .map(|p| p.department.clone())
            .collect();
        departments.push(depts);
    }

    let mut flows = Vec::new();

    for i in 0..sorted.len() {
        let current = sorted[i];
        if !matches!(
            current.activity_type,
            ActivityType::Email | ActivityType::Meeting
        ) {
            continue;
        }

        let window_end = (i + FLOW_LOOKAHEAD).min(sorted.len());
        for j in (i + 1)..window_end {
            let next = sorted[j];
            let common: Vec<String> = departments[i]
                .intersection(&departments[j])
                .cloned()
                .collect();
            let time_diff =
                (next.timestamp - current.timestamp).num_seconds() as f64 / 3600.0;

            if !common.is_empty() && time_diff < FLOW_WINDOW_HOURS {
                flows.push(CommunicationFlow {
                    id: generate_id("flow", &format!("{}_{}", current.id, next.id)),
                    source_activity: current.id.clone(),
                    target_activity: next.id.clone(),
                    source_departments: departments[i].iter().cloned().collect(),
                    target_departments: departments[j].iter().cloned().collect(),
                    common_departments: common,
                    time_difference_hours: (time_diff * 10.0).round() / 10.0,
                    flow_kind: classify_flow(current.activity_type, next.activity_type),
                });
                break;
            }
        }
    }

    Ok(flows)
}

// ============================================================================
// Cross-functional activities
// ============================================================================

/// Activities spanning ≥3 departments, sorted by complexity score descending.
pub fn cross_functional_activities(
    batch: &ActivityBatch,
) -> Result<Vec<CrossFunctionalActivity>, AnalysisError> {
    let mut result = Vec::new();

    for activity in batch.activities() {
        let participants = batch.participants(activity)?;

        let mut by_dept: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for person in &participants {
            by_dept
                .entry(person.department.clone())
                .or_default()
                .push(person.name.clone());
        }

        if by_dept.len() >= 3 {
            let complexity_score = by_dept.len() * participants.len();
            result.push(CrossFunctionalActivity {
                activity_id: activity.id.clone(),
                activity_type: activity.activity_type,
                timestamp: activity.timestamp,
                departments: by_dept.keys().cloned().collect(),
                participant_count: participants.len(),
                participants_by_department: by_dept,
                complexity_score,
                tags: activity.tags.clone(),
            });
        }
    }

    result.sort_by(|a, b| b.complexity_score.cmp(&a.complexity_score));
    Ok(result)
}

// ============================================================================
// Bottleneck departments
// ============================================================================

/// Score one department against the three bottleneck heuristics.
///
/// Returns `None` when no rule fires. Rules are additive:
/// betweenness > 0.3 → +3; degree centrality > 0.5 with a team smaller than
/// 5 → +2; in-degree more than 1.5× out-degree → +1.
pub fn bottleneck_assessment(
    department: &str,
    metrics: &CentralityMetrics,
    size: usize,
) -> Option<BottleneckDepartment> {
    let mut score = 0u32;
    let mut reasons = Vec::new();

    if metrics.betweenness_centrality > 0.3 {
        score += 3;
        reasons.push(REASON_INTERMEDIARY.to_string());
    }
    if metrics.degree_centrality > 0.5 && size < 5 {
        score += 2;
        reasons.push(REASON_SMALL_TEAM.to_string());
    }
    if metrics.in_degree as f64 > metrics.out_degree as f64 * 1.5 {
        score += 1;
        reasons.push(REASON_INBOUND.to_string());
    }

    if score == 0 {
        return None;
    }

    let recommendations = bottleneck_recommendations(department, &reasons);
    Some(BottleneckDepartment {
        department: department.to_string(),
        bottleneck_score: score,
        reasons,
        metrics: metrics.clone(),
        recommendations,
    })
}

fn bottleneck_recommendations(department: &str, reasons: &[String]) -> Vec<String> {
    let mut recommendations = Vec::new();

    if reasons.iter().any(|r| r == REASON_SMALL_TEAM) {
        recommendations.push(format!("Consider adding headcount to {department}"));
    }
    if reasons.iter().any(|r| r == REASON_INTERMEDIARY) {
        recommendations
            .push("Establish direct communication channels between the departments involved".to_string());
        recommendations.push("Set up a recurring cross-department sync".to_string());
    }
    if reasons.iter().any(|r| r == REASON_INBOUND) {
        recommendations.push("Establish a request prioritization process".to_string());
        recommendations.push("Offer self-service resources for common requests".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Review and streamline the department's processes".to_string());
    }

    recommendations
}

/// All departments with a positive bottleneck score, sorted descending.
pub fn bottleneck_departments(
    graph: &DepartmentGraph,
    metrics: &BTreeMap<String, CentralityMetrics>,
) -> Vec<BottleneckDepartment> {
    let mut bottlenecks: Vec<BottleneckDepartment> = metrics
        .iter()
        .filter_map(|(dept, m)| {
            let size = graph.node(dept).map(|n| n.size).unwrap_or(0);
            bottleneck_assessment(dept, m, size)
        })
        .collect();
    bottlenecks.sort_by(|a, b| b.bottleneck_score.cmp(&a.bottleneck_score));
    bottlenecks
}

// ============================================================================
// Collaboration patterns
// ============================================================================

/// Hub, isolated, strong-pair and triangle patterns over the built graph.
pub fn collaboration_patterns(
    graph: &DepartmentGraph,
    strong_pair_threshold: u32,
) -> Vec<CollaborationPattern> {
    use petgraph::visit::EdgeRef;

    let g = &graph.graph;
    let n = g.node_count();
    let mut patterns = Vec::new();

    // Hubs: connected to at least half of all departments, ranked by
    // connection count descending.
    let mut hubs: Vec<CollaborationPattern> = Vec::new();
    for idx in g.node_indices() {
        let connected = graph.total_degree(idx);
        if 2 * connected >= n {
            hubs.push(CollaborationPattern::Hub {
                department: g[idx].name.clone(),
                connected_departments: connected,
                total_interactions: outbound_weight(graph, idx),
                department_size: g[idx].size,
            });
        }
    }
    hubs.sort_by(|a, b| {
        let key = |p: &CollaborationPattern| match p {
            CollaborationPattern::Hub {
                connected_departments,
                ..
            } => *connected_departments,
            _ => 0,
        };
        key(b).cmp(&key(a))
    });
    patterns.extend(hubs);

    // Isolated: at most one connection.
    for idx in g.node_indices() {
        if graph.total_degree(idx) <= 1 {
            patterns.push(CollaborationPattern::Isolated {
                department: g[idx].name.clone(),
                recommendation: "Explore closer collaboration with other departments".to_string(),
            });
        }
    }

    // Strong pairs: edges at or above the threshold, ranked by weight.
    let mut strong: Vec<(u32, CollaborationPattern)> = g
        .edge_references()
        .filter(|e| e.weight().weight >= strong_pair_threshold)
        .map(|e| {
            let pair = (
                g[e.source()].name.clone(),
                g[e.target()].name.clone(),
            );
            (
                e.weight().weight,
                CollaborationPattern::StrongPair {
                    departments: pair,
                    interaction_count: e.weight().weight,
                    main_activity_type: e.weight().main_activity_type,
                },
            )
        })
        .collect();
    strong.sort_by(|a, b| b.0.cmp(&a.0));
    patterns.extend(strong.into_iter().map(|(_, p)| p));

    // Triangles: pairwise-connected triples on the undirected view,
    // canonical by the sorted department list.
    let departments = graph.departments();
    for i in 0..departments.len() {
        for j in (i + 1)..departments.len() {
            for k in (j + 1)..departments.len() {
                let (a, b, c) = (&departments[i], &departments[j], &departments[k]);
                if graph.connected(a, b) && graph.connected(b, c) && graph.connected(a, c) {
                    patterns.push(CollaborationPattern::Triangle {
                        departments: (a.clone(), b.clone(), c.clone()),
                    });
                }
            }
        }
    }

    patterns
}

// ============================================================================
// Tests
// ============================================================================
