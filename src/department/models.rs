//! Department analysis data models.
//!
//! ## Derived graph
//! - [`DeptNode`] / [`InteractionEdge`] — node and edge payloads
//! - [`DepartmentGraph`] — petgraph wrapper with department-name ↔ NodeIndex
//!   mapping; ephemeral, rebuilt in full on every analysis
//! - [`InteractionStats`] — raw pair aggregation feeding the graph builder
//!
//! ## Report types
//! - [`CentralityMetrics`] / [`GraphMetrics`] — per-node and whole-graph scores
//! - [`InformationPath`], [`CommunicationFlow`], [`CrossFunctionalActivity`],
//!   [`BottleneckDepartment`], [`CollaborationPattern`], [`CollaborationMatrix`]
//! - [`DepartmentReport`] — the full serializable analysis result
//! - [`DepartmentAnalysis`] — report plus the owned graph snapshot

use chrono::{DateTime, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::ActivityType;

// ============================================================================
// Graph payloads
// ============================================================================

/// A department node in the interaction graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeptNode {
    pub name: String,
    /// Distinct participants observed in this department's qualifying
    /// interactions
    pub size: usize,
    /// Count of activities with ≥2 participants from this department alone.
    /// Stored on the node, never as a self-edge.
    pub internal_interactions: u32,
}

/// A directed interaction edge between two departments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEdge {
    /// Number of shared activities (the aggregated pair count)
    pub weight: u32,
    /// Number of contributing activities
    pub activities: usize,
    /// Most frequent contributing activity type
    pub main_activity_type: ActivityType,
}

// ============================================================================
// DepartmentGraph — petgraph wrapper with name mapping
// ============================================================================

/// Weighted directed department-interaction graph.
///
/// Thin wrapper around `petgraph::DiGraph` with a department-name →
/// `NodeIndex` map for O(1) lookups. Owned by the [`DepartmentAnalysis`]
/// that built it; discarded with the analysis value.
#[derive(Debug, Clone, Default)]
pub struct DepartmentGraph {
    pub graph: DiGraph<DeptNode, InteractionEdge>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl DepartmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a department node; returns the existing index if already present.
    pub fn add_department(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.name_to_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(DeptNode {
            name: name.to_string(),
            size: 0,
            internal_interactions: 0,
        });
        self.name_to_index.insert(name.to_string(), idx);
        idx
    }

    /// Add a directed interaction edge, creating endpoints as needed.
    pub fn add_interaction(&mut self, from: &str, to: &str, edge: InteractionEdge) {
        let from_idx = self.add_department(from);
        let to_idx = self.add_department(to);
        self.graph.add_edge(from_idx, to_idx, edge);
    }

    pub fn index(&self, name: &str) -> Option<NodeIndex> {
        self.name_to_index.get(name).copied()
    }

    pub fn node(&self, name: &str) -> Option<&DeptNode> {
        self.graph.node_weight(self.index(name)?)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut DeptNode> {
        let idx = self.index(name)?;
        self.graph.node_weight_mut(idx)
    }

    /// Directed edge lookup (`from → to` only).
    pub fn edge(&self, from: &str, to: &str) -> Option<&InteractionEdge> {
        let from_idx = self.index(from)?;
        let to_idx = self.index(to)?;
        let edge_idx = self.graph.find_edge(from_idx, to_idx)?;
        self.graph.edge_weight(edge_idx)
    }

    /// Whether the two departments are connected in either direction.
    pub fn connected(&self, a: &str, b: &str) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(ai), Some(bi)) => {
                self.graph.find_edge(ai, bi).is_some() || self.graph.find_edge(bi, ai).is_some()
            }
            _ => false,
        }
    }

    /// In-degree + out-degree of a node.
    pub fn total_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
            + self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Department names in sorted order (deterministic iteration).
    pub fn departments(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .graph
            .node_weights()
            .map(|n| n.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

// ============================================================================
// Aggregation record
// ============================================================================

/// Accumulated interaction data for one canonical department pair.
///
/// The key `(d, d)` holds a department's intra-department interactions.
#[derive(Debug, Clone, Default)]
pub struct InteractionStats {
    pub count: u32,
    pub activity_ids: Vec<String>,
    /// Deduplicated participant emails from both sides of the pair
    pub participants: BTreeSet<String>,
    pub activity_types: BTreeMap<ActivityType, u32>,
}

impl InteractionStats {
    /// Most frequent contributing activity type; ties break by the
    /// [`ActivityType`] declaration order so repeated runs agree.
    pub fn main_activity_type(&self) -> Option<ActivityType> {
        self.activity_types
            .iter()
            .max_by(|(ta, ca), (tb, cb)| ca.cmp(cb).then(tb.cmp(ta)))
            .map(|(ty, _)| *ty)
    }
}

// ============================================================================
// Report types
// ============================================================================

/// Per-department centrality scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CentralityMetrics {
    /// Fraction of other departments directly connected (3 decimals)
    pub degree_centrality: f64,
    /// Weighted betweenness, normalized (3 decimals)
    pub betweenness_centrality: f64,
    /// Weighted eigenvector score (3 decimals); 0.0 when the power
    /// iteration did not converge — "not computed", not a true zero
    pub eigenvector_centrality: f64,
    pub in_degree: usize,
    pub out_degree: usize,
    /// Sum of outbound edge weights
    pub total_interactions: u32,
}

/// Whole-graph structural metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    /// Single weakly connected component?
    pub is_connected: bool,
    pub average_degree: f64,
    /// Average local clustering coefficient of the undirected view
    pub clustering_coefficient: f64,
}

/// One aggregated department-pair entry of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentInteraction {
    /// Canonical (sorted) department pair; equal names = intra-department
    pub departments: (String, String),
    pub count: u32,
    pub activity_ids: Vec<String>,
    pub participants: Vec<String>,
    pub activity_types: BTreeMap<ActivityType, u32>,
}

/// Shortest information route between two departments.
///
/// Only pairs that route through at least one intermediary are listed;
/// unreachable ordered pairs are recorded with `path: None` and an
/// explanatory note rather than omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformationPath {
    pub source: String,
    pub target: String,
    pub path: Option<Vec<String>>,
    /// Hop count; `None` means unreachable (sorted last)
    pub length: Option<u32>,
    pub intermediary_departments: Vec<String>,
    /// Sum of edge weights along the path
    pub total_weight: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Taxonomy of inferred communication flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// email → meeting
    Coordination,
    /// meeting → document
    DecisionDocumentation,
    /// document → email
    DocumentSharing,
    /// same type on both ends
    Chain(ActivityType),
    Generic,
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordination => write!(f, "coordination flow"),
            Self::DecisionDocumentation => write!(f, "decision documentation"),
            Self::DocumentSharing => write!(f, "document sharing"),
            Self::Chain(ty) => write!(f, "chain of {ty}"),
            Self::Generic => write!(f, "generic flow"),
        }
    }
}

impl Serialize for FlowKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// An inferred source → follow-up communication flow.
#[derive(Debug, Clone, Serialize)]
pub struct CommunicationFlow {
    pub id: String,
    pub source_activity: String,
    pub target_activity: String,
    pub source_departments: Vec<String>,
    pub target_departments: Vec<String>,
    pub common_departments: Vec<String>,
    /// Rounded to one decimal
    pub time_difference_hours: f64,
    pub flow_kind: FlowKind,
}

/// An activity spanning three or more departments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossFunctionalActivity {
    pub activity_id: String,
    pub activity_type: ActivityType,
    pub timestamp: DateTime<Utc>,
    pub departments: Vec<String>,
    pub participant_count: usize,
    /// Department → participant names
    pub participants_by_department: BTreeMap<String, Vec<String>>,
    /// department count × participant count
    pub complexity_score: usize,
    pub tags: Vec<String>,
}

/// A department flagged as a likely throughput constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleneckDepartment {
    pub department: String,
    pub bottleneck_score: u32,
    pub reasons: Vec<String>,
    pub metrics: CentralityMetrics,
    pub recommendations: Vec<String>,
}

/// Structural collaboration patterns over the built graph.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollaborationPattern {
    /// Connected to at least half of all departments
    Hub {
        department: String,
        connected_departments: usize,
        total_interactions: u32,
        department_size: usize,
    },
    /// Total degree ≤ 1
    Isolated {
        department: String,
        recommendation: String,
    },
    /// Edge weight at or above the strong-pair threshold
    StrongPair {
        departments: (String, String),
        interaction_count: u32,
        main_activity_type: ActivityType,
    },
    /// Three pairwise-connected departments (canonical sorted triple)
    Triangle { departments: (String, String, String) },
}

/// Department × department interaction matrix.
///
/// Diagonal entries are intra-department counts; off-diagonal entries are
/// directed edge weights. `total_interactions` equals the sum of all edge
/// weights in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationMatrix {
    pub departments: Vec<String>,
    pub matrix: BTreeMap<String, BTreeMap<String, u32>>,
    pub total_interactions: u32,
}

/// Complete serializable result of one department analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentReport {
    pub department_interactions: Vec<DepartmentInteraction>,
    pub communication_flows: Vec<CommunicationFlow>,
    pub cross_functional_activities: Vec<CrossFunctionalActivity>,
    pub centrality_metrics: BTreeMap<String, CentralityMetrics>,
    pub information_paths: Vec<InformationPath>,
    pub bottleneck_departments: Vec<BottleneckDepartment>,
    pub collaboration_patterns: Vec<CollaborationPattern>,
    pub graph_metrics: GraphMetrics,
    pub computed_at: DateTime<Utc>,
}

/// Report plus the graph snapshot it was derived from.
///
/// The graph is owned here (not retained by the analyzer) so matrix and
/// diagram renderers can consume it after the analysis returns.
#[derive(Debug, Clone)]
pub struct DepartmentAnalysis {
    pub graph: DepartmentGraph,
    pub report: DepartmentReport,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_department_idempotent() {
        let mut g = DepartmentGraph::new();
        let a = g.add_department("Engineering");
        let b = g.add_department("Engineering");
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_edge_is_directional() {
        let mut g = DepartmentGraph::new();
        g.add_interaction(
            "Engineering",
            "Sales",
            InteractionEdge {
                weight: 5,
                activities: 5,
                main_activity_type: ActivityType::Email,
            },
        );
        assert!(g.edge("Engineering", "Sales").is_some());
        assert!(g.edge("Sales", "Engineering").is_none());
        assert!(g.connected("Sales", "Engineering"));
    }

    #[test]
    fn test_total_degree_counts_both_directions() {
        let mut g = DepartmentGraph::new();
        let edge = |w| InteractionEdge {
            weight: w,
            activities: w as usize,
            main_activity_type: ActivityType::Chat,
        };
        g.add_interaction("A", "B", edge(1));
        g.add_interaction("C", "A", edge(2));
        let a = g.index("A").unwrap();
        assert_eq!(g.total_degree(a), 2);
    }

    #[test]
    fn test_main_activity_type_tie_breaks_by_declaration_order() {
        let mut stats = InteractionStats::default();
        stats.activity_types.insert(ActivityType::Meeting, 2);
        stats.activity_types.insert(ActivityType::Email, 2);
        stats.activity_types.insert(ActivityType::Chat, 1);
        // email and meeting tie; email is declared first
        assert_eq!(stats.main_activity_type(), Some(ActivityType::Email));
    }

    #[test]
    fn test_flow_kind_display() {
        assert_eq!(FlowKind::Coordination.to_string(), "coordination flow");
        assert_eq!(
            FlowKind::Chain(ActivityType::Email).to_string(),
            "chain of email"
        );
    }
}
