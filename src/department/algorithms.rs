//! Graph algorithms over the department interaction graph.
//!
//! - **Degree centrality** — direct connectivity fraction (custom, trivial)
//! - **Betweenness centrality** — Brandes over Dijkstra distances using edge
//!   weights; implemented directly because `rustworkx_core`'s betweenness is
//!   unweighted
//! - **Eigenvector centrality** — via `rustworkx_core::centrality`, with the
//!   all-zero fallback when the power iteration does not converge
//! - **Clustering coefficient** — local coefficient per node on the
//!   undirected view
//! - **Weak connectivity** — BFS on the undirected view
//! - **Information paths** — all-pairs BFS shortest hop-count routes
//!
//! All functions are pure over the graph snapshot and return results keyed
//! by department name.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::convert::Infallible;
use tracing::warn;

use super::models::{DepartmentGraph, GraphMetrics, InformationPath};

/// Round to 3 decimals, the precision reported for all centrality scores.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// ============================================================================
// Degree centrality
// ============================================================================

/// Fraction of all other departments each department is directly connected
/// to: `(in_degree + out_degree) / (n - 1)`. Zero when the graph has fewer
/// than two nodes.
pub fn degree_centrality(graph: &DepartmentGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    let n = g.node_count();
    let mut result = HashMap::with_capacity(n);
    if n == 0 {
        return result;
    }

    for idx in g.node_indices() {
        let score = if n > 1 {
            graph.total_degree(idx) as f64 / (n - 1) as f64
        } else {
            0.0
        };
        result.insert(g[idx].name.clone(), score);
    }
    result
}

// ============================================================================
// Betweenness centrality (weighted Brandes)
// ============================================================================

/// Entry in the Dijkstra frontier; ordered as a min-heap on distance.
#[derive(Copy, Clone, PartialEq)]
struct Frontier {
    dist: f64,
    node: usize,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the closest node first.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Weighted betweenness centrality: the fraction of weighted shortest paths
/// between other node pairs passing through each node.
///
/// Brandes' algorithm with Dijkstra (edge weights as distances, the same
/// convention as the original weighted computation), normalized by
/// `1 / ((n-1)(n-2))` for directed graphs. All scores are zero when n ≤ 2.
pub fn betweenness_centrality(graph: &DepartmentGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    let n = g.node_count();
    let mut bc = vec![0.0f64; n];

    if n > 2 {
        for s in g.node_indices() {
            let mut dist = vec![f64::INFINITY; n];
            let mut sigma = vec![0.0f64; n];
            let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut settled = vec![false; n];
            let mut order: Vec<usize> = Vec::with_capacity(n);
            let mut heap = BinaryHeap::new();

            dist[s.index()] = 0.0;
            sigma[s.index()] = 1.0;
            heap.push(Frontier {
                dist: 0.0,
                node: s.index(),
            });

            while let Some(Frontier { dist: d, node: v }) = heap.pop() {
                if settled[v] {
                    continue;
                }
                settled[v] = true;
                order.push(v);

                for edge in g.edges(NodeIndex::new(v)) {
                    let w = edge.target().index();
                    let nd = d + f64::from(edge.weight().weight);
                    if nd < dist[w] {
                        dist[w] = nd;
                        sigma[w] = sigma[v];
                        preds[w] = vec![v];
                        heap.push(Frontier { dist: nd, node: w });
                    } else if nd == dist[w] {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    }
                }
            }

            // Dependency accumulation in reverse settle order.
            let mut delta = vec![0.0f64; n];
            while let Some(w) = order.pop() {
                for &v in &preds[w] {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
                if w != s.index() {
                    bc[w] += delta[w];
                }
            }
        }

        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        for score in bc.iter_mut() {
            *score *= scale;
        }
    }

    g.node_indices()
        .map(|idx| (g[idx].name.clone(), bc[idx.index()]))
        .collect()
}

// ============================================================================
// Eigenvector centrality (via rustworkx-core)
// ============================================================================

/// Weighted eigenvector centrality with up to 1000 power iterations.
///
/// Non-convergence yields 0.0 for every department (with a warning): callers
/// must read that as "not computed", not as a true zero score.
pub fn eigenvector_centrality(graph: &DepartmentGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return HashMap::new();
    }

    let result: Result<Option<Vec<f64>>, Infallible> =
        rustworkx_core::centrality::eigenvector_centrality(
            g,
            |edge| Ok(f64::from(edge.weight().weight)),
            Some(1000),
            None,
        );

    let scores = match result {
        Ok(Some(scores)) => scores,
        Ok(None) => {
            warn!("eigenvector centrality did not converge; reporting zeros (not computed)");
            vec![0.0; g.node_count()]
        }
        Err(never) => match never {},
    };

    g.node_indices()
        .map(|idx| {
            let score = scores.get(idx.index()).copied().unwrap_or(0.0);
            (g[idx].name.clone(), score)
        })
        .collect()
}

// ============================================================================
// Clustering coefficient
// ============================================================================

/// Local clustering coefficient per node on the undirected view:
/// `triangles / (k * (k - 1) / 2)` over the k unique neighbors.
pub fn clustering_coefficient(graph: &DepartmentGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    let mut result = HashMap::with_capacity(g.node_count());

    for idx in g.node_indices() {
        let mut neighbors: Vec<NodeIndex> = Vec::new();
        let mut seen = HashSet::new();
        for n in g.neighbors_directed(idx, Direction::Outgoing) {
            if n != idx && seen.insert(n) {
                neighbors.push(n);
            }
        }
        for n in g.neighbors_directed(idx, Direction::Incoming) {
            if n != idx && seen.insert(n) {
                neighbors.push(n);
            }
        }

        let k = neighbors.len();
        if k < 2 {
            result.insert(g[idx].name.clone(), 0.0);
            continue;
        }

        let mut triangles = 0usize;
        for i in 0..neighbors.len() {
            for j in (i + 1)..neighbors.len() {
                let (ni, nj) = (neighbors[i], neighbors[j]);
                if g.contains_edge(ni, nj) || g.contains_edge(nj, ni) {
                    triangles += 1;
                }
            }
        }

        let possible = k * (k - 1) / 2;
        result.insert(g[idx].name.clone(), triangles as f64 / possible as f64);
    }

    result
}

// ============================================================================
// Weak connectivity
// ============================================================================

/// Whether every node is reachable from every other when edges are treated
/// as undirected. An empty graph is not connected.
pub fn is_weakly_connected(graph: &DepartmentGraph) -> bool {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return false;
    }

    let start = match g.node_indices().next() {
        Some(idx) => idx,
        None => return false,
    };
    let mut visited = HashSet::with_capacity(n);
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for dir in [Direction::Outgoing, Direction::Incoming] {
            for neighbor in g.neighbors_directed(current, dir) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    visited.len() == n
}

// ============================================================================
// Graph metrics
// ============================================================================

/// Whole-graph structural metrics. An empty graph yields the all-zero
/// record rather than an error.
pub fn graph_metrics(graph: &DepartmentGraph) -> GraphMetrics {
    let g = &graph.graph;
    let n = g.node_count();
    let m = g.edge_count();
    if n == 0 {
        return GraphMetrics::default();
    }

    let density = if n > 1 {
        m as f64 / (n as f64 * (n - 1) as f64)
    } else {
        0.0
    };

    // Every directed edge contributes to the degree of both endpoints.
    let average_degree = 2.0 * m as f64 / n as f64;

    let clustering = clustering_coefficient(graph);
    let clustering_coefficient = if clustering.is_empty() {
        0.0
    } else {
        clustering.values().sum::<f64>() / clustering.len() as f64
    };

    GraphMetrics {
        node_count: n,
        edge_count: m,
        density,
        is_connected: is_weakly_connected(graph),
        average_degree,
        clustering_coefficient,
    }
}

// ============================================================================
// Information paths
// ============================================================================

/// All-pairs shortest information routes by hop count.
///
/// BFS from every department; for each ordered pair the shortest path is
/// recorded when it routes through at least one intermediary (direct edges
/// carry no routing information). Unreachable pairs are recorded explicitly
/// with `path: None` and an explanatory note. Sorted ascending by length,
/// unreachable entries last.
pub fn information_paths(graph: &DepartmentGraph) -> Vec<InformationPath> {
    let g = &graph.graph;
    if g.node_count() < 2 {
        return Vec::new();
    }

    let mut names: Vec<(NodeIndex, String)> = g
        .node_indices()
        .map(|idx| (idx, g[idx].name.clone()))
        .collect();
    names.sort_by(|a, b| a.1.cmp(&b.1));

    let mut paths = Vec::new();

    for (source_idx, source) in &names {
        // BFS with parent tracking from this source.
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(*source_idx);
        queue.push_back(*source_idx);
        while let Some(current) = queue.pop_front() {
            for neighbor in g.neighbors_directed(current, Direction::Outgoing) {
                if visited.insert(neighbor) {
                    parent.insert(neighbor, current);
                    queue.push_back(neighbor);
                }
            }
        }

        for (target_idx, target) in &names {
            if target_idx == source_idx {
                continue;
            }

            if visited.contains(target_idx) {
                // Reconstruct source → target.
                let mut route = vec![*target_idx];
                let mut cursor = *target_idx;
                while let Some(&prev) = parent.get(&cursor) {
                    route.push(prev);
                    cursor = prev;
                }
                route.reverse();

                let hops = (route.len() - 1) as u32;
                if hops <= 1 {
                    // Directly connected: no intermediary to report.
                    continue;
                }

                let total_weight = route
                    .windows(2)
                    .filter_map(|pair| {
                        g.find_edge(pair[0], pair[1])
                            .and_then(|e| g.edge_weight(e))
                            .map(|e| e.weight)
                    })
                    .sum();

                let path_names: Vec<String> =
                    route.iter().map(|idx| g[*idx].name.clone()).collect();
                let intermediaries = path_names[1..path_names.len() - 1].to_vec();

                paths.push(InformationPath {
                    source: source.clone(),
                    target: target.clone(),
                    path: Some(path_names),
                    length: Some(hops),
                    intermediary_departments: intermediaries,
                    total_weight,
                    note: None,
                });
            } else {
                paths.push(InformationPath {
                    source: source.clone(),
                    target: target.clone(),
                    path: None,
                    length: None,
                    intermediary_departments: Vec::new(),
                    total_weight: 0,
                    note: Some("no direct information route exists".to_string()),
                });
            }
        }
    }

    // Stable sort: unreachable (None) entries go last, insertion order
    // (sorted source/target) is preserved within equal lengths.
    paths.sort_by_key(|p| p.length.unwrap_or(u32::MAX));
    paths
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;
    use crate::department::models::InteractionEdge;

    fn edge(weight: u32) -> InteractionEdge {
        InteractionEdge {
            weight,
            activities: weight as usize,
            main_activity_type: ActivityType::Email,
        }
    }

    /// A → B → C chain with unit weights.
    fn chain() -> DepartmentGraph {
        let mut g = DepartmentGraph::new();
        g.add_interaction("A", "B", edge(1));
        g.add_interaction("B", "C", edge(1));
        g
    }

    /// Star: Hub connected to 4 leaves.
    fn star() -> DepartmentGraph {
        let mut g = DepartmentGraph::new();
        for leaf in ["L1", "L2", "L3", "L4"] {
            g.add_interaction("Hub", leaf, edge(2));
        }
        g
    }

    /// Triangle A ↔ B ↔ C ↔ A (one directed edge per pair).
    fn triangle() -> DepartmentGraph {
        let mut g = DepartmentGraph::new();
        g.add_interaction("A", "B", edge(1));
        g.add_interaction("B", "C", edge(1));
        g.add_interaction("A", "C", edge(1));
        g
    }

    #[test]
    fn test_degree_centrality_star() {
        let dc = degree_centrality(&star());
        assert!((dc["Hub"] - 1.0).abs() < f64::EPSILON); // 4 of 4 others
        assert!((dc["L1"] - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_degree_centrality_empty_and_singleton() {
        assert!(degree_centrality(&DepartmentGraph::new()).is_empty());
        let mut g = DepartmentGraph::new();
        g.add_department("Solo");
        assert!((degree_centrality(&g)["Solo"] - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_betweenness_chain_middle() {
        let bc = betweenness_centrality(&chain());
        // B sits on the only A→C shortest path; scale = 1/((3-1)(3-2)) = 0.5
        assert!((bc["B"] - 0.5).abs() < 1e-9);
        assert!((bc["A"] - 0.0).abs() < 1e-9);
        assert!((bc["C"] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_respects_weights() {
        // Direct A→C edge exists but is "longer" than the A→B→C detour.
        let mut g = DepartmentGraph::new();
        g.add_interaction("A", "B", edge(1));
        g.add_interaction("B", "C", edge(1));
        g.add_interaction("A", "C", edge(10));
        let bc = betweenness_centrality(&g);
        assert!(
            bc["B"] > 0.0,
            "B should mediate the weighted shortest A→C path, got {}",
            bc["B"]
        );
    }

    #[test]
    fn test_betweenness_small_graphs_zero() {
        let mut g = DepartmentGraph::new();
        g.add_interaction("A", "B", edge(3));
        let bc = betweenness_centrality(&g);
        assert!((bc["A"] - 0.0).abs() < f64::EPSILON);
        assert!((bc["B"] - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eigenvector_triangle_positive() {
        let ev = eigenvector_centrality(&triangle());
        assert_eq!(ev.len(), 3);
        assert!(ev.values().any(|&v| v > 0.0));
    }

    #[test]
    fn test_eigenvector_empty() {
        assert!(eigenvector_centrality(&DepartmentGraph::new()).is_empty());
    }

    #[test]
    fn test_clustering_triangle_all_one() {
        let cc = clustering_coefficient(&triangle());
        for (dept, coeff) in &cc {
            assert!(
                (coeff - 1.0).abs() < f64::EPSILON,
                "{dept} should have coefficient 1.0, got {coeff}"
            );
        }
    }

    #[test]
    fn test_clustering_star_center_zero() {
        let cc = clustering_coefficient(&star());
        assert!((cc["Hub"] - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weak_connectivity() {
        assert!(is_weakly_connected(&chain()));
        assert!(!is_weakly_connected(&DepartmentGraph::new()));

        let mut split = chain();
        split.add_interaction("X", "Y", edge(1));
        assert!(!is_weakly_connected(&split));
    }

    #[test]
    fn test_graph_metrics_chain() {
        let metrics = graph_metrics(&chain());
        assert_eq!(metrics.node_count, 3);
        assert_eq!(metrics.edge_count, 2);
        assert!((metrics.density - 2.0 / 6.0).abs() < 1e-9);
        assert!((metrics.average_degree - 4.0 / 3.0).abs() < 1e-9);
        assert!(metrics.is_connected);
    }

    #[test]
    fn test_graph_metrics_empty() {
        let metrics = graph_metrics(&DepartmentGraph::new());
        assert_eq!(metrics, GraphMetrics::default());
        assert!(!metrics.is_connected);
    }

    #[test]
    fn test_information_paths_chain() {
        let paths = information_paths(&chain());

        // A→C routes via B; B→A, C→A, C→B are unreachable; direct pairs skipped.
        assert_eq!(paths.len(), 4);

        let first = &paths[0];
        assert_eq!(first.source, "A");
        assert_eq!(first.target, "C");
        assert_eq!(first.length, Some(2));
        assert_eq!(first.intermediary_departments, vec!["B".to_string()]);
        assert_eq!(first.total_weight, 2);

        // Unreachable entries come last with explicit notes.
        for p in &paths[1..] {
            assert!(p.path.is_none());
            assert!(p.length.is_none());
            assert!(p.note.is_some());
        }
    }

    #[test]
    fn test_information_paths_trivial_graphs() {
        assert!(information_paths(&DepartmentGraph::new()).is_empty());
        let mut g = DepartmentGraph::new();
        g.add_department("Only");
        assert!(information_paths(&g).is_empty());
    }
}
