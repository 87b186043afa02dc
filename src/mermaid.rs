//! Mermaid diagram rendering.
//!
//! Emits the textual diagram grammar consumed by the external note renderer:
//! a fenced ```` ```mermaid ```` block opening with `graph LR`, one node
//! declaration per line (`node_id["label"]`), optional per-node style lines,
//! and one edge line per connection (`a --> b`, or `a -->|w| b` for heavy
//! edges). Node IDs must be grammar-safe: spaces are replaced with `_`.
//!
//! This exact shape is a wire contract for downstream tooling; change it
//! only in lockstep with the consumers.

use petgraph::visit::EdgeRef;

use crate::department::DepartmentGraph;
use crate::models::Workflow;

/// Edge weights above this render with an explicit `-->|w|` label.
const LABELED_EDGE_THRESHOLD: u32 = 5;

fn node_id(name: &str) -> String {
    name.replace(' ', "_")
}

fn escape_label(label: &str) -> String {
    label.replace('"', "\\\"")
}

// ============================================================================
// Department network
// ============================================================================

/// Render the department interaction network.
///
/// Node styles bucket departments by size; edges heavier than
/// [`LABELED_EDGE_THRESHOLD`] carry their weight inline. An empty graph
/// renders a single `NoData` placeholder node.
pub fn department_network(graph: &DepartmentGraph) -> String {
    if graph.node_count() == 0 {
        return "```mermaid\ngraph LR\n    NoData[\"no data\"]\n```".to_string();
    }

    let mut lines = vec!["```mermaid".to_string(), "graph LR".to_string()];

    for name in graph.departments() {
        let size = graph.node(&name).map(|n| n.size).unwrap_or(0);
        let id = node_id(&name);
        lines.push(format!(
            "    {id}[\"{}\\n({size} members)\"]",
            escape_label(&name)
        ));

        let style = if size > 10 {
            format!("    style {id} fill:#ff9999,stroke:#333,stroke-width:4px")
        } else if size > 5 {
            format!("    style {id} fill:#ffcc99,stroke:#333,stroke-width:2px")
        } else {
            format!("    style {id} fill:#ccffcc,stroke:#333,stroke-width:1px")
        };
        lines.push(style);
    }

    for edge in graph.graph.edge_references() {
        let source = node_id(&graph.graph[edge.source()].name);
        let target = node_id(&graph.graph[edge.target()].name);
        let weight = edge.weight().weight;
        if weight > LABELED_EDGE_THRESHOLD {
            lines.push(format!("    {source} -->|{weight}| {target}"));
        } else {
            lines.push(format!("    {source} --> {target}"));
        }
    }

    lines.push("```".to_string());
    lines.join("\n")
}

// ============================================================================
// Workflow
// ============================================================================

/// Render a workflow's step-dependency flow.
///
/// Steps are numbered `S0..Sn` in insertion order; dependency edges point
/// dependency → step. Parallel root steps (no dependencies) are linked
/// pairwise with dashed `-.->` edges so they render side by side.
pub fn workflow_flow(workflow: &Workflow) -> String {
    let mut lines = vec!["```mermaid".to_string(), "graph LR".to_string()];

    for (i, step) in workflow.steps.iter().enumerate() {
        let mut label = escape_label(&step.name);
        if let Some(responsible) = &step.responsible {
            label.push_str(&format!("\\n({})", escape_label(&responsible.name)));
        }
        if let Some(duration) = step.duration_hours {
            label.push_str(&format!("\\n{duration}h"));
        }
        lines.push(format!("    S{i}[\"{label}\"]"));
    }

    for (i, step) in workflow.steps.iter().enumerate() {
        for dep in &step.dependencies {
            if let Some(j) = workflow.steps.iter().position(|s| &s.id == dep) {
                lines.push(format!("    S{j} --> S{i}"));
            }
        }
    }

    let roots: Vec<usize> = workflow
        .steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.dependencies.is_empty())
        .map(|(i, _)| i)
        .collect();
    if roots.len() > 1 {
        for pair in roots.windows(2) {
            lines.push(format!("    S{} -.-> S{}", pair[0], pair[1]));
        }
    }

    lines.push("```".to_string());
    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::models::InteractionEdge;
    use crate::models::{ActivityType, Frequency, Person, Priority, WorkflowStep};

    #[test]
    fn test_empty_network_placeholder() {
        let rendered = department_network(&DepartmentGraph::new());
        assert_eq!(rendered, "```mermaid\ngraph LR\n    NoData[\"no data\"]\n```");
    }

    #[test]
    fn test_network_nodes_edges_and_styles() {
        let mut g = DepartmentGraph::new();
        g.add_interaction(
            "Customer Support",
            "Engineering",
            InteractionEdge {
                weight: 8,
                activities: 8,
                main_activity_type: ActivityType::Email,
            },
        );
        g.add_interaction(
            "Engineering",
            "Sales",
            InteractionEdge {
                weight: 3,
                activities: 3,
                main_activity_type: ActivityType::Chat,
            },
        );

        let rendered = department_network(&g);
        assert!(rendered.starts_with("```mermaid\ngraph LR"));
        assert!(rendered.ends_with("```"));
        // spaces in node ids are replaced
        assert!(rendered.contains("Customer_Support[\"Customer Support\\n"));
        assert!(rendered.contains("style Customer_Support fill:"));
        // heavy edge carries its weight, light edge does not
        assert!(rendered.contains("Customer_Support -->|8| Engineering"));
        assert!(rendered.contains("Engineering --> Sales"));
    }

    #[test]
    fn test_workflow_flow_shape() {
        let mut w = Workflow::new(
            "workflow_m".into(),
            "demo".into(),
            Person::new("Owner", "Ops", "lead", "owner@example.com"),
            Frequency::Weekly,
            Priority::Medium,
        );
        let mut s0 = WorkflowStep::new("a".into(), "draft \"spec\"".into(), String::new());
        s0.duration_hours = Some(1.5);
        let s1 = WorkflowStep::new("b".into(), "review".into(), String::new());
        let mut s2 = WorkflowStep::new("c".into(), "publish".into(), String::new());
        s2.add_dependency("a");
        s2.add_dependency("b");
        s2.responsible = Some(Person::new("Resp", "Ops", "member", "resp@example.com"));
        w.add_step(s0);
        w.add_step(s1);
        w.add_step(s2);

        let rendered = workflow_flow(&w);
        assert!(rendered.starts_with("```mermaid\ngraph LR"));
        // quote escaping and duration suffix on the node label
        assert!(rendered.contains("S0[\"draft \\\"spec\\\"\\n1.5h\"]"));
        // responsible name on the labeled node
        assert!(rendered.contains("S2[\"publish\\n(Resp)\"]"));
        // dependency edges
        assert!(rendered.contains("S0 --> S2"));
        assert!(rendered.contains("S1 --> S2"));
        // parallel roots joined with a dashed link
        assert!(rendered.contains("S0 -.-> S1"));
    }
}
