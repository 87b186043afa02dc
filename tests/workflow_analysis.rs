//! Integration tests for workflow mining, construction and critical-path
//! analysis.

use chrono::{Duration, TimeZone, Utc};

use orglens::models::{
    Activity, ActivityBatch, ActivityType, Frequency, Person, Priority, Workflow, WorkflowStep,
};
use orglens::workflow::{analyze_bottlenecks, critical_path, PatternKind, WorkflowAnalyzer};
use orglens::{mermaid, WorkflowConfig};

fn base() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn act(
    ty: ActivityType,
    offset_hours: i64,
    content: &str,
    tags: &[&str],
    people: &[&Person],
) -> Activity {
    let mut a = Activity::new(ty, base() + Duration::hours(offset_hours), content);
    for tag in tags {
        a.add_tag(tag);
    }
    for p in people {
        a.add_participant(&p.id);
    }
    a
}

fn step(id: &str, duration: f64, deps: &[&str]) -> WorkflowStep {
    let mut s = WorkflowStep::new(id.to_string(), id.to_string(), String::new());
    s.duration_hours = Some(duration);
    for dep in deps {
        s.add_dependency(dep);
    }
    s
}

fn manual_workflow(steps: Vec<WorkflowStep>) -> Workflow {
    let mut w = Workflow::new(
        "workflow_manual".into(),
        "manual".into(),
        Person::new("Owner", "Ops", "lead", "owner@example.com"),
        Frequency::Weekly,
        Priority::Medium,
    );
    for s in steps {
        w.add_step(s);
    }
    w
}

// ============================================================================
// Scenario B — weekly recurring person sequence
// ============================================================================

/// Alice runs (email, document, meeting) with matching tags on days 0, 7, 14.
fn weekly_triple_batch() -> ActivityBatch {
    let alice = Person::new("Alice", "Engineering", "engineer", "alice@example.com");
    let mut acts = Vec::new();
    for day in [0i64, 7, 14] {
        let h = day * 24;
        acts.push(act(ActivityType::Email, h, "request numbers", &["report"], &[&alice]));
        acts.push(act(ActivityType::Document, h + 1, "draft report", &["report"], &[&alice]));
        acts.push(act(ActivityType::Meeting, h + 2, "review report", &["report"], &[&alice]));
    }
    ActivityBatch::try_new(vec![alice], acts).unwrap()
}

#[test]
fn scenario_b_weekly_pattern_detected() {
    let batch = weekly_triple_batch();
    let analyzer = WorkflowAnalyzer::default(); // min frequency 2.0, 24h window

    let patterns = analyzer.detect_patterns(&batch).unwrap();
    let person_patterns: Vec<_> = patterns
        .iter()
        .filter(|p| p.sequence().is_some())
        .collect();
    assert!(!person_patterns.is_empty());
    assert!(person_patterns.iter().all(|p| p.weight >= 2.0));

    // The full triple recurs three times and classifies as weekly.
    let triple = person_patterns
        .iter()
        .find(|p| p.sequence().map(|s| s.len()) == Some(3))
        .expect("full three-item pattern");
    assert!((triple.weight - 3.0).abs() < f64::EPSILON);

    let workflow = analyzer.build_workflow(triple, &batch).unwrap();
    assert_eq!(workflow.frequency, Frequency::Weekly);
    assert_eq!(workflow.owner.email, "alice@example.com");
    assert_eq!(workflow.steps.len(), 3);
}

#[test]
fn no_pattern_below_min_frequency() {
    let batch = weekly_triple_batch();
    let strict = WorkflowAnalyzer::new(WorkflowConfig {
        min_pattern_frequency: 10.0,
        ..WorkflowConfig::default()
    });
    assert!(strict.detect_patterns(&batch).unwrap().is_empty());

    let lenient = WorkflowAnalyzer::default();
    for pattern in lenient.detect_patterns(&batch).unwrap() {
        assert!(pattern.weight >= 2.0);
    }
}

// ============================================================================
// Scenario C — diamond critical path
// ============================================================================

#[test]
fn scenario_c_diamond_critical_path() {
    // S1 → S2 → S4 and S1 → S3 → S4 with durations 1, 3, 2, 1:
    // the S2 branch accumulates 5 hours, the S3 branch 4.
    let w = manual_workflow(vec![
        step("S1", 1.0, &[]),
        step("S2", 3.0, &["S1"]),
        step("S3", 2.0, &["S1"]),
        step("S4", 1.0, &["S2", "S3"]),
    ]);
    let critical = critical_path(&w);

    let expected: std::collections::BTreeSet<String> =
        ["S1", "S2", "S4"].iter().map(|s| s.to_string()).collect();
    assert_eq!(critical, expected);
}

#[test]
fn cyclic_dependencies_yield_empty_critical_path() {
    let w = manual_workflow(vec![
        step("S1", 1.0, &["S3"]),
        step("S2", 1.0, &["S1"]),
        step("S3", 1.0, &["S2"]),
    ]);
    assert!(critical_path(&w).is_empty());

    // The surrounding bottleneck analysis keeps working.
    let bottlenecks = analyze_bottlenecks(&[w]);
    for b in &bottlenecks {
        assert!(!b.is_critical);
    }
}

// ============================================================================
// Bottleneck rules
// ============================================================================

#[test]
fn bottleneck_rules_and_ordering() {
    // Critical + heavy load; unassigned + long; many dependencies.
    let mut loaded = step("LOADED", 6.0, &["A"]);
    loaded.responsible = Some(Person::new("Resp", "Ops", "member", "resp@example.com"));
    let w1 = manual_workflow(vec![step("A", 1.0, &[]), loaded]);

    let mut w2 = manual_workflow(vec![step("UNASSIGNED", 3.0, &[])]);
    w2.id = "workflow_unassigned".into();

    let bottlenecks = analyze_bottlenecks(&[w1, w2]);
    assert_eq!(bottlenecks.len(), 2);
    // Sorted by load factor descending: 6×2 = 12 before 3×1 = 3.
    assert_eq!(bottlenecks[0].step_id, "LOADED");
    assert_eq!(bottlenecks[1].step_id, "UNASSIGNED");
    assert_eq!(bottlenecks[1].responsible, "unassigned");
    assert!(bottlenecks
        .iter()
        .all(|b| !b.recommendations.is_empty()));
}

// ============================================================================
// Team patterns end-to-end
// ============================================================================

#[test]
fn team_pattern_builds_workflow() {
    let alice = Person::new("Alice", "Engineering", "engineer", "alice@example.com");
    let bob = Person::new("Bob", "Sales", "rep", "bob@example.com");
    let acts = vec![
        act(ActivityType::Meeting, 0, "standup", &[], &[&alice, &bob]),
        act(ActivityType::Meeting, 24, "standup", &[], &[&bob, &alice]),
        act(ActivityType::Email, 48, "minutes", &[], &[&alice, &bob]),
    ];
    let batch = ActivityBatch::try_new(vec![alice, bob], acts).unwrap();

    let analyzer = WorkflowAnalyzer::default();
    let patterns = analyzer.detect_patterns(&batch).unwrap();
    let team = patterns
        .iter()
        .find(|p| p.kind == PatternKind::TeamCollaboration)
        .expect("team pattern");
    assert!((team.weight - 3.0).abs() < f64::EPSILON);

    let workflow = analyzer.build_workflow(team, &batch).unwrap();
    // One step per distinct activity type; owner is the most frequent
    // participant (both tie at 3, lexically smallest email wins).
    assert_eq!(workflow.steps.len(), 2);
    assert_eq!(workflow.owner.email, "alice@example.com");
}

// ============================================================================
// Scenario E — empty input; full pipeline
// ============================================================================

#[test]
fn scenario_e_empty_batch_mines_nothing() {
    let analyzer = WorkflowAnalyzer::default();
    assert!(analyzer
        .detect_patterns(&ActivityBatch::empty())
        .unwrap()
        .is_empty());

    let report = analyzer.analyze(&ActivityBatch::empty()).unwrap();
    assert!(report.patterns.is_empty());
    assert!(report.workflows.is_empty());
    assert!(report.bottlenecks.is_empty());
}

#[test]
fn full_pipeline_builds_one_workflow_per_pattern() {
    let batch = weekly_triple_batch();
    let report = WorkflowAnalyzer::default().analyze(&batch).unwrap();

    assert!(!report.patterns.is_empty());
    assert_eq!(report.patterns.len(), report.workflows.len());
    assert_eq!(report.patterns.len(), report.critical_paths.len());

    // Every built workflow's critical path covers its linear chain.
    for (workflow, critical) in report.workflows.iter().zip(&report.critical_paths) {
        if !workflow.steps.is_empty() {
            assert!(!critical.is_empty());
        }
    }

    // The report serializes (wire contract for the CLI output).
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["patterns"].is_array());
    assert!(json["workflows"].is_array());
}

// ============================================================================
// Mermaid rendering of built workflows
// ============================================================================

#[test]
fn workflow_mermaid_wire_format() {
    let batch = weekly_triple_batch();
    let analyzer = WorkflowAnalyzer::default();
    let patterns = analyzer.detect_patterns(&batch).unwrap();
    let triple = patterns
        .iter()
        .find(|p| p.sequence().map(|s| s.len()) == Some(3))
        .unwrap();
    let workflow = analyzer.build_workflow(triple, &batch).unwrap();

    let rendered = mermaid::workflow_flow(&workflow);
    assert!(rendered.starts_with("```mermaid\ngraph LR"));
    assert!(rendered.ends_with("```"));
    assert!(rendered.contains("S0[\""));
    // linear chain edges
    assert!(rendered.contains("S0 --> S1"));
    assert!(rendered.contains("S1 --> S2"));
}
