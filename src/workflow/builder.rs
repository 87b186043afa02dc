//! Workflow construction from mined patterns.
//!
//! Turns an [`ActivityPattern`] into an explicit [`Workflow`] model: resolves
//! the owner, groups matched activities into steps with estimated durations
//! and responsibles, chains the steps into a linear dependency order, and
//! estimates execution frequency and priority from the pattern's timestamps
//! and weight.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::error::WorkflowAnalysisError;
use crate::models::{
    generate_id, Activity, ActivityBatch, ActivityType, Frequency, Person, Priority, Workflow,
    WorkflowStep,
};

use super::miner::WorkflowAnalyzer;
use super::models::{ActivityPattern, PatternKind, PatternShape};

/// Duration estimates outside this range (hours) are treated as outliers.
const MAX_STEP_GAP_HOURS: f64 = 24.0;
/// Fallback step duration when there is not enough data to estimate one.
const DEFAULT_STEP_DURATION_HOURS: f64 = 1.0;

impl WorkflowAnalyzer {
    /// Build a [`Workflow`] from a mined pattern.
    ///
    /// Fails with [`WorkflowAnalysisError`] when no owner can be resolved or
    /// the pattern's matched activities are inconsistent with its shape.
    pub fn build_workflow(
        &self,
        pattern: &ActivityPattern,
        batch: &ActivityBatch,
    ) -> Result<Workflow, WorkflowAnalysisError> {
        let activities = resolve_activities(pattern, batch)?;
        let owner = resolve_owner(pattern, batch, &activities)?;

        let mut workflow = Workflow::new(
            generate_id("workflow", &pattern.id),
            workflow_name(pattern),
            owner,
            estimate_frequency(&activities),
            estimate_priority(pattern),
        );

        let steps = build_steps(pattern, batch, &activities)?;
        for step in steps {
            workflow.add_step(step);
        }

        // Default dependency model: a linear chain, step i after step i-1.
        let ids: Vec<String> = workflow.steps.iter().map(|s| s.id.clone()).collect();
        for (i, step) in workflow.steps.iter_mut().enumerate().skip(1) {
            step.add_dependency(&ids[i - 1]);
        }

        Ok(workflow)
    }
}

// ============================================================================
// Owner resolution
// ============================================================================

fn resolve_activities<'a>(
    pattern: &ActivityPattern,
    batch: &'a ActivityBatch,
) -> Result<Vec<&'a Activity>, WorkflowAnalysisError> {
    pattern
        .activity_ids
        .iter()
        .map(|id| {
            batch
                .activity(id)
                .ok_or_else(|| WorkflowAnalysisError::StepConstruction {
                    pattern_id: pattern.id.clone(),
                    reason: format!("matched activity '{id}' is not in the batch"),
                })
        })
        .collect()
}

/// Person patterns are owned by that person (placeholder record when the
/// registry has none); team patterns by the most frequent participant.
fn resolve_owner(
    pattern: &ActivityPattern,
    batch: &ActivityBatch,
    activities: &[&Activity],
) -> Result<Person, WorkflowAnalysisError> {
    match &pattern.shape {
        PatternShape::PersonSequence { person_email, .. } => Ok(batch
            .person_by_email(person_email)
            .cloned()
            .unwrap_or_else(|| Person::placeholder(person_email))),
        PatternShape::Team { .. } => most_frequent_participant(batch, activities)
            .ok_or_else(|| WorkflowAnalysisError::OwnerUnresolved {
                pattern_id: pattern.id.clone(),
            }),
    }
}

/// The participant appearing most often across the given activities; ties
/// break toward the lexically smallest email for determinism.
fn most_frequent_participant(batch: &ActivityBatch, activities: &[&Activity]) -> Option<Person> {
    let mut counts: BTreeMap<&str, (u32, &Person)> = BTreeMap::new();
    for activity in activities {
        for person_id in &activity.participants {
            if let Some(person) = batch.person(person_id) {
                counts
                    .entry(person.email.as_str())
                    .or_insert((0, person))
                    .0 += 1;
            }
        }
    }
    counts
        .into_iter()
        .max_by(|(ea, (ca, _)), (eb, (cb, _))| ca.cmp(cb).then(eb.cmp(ea)))
        .map(|(_, (_, person))| person.clone())
}

// ============================================================================
// Naming & estimates
// ============================================================================

fn workflow_name(pattern: &ActivityPattern) -> String {
    match &pattern.shape {
        PatternShape::PersonSequence { sequence, .. } => {
            let type_of = |item: &String| item.split('_').next().unwrap_or(item).to_string();
            let start = sequence.first().map(type_of).unwrap_or_default();
            let end = sequence.last().map(type_of).unwrap_or_default();
            if start == end {
                format!("recurring {start} {}", pattern.kind)
            } else {
                format!("{start} to {end} {}", pattern.kind)
            }
        }
        PatternShape::Team { participant_emails } => {
            format!("{}-person {}", participant_emails.len(), pattern.kind)
        }
    }
}

/// Cadence estimate from the mean day gap between the pattern's activities:
/// ≤1 day → daily, ≤7 → weekly, ≤30 → monthly, else irregular.
fn estimate_frequency(activities: &[&Activity]) -> Frequency {
    let mut timestamps: Vec<DateTime<Utc>> = activities.iter().map(|a| a.timestamp).collect();
    timestamps.sort();
    if timestamps.len() < 2 {
        return Frequency::Irregular;
    }

    let gaps: Vec<i64> = timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();
    let avg = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

    if avg <= 1.0 {
        Frequency::Daily
    } else if avg <= 7.0 {
        Frequency::Weekly
    } else if avg <= 30.0 {
        Frequency::Monthly
    } else {
        Frequency::Irregular
    }
}

/// High for heavily recurring or meeting-driven patterns, medium for
/// moderately recurring ones, low otherwise.
fn estimate_priority(pattern: &ActivityPattern) -> Priority {
    if pattern.weight >= 10.0 || pattern.kind == PatternKind::Meeting {
        Priority::High
    } else if pattern.weight >= 5.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

// ============================================================================
// Step construction
// ============================================================================

fn build_steps(
    pattern: &ActivityPattern,
    batch: &ActivityBatch,
    activities: &[&Activity],
) -> Result<Vec<WorkflowStep>, WorkflowAnalysisError> {
    let mut steps = Vec::new();

    match &pattern.shape {
        PatternShape::PersonSequence { sequence, .. } => {
            // Group the matched activities per sequence item (type match).
            let mut groups: Vec<(&String, Vec<&Activity>)> = Vec::new();
            for item in sequence {
                let matching: Vec<&Activity> = activities
                    .iter()
                    .copied()
                    .filter(|a| item.contains(a.activity_type.as_str()))
                    .collect();
                if !matching.is_empty() {
                    groups.push((item, matching));
                }
            }

            for (i, (item, group)) in groups.iter().enumerate() {
                let mut step = WorkflowStep::new(
                    generate_id("step", &format!("{}_{}", pattern.id, i)),
                    step_name(item, group),
                    step_description(group),
                );
                step.responsible = most_frequent_participant(batch, group);
                step.duration_hours = Some(estimate_step_duration(group));
                steps.push(step);
            }
        }
        PatternShape::Team { .. } => {
            // One step per distinct activity type observed.
            let mut by_type: BTreeMap<ActivityType, Vec<&Activity>> = BTreeMap::new();
            for activity in activities {
                by_type.entry(activity.activity_type).or_default().push(activity);
            }

            for (activity_type, group) in &by_type {
                let mut step = WorkflowStep::new(
                    generate_id("step", &format!("{}_{}", pattern.id, activity_type)),
                    format!("{activity_type} activity"),
                    format!("{} {} activities", group.len(), activity_type),
                );
                step.responsible = most_frequent_participant(batch, group);
                step.duration_hours = Some(estimate_step_duration(group));
                steps.push(step);
            }
        }
    }

    Ok(steps)
}

/// Step name: the sequence item humanized, prefixed with the group's most
/// common tag when one exists.
fn step_name(item: &str, group: &[&Activity]) -> String {
    let base = item.replace('_', " ");

    let mut tag_counts: BTreeMap<&str, u32> = BTreeMap::new();
    for activity in group {
        for tag in &activity.tags {
            *tag_counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    match tag_counts
        .into_iter()
        .max_by(|(ta, ca), (tb, cb)| ca.cmp(cb).then(tb.cmp(ta)))
    {
        Some((tag, _)) => format!("{tag} {base}"),
        None => base,
    }
}

/// Step description: activity count plus up to three short content excerpts.
fn step_description(group: &[&Activity]) -> String {
    if group.is_empty() {
        return "no details".to_string();
    }

    let excerpts: Vec<String> = group
        .iter()
        .take(3)
        .map(|a| a.content.chars().take(50).collect())
        .collect();

    let mut description = format!("{} recorded activities.", group.len());
    if !excerpts.is_empty() {
        description.push_str(" e.g.: ");
        description.push_str(&excerpts.join("; "));
    }
    description
}

/// Mean gap (hours) between consecutive activities in the group, keeping
/// only gaps in (0, 24) to exclude outliers; rounded to one decimal.
/// Defaults to 1.0 when there is not enough data.
fn estimate_step_duration(group: &[&Activity]) -> f64 {
    if group.len() < 2 {
        return DEFAULT_STEP_DURATION_HOURS;
    }

    let mut sorted: Vec<&Activity> = group.to_vec();
    sorted.sort_by_key(|a| a.timestamp);

    let durations: Vec<f64> = sorted
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() as f64 / 3600.0)
        .filter(|&hours| hours > 0.0 && hours < MAX_STEP_GAP_HOURS)
        .collect();

    if durations.is_empty() {
        return DEFAULT_STEP_DURATION_HOURS;
    }
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    (mean * 10.0).round() / 10.0
}

// ============================================================================
// Tests
// ============================================================================
