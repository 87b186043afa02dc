//! Activity sequence mining.
//!
//! Finds recurring behavior in the activity log two ways:
//!
//! - **Person sequences**: per-participant activity chains within a time
//!   window, mined for frequent (sub)sequences with partial-match credit —
//!   exact occurrences weigh 1.0, every proper contiguous subsequence of
//!   length ≥2 adds 0.5 per occurrence, so a consistent prefix surfaces even
//!   when the full sequences vary.
//! - **Team patterns**: multi-participant activities grouped by their exact
//!   (order-independent) participant set.
//!
//! A (sub)sequence or group qualifies only when its accumulated weight
//! reaches `min_pattern_frequency`.

use chrono::Duration;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::WorkflowConfig;
use crate::error::AnalysisError;
use crate::models::{generate_id, Activity, ActivityBatch};

use super::models::{ActivityPattern, PatternKind, PatternShape};

/// Sequences are capped at this many items.
const MAX_SEQUENCE_LEN: usize = 5;

// ============================================================================
// WorkflowAnalyzer (mining entry point)
// ============================================================================

/// Mines activity patterns and turns them into workflow models.
#[derive(Debug, Clone, Default)]
pub struct WorkflowAnalyzer {
    pub(crate) config: WorkflowConfig,
}

impl WorkflowAnalyzer {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Detect person-sequence and team patterns in the batch.
    ///
    /// An empty batch yields an empty list. Every returned pattern carries a
    /// weight of at least `min_pattern_frequency`.
    pub fn detect_patterns(
        &self,
        batch: &ActivityBatch,
    ) -> Result<Vec<ActivityPattern>, AnalysisError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut sorted: Vec<&Activity> = batch.activities().iter().collect();
        sorted.sort_by_key(|a| a.timestamp);

        // Group activities per participant; one activity feeds every
        // participant's group.
        let mut person_activities: BTreeMap<String, Vec<&Activity>> = BTreeMap::new();
        for activity in &sorted {
            for person in batch.participants(activity)? {
                person_activities
                    .entry(person.email.clone())
                    .or_default()
                    .push(activity);
            }
        }

        let window = Duration::hours(self.config.time_window_hours);
        let mut patterns = Vec::new();

        for (email, acts) in &person_activities {
            let sequences = extract_sequences(acts, window);
            let frequent = find_frequent_sequences(&sequences, self.config.min_pattern_frequency);

            for (sequence, weight) in frequent {
                let activity_ids = activities_for_sequence(acts, &sequence);
                patterns.push(ActivityPattern {
                    id: generate_id("pattern", &format!("{}_{}", email, sequence.join("->"))),
                    kind: classify_sequence(&sequence),
                    weight,
                    activity_ids,
                    shape: PatternShape::PersonSequence {
                        person_email: email.clone(),
                        sequence,
                    },
                });
            }
        }

        patterns.extend(self.detect_team_patterns(batch, &sorted)?);

        info!(patterns = patterns.len(), "pattern detection complete");
        Ok(patterns)
    }

    /// Group multi-participant activities by exact participant set; groups
    /// recurring at least `min_pattern_frequency` times become patterns.
    fn detect_team_patterns(
        &self,
        batch: &ActivityBatch,
        sorted: &[&Activity],
    ) -> Result<Vec<ActivityPattern>, AnalysisError> {
        let multi_person: Vec<&&Activity> = sorted
            .iter()
            .filter(|a| a.participants.len() > 1)
            .collect();
        if (multi_person.len() as f64) < self.config.min_pattern_frequency {
            return Ok(Vec::new());
        }

        let mut groups: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();
        for activity in multi_person {
            let mut emails: Vec<String> = batch
                .participants(activity)?
                .iter()
                .map(|p| p.email.clone())
                .collect();
            emails.sort();
            emails.dedup();
            groups.entry(emails).or_default().push(activity.id.clone());
        }

        let mut patterns = Vec::new();
        for (emails, activity_ids) in groups {
            if activity_ids.len() as f64 >= self.config.min_pattern_frequency {
                patterns.push(ActivityPattern {
                    id: generate_id("team_pattern", &emails.join(",")),
                    kind: PatternKind::TeamCollaboration,
                    weight: activity_ids.len() as f64,
                    activity_ids,
                    shape: PatternShape::Team {
                        participant_emails: emails,
                    },
                });
            }
        }
        Ok(patterns)
    }
}

// ============================================================================
// Sequence extraction & mining
// ============================================================================

/// Sequence item label: activity type, suffixed with the first tag if any.
pub(crate) fn sequence_item(activity: &Activity) -> String {
    match activity.tags.first() {
        Some(tag) => format!("{}_{}", activity.activity_type, tag),
        None => activity.activity_type.to_string(),
    }
}

/// Extract candidate sequences from one person's time-sorted activities.
///
/// From every starting index, activities are chained while they fall within
/// `window` of the sequence *start*. Sequences shorter than 2 items are
/// discarded; longer ones are capped at [`MAX_SEQUENCE_LEN`].
pub(crate) fn extract_sequences(activities: &[&Activity], window: Duration) -> Vec<Vec<String>> {
    let mut sequences = Vec::new();

    for i in 0..activities.len() {
        let start = activities[i].timestamp;
        let mut sequence = Vec::new();
        for activity in &activities[i..] {
            if activity.timestamp - start <= window {
                sequence.push(sequence_item(activity));
            } else {
                break;
            }
        }
        if sequence.len() >= 2 {
            sequence.truncate(MAX_SEQUENCE_LEN);
            sequences.push(sequence);
        }
    }

    sequences
}

/// Count exact sequences (weight 1.0) and all proper contiguous
/// subsequences of length ≥2 (weight 0.5 per occurrence); keep entries at or
/// above `min_frequency`.
pub(crate) fn find_frequent_sequences(
    sequences: &[Vec<String>],
    min_frequency: f64,
) -> BTreeMap<Vec<String>, f64> {
    let mut counts: BTreeMap<Vec<String>, f64> = BTreeMap::new();

    for seq in sequences {
        *counts.entry(seq.clone()).or_insert(0.0) += 1.0;
    }
    for seq in sequences {
        for length in 2..seq.len() {
            for start in 0..=(seq.len() - length) {
                let sub = seq[start..start + length].to_vec();
                *counts.entry(sub).or_insert(0.0) += 0.5;
            }
        }
    }

    counts.retain(|_, weight| *weight >= min_frequency);
    counts
}

/// Collect the activity IDs matched by a sequence: every window of the
/// person's activities whose items match the sequence by type prefix.
pub(crate) fn activities_for_sequence(
    activities: &[&Activity],
    sequence: &[String],
) -> Vec<String> {
    let mut matched = Vec::new();
    if sequence.is_empty() || activities.len() < sequence.len() {
        return matched;
    }

    for start in 0..=(activities.len() - sequence.len()) {
        let window = &activities[start..start + sequence.len()];
        let matches = window.iter().zip(sequence).all(|(activity, item)| {
            let type_prefix = item.split('_').next().unwrap_or(item);
            sequence_item(activity).starts_with(type_prefix)
        });
        if matches {
            matched.extend(window.iter().map(|a| a.id.clone()));
        }
    }
    matched
}

/// Classify a sequence by its contents.
pub(crate) fn classify_sequence(sequence: &[String]) -> PatternKind {
    let joined = sequence.join(" ");
    let has = |needle: &str| joined.contains(needle);

    if has("email") && has("document") {
        PatternKind::DocumentCreation
    } else if has("meeting") {
        PatternKind::Meeting
    } else if has("email") {
        PatternKind::EmailCommunication
    } else if has("document") {
        PatternKind::DocumentManagement
    } else {
        PatternKind::General
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;
    use crate::test_helpers::{activity, batch, person};

    #[test]
    fn test_sequence_item_uses_first_tag() {
        let alice = person("Alice", "Engineering");
        let tagged = activity(ActivityType::Email, 0, "x", &["Report", "q1"], &[&alice]);
        assert_eq!(sequence_item(&tagged), "email_report");
        let untagged = activity(ActivityType::Chat, 0, "y", &[], &[&alice]);
        assert_eq!(sequence_item(&untagged), "chat");
    }

    #[test]
    fn test_extract_sequences_window_and_cap() {
        let alice = person("Alice", "Engineering");
        let acts: Vec<_> = (0..7)
            .map(|i| activity(ActivityType::Email, i * 2, &format!("m{i}"), &[], &[&alice]))
            .collect();
        let refs: Vec<&_> = acts.iter().collect();

        let sequences = extract_sequences(&refs, Duration::hours(24));
        // Every start index chains all remaining activities (12h total span),
        // capped at 5; trailing single-item starts are discarded.
        assert_eq!(sequences.len(), 6);
        assert_eq!(sequences[0].len(), 5);
        assert_eq!(sequences[5].len(), 2);
    }

    #[test]
    fn test_extract_sequences_window_breaks_chain() {
        let alice = person("Alice", "Engineering");
        let acts = vec![
            activity(ActivityType::Email, 0, "a", &[], &[&alice]),
            activity(ActivityType::Email, 48, "b", &[], &[&alice]),
        ];
        let refs: Vec<&_> = acts.iter().collect();
        assert!(extract_sequences(&refs, Duration::hours(24)).is_empty());
    }

    #[test]
    fn test_find_frequent_awards_partial_credit() {
        let seqs = vec![
            vec!["email".to_string(), "document".to_string(), "meeting".to_string()],
            vec!["document".to_string(), "meeting".to_string()],
        ];
        let frequent = find_frequent_sequences(&seqs, 1.5);
        // (document, meeting): 1.0 exact + 0.5 subsequence credit = 1.5
        let key = vec!["document".to_string(), "meeting".to_string()];
        assert!((frequent[&key] - 1.5).abs() < f64::EPSILON);
        // the full triple occurs once only
        assert!(!frequent.contains_key(&seqs[0]));
    }

    #[test]
    fn test_no_pattern_below_min_frequency() {
        let seqs = vec![vec!["email".to_string(), "chat".to_string()]];
        let frequent = find_frequent_sequences(&seqs, 2.0);
        assert!(frequent.is_empty());
    }

    #[test]
    fn test_classify_sequence() {
        let seq = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            classify_sequence(&seq(&["email", "document_spec"])),
            PatternKind::DocumentCreation
        );
        assert_eq!(
            classify_sequence(&seq(&["chat", "meeting"])),
            PatternKind::Meeting
        );
        assert_eq!(
            classify_sequence(&seq(&["email", "email"])),
            PatternKind::EmailCommunication
        );
        assert_eq!(
            classify_sequence(&seq(&["document", "document"])),
            PatternKind::DocumentManagement
        );
        assert_eq!(
            classify_sequence(&seq(&["chat", "task"])),
            PatternKind::General
        );
    }

    #[test]
    fn test_detect_patterns_empty_batch() {
        let analyzer = WorkflowAnalyzer::default();
        let patterns = analyzer
            .detect_patterns(&crate::models::ActivityBatch::empty())
            .unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_detect_patterns_respects_threshold() {
        let alice = person("Alice", "Engineering");
        let acts = vec![
            activity(ActivityType::Email, 0, "a", &[], &[&alice]),
            activity(ActivityType::Document, 1, "b", &[], &[&alice]),
        ];
        let batch = batch(vec![alice], acts);

        let analyzer = WorkflowAnalyzer::default();
        let patterns = analyzer.detect_patterns(&batch).unwrap();
        // one occurrence of (email, document): weight 1.0 < 2.0
        assert!(patterns.is_empty());

        let analyzer = WorkflowAnalyzer::new(WorkflowConfig {
            min_pattern_frequency: 1.0,
            ..WorkflowConfig::default()
        });
        let patterns = analyzer.detect_patterns(&batch).unwrap();
        assert_eq!(patterns.len(), 1);
        assert!(patterns.iter().all(|p| p.weight >= 1.0));
    }

    #[test]
    fn test_detect_team_patterns() {
        let alice = person("Alice", "Engineering");
        let bob = person("Bob", "Sales");
        let carol = person("Carol", "Sales");
        let acts = vec![
            activity(ActivityType::Meeting, 0, "standup", &[], &[&alice, &bob]),
            activity(ActivityType::Meeting, 24 * 7, "standup", &[], &[&bob, &alice]),
            activity(ActivityType::Meeting, 24 * 14, "other", &[], &[&alice, &carol]),
        ];
        let batch = batch(vec![alice, bob, carol], acts);

        let analyzer = WorkflowAnalyzer::default();
        let patterns = analyzer.detect_patterns(&batch).unwrap();

        let teams: Vec<_> = patterns
            .iter()
            .filter(|p| p.kind == PatternKind::TeamCollaboration)
            .collect();
        // alice+bob recurs twice (participant order must not matter);
        // alice+carol occurs once and is dropped.
        assert_eq!(teams.len(), 1);
        assert!((teams[0].weight - 2.0).abs() < f64::EPSILON);
        assert_eq!(teams[0].activity_ids.len(), 2);
    }
}
