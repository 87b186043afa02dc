//! Domain records for organizational activity analysis.
//!
//! ## Record types
//! - [`Person`] / [`Activity`] — the input records analyzed by both pipelines
//! - [`Workflow`] / [`WorkflowStep`] — the output model of workflow mining
//! - [`ActivityBatch`] — the validated registry handed to the analyzers
//!
//! ## Identity model
//!
//! Records reference each other by String ID through the [`ActivityBatch`]
//! registry, never by nested ownership. An activity's `participants` is a list
//! of person IDs; a person's `collaborators` is a set of person IDs. This
//! keeps the model cycle-free and arena-friendly: one vector of activities,
//! one ID-indexed person map.
//!
//! IDs are deterministic content hashes (`{prefix}_{sha256[..8]}`), so the
//! same input batch always yields the same identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::AnalysisError;

// ============================================================================
// Enums
// ============================================================================

/// Kind of recorded activity.
///
/// The declaration order is the deterministic tie-break order wherever a
/// "most frequent type" is reported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Email,
    Meeting,
    Document,
    Chat,
    Task,
    Other,
}

impl ActivityType {
    /// Lowercase wire name, used in sequence items and step names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Document => "document",
            Self::Chat => "chat",
            Self::Task => "task",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Estimated execution cadence of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Irregular,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Irregular => write!(f, "irregular"),
        }
    }
}

// ============================================================================
// ID generation
// ============================================================================

/// Generate a deterministic prefixed ID: `{prefix}_{sha256(value)[..8]}`.
pub fn generate_id(prefix: &str, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", prefix, &digest[..8])
}

// ============================================================================
// Person
// ============================================================================

/// A person observed in the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Deterministic identifier (`p_...`, hashed from the email)
    pub id: String,
    pub name: String,
    pub department: String,
    pub role: String,
    /// Lower-cased email address; the dedup key for participant sets
    pub email: String,
    /// IDs of activities this person participated in (back-reference)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity_ids: Vec<String>,
    /// IDs of people this person shared at least one activity with.
    /// Symmetric, deduplicated, never contains the person itself.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub collaborators: BTreeSet<String>,
}

impl Person {
    /// Create a person with a content-derived ID and normalized email.
    pub fn new(name: &str, department: &str, role: &str, email: &str) -> Self {
        let email = email.trim().to_lowercase();
        Self {
            id: generate_id("p", &email),
            name: name.to_string(),
            department: department.to_string(),
            role: role.to_string(),
            email,
            activity_ids: Vec::new(),
            collaborators: BTreeSet::new(),
        }
    }

    /// Build a placeholder record from a bare email address, for pattern
    /// owners with no richer registry entry. The display name is the local
    /// part, dots as spaces, each word title-cased.
    pub fn placeholder(email: &str) -> Self {
        let email = email.trim().to_lowercase();
        let local = email.split('@').next().unwrap_or(&email);
        let name = local
            .split('.')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: generate_id("p", &email),
            name,
            department: "unassigned".to_string(),
            role: "unassigned".to_string(),
            email,
            activity_ids: Vec::new(),
            collaborators: BTreeSet::new(),
        }
    }

    fn add_collaborator(&mut self, person_id: &str) {
        if person_id != self.id {
            self.collaborators.insert(person_id.to_string());
        }
    }
}

// ============================================================================
// Activity
// ============================================================================

/// A single timestamped activity (email, meeting, document, ...).
///
/// Treated as immutable once handed to an analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Deterministic identifier (`a_...`)
    pub id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    /// Lower-cased, deduplicated tags; the first tag qualifies sequence items
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ordered person IDs
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    /// Create an activity with a content-derived ID.
    pub fn new(activity_type: ActivityType, timestamp: DateTime<Utc>, content: &str) -> Self {
        let id = generate_id(
            "a",
            &format!("{}_{}_{}", activity_type, timestamp.to_rfc3339(), content),
        );
        Self {
            id,
            activity_type,
            timestamp,
            content: content.to_string(),
            tags: Vec::new(),
            participants: Vec::new(),
        }
    }

    /// Add a tag, lower-cased; duplicates are ignored.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.to_lowercase();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Add a participant ID; duplicates are ignored.
    pub fn add_participant(&mut self, person_id: &str) {
        if !self.participants.iter().any(|p| p == person_id) {
            self.participants.push(person_id.to_string());
        }
    }
}

// ============================================================================
// WorkflowStep / Workflow
// ============================================================================

/// One step of a mined workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Deterministic identifier (`step_...`)
    pub id: String,
    pub name: String,
    pub description: String,
    /// Most frequent participant of the step's activities, if any
    pub responsible: Option<Person>,
    /// Estimated duration in hours (non-negative)
    pub duration_hours: Option<f64>,
    /// IDs of steps that must complete before this one ("dependency → step").
    /// Must stay acyclic within a workflow for the critical path to be defined.
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

impl WorkflowStep {
    pub fn new(id: String, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
            responsible: None,
            duration_hours: None,
            dependencies: BTreeSet::new(),
        }
    }

    /// Add a dependency edge; a step never depends on itself.
    pub fn add_dependency(&mut self, step_id: &str) {
        if step_id != self.id {
            self.dependencies.insert(step_id.to_string());
        }
    }
}

/// A mined workflow: an owned, ordered sequence of dependent steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Deterministic identifier (`workflow_...`)
    pub id: String,
    pub name: String,
    pub owner: Person,
    /// Insertion order is the step index
    pub steps: Vec<WorkflowStep>,
    pub frequency: Frequency,
    pub priority: Priority,
    /// Workflow-level ordering, separate from step dependencies
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
}

impl Workflow {
    pub fn new(id: String, name: String, owner: Person, frequency: Frequency, priority: Priority) -> Self {
        Self {
            id,
            name,
            owner,
            steps: Vec::new(),
            frequency,
            priority,
            depends_on: BTreeSet::new(),
        }
    }

    pub fn add_step(&mut self, step: WorkflowStep) {
        self.steps.push(step);
    }

    /// Look up a step by ID.
    pub fn step(&self, step_id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

// ============================================================================
// ActivityBatch — validated registry
// ============================================================================

/// The validated input to both analyzers: a person registry plus an ordered
/// activity list.
///
/// Construction is the fail-fast validation point: invalid emails, duplicate
/// person IDs and unresolved participant references are rejected with
/// [`AnalysisError`] before any analysis runs. After construction every
/// participant lookup is guaranteed to resolve, and back-references
/// (activity IDs, symmetric collaborator sets) are wired.
///
/// The batch is read-only during analysis; analyzers never mutate it.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawBatch")]
pub struct ActivityBatch {
    people: BTreeMap<String, Person>,
    activities: Vec<Activity>,
    activity_index: BTreeMap<String, usize>,
}

/// Wire shape of a batch file: `{"people": [...], "activities": [...]}`.
#[derive(Debug, Deserialize)]
struct RawBatch {
    #[serde(default)]
    people: Vec<Person>,
    #[serde(default)]
    activities: Vec<Activity>,
}

impl TryFrom<RawBatch> for ActivityBatch {
    type Error = AnalysisError;

    fn try_from(raw: RawBatch) -> Result<Self, Self::Error> {
        ActivityBatch::try_new(raw.people, raw.activities)
    }
}

impl ActivityBatch {
    /// Validate and assemble a batch, wiring back-references.
    pub fn try_new(
        people: Vec<Person>,
        activities: Vec<Activity>,
    ) -> Result<Self, AnalysisError> {
        let mut registry: BTreeMap<String, Person> = BTreeMap::new();

        for person in people {
            if !person.email.contains('@') {
                return Err(AnalysisError::InvalidInput(format!(
                    "person '{}' has an invalid email address '{}'",
                    person.id, person.email
                )));
            }
            if registry.contains_key(&person.id) {
                return Err(AnalysisError::InvalidInput(format!(
                    "duplicate person id '{}'",
                    person.id
                )));
            }
            registry.insert(person.id.clone(), person);
        }

        // Resolve every participant reference before wiring anything.
        let mut activity_index = BTreeMap::new();
        for (pos, activity) in activities.iter().enumerate() {
            if activity_index.insert(activity.id.clone(), pos).is_some() {
                return Err(AnalysisError::InvalidInput(format!(
                    "duplicate activity id '{}'",
                    activity.id
                )));
            }
            for person_id in &activity.participants {
                if !registry.contains_key(person_id) {
                    return Err(AnalysisError::UnknownParticipant {
                        activity_id: activity.id.clone(),
                        person_id: person_id.clone(),
                    });
                }
            }
        }

        // Back-references: activity membership and symmetric collaborators.
        for activity in &activities {
            for person_id in &activity.participants {
                if let Some(person) = registry.get_mut(person_id) {
                    person.activity_ids.push(activity.id.clone());
                }
            }
            for a in &activity.participants {
                for b in &activity.participants {
                    if a != b {
                        if let Some(person) = registry.get_mut(a) {
                            person.add_collaborator(b);
                        }
                    }
                }
            }
        }

        Ok(Self {
            people: registry,
            activities,
            activity_index,
        })
    }

    /// An empty batch (valid: analyses return degenerate zero-valued reports).
    pub fn empty() -> Self {
        Self {
            people: BTreeMap::new(),
            activities: Vec::new(),
            activity_index: BTreeMap::new(),
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Look up an activity by ID.
    pub fn activity(&self, activity_id: &str) -> Option<&Activity> {
        self.activity_index
            .get(activity_id)
            .map(|&pos| &self.activities[pos])
    }

    pub fn person(&self, person_id: &str) -> Option<&Person> {
        self.people.get(person_id)
    }

    /// Find a person by (lower-cased) email.
    pub fn person_by_email(&self, email: &str) -> Option<&Person> {
        let email = email.to_lowercase();
        self.people.values().find(|p| p.email == email)
    }

    /// People registry in ID order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    /// Resolve an activity's participants in order.
    ///
    /// Infallible for batches built through [`Self::try_new`]; the error
    /// branch guards analyzers against hand-assembled inconsistent batches.
    pub fn participants(&self, activity: &Activity) -> Result<Vec<&Person>, AnalysisError> {
        activity
            .participants
            .iter()
            .map(|id| {
                self.people
                    .get(id)
                    .ok_or_else(|| AnalysisError::UnknownParticipant {
                        activity_id: activity.id.clone(),
                        person_id: id.clone(),
                    })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
