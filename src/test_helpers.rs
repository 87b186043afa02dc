//! Test helper factories
//!
//! Convenience builders for people, activities and validated batches with
//! sensible defaults, shared across the unit-test modules.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

use crate::models::{Activity, ActivityBatch, ActivityType, Person};

/// Base timestamp used by the builders: 2025-03-01 09:00 UTC.
pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// Create a person whose email (and thus ID) derives from the name.
pub(crate) fn person(name: &str, department: &str) -> Person {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    Person::new(name, department, "member", &email)
}

/// Create an activity at `base_time + offset_hours` with the given tags and
/// participants.
pub(crate) fn activity(
    activity_type: ActivityType,
    offset_hours: i64,
    content: &str,
    tags: &[&str],
    participants: &[&Person],
) -> Activity {
    let mut act = Activity::new(
        activity_type,
        base_time() + Duration::hours(offset_hours),
        content,
    );
    for tag in tags {
        act.add_tag(tag);
    }
    for p in participants {
        act.add_participant(&p.id);
    }
    act
}

/// Batch from `spec` = [(type, [departments])]: each listed department slot
/// becomes a distinct person per (department, ordinal), one activity per
/// entry spaced an hour apart.
pub(crate) fn batch_of(spec: &[(ActivityType, &[&str])]) -> ActivityBatch {
    let mut people: BTreeMap<String, Person> = BTreeMap::new();
    let mut activities = Vec::new();

    for (i, (ty, depts)) in spec.iter().enumerate() {
        let mut act = Activity::new(
            *ty,
            base_time() + Duration::hours(i as i64),
            &format!("activity {i}"),
        );
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for dept in *depts {
            let slot = *seen.get(dept).unwrap_or(&0);
            seen.insert(dept, slot + 1);
            let email = format!("{}{}@example.com", dept.to_lowercase(), slot);
            let p = Person::new(&format!("{dept} {slot}"), dept, "member", &email);
            act.add_participant(&p.id);
            people.entry(p.id.clone()).or_insert(p);
        }
        activities.push(act);
    }

    ActivityBatch::try_new(people.into_values().collect(), activities).unwrap()
}

/// Assemble a batch from explicit people and activities.
pub(crate) fn batch(people: Vec<Person>, activities: Vec<Activity>) -> ActivityBatch {
    ActivityBatch::try_new(people, activities).unwrap()
}
