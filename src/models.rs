//! Core data models used throughout the exercise catalog.
//!
//! [`Exercise`] is the record schema served to clients. [`Snapshot`] is one
//! immutable, timestamped copy of the whole catalog as held by the
//! [`CatalogStore`](crate::store::CatalogStore).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// A single exercise record.
///
/// Every field is always present on the wire. Missing keys in the upstream
/// payload decode to `null` or an empty list, and serialization emits every
/// key, so lookups over the schema never hit an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub force: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub mechanic: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    /// Ordered muscle names. The first entry is the primary muscle used by
    /// recommendation filtering.
    #[serde(default)]
    pub primary_muscles: Vec<String>,
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Exercise {
    /// The first primary muscle, if any.
    pub fn primary_muscle(&self) -> Option<&str> {
        self.primary_muscles.first().map(String::as_str)
    }
}

/// One immutable copy of the catalog.
///
/// Snapshots are replaced wholesale on refresh and shared as
/// `Arc<Snapshot>`; nothing mutates one after construction.
#[derive(Debug)]
pub struct Snapshot {
    exercises: Vec<Exercise>,
    by_id: HashMap<String, usize>,
    fetched_at: DateTime<Utc>,
    fetched_instant: Instant,
}

impl Snapshot {
    /// Builds a snapshot stamped with the current time.
    ///
    /// If `exercises` contains duplicate ids, the first occurrence is the one
    /// returned by [`Snapshot::get`]. All records stay in catalog order.
    pub fn new(exercises: Vec<Exercise>) -> Self {
        let mut by_id = HashMap::with_capacity(exercises.len());
        for (index, exercise) in exercises.iter().enumerate() {
            if by_id.contains_key(&exercise.id) {
                tracing::warn!(id = %exercise.id, index, "duplicate exercise id in catalog");
                continue;
            }
            by_id.insert(exercise.id.clone(), index);
        }

        Self {
            exercises,
            by_id,
            fetched_at: Utc::now(),
            fetched_instant: Instant::now(),
        }
    }

    /// All records in catalog order.
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Looks up a record by its `id`.
    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.by_id.get(id).map(|&i| &self.exercises[i])
    }

    /// Wall-clock time the snapshot was fetched.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Monotonic fetch time, used for staleness checks.
    pub fn fetched_instant(&self) -> Instant {
        self.fetched_instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_decode_to_null_and_empty() {
        let json = r#"{"id": "Pushup", "name": "Push Up", "primaryMuscles": ["chest"]}"#;
        let ex: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(ex.equipment, None);
        assert!(ex.secondary_muscles.is_empty());
        assert_eq!(ex.primary_muscle(), Some("chest"));
    }

    #[test]
    fn test_serialization_emits_every_key() {
        let json = r#"{"id": "Pushup", "name": "Push Up"}"#;
        let ex: Exercise = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&ex).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "id",
            "name",
            "force",
            "level",
            "mechanic",
            "equipment",
            "primaryMuscles",
            "secondaryMuscles",
            "instructions",
            "category",
            "images",
        ] {
            assert!(obj.contains_key(key), "missing key: {}", key);
        }
        assert!(obj["equipment"].is_null());
        assert_eq!(obj["images"], serde_json::json!([]));
    }

    #[test]
    fn test_snapshot_duplicate_ids_first_wins() {
        let a: Exercise = serde_json::from_str(r#"{"id": "x", "name": "First"}"#).unwrap();
        let b: Exercise = serde_json::from_str(r#"{"id": "x", "name": "Second"}"#).unwrap();
        let snap = Snapshot::new(vec![a, b]);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get("x").unwrap().name, "First");
        assert!(snap.get("y").is_none());
    }
}
