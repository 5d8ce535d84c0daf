//! Direct lookups and filters over a catalog snapshot.
//!
//! None of these involve scoring: `get_by_id` is a keyed lookup, `sample`
//! draws random indices, and `recommend` is a linear filter.

use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Config;
use crate::error::CatalogError;
use crate::models::{Exercise, Snapshot};
use crate::store::CatalogStore;

/// Records returned by `GET /random`.
pub const RANDOM_COUNT: usize = 5;

/// Upper bound on `GET /recommendations` results.
pub const RECOMMENDATION_LIMIT: usize = 5;

/// Returns the record with the given id.
pub fn get_by_id<'a>(snapshot: &'a Snapshot, id: &str) -> Result<&'a Exercise, CatalogError> {
    snapshot
        .get(id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))
}

/// Draws `n` records uniformly at random, with replacement.
///
/// The same record may appear more than once. An empty catalog yields an
/// empty result.
pub fn sample(snapshot: &Snapshot, n: usize) -> Vec<&Exercise> {
    sample_with(snapshot, n, &mut rand::thread_rng())
}

/// [`sample`] with a caller-supplied RNG.
pub fn sample_with<'a, R: Rng + ?Sized>(
    snapshot: &'a Snapshot,
    n: usize,
    rng: &mut R,
) -> Vec<&'a Exercise> {
    let exercises = snapshot.exercises();
    (0..n).filter_map(|_| exercises.choose(rng)).collect()
}

/// First [`RECOMMENDATION_LIMIT`] records, in catalog order, whose equipment
/// equals `equipment` and whose first primary muscle equals `muscle`.
///
/// Both comparisons are exact. Records with no equipment or no primary
/// muscles never match.
pub fn recommend<'a>(snapshot: &'a Snapshot, equipment: &str, muscle: &str) -> Vec<&'a Exercise> {
    snapshot
        .exercises()
        .iter()
        .filter(|e| e.equipment.as_deref() == Some(equipment) && e.primary_muscle() == Some(muscle))
        .take(RECOMMENDATION_LIMIT)
        .collect()
}

// ============ CLI entry points ============

/// Prints one record as JSON.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let store = CatalogStore::connect(config)?;
    let snapshot = store.get_catalog().await?;
    let exercise = get_by_id(&snapshot, id)?;
    println!("{}", serde_json::to_string_pretty(exercise)?);
    Ok(())
}

/// Prints `count` randomly sampled records.
pub async fn run_random(config: &Config, count: usize) -> Result<()> {
    let store = CatalogStore::connect(config)?;
    let snapshot = store.get_catalog().await?;
    print_list(&sample(&snapshot, count));
    Ok(())
}

/// Prints recommendations for an equipment / primary muscle pair.
pub async fn run_recommend(config: &Config, equipment: &str, muscle: &str) -> Result<()> {
    let store = CatalogStore::connect(config)?;
    let snapshot = store.get_catalog().await?;
    let recs = recommend(&snapshot, equipment, muscle);
    if recs.is_empty() {
        println!("No recommendations.");
        return Ok(());
    }
    print_list(&recs);
    Ok(())
}

fn print_list(exercises: &[&Exercise]) {
    for (i, e) in exercises.iter().enumerate() {
        println!("{}. {} ({})", i + 1, e.name, e.id);
    }
}
