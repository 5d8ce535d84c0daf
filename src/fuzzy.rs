//! Approximate name matching.
//!
//! A record matches a query when every character of the case-folded query
//! appears in the case-folded name, in order, with gaps allowed. Among all
//! such alignments the cheapest one gives the record's score:
//!
//! ```text
//! score = (GAP_WEIGHT * gaps + LEAD_WEIGHT * lead + TAIL_WEIGHT * tail) / name_len
//!
//!   lead  = chars before the first matched char
//!   gaps  = unmatched chars between the first and last matched char
//!   tail  = chars after the last matched char
//! ```
//!
//! Lower is better and an exact match scores `0.0`. Since
//! `GAP_WEIGHT > TAIL_WEIGHT`, a contiguous substring anywhere in the name
//! always scores below `LEAD_WEIGHT`, so the default threshold keeps every
//! plain substring match and drops widely scattered ones.
//!
//! Matching is a pure function of the snapshot and the query. Results are
//! sorted stably by score, so equal scores keep catalog order and repeated
//! queries paginate identically.

use serde::Serialize;

use crate::models::{Exercise, Snapshot};

pub const GAP_WEIGHT: f64 = 1.0;
pub const LEAD_WEIGHT: f64 = 0.5;
pub const TAIL_WEIGHT: f64 = 0.1;

/// Records scoring above this are dropped.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// A matched record with its position in the snapshot and its score.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult<'a> {
    pub item: &'a Exercise,
    #[serde(rename = "refIndex")]
    pub ref_index: usize,
    pub score: f64,
}

/// Scores names against queries with a fixed inclusion threshold.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Matcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns every record whose name matches `query`, best first.
    ///
    /// Empty or whitespace-only queries match nothing.
    pub fn search<'a>(&self, snapshot: &'a Snapshot, query: &str) -> Vec<MatchResult<'a>> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let needle = normalize(query);

        let mut matches: Vec<MatchResult<'a>> = snapshot
            .exercises()
            .iter()
            .enumerate()
            .filter_map(|(ref_index, item)| {
                let score = subsequence_score(&needle, &normalize(&item.name))?;
                (score <= self.threshold).then_some(MatchResult {
                    item,
                    ref_index,
                    score,
                })
            })
            .collect();

        // sort_by is stable: ties stay in catalog order
        matches.sort_by(|a, b| a.score.total_cmp(&b.score));
        matches
    }
}

/// Searches with the default threshold.
pub fn search<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<MatchResult<'a>> {
    Matcher::default().search(snapshot, query)
}

/// Case-folds `s` into a char sequence.
pub fn normalize(s: &str) -> Vec<char> {
    s.to_lowercase().chars().collect()
}

/// Best score of `query` against `candidate`, or `None` when `query` is not
/// an ordered subsequence of `candidate`.
///
/// Both inputs are expected to be normalized already.
pub fn subsequence_score(query: &[char], candidate: &[char]) -> Option<f64> {
    let m = query.len();
    let n = candidate.len();
    if m == 0 || m > n {
        return None;
    }

    let mut best: Option<f64> = None;

    // The cost only depends on where the alignment starts and ends, and for
    // a fixed start the earliest end is cheapest, so greedy from each start.
    for start in 0..=(n - m) {
        if candidate[start] != query[0] {
            continue;
        }
        // A later start sees a strict suffix, so it cannot succeed either.
        let Some(end) = greedy_end(query, candidate, start) else {
            break;
        };

        let lead = start;
        let gaps = (end - start + 1) - m;
        let tail = n - 1 - end;
        let cost = (GAP_WEIGHT * gaps as f64
            + LEAD_WEIGHT * lead as f64
            + TAIL_WEIGHT * tail as f64)
            / n as f64;

        best = Some(match best {
            Some(b) if b <= cost => b,
            _ => cost,
        });
    }

    best
}

/// Matches `query[1..]` as early as possible after `start`, returning the
/// position of the last matched char.
fn greedy_end(query: &[char], candidate: &[char], start: usize) -> Option<usize> {
    let mut pos = start;
    for &c in &query[1..] {
        let offset = candidate[pos + 1..].iter().position(|&x| x == c)?;
        pos += offset + 1;
    }
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: &str, name: &str) -> Exercise {
        serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
    }

    fn snapshot(names: &[&str]) -> Snapshot {
        Snapshot::new(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| exercise(&format!("ex-{}", i), n))
                .collect(),
        )
    }

    fn score(query: &str, name: &str) -> Option<f64> {
        subsequence_score(&normalize(query), &normalize(name))
    }

    fn names<'a>(matches: &[MatchResult<'a>]) -> Vec<&'a str> {
        matches.iter().map(|m| m.item.name.as_str()).collect()
    }

    #[test]
    fn test_exact_match_scores_zero() {
        assert_eq!(score("push up", "Push Up"), Some(0.0));
    }

    #[test]
    fn test_not_a_subsequence() {
        assert_eq!(score("pusx", "Push Up"), None);
        assert_eq!(score("pu", "up"), None);
        assert_eq!(score("longer than name", "Row"), None);
    }

    #[test]
    fn test_pushu_matches_push_up() {
        let snap = Snapshot::new(vec![serde_json::from_value(serde_json::json!({
            "id": "Pushup",
            "name": "Push Up",
            "equipment": null,
            "primaryMuscles": ["Chest"]
        }))
        .unwrap()]);

        let hits = search(&snap, "pushu");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.id, "Pushup");
        assert_eq!(hits[0].ref_index, 0);
        assert!(hits[0].score.is_finite());

        assert!(search(&snap, "xyz123").is_empty());
    }

    #[test]
    fn test_prefix_beats_buried_substring() {
        let snap = snapshot(&["Bench Press", "Press Up"]);
        let hits = search(&snap, "press");
        assert_eq!(names(&hits), vec!["Press Up", "Bench Press"]);
        assert!(hits[0].score < hits[1].score);
    }

    #[test]
    fn test_fewer_gaps_rank_higher() {
        let a = score("curl", "Curl").unwrap();
        let b = score("curl", "Cu-r-l").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_contiguous_substring_always_passes_default_threshold() {
        for (query, name) in [
            ("curl", "Barbell Curl"),
            ("press", "Dumbbell Incline Bench Press"),
            ("y", "Barbell Squat Assistance Machine Body"),
            ("row", "Seated Cable Row"),
        ] {
            let s = score(query, name).unwrap();
            assert!(s < DEFAULT_THRESHOLD, "{} in {} scored {}", query, name, s);
        }
    }

    #[test]
    fn test_scattered_match_is_excluded() {
        let snap = snapshot(&["Barbell Curl"]);
        assert!(score("bcl", "Barbell Curl").unwrap() > DEFAULT_THRESHOLD);
        assert!(search(&snap, "bcl").is_empty());
    }

    #[test]
    fn test_best_alignment_is_chosen() {
        // Greedy from the first 'a' would span the whole name; starting at
        // the second 'a' gives a contiguous match.
        let s = score("ab", "a---ab").unwrap();
        let expected = LEAD_WEIGHT * 4.0 / 6.0;
        assert!((s - expected).abs() < 1e-9);
    }

    #[test]
    fn test_case_insensitive() {
        let snap = snapshot(&["DEADLIFT"]);
        assert_eq!(search(&snap, "deadlift").len(), 1);
        assert_eq!(search(&snap, "DeAdLiFt")[0].score, 0.0);
    }

    #[test]
    fn test_empty_and_blank_queries_match_nothing() {
        let snap = snapshot(&["Push Up", "   "]);
        assert!(search(&snap, "").is_empty());
        assert!(search(&snap, "   ").is_empty());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let snap = snapshot(&["Squat", "Lunge", "Squat", "Squat"]);
        let hits = search(&snap, "squat");
        let indices: Vec<usize> = hits.iter().map(|m| m.ref_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let snap = snapshot(&[
            "Push Up",
            "Push Press",
            "Pushdown",
            "Band Push Sled",
            "Clean and Push",
            "Decline Push Up",
        ]);
        for query in ["push", "pu", "p", "sh u", "xyz"] {
            let a: Vec<usize> = search(&snap, query).iter().map(|m| m.ref_index).collect();
            let b: Vec<usize> = search(&snap, query).iter().map(|m| m.ref_index).collect();
            assert_eq!(a, b, "ordering changed for {}", query);
        }
    }

    #[test]
    fn test_every_match_contains_query_in_order() {
        let snap = snapshot(&[
            "Alternating Kettlebell Row",
            "Barbell Bench Press - Medium Grip",
            "Cable Crossover",
            "Dumbbell Flyes",
            "Push Up",
            "Side Lateral Raise",
        ]);
        for query in ["ab", "press", "Row", "cr", "e e", "ll"] {
            let q = normalize(query);
            for m in search(&snap, query) {
                let name = normalize(&m.item.name);
                let mut it = name.iter();
                assert!(
                    q.iter().all(|c| it.any(|x| x == c)),
                    "{:?} does not contain {:?} in order",
                    m.item.name,
                    query
                );
            }
        }
    }

    #[test]
    fn test_threshold_is_configurable() {
        let snap = snapshot(&["Barbell Curl", "Curl"]);
        assert_eq!(Matcher::new(0.0).search(&snap, "curl").len(), 1);
        assert_eq!(Matcher::new(1.0).search(&snap, "bcl").len(), 1);
    }

    #[test]
    fn test_odd_input_does_not_panic() {
        let snap = snapshot(&["İstanbul Squat", "🏋️ Lift", ""]);
        for query in ["i̇", "🏋", "\u{0}", "%%%", "ßs", "lift"] {
            let _ = search(&snap, query);
        }
        assert_eq!(search(&snap, "lift").len(), 1);
    }
}
