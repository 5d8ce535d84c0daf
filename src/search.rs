//! Paginated fuzzy search over the catalog.
//!
//! Used by both the `exercise-catalog search` CLI command and the
//! `GET /search` HTTP endpoint. The matcher returns the full ordered match
//! list; this module slices one page out of it and wraps it in the response
//! envelope.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::fuzzy::{MatchResult, Matcher};
use crate::models::Snapshot;
use crate::store::CatalogStore;

/// Fixed number of matches per page.
pub const PAGE_SIZE: usize = 10;

/// Response envelope for one page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage<'a> {
    /// Total number of matches across all pages.
    pub results: usize,
    /// The (clamped) page that was served.
    pub page: usize,
    pub total_pages: usize,
    pub data: Vec<MatchResult<'a>>,
}

/// Parses a raw `page` parameter.
///
/// Absent, non-numeric, zero, and negative values all mean page 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&p| p >= 1)
        .and_then(|p| usize::try_from(p).ok())
        .unwrap_or(1)
}

/// `ceil(total / PAGE_SIZE)`; zero when there are no matches.
pub fn total_pages(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Runs `query` against `snapshot` and returns page `page` (1-based).
///
/// Pages past the end come back with empty `data` but correct counts.
pub fn paginated_search<'a>(
    matcher: &Matcher,
    snapshot: &'a Snapshot,
    query: &str,
    page: usize,
) -> SearchPage<'a> {
    let page = page.max(1);
    let matches = matcher.search(snapshot, query);
    let results = matches.len();

    let start = (page - 1).saturating_mul(PAGE_SIZE).min(results);
    let end = start.saturating_add(PAGE_SIZE).min(results);

    let data = matches[start..end].to_vec();

    SearchPage {
        results,
        page,
        total_pages: total_pages(results),
        data,
    }
}

/// CLI entry point: fetches the catalog and prints one page of results.
pub async fn run_search(config: &Config, query: &str, page: Option<&str>) -> Result<()> {
    let store = CatalogStore::connect(config)?;
    let snapshot = store.get_catalog().await?;
    let matcher = Matcher::new(config.search.threshold);
    let result = paginated_search(&matcher, &snapshot, query, parse_page(page));

    if result.results == 0 {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{} results, page {} of {}",
        result.results, result.page, result.total_pages
    );
    println!();

    let offset = (result.page - 1).saturating_mul(PAGE_SIZE);
    for (i, m) in result.data.iter().enumerate() {
        println!("{}. [{:.3}] {}", offset + i + 1, m.score, m.item.name);
        println!("    id: {}", m.item.id);
        println!(
            "    equipment: {}",
            m.item.equipment.as_deref().unwrap_or("(none)")
        );
        if !m.item.primary_muscles.is_empty() {
            println!("    muscles: {}", m.item.primary_muscles.join(", "));
        }
        println!();
    }

    Ok(())
}
