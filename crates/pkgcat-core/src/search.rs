//! Relevance search over registry indexes.
//!
//! Scoring is a plain substring match, case-insensitive:
//! - +2.0 when the query occurs in the package name
//! - +1.0 for every tag containing the query
//! - +0.5 when the query occurs in the description
//!
//! Entries scoring at least [`SEARCH_THRESHOLD`] are returned.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::registry::{IndexEntry, Registry};
use crate::source::Source;

/// Minimum rank required to appear in results.
pub const SEARCH_THRESHOLD: f64 = 0.5;

/// Score `entry` against `query`.
pub fn rank(entry: &IndexEntry, query: &str) -> f64 {
    let q = query.to_lowercase();

    let mut result = 0.0;
    if entry.name.to_lowercase().contains(&q) {
        result += 2.0;
    }
    for tag in &entry.tags {
        if tag.to_lowercase().contains(&q) {
            result += 1.0;
        }
    }
    if entry.description.to_lowercase().contains(&q) {
        result += 0.5;
    }
    result
}

/// Whether a score clears the inclusion threshold.
pub fn is_relevant(score: f64) -> bool {
    score >= SEARCH_THRESHOLD
}

/// An index entry as reported by search, with versions flattened to identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub versions: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&IndexEntry> for SearchHit {
    fn from(entry: &IndexEntry) -> Self {
        Self {
            name: entry.name.clone(),
            versions: entry.version_ids(),
            tags: entry.tags.clone(),
            description: entry.description.clone(),
            extra: entry.extra.clone(),
        }
    }
}

/// Search hits from a single source.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntries {
    pub source: Source,
    pub packages: Vec<SearchHit>,
}

/// Search every registry, in order, for entries matching `query`.
///
/// Every registry contributes one group, possibly empty. The first index that
/// cannot be read aborts the search.
pub fn search(query: &str, registries: &[Registry]) -> Result<Vec<IndexEntries>> {
    let mut results = Vec::with_capacity(registries.len());
    for registry in registries {
        let index = registry.index()?;
        let packages = index
            .packages
            .iter()
            .filter(|entry| is_relevant(rank(entry, query)))
            .map(SearchHit::from)
            .collect();
        results.push(IndexEntries {
            source: registry.source().clone(),
            packages,
        });
    }
    Ok(results)
}
