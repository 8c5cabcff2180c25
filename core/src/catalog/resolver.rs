//! Resolve user-typed game queries against the catalog.

use thiserror::Error;

use super::CatalogEntry;

/// Maximum edit distance for "did you mean" suggestions.
const SUGGESTION_DISTANCE: usize = 3;
const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no game given")]
    Empty,

    #[error("game '{query}' not found")]
    NotFound {
        query: String,
        /// Close ids, nearest first.
        suggestions: Vec<String>,
    },

    #[error("game '{query}' is ambiguous: {}", .candidates.join(", "))]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },
}

/// Exact id, then case-insensitive id, then a unique case-insensitive prefix.
pub(super) fn resolve<'a>(
    query: &str,
    entries: &'a [CatalogEntry],
) -> Result<&'a CatalogEntry, ResolveError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ResolveError::Empty);
    }

    if let Some(entry) = entries.iter().find(|e| e.id == query) {
        return Ok(entry);
    }

    let lowered = query.to_lowercase();
    if let Some(entry) = entries.iter().find(|e| e.id.to_lowercase() == lowered) {
        return Ok(entry);
    }

    let prefixed: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|e| e.id.to_lowercase().starts_with(&lowered))
        .collect();

    match prefixed.as_slice() {
        [single] => Ok(*single),
        [] => Err(ResolveError::NotFound {
            query: query.to_string(),
            suggestions: suggest(&lowered, entries),
        }),
        many => Err(ResolveError::Ambiguous {
            query: query.to_string(),
            candidates: many.iter().map(|e| e.id.clone()).collect(),
        }),
    }
}

fn suggest(query: &str, entries: &[CatalogEntry]) -> Vec<String> {
    let mut scored: Vec<(usize, &str)> = entries
        .iter()
        .map(|e| (levenshtein_distance(query, &e.id.to_lowercase()), e.id.as_str()))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, id)| id.to_string())
        .collect()
}

/// Edit distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
