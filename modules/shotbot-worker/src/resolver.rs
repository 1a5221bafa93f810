use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use shotbot_common::EntityMatch;

use crate::directory::EntityDirectory;

/// Minimum similarity for a canonical name to count as a match.
pub const DEFAULT_SIMILARITY_CUTOFF: f64 = 0.6;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// No canonical names at all. Nothing can resolve until this clears.
    #[error("{0:#}")]
    Directory(anyhow::Error),

    /// The id lookup for a matched name failed.
    #[error("player id lookup failed for {name}: {cause:#}")]
    Lookup {
        name: String,
        cause: anyhow::Error,
    },
}

/// Turns free-text "First Last" queries into canonical players.
pub struct EntityResolver {
    directory: Arc<EntityDirectory>,
    cutoff: f64,
}

impl EntityResolver {
    pub fn new(directory: Arc<EntityDirectory>) -> Self {
        Self {
            directory,
            cutoff: DEFAULT_SIMILARITY_CUTOFF,
        }
    }

    /// Resolve a query to the closest canonical player.
    ///
    /// Queries that aren't exactly two words, or that have no close enough
    /// canonical name, resolve to `Ok(None)`.
    pub async fn resolve(&self, raw_text: &str) -> Result<Option<EntityMatch>, ResolveError> {
        let Some(expected) = expected_canonical(raw_text) else {
            debug!(query = raw_text, "Query is not a two-word name");
            return Ok(None);
        };

        let names = self.directory.names().await.map_err(ResolveError::Directory)?;
        let Some(name) = best_match(&expected, &names, self.cutoff) else {
            debug!(query = raw_text, expected = expected.as_str(), "No close canonical name");
            return Ok(None);
        };

        match self.directory.entity_id(name).await {
            Ok(Some(entity_id)) => Ok(Some(EntityMatch::new(entity_id, name))),
            Ok(None) => {
                warn!(name, "Canonical name has no id");
                Ok(None)
            }
            Err(e) => {
                error!(name, error = %e, "Unexpected error looking up player id");
                Err(ResolveError::Lookup {
                    name: name.to_string(),
                    cause: e,
                })
            }
        }
    }
}

/// "Stephen Curry" → "Curry, Stephen". `None` unless the query is exactly two words.
pub fn expected_canonical(raw_text: &str) -> Option<String> {
    let mut tokens = raw_text.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(first), Some(last), None) => Some(format!("{last}, {first}")),
        _ => None,
    }
}

/// Closest candidate by normalized edit distance, case-sensitive.
/// Ties go to the candidate that appears first.
pub fn best_match<'a>(expected: &str, candidates: &'a [String], cutoff: f64) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = strsim::normalized_levenshtein(expected, candidate);
        if score < cutoff {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate.as_str(), score));
        }
    }
    best.map(|(name, _)| name)
}
