use std::collections::{HashMap, HashSet};

use crate::models::{Chunk, ScoredCandidate};
use crate::store::DocumentStore;

/// Resolve the citation link for a chunk: chunk-level link first, then
/// the collection's entry in the links side table.
pub async fn resolve_link(
    store: &dyn DocumentStore,
    chunk: &Chunk,
    cache: &mut HashMap<String, Option<String>>,
) -> Option<String> {
    if let Some(link) = &chunk.reference_link {
        if !link.trim().is_empty() {
            return Some(link.clone());
        }
    }

    if let Some(cached) = cache.get(&chunk.source_collection) {
        return cached.clone();
    }

    let link = match store.reference_link(&chunk.source_collection).await {
        Ok(link) => link.filter(|l| !l.trim().is_empty()),
        Err(e) => {
            tracing::warn!(
                "reference link lookup failed for '{}': {e}",
                chunk.source_collection
            );
            None
        }
    };
    cache
        .insert(chunk.source_collection.clone(), link.clone());
    link
}

/// Sort candidates by combined score (stable, so ties keep fetch order),
/// deduplicate by resolved citation link, and truncate to `top_k`.
///
/// Two chunks resolving to the same link count once; chunks with no
/// resolvable link are each kept (keyed by their own id). An empty input
/// yields an empty result — the caller's "unanswered" signal.
pub async fn rank(
    store: &dyn DocumentStore,
    mut candidates: Vec<ScoredCandidate>,
    top_k: usize,
) -> Vec<ScoredCandidate> {
    if top_k == 0 {
        return Vec::new();
    }

    candidates.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut link_cache: HashMap<String, Option<String>> = HashMap::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut ranked = Vec::new();

    for candidate in candidates {
        let key = match resolve_link(store, &candidate.chunk, &mut link_cache).await {
            Some(link) => format!("link:{link}"),
            None => format!("chunk:{}", candidate.chunk.id),
        };
        if !seen.insert(key) {
            continue;
        }
        ranked.push(candidate);
        if ranked.len() == top_k {
            break;
        }
    }

    ranked
}
