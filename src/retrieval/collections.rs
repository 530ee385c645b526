use std::collections::HashSet;

/// Utility collections that must never leak into retrieval: interaction
/// logs, user accounts, admin review state, the synonym and link side
/// tables, GridFS binary buckets, and the vector index itself.
const EXCLUDED_COLLECTIONS: &[&str] = &[
    "logs",
    "users",
    "admin_users",
    "admin_markings",
    "admin_answers",
    "keywords",
    "links",
    "fs.files",
    "fs.chunks",
    "legal_vectors",
];

/// Namespace collections created by the store itself.
const SYSTEM_PREFIX: &str = "system.";
/// Collections reserved for internal bookkeeping by the ingestion jobs.
const INTERNAL_PREFIX: &str = "internal_";

/// Whether a collection holds retrievable content. Applied before any
/// scoring so operational data cannot surface in answers.
pub fn is_content_collection(name: &str) -> bool {
    !name.starts_with(SYSTEM_PREFIX)
        && !name.starts_with(INTERNAL_PREFIX)
        && !EXCLUDED_COLLECTIONS.contains(&name)
}

/// Lowercase word tokens. Underscores and every other non-alphanumeric
/// separator split, so `minimum_wages_act` tokenises like
/// "minimum wages act". Devanagari letters count as alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token-overlap relevance of a collection name to the query:
/// |query tokens ∩ name tokens| / |query tokens|, 0 for an empty query.
pub fn relevance(query_tokens: &[String], collection_name: &str) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let query_set: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
    let name_tokens = tokenize(collection_name);
    let name_set: HashSet<&str> = name_tokens.iter().map(String::as_str).collect();

    let overlap = query_set.intersection(&name_set).count();
    overlap as f32 / query_set.len() as f32
}

/// Filter out system/utility collections, score the rest by token
/// overlap with the query, and return them ordered by descending
/// relevance. The sort is stable, so ties keep store order.
pub fn select(all_collection_names: &[String], query_tokens: &[String]) -> Vec<(String, f32)> {
    let mut scored: Vec<(String, f32)> = all_collection_names
        .iter()
        .filter(|name| is_content_collection(name))
        .map(|name| (name.clone(), relevance(query_tokens, name)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
}
