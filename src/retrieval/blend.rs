use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::config::RankingConfig;
use crate::models::ScoredCandidate;
use crate::retrieval::scorer::ScoredChunk;

/// Legal-action phrases that signal the user wants an exact statutory
/// answer. When any of these appear in the query, candidates that carry
/// all matched phrases outrank everything else.
const LEGAL_ACTION_PHRASES: &[&str] = &[
    "retrenchment",
    "gratuity",
    "lay-off",
    "layoff",
    "lockout",
    "lock-out",
    "strike",
    "dismissal",
    "termination",
    "notice period",
    "compensation",
    "overtime",
    "minimum wage",
    "maternity leave",
    "provident fund",
    "bonus",
    "working hours",
    "appointment letter",
    "earned leave",
    "trade union",
];

/// Jurisdiction/scope vocabulary. Queries about where or to whom an act
/// applies should surface the applicability clauses, not semantically
/// adjacent provisions.
const SCOPE_TERMS: &[&str] = &[
    "applicability",
    "applicable",
    "applies to",
    "scope",
    "jurisdiction",
    "whole of india",
    "extent",
    "coverage",
];

/// `section 25F`, `Section 9`, etc. Captures the number plus optional
/// letter suffix.
fn section_re() -> &'static Regex {
    static SECTION_RE: OnceLock<Regex> = OnceLock::new();
    SECTION_RE.get_or_init(|| {
        Regex::new(r"(?i)\bsection\s+(\d+[a-z]*)").expect("section pattern is valid")
    })
}

/// A named filter stage applied after base scoring.
///
/// A stage inspects the query; when it matches, it returns the indices
/// of the candidates that survive its restriction. Stages run in
/// priority order and the first stage whose surviving set is non-empty
/// replaces the whole candidate pool; stages are filters, not additive
/// signals. `None` means "no match, fall through".
pub trait BoostStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, query: &str, candidates: &[ScoredCandidate]) -> Option<Vec<usize>>;
}

/// Whether `text` cites exactly `section <token>`. Compares the captured
/// reference, not the raw substring, so `section 2` never matches the
/// prefix of `Section 25F`.
fn cites_section(text: &str, token: &str) -> bool {
    section_re()
        .captures_iter(text)
        .any(|caps| caps[1].eq_ignore_ascii_case(token))
}

/// Restrict to candidates containing every legal-action phrase found in
/// the query, and the exact section reference when the query cites one.
pub struct PhraseMatchStage;

impl BoostStage for PhraseMatchStage {
    fn name(&self) -> &'static str {
        "phrase_match"
    }

    fn apply(&self, query: &str, candidates: &[ScoredCandidate]) -> Option<Vec<usize>> {
        let query_lower = query.to_lowercase();

        let matched_phrases: Vec<&str> = LEGAL_ACTION_PHRASES
            .iter()
            .copied()
            .filter(|p| query_lower.contains(p))
            .collect();

        let section_token = section_re()
            .captures(&query_lower)
            .map(|caps| caps[1].to_string());

        // An explicit `section N` citation triggers the stage on its own;
        // exact citations must always win over fuzzy neighbors.
        if matched_phrases.is_empty() && section_token.is_none() {
            return None;
        }

        let survivors = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                let text = c.chunk.searchable_text();
                matched_phrases.iter().all(|p| text.contains(p))
                    && section_token
                        .as_deref()
                        .map_or(true, |token| cites_section(&text, token))
            })
            .map(|(i, _)| i)
            .collect();

        Some(survivors)
    }
}

/// Restrict to candidates discussing applicability/scope when the query
/// asks about it.
pub struct ScopeStage;

impl BoostStage for ScopeStage {
    fn name(&self) -> &'static str {
        "applicability_scope"
    }

    fn apply(&self, query: &str, candidates: &[ScoredCandidate]) -> Option<Vec<usize>> {
        let query_lower = query.to_lowercase();
        if !SCOPE_TERMS.iter().any(|t| query_lower.contains(t)) {
            return None;
        }

        let survivors = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                let text = c.chunk.searchable_text();
                SCOPE_TERMS.iter().any(|t| text.contains(t))
            })
            .map(|(i, _)| i)
            .collect();

        Some(survivors)
    }
}

/// The stages in priority order: exact citations beat scope matching.
pub fn default_stages() -> Vec<Box<dyn BoostStage>> {
    vec![Box::new(PhraseMatchStage), Box::new(ScopeStage)]
}

/// Blend semantic similarity with collection relevance, then run the
/// boost stages.
///
/// Base combined score is `semantic_weight * semantic +
/// collection_weight * relevance`. The first stage yielding a non-empty
/// surviving set replaces the pool (deduplicated by chunk identity) and
/// each survivor scores `base + boost_bonus`, guaranteeing it floats
/// above every unboosted candidate. With no stage match the base scores
/// stand.
pub fn blend(
    scored: Vec<ScoredChunk>,
    collection_relevance: &HashMap<String, f32>,
    stages: &[Box<dyn BoostStage>],
    ranking: &RankingConfig,
    query: &str,
) -> Vec<ScoredCandidate> {
    let candidates: Vec<ScoredCandidate> = scored
        .into_iter()
        .map(|s| {
            let relevance = collection_relevance
                .get(&s.chunk.source_collection)
                .copied()
                .unwrap_or(0.0);
            let combined =
                ranking.semantic_weight * s.semantic_score + ranking.collection_weight * relevance;
            ScoredCandidate {
                chunk: s.chunk,
                semantic_score: s.semantic_score,
                collection_relevance: relevance,
                boost: 0.0,
                combined_score: combined,
            }
        })
        .collect();

    for stage in stages {
        let Some(survivors) = stage.apply(query, &candidates) else {
            continue;
        };
        if survivors.is_empty() {
            tracing::debug!("boost stage '{}' matched but filtered everything", stage.name());
            continue;
        }

        tracing::debug!(
            "boost stage '{}' restricted {} candidates to {}",
            stage.name(),
            candidates.len(),
            survivors.len()
        );

        let mut seen: HashSet<String> = HashSet::new();
        let mut boosted = Vec::with_capacity(survivors.len());
        for idx in survivors {
            let c = &candidates[idx];
            if !seen.insert(c.chunk.id.clone()) {
                continue;
            }
            let mut c = c.clone();
            c.boost = ranking.boost_bonus;
            c.combined_score += ranking.boost_bonus;
            boosted.push(c);
        }
        return boosted;
    }

    candidates
}
