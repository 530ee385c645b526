//! # saathi-search
//!
//! Retrieval and ranking engine for a bilingual (English/Hindi)
//! labour-law question-answering assistant. Given a free-text query, the
//! engine selects the content collections to search, fetches candidate
//! chunks, scores them by semantic similarity blended with collection
//! relevance, applies lexical boost stages for exact legal citations,
//! and returns a deduplicated, ranked top-k ready for answer synthesis.
//!
//! ## Pipeline
//!
//! ```text
//!                      ┌──────────────┐
//!                      │  User Query   │
//!                      └──────┬────────┘
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │  Language Detector   │  Devanagari ⇒ hi, else en
//!                  └──────────┬──────────┘
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │ Collection Selector  │  exclude system/utility,
//!                  │  (token overlap)     │  score by query overlap
//!                  └──────────┬──────────┘
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │   Corpus Fetcher     │  per-collection, partial-
//!                  └──────────┬──────────┘  failure tolerant
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │  Similarity Scorer   │  cosine vs. query embedding;
//!                  │  (+ lazy backfill)   │  missing vectors computed
//!                  └──────────┬──────────┘  on the fly and written back
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │  Relevance Blender   │  0.7·semantic + 0.3·collection,
//!                  │  (boost stages)      │  phrase/section and scope
//!                  └──────────┬──────────┘  filters override on match
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │ Ranker/Deduplicator  │  stable sort, dedup by
//!                  └──────────┬──────────┘  citation link, top-k
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │  Context Formatter   │  numbered source blocks
//!                  └─────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration: blend weights, boost
//!   bonus, embedding backend settings
//! - [`models`] - Shared data types: `Chunk`, `Query`, `Language`,
//!   `ScoredCandidate`
//! - [`error`] - Typed error taxonomy separating fatal infrastructure
//!   failures from per-candidate skips
//! - [`store`] - The `DocumentStore` collaborator trait and the
//!   JSON-persisted `InMemoryStore`
//! - [`embed`] - The `EmbeddingProvider` collaborator trait and the
//!   HTTP-backed `HttpEmbedder` (Ollama / OpenAI-compatible)
//! - [`retrieval`] - The pipeline stages and the [`RetrievalEngine`]
//!
//! The LLM answer generator, HTTP layer, authentication, and escalation
//! flows are consumers of this crate, not part of it.

pub mod config;
pub mod embed;
pub mod error;
pub mod models;
pub mod retrieval;
pub mod store;

pub use config::{Config, EmbeddingConfig, RankingConfig};
pub use embed::{EmbeddingProvider, HttpEmbedder};
pub use error::{RetrievalError, SkipReason};
pub use models::{Chunk, Language, Query, ScoredCandidate};
pub use retrieval::engine::RetrievalEngine;
pub use store::{DocumentStore, InMemoryStore, KeywordEntry};
