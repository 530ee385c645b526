//! The retrieval pipeline, leaf to root: language detection, collection
//! selection, corpus fetch, similarity scoring, relevance blending,
//! ranking/deduplication, and context formatting. [`engine`] wires the
//! stages together behind injected collaborators.

pub mod blend;
pub mod collections;
pub mod context;
pub mod engine;
pub mod fetch;
pub mod language;
pub mod rank;
pub mod scorer;
