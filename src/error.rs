use thiserror::Error;

/// Errors that abort a retrieval request.
///
/// Failures local to a single chunk or collection never surface here;
/// they are absorbed as [`SkipReason`]s or logged skips. Only shared
/// infrastructure (the embedding model, the document store connection)
/// propagates, so callers can tell "no answer found" (an empty result
/// list) apart from "the system is broken".
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The embedding model has not been initialized or is unreachable.
    /// Fatal for the request; never downgraded to an empty vector.
    #[error("embedding model is not available")]
    ModelUnavailable,

    /// The embedding backend accepted the request but failed to produce
    /// a vector.
    #[error("embedding backend error: {0}")]
    Embedding(String),

    /// The document store failed at the infrastructure level.
    #[error("document store error: {0}")]
    Store(String),
}

/// Why a single candidate chunk was dropped during scoring.
///
/// Carried in `Result<_, SkipReason>` per candidate, logged, and
/// filtered out; a skip never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No embedding for the requested language and no text in any
    /// language to compute one from.
    NoText,
    /// On-the-fly embedding failed for this chunk only.
    EmbeddingFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoText => write!(f, "no content text in any language"),
            SkipReason::EmbeddingFailed(e) => write!(f, "embedding failed: {e}"),
        }
    }
}
