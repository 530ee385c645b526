use crate::embed::EmbeddingProvider;
use crate::error::{RetrievalError, SkipReason};
use crate::models::{Chunk, Language};
use crate::store::DocumentStore;

/// A chunk paired with its cosine similarity to the query embedding.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub semantic_score: f32,
}

/// Score every chunk against the query embedding in the requested
/// language.
///
/// Chunks carrying a stored embedding for the language use it directly.
/// Chunks missing one are embedded on the fly from their fallback text
/// and the fresh vector is written back to the store best-effort, so
/// the next request reuses it. Chunks with neither embedding nor text
/// are dropped with a logged [`SkipReason`]; only a missing model
/// ([`RetrievalError::ModelUnavailable`]) aborts the whole batch.
pub async fn score_chunks(
    store: &dyn DocumentStore,
    embedder: &dyn EmbeddingProvider,
    query_embedding: &[f32],
    chunks: Vec<Chunk>,
    language: Language,
) -> Result<Vec<ScoredChunk>, RetrievalError> {
    let mut scored = Vec::with_capacity(chunks.len());

    for mut chunk in chunks {
        match resolve_embedding(store, embedder, &mut chunk, language).await? {
            Ok(()) => {
                // resolve_embedding guarantees the field is set.
                let embedding = chunk.embedding_for(language).unwrap_or(&[]);
                let semantic_score = cosine_similarity(query_embedding, embedding);
                scored.push(ScoredChunk {
                    semantic_score,
                    chunk,
                });
            }
            Err(reason) => {
                tracing::debug!(
                    "skipping chunk {} from '{}': {reason}",
                    chunk.id,
                    chunk.source_collection
                );
            }
        }
    }

    Ok(scored)
}

/// Ensure `chunk` carries an embedding for `language`, computing and
/// backfilling one when absent.
///
/// The outer `Result` is fatal (model unavailable); the inner one is the
/// per-chunk skip decision.
async fn resolve_embedding(
    store: &dyn DocumentStore,
    embedder: &dyn EmbeddingProvider,
    chunk: &mut Chunk,
    language: Language,
) -> Result<Result<(), SkipReason>, RetrievalError> {
    if chunk.embedding_for(language).is_some() {
        return Ok(Ok(()));
    }

    let Some(text) = chunk.embeddable_text(language) else {
        return Ok(Err(SkipReason::NoText));
    };
    let text = text.to_string();

    let embedding = match embedder.embed(&text, language).await {
        Ok(v) => v,
        // A missing model is fatal for the request, not a per-chunk skip.
        Err(RetrievalError::ModelUnavailable) => return Err(RetrievalError::ModelUnavailable),
        Err(e) => return Ok(Err(SkipReason::EmbeddingFailed(e.to_string()))),
    };

    // Best-effort backfill; a write failure costs a recompute next time,
    // nothing else.
    if let Err(e) = store
        .update_embedding(&chunk.source_collection, &chunk.id, language, &embedding)
        .await
    {
        tracing::warn!(
            "embedding backfill failed for chunk {} in '{}': {e}",
            chunk.id,
            chunk.source_collection
        );
    }

    chunk.set_embedding(language, embedding);
    Ok(Ok(()))
}

/// Cosine similarity: dot(a, b) / (‖a‖·‖b‖). Zero norm or mismatched
/// dimensions yield 0.0 rather than an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for i in 0..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use async_trait::async_trait;

    /// Deterministic embedder: counts occurrences of fixed axis words.
    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        async fn embed(&self, text: &str, _language: Language) -> Result<Vec<f32>, RetrievalError> {
            let lower = text.to_lowercase();
            Ok(vec![
                lower.matches("wage").count() as f32,
                lower.matches("safety").count() as f32,
                lower.matches("leave").count() as f32,
            ])
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed(&self, _: &str, _: Language) -> Result<Vec<f32>, RetrievalError> {
            Err(RetrievalError::ModelUnavailable)
        }
    }

    fn chunk(id: &str, content_en: Option<&str>, embedding_en: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: id.to_string(),
            source_collection: "acts".to_string(),
            content_en: content_en.map(str::to_string),
            content_hi: None,
            embedding_en,
            embedding_hi: None,
            source_label: String::new(),
            topic: None,
            text: None,
            reference_link: None,
        }
    }

    #[test]
    fn test_cosine_self_similarity_is_one() {
        let v = vec![0.3, -0.5, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_is_symmetric_and_bounded() {
        let a = vec![1.0, 2.0, -3.0];
        let b = vec![-0.5, 0.25, 4.0];
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_stored_embedding_used_directly() {
        let store = InMemoryStore::new();
        let chunks = vec![chunk("a", None, Some(vec![1.0, 0.0, 0.0]))];

        let scored = score_chunks(&store, &AxisEmbedder, &[1.0, 0.0, 0.0], chunks, Language::En)
            .await
            .unwrap();
        assert_eq!(scored.len(), 1);
        assert!((scored[0].semantic_score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_missing_embedding_computed_and_backfilled() {
        let store = InMemoryStore::new();
        let id = store.insert_chunk("acts", chunk("", Some("wage rules"), None));
        let chunks = store.find_chunks("acts").await.unwrap();

        let scored = score_chunks(&store, &AxisEmbedder, &[1.0, 0.0, 0.0], chunks, Language::En)
            .await
            .unwrap();
        assert_eq!(scored.len(), 1);
        assert!(scored[0].semantic_score > 0.9);

        // The fresh vector was written back to the store.
        let persisted = store.find_chunks("acts").await.unwrap();
        assert_eq!(persisted[0].id, id);
        assert_eq!(persisted[0].embedding_en.as_deref(), Some(&[1.0, 0.0, 0.0][..]));
    }

    #[tokio::test]
    async fn test_no_text_chunk_is_dropped() {
        let store = InMemoryStore::new();
        let chunks = vec![chunk("empty", None, None), chunk("ok", Some("wage"), None)];

        let scored = score_chunks(&store, &AxisEmbedder, &[1.0, 0.0, 0.0], chunks, Language::En)
            .await
            .unwrap();
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].chunk.id, "ok");
    }

    #[tokio::test]
    async fn test_model_unavailable_aborts_the_batch() {
        let store = InMemoryStore::new();
        let chunks = vec![chunk("a", Some("wage"), None)];

        let err = score_chunks(&store, &BrokenEmbedder, &[1.0], chunks, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::ModelUnavailable));
    }

    #[tokio::test]
    async fn test_hindi_language_selects_hindi_fields() {
        let store = InMemoryStore::new();
        let mut c = chunk("hi", None, None);
        c.embedding_hi = Some(vec![0.0, 1.0, 0.0]);
        c.embedding_en = Some(vec![1.0, 0.0, 0.0]);

        let scored = score_chunks(&store, &AxisEmbedder, &[0.0, 1.0, 0.0], vec![c], Language::Hi)
            .await
            .unwrap();
        assert!((scored[0].semantic_score - 1.0).abs() < 1e-6);
    }
}
