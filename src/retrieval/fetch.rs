use crate::models::Chunk;
use crate::store::DocumentStore;

/// Materialize candidate chunks from the selected collections, tagging
/// each with its origin collection.
///
/// One collection failing to read is logged and skipped; the remaining
/// collections still contribute. Partial results are a correctness
/// requirement here, not an optimization.
pub async fn fetch_corpus(
    store: &dyn DocumentStore,
    collections: &[(String, f32)],
) -> Vec<Chunk> {
    let mut corpus = Vec::new();

    for (name, _) in collections {
        match store.find_chunks(name).await {
            Ok(chunks) => {
                for mut chunk in chunks {
                    chunk.source_collection = name.clone();
                    corpus.push(chunk);
                }
            }
            Err(e) => {
                tracing::warn!("skipping collection '{name}': {e}");
            }
        }
    }

    corpus
}
