use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::embed::EmbeddingProvider;
use crate::error::RetrievalError;
use crate::models::{Chunk, Language, Query, ScoredCandidate};
use crate::retrieval::blend::{blend, default_stages, BoostStage};
use crate::retrieval::{collections, context, fetch, language, rank, scorer};
use crate::store::DocumentStore;

/// The retrieval pipeline with its injected collaborators.
///
/// Stateless between calls; the store and embedder handles are shared
/// process-wide and must tolerate concurrent use. An empty result means
/// "nothing relevant found" (the escalation trigger); infrastructure
/// failures surface as [`RetrievalError`].
pub struct RetrievalEngine {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: Config,
    stages: Vec<Box<dyn BoostStage>>,
}

impl RetrievalEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: Config,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
            stages: default_stages(),
        }
    }

    /// Replace the boost stages (in priority order).
    pub fn with_stages(mut self, stages: Vec<Box<dyn BoostStage>>) -> Self {
        self.stages = stages;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Retrieve with the configured default top-k.
    pub async fn retrieve_default(&self, query: &str) -> Result<Vec<Chunk>, RetrievalError> {
        self.retrieve(query, self.config.default_top_k).await
    }

    /// Retrieve the `top_k` most relevant chunks for a free-text query.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<Chunk>, RetrievalError> {
        let candidates = self.retrieve_scored(&Query::new(query), top_k).await?;
        Ok(candidates.into_iter().map(|c| c.chunk).collect())
    }

    /// Full pipeline returning scored candidates:
    /// detect language → select collections → fetch → embed query →
    /// score → blend/boost → rank/deduplicate.
    pub async fn retrieve_scored(
        &self,
        query: &Query,
        top_k: usize,
    ) -> Result<Vec<ScoredCandidate>, RetrievalError> {
        let detected = query
            .language_hint
            .unwrap_or_else(|| language::detect(&query.text));
        tracing::debug!("retrieving ({}) '{}'", detected.as_str(), query.text);

        let all_names = self.store.list_collection_names().await?;
        if all_names.is_empty() {
            tracing::info!("document store has no collections; nothing to retrieve");
            return Ok(Vec::new());
        }

        // Expand the query tokens with synonyms before collection
        // scoring; a failed lookup just means no expansion.
        let mut query_tokens = collections::tokenize(&query.text);
        match self.store.synonyms(&query_tokens, detected).await {
            Ok(expanded) => {
                for term in expanded {
                    query_tokens.extend(collections::tokenize(&term));
                }
                query_tokens.sort();
                query_tokens.dedup();
            }
            Err(e) => tracing::warn!("synonym expansion failed: {e}"),
        }

        let selected = collections::select(&all_names, &query_tokens);
        if selected.is_empty() {
            tracing::info!("no content collections after exclusion; nothing to retrieve");
            return Ok(Vec::new());
        }

        let corpus = fetch::fetch_corpus(self.store.as_ref(), &selected).await;
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(&query.text, detected).await?;

        let scored = scorer::score_chunks(
            self.store.as_ref(),
            self.embedder.as_ref(),
            &query_embedding,
            corpus,
            detected,
        )
        .await?;

        let relevance_map: HashMap<String, f32> = selected.into_iter().collect();
        let candidates = blend(
            scored,
            &relevance_map,
            &self.stages,
            &self.config.ranking,
            &query.text,
        );

        Ok(rank::rank(self.store.as_ref(), candidates, top_k).await)
    }

    /// Serialize ranked chunks into the generation-ready context block,
    /// resolving citation links from the store.
    pub async fn format_context(&self, chunks: &[Chunk], language: Language) -> String {
        let mut links: HashMap<String, String> = HashMap::new();
        for chunk in chunks {
            if links.contains_key(&chunk.source_collection) {
                continue;
            }
            match self.store.reference_link(&chunk.source_collection).await {
                Ok(Some(link)) if !link.trim().is_empty() => {
                    links.insert(chunk.source_collection.clone(), link);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "reference link lookup failed for '{}': {e}",
                        chunk.source_collection
                    );
                }
            }
        }
        context::format_context(chunks, language, &links)
    }
}
