use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::error::RetrievalError;
use crate::models::{Chunk, Language};

/// A keyword entry in the synonym side table. Matching a query token
/// against any keyword or synonym expands the query with the whole entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordEntry {
    #[serde(default)]
    pub english_keyword: String,
    #[serde(default)]
    pub hindi_keyword: String,
    #[serde(default)]
    pub english_synonyms: Vec<String>,
    #[serde(default)]
    pub hindi_synonyms: Vec<String>,
}

/// The document store collaborator.
///
/// The engine only needs four operations plus the optional synonym
/// lookup; everything else about the store (indexes, replication,
/// ingestion) is out of scope. Implementations must support concurrent
/// reads and atomic single-document embedding updates — the lazy
/// backfill is idempotent, so no further locking is required.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every collection name in the store, content and utility alike.
    /// The collection selector partitions them afterwards.
    async fn list_collection_names(&self) -> Result<Vec<String>, RetrievalError>;

    /// All chunks of one collection, projected to the [`Chunk`] fields.
    /// Anything else on the document (audit fields, ingest metadata) is
    /// dead weight on the retrieval path.
    async fn find_chunks(&self, collection: &str) -> Result<Vec<Chunk>, RetrievalError>;

    /// Patch one chunk's embedding field for the given language.
    /// Returns whether a document was matched.
    async fn update_embedding(
        &self,
        collection: &str,
        chunk_id: &str,
        language: Language,
        embedding: &[f32],
    ) -> Result<bool, RetrievalError>;

    /// Citable URL for a content collection, from the links side table.
    async fn reference_link(&self, collection: &str) -> Result<Option<String>, RetrievalError>;

    /// Expansion terms for the query tokens from the keywords side table.
    /// Stores without one keep the default empty expansion.
    async fn synonyms(
        &self,
        _query_tokens: &[String],
        _language: Language,
    ) -> Result<Vec<String>, RetrievalError> {
        Ok(Vec::new())
    }
}

/// On-disk snapshot of an [`InMemoryStore`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    collections: BTreeMap<String, Vec<Chunk>>,
    links: HashMap<String, String>,
    keywords: Vec<KeywordEntry>,
}

/// In-memory document store with optional JSON persistence.
///
/// Serves small local corpora in production and doubles as the injected
/// test store. Collection order is stable (BTreeMap) so retrieval
/// tie-breaks are reproducible.
pub struct InMemoryStore {
    inner: RwLock<StoreSnapshot>,
    persist_path: Option<PathBuf>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreSnapshot::default()),
            persist_path: None,
        }
    }

    /// Store described by the configuration: persisted at `corpus_path`
    /// when one is set, purely in-memory otherwise.
    pub fn from_config(config: &Config) -> Result<Self, RetrievalError> {
        match &config.corpus_path {
            Some(path) => Self::open_or_create(path),
            None => Ok(Self::new()),
        }
    }

    /// Load a persisted corpus, or start empty when the file is missing
    /// or unreadable.
    pub fn open_or_create(path: &Path) -> Result<Self, RetrievalError> {
        let snapshot = if path.exists() {
            let data = std::fs::read_to_string(path)
                .map_err(|e| RetrievalError::Store(format!("failed to read corpus: {e}")))?;
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            StoreSnapshot::default()
        };

        Ok(Self {
            inner: RwLock::new(snapshot),
            persist_path: Some(path.to_path_buf()),
        })
    }

    /// Insert a chunk, assigning an id when it has none. Returns the id.
    pub fn insert_chunk(&self, collection: &str, mut chunk: Chunk) -> String {
        if chunk.id.is_empty() {
            chunk.id = Uuid::new_v4().to_string();
        }
        chunk.source_collection = collection.to_string();
        let id = chunk.id.clone();
        {
            let mut inner = self.inner.write();
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(chunk);
        }
        self.persist();
        id
    }

    /// Register an empty collection (e.g. a utility collection in tests).
    pub fn create_collection(&self, collection: &str) {
        self.inner
            .write()
            .collections
            .entry(collection.to_string())
            .or_default();
    }

    pub fn set_reference_link(&self, collection: &str, link: &str) {
        self.inner
            .write()
            .links
            .insert(collection.to_string(), link.to_string());
        self.persist();
    }

    pub fn add_keyword_entry(&self, entry: KeywordEntry) {
        self.inner.write().keywords.push(entry);
        self.persist();
    }

    /// Persist the snapshot (atomic write via temp file + rename).
    /// No-op without a persist path; write failures are logged.
    fn persist(&self) {
        let Some(path) = &self.persist_path else {
            return;
        };
        let inner = self.inner.read();
        match serde_json::to_string(&*inner) {
            Ok(data) => {
                let tmp_path = path.with_extension("json.tmp");
                if std::fs::write(&tmp_path, &data).is_ok() {
                    let _ = std::fs::rename(&tmp_path, path);
                } else {
                    tracing::warn!("failed to write corpus snapshot to {}", path.display());
                }
            }
            Err(e) => tracing::warn!("failed to serialize corpus snapshot: {e}"),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_collection_names(&self) -> Result<Vec<String>, RetrievalError> {
        Ok(self.inner.read().collections.keys().cloned().collect())
    }

    async fn find_chunks(&self, collection: &str) -> Result<Vec<Chunk>, RetrievalError> {
        let inner = self.inner.read();
        let chunks = inner
            .collections
            .get(collection)
            .ok_or_else(|| RetrievalError::Store(format!("unknown collection: {collection}")))?;
        Ok(chunks.clone())
    }

    async fn update_embedding(
        &self,
        collection: &str,
        chunk_id: &str,
        language: Language,
        embedding: &[f32],
    ) -> Result<bool, RetrievalError> {
        let matched = {
            let mut inner = self.inner.write();
            let Some(chunks) = inner.collections.get_mut(collection) else {
                return Ok(false);
            };
            match chunks.iter_mut().find(|c| c.id == chunk_id) {
                Some(chunk) => {
                    chunk.set_embedding(language, embedding.to_vec());
                    true
                }
                None => false,
            }
        };
        if matched {
            self.persist();
        }
        Ok(matched)
    }

    async fn reference_link(&self, collection: &str) -> Result<Option<String>, RetrievalError> {
        Ok(self.inner.read().links.get(collection).cloned())
    }

    async fn synonyms(
        &self,
        query_tokens: &[String],
        language: Language,
    ) -> Result<Vec<String>, RetrievalError> {
        let inner = self.inner.read();
        let mut expanded: Vec<String> = Vec::new();

        for entry in &inner.keywords {
            let search_terms = match language {
                Language::En => &entry.english_synonyms,
                Language::Hi => &entry.hindi_synonyms,
            };
            let keyword = match language {
                Language::En => &entry.english_keyword,
                Language::Hi => &entry.hindi_keyword,
            };

            let hit = query_tokens.iter().any(|t| {
                t.eq_ignore_ascii_case(keyword)
                    || search_terms.iter().any(|s| t.eq_ignore_ascii_case(s))
            });
            if hit {
                expanded.push(entry.english_keyword.clone());
                expanded.push(entry.hindi_keyword.clone());
                expanded.extend(entry.english_synonyms.iter().cloned());
                expanded.extend(entry.hindi_synonyms.iter().cloned());
            }
        }

        expanded.retain(|t| !t.is_empty());
        expanded.sort();
        expanded.dedup();
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_with_en(content: &str) -> Chunk {
        Chunk {
            id: String::new(),
            source_collection: String::new(),
            content_en: Some(content.to_string()),
            content_hi: None,
            embedding_en: None,
            embedding_hi: None,
            source_label: "Test Act".to_string(),
            topic: None,
            text: None,
            reference_link: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_tags_collection() {
        let store = InMemoryStore::new();
        let id = store.insert_chunk("minimum_wages_act", chunk_with_en("wages"));
        assert!(!id.is_empty());

        let chunks = store.find_chunks("minimum_wages_act").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source_collection, "minimum_wages_act");
    }

    #[tokio::test]
    async fn test_find_unknown_collection_is_store_error() {
        let store = InMemoryStore::new();
        let err = store.find_chunks("nope").await.unwrap_err();
        assert!(matches!(err, RetrievalError::Store(_)));
    }

    #[tokio::test]
    async fn test_update_embedding_is_idempotent() {
        let store = InMemoryStore::new();
        let id = store.insert_chunk("acts", chunk_with_en("wages"));

        let emb = vec![0.1, 0.2, 0.3];
        assert!(store
            .update_embedding("acts", &id, Language::En, &emb)
            .await
            .unwrap());
        assert!(store
            .update_embedding("acts", &id, Language::En, &emb)
            .await
            .unwrap());

        let chunks = store.find_chunks("acts").await.unwrap();
        assert_eq!(chunks[0].embedding_en.as_deref(), Some(emb.as_slice()));
    }

    #[tokio::test]
    async fn test_update_embedding_unknown_chunk_matches_nothing() {
        let store = InMemoryStore::new();
        store.create_collection("acts");
        let matched = store
            .update_embedding("acts", "missing", Language::En, &[1.0])
            .await
            .unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");

        let id;
        {
            let store = InMemoryStore::open_or_create(&path).unwrap();
            id = store.insert_chunk("acts", chunk_with_en("gratuity rules"));
            store.set_reference_link("acts", "https://example.org/acts");
        }

        let reloaded = InMemoryStore::open_or_create(&path).unwrap();
        let chunks = reloaded.find_chunks("acts").await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, id);
        assert_eq!(
            reloaded.reference_link("acts").await.unwrap().as_deref(),
            Some("https://example.org/acts")
        );
    }

    #[tokio::test]
    async fn test_from_config_respects_corpus_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");

        let mut config = Config::default();
        config.corpus_path = Some(path.clone());

        {
            let store = InMemoryStore::from_config(&config).unwrap();
            store.insert_chunk("acts", chunk_with_en("wages"));
        }
        assert!(path.exists(), "configured path gets a snapshot");

        let reloaded = InMemoryStore::from_config(&config).unwrap();
        assert_eq!(reloaded.find_chunks("acts").await.unwrap().len(), 1);

        // No path configured: in-memory only, nothing written.
        let ephemeral = InMemoryStore::from_config(&Config::default()).unwrap();
        ephemeral.insert_chunk("acts", chunk_with_en("wages"));
    }

    #[tokio::test]
    async fn test_synonym_expansion_matches_either_direction() {
        let store = InMemoryStore::new();
        store.add_keyword_entry(KeywordEntry {
            english_keyword: "wages".to_string(),
            hindi_keyword: "मजदूरी".to_string(),
            english_synonyms: vec!["salary".to_string(), "pay".to_string()],
            hindi_synonyms: vec![],
        });

        let tokens = vec!["salary".to_string()];
        let expanded = store.synonyms(&tokens, Language::En).await.unwrap();
        assert!(expanded.contains(&"wages".to_string()));
        assert!(expanded.contains(&"pay".to_string()));

        let tokens = vec!["unrelated".to_string()];
        let expanded = store.synonyms(&tokens, Language::En).await.unwrap();
        assert!(expanded.is_empty());
    }
}
