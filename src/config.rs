use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Scoring weights and boost constants
    pub ranking: RankingConfig,
    /// Embedding backend configuration
    pub embedding: EmbeddingConfig,
    /// Default number of chunks returned when the caller does not ask
    /// for a specific top-k
    pub default_top_k: usize,
    /// Optional path for the in-memory store's JSON corpus snapshot
    pub corpus_path: Option<PathBuf>,
}

/// Weights for blending semantic similarity with collection relevance,
/// plus the boost added by a matched filter stage.
///
/// The defaults (0.7/0.3, +1.0) are tuning values inherited from the
/// deployed system; they are configuration, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub semantic_weight: f32,
    pub collection_weight: f32,
    /// Added on top of the base score when a boost stage matches, sized
    /// so matched candidates always float above unboosted ones.
    pub boost_bonus: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            collection_weight: 0.3,
            boost_bonus: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the embedding API. Empty means the model is not
    /// initialized and every embed call fails with `ModelUnavailable`.
    pub base_url: String,
    /// Model used for English queries and content
    pub model_en: String,
    /// Model used for Hindi queries and content
    pub model_hi: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub embedding_dim: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model_en: "nomic-embed-text".to_string(),
            model_hi: "paraphrase-multilingual".to_string(),
            api_key: None,
            embedding_dim: 768,
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ranking: RankingConfig::default(),
            embedding: EmbeddingConfig::default(),
            default_top_k: 3,
            corpus_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SAATHI_SEMANTIC_WEIGHT") {
            if let Ok(v) = val.parse() {
                config.ranking.semantic_weight = v;
            }
        }
        if let Ok(val) = std::env::var("SAATHI_COLLECTION_WEIGHT") {
            if let Ok(v) = val.parse() {
                config.ranking.collection_weight = v;
            }
        }
        if let Ok(val) = std::env::var("SAATHI_BOOST_BONUS") {
            if let Ok(v) = val.parse() {
                config.ranking.boost_bonus = v;
            }
        }
        if let Ok(val) = std::env::var("SAATHI_TOP_K") {
            if let Ok(v) = val.parse() {
                config.default_top_k = v;
            }
        }
        if let Ok(path) = std::env::var("SAATHI_CORPUS_PATH") {
            config.corpus_path = Some(PathBuf::from(path));
        }

        if let Ok(provider) = std::env::var("EMBED_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(url) = std::env::var("EMBED_BASE_URL") {
            config.embedding.base_url = url;
        }
        if let Ok(model) = std::env::var("EMBED_MODEL_EN") {
            config.embedding.model_en = model;
        }
        if let Ok(model) = std::env::var("EMBED_MODEL_HI") {
            config.embedding.model_hi = model;
        }
        if let Ok(key) = std::env::var("EMBED_API_KEY") {
            config.embedding.api_key = Some(key);
        }
        if let Ok(val) = std::env::var("EMBED_DIM") {
            if let Ok(v) = val.parse() {
                config.embedding.embedding_dim = v;
            }
        }
        if let Ok(val) = std::env::var("EMBED_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.embedding.timeout_secs = v;
            }
        }

        config
    }
}
