use serde::{Deserialize, Serialize};

/// Query/content language supported by the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// The other supported language, used for content fallback.
    pub fn other(&self) -> Language {
        match self {
            Language::En => Language::Hi,
            Language::Hi => Language::En,
        }
    }
}

/// A unit of retrievable legal/FAQ text with optional bilingual content
/// and embeddings.
///
/// Chunks are owned by the document store; the engine only reads them and
/// may patch back a missing embedding field (lazy backfill). At least one
/// of `content_en`/`content_hi` must be non-empty for a chunk with no
/// embeddings to be scorable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(default)]
    pub id: String,
    /// Origin collection, tagged by the corpus fetcher.
    #[serde(default)]
    pub source_collection: String,
    #[serde(default)]
    pub content_en: Option<String>,
    #[serde(default)]
    pub content_hi: Option<String>,
    #[serde(default)]
    pub embedding_en: Option<Vec<f32>>,
    #[serde(default)]
    pub embedding_hi: Option<Vec<f32>>,
    /// Human-readable label of the act/notification the chunk came from.
    #[serde(default)]
    pub source_label: String,
    /// Optional topic heading used by the context formatter.
    #[serde(default)]
    pub topic: Option<String>,
    /// Generic content field present in older ingests that predate the
    /// bilingual schema.
    #[serde(default)]
    pub text: Option<String>,
    /// Chunk-level citation link; overrides the collection-level link
    /// table when present.
    #[serde(default)]
    pub reference_link: Option<String>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

impl Chunk {
    /// Content in the given language, if non-empty.
    pub fn content_for(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => non_empty(&self.content_en),
            Language::Hi => non_empty(&self.content_hi),
        }
    }

    /// Stored embedding for the given language.
    pub fn embedding_for(&self, language: Language) -> Option<&[f32]> {
        match language {
            Language::En => self.embedding_en.as_deref(),
            Language::Hi => self.embedding_hi.as_deref(),
        }
    }

    pub fn set_embedding(&mut self, language: Language, embedding: Vec<f32>) {
        match language {
            Language::En => self.embedding_en = Some(embedding),
            Language::Hi => self.embedding_hi = Some(embedding),
        }
    }

    /// Text used to compute a missing embedding: preferred-language
    /// content, then the other language, then the source label.
    pub fn embeddable_text(&self, language: Language) -> Option<&str> {
        self.content_for(language)
            .or_else(|| self.content_for(language.other()))
            .or_else(|| {
                let label = self.source_label.trim();
                (!label.is_empty()).then_some(label)
            })
    }

    /// All searchable text of the chunk, lowercased, for phrase matching.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(en) = non_empty(&self.content_en) {
            parts.push(en);
        }
        if let Some(hi) = non_empty(&self.content_hi) {
            parts.push(hi);
        }
        if let Some(t) = non_empty(&self.text) {
            parts.push(t);
        }
        if !self.source_label.trim().is_empty() {
            parts.push(self.source_label.trim());
        }
        parts.join(" ").to_lowercase()
    }
}

/// A user query plus an optional caller-supplied language override.
#[derive(Debug, Clone, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default)]
    pub language_hint: Option<Language>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language_hint: None,
        }
    }
}

/// A chunk with its per-request scores. Transient; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub chunk: Chunk,
    /// Cosine similarity between query and chunk embeddings.
    pub semantic_score: f32,
    /// Token-overlap relevance of the chunk's origin collection.
    pub collection_relevance: f32,
    /// Boost added by a matched filter stage (0.0 when none matched).
    pub boost: f32,
    pub combined_score: f32,
}
