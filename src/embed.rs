use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::error::RetrievalError;
use crate::models::Language;

/// Maximum characters to send per text to the embedding API.
/// Multilingual MiniLM-class models truncate around 512 tokens anyway,
/// and Devanagari content tokenises densely; 3 000 chars keeps every
/// request safely inside the context window of both configured models.
const MAX_EMBED_CHARS: usize = 3_000;

/// Truncate `text` to at most `MAX_EMBED_CHARS`, splitting on a UTF-8
/// char boundary. Devanagari code points are 3 bytes, so the boundary
/// walk matters for Hindi content.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// The embedding model collaborator: one fixed-length vector per text,
/// language-routed to the matching model.
///
/// Implementations must be safe for concurrent read-only inference and
/// must fail with [`RetrievalError::ModelUnavailable`] when the backing
/// model has not been initialized — never with a silent empty vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str, language: Language) -> Result<Vec<f32>, RetrievalError>;
}

/// Embedding provider backed by an HTTP inference server
/// (Ollama or any OpenAI-compatible API).
pub struct HttpEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RetrievalError::Embedding(format!("failed to build client: {e}")))?;
        Ok(Self { client, config })
    }

    fn model_for(&self, language: Language) -> &str {
        match language {
            Language::En => &self.config.model_en,
            Language::Hi => &self.config.model_hi,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str, language: Language) -> Result<Vec<f32>, RetrievalError> {
        if self.config.base_url.trim().is_empty() {
            return Err(RetrievalError::ModelUnavailable);
        }

        let model = self.model_for(language);
        if model.trim().is_empty() {
            return Err(RetrievalError::ModelUnavailable);
        }

        let input = truncate_for_embedding(text);
        let embedding = match self.config.provider.as_str() {
            "ollama" => embed_ollama(&self.client, &self.config, model, input).await?,
            "openai" => embed_openai(&self.client, &self.config, model, input).await?,
            other => {
                return Err(RetrievalError::Embedding(format!(
                    "unknown embedding provider: {other}"
                )))
            }
        };

        check_dimension(embedding, self.config.embedding_dim)
    }
}

/// Reject empty vectors and, when a dimension is configured, vectors of
/// the wrong length. A mismatch means the configured model does not
/// produce vectors comparable with the stored corpus embeddings.
fn check_dimension(embedding: Vec<f32>, expected: usize) -> Result<Vec<f32>, RetrievalError> {
    if embedding.is_empty() {
        return Err(RetrievalError::Embedding(
            "backend returned an empty vector".to_string(),
        ));
    }
    if expected != 0 && embedding.len() != expected {
        return Err(RetrievalError::Embedding(format!(
            "backend returned {} dimensions, expected {expected}",
            embedding.len()
        )));
    }
    Ok(embedding)
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    /// Ask Ollama to silently truncate inputs that exceed the model's
    /// context length instead of returning a 400 error.
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

async fn embed_ollama(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    model: &str,
    text: &str,
) -> Result<Vec<f32>, RetrievalError> {
    let url = format!("{}/api/embed", config.base_url);
    let req = OllamaEmbedRequest {
        model,
        input: vec![text],
        truncate: true,
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .map_err(connection_error)?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(RetrievalError::Embedding(format!(
            "Ollama embed API returned {status}: {body}"
        )));
    }

    let body: OllamaEmbedResponse = resp
        .json()
        .await
        .map_err(|e| RetrievalError::Embedding(format!("bad Ollama embed response: {e}")))?;

    body.embeddings
        .into_iter()
        .next()
        .ok_or_else(|| RetrievalError::Embedding("no embedding returned".to_string()))
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

async fn embed_openai(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    model: &str,
    text: &str,
) -> Result<Vec<f32>, RetrievalError> {
    let url = format!("{}/v1/embeddings", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiEmbedRequest {
        model,
        input: vec![text],
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .map_err(connection_error)?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(RetrievalError::Embedding(format!(
            "OpenAI embed API returned {status}: {body}"
        )));
    }

    let body: OpenAiEmbedResponse = resp
        .json()
        .await
        .map_err(|e| RetrievalError::Embedding(format!("bad OpenAI embed response: {e}")))?;

    body.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| RetrievalError::Embedding("no embedding returned".to_string()))
}

/// An unreachable backend means the model was never initialized for this
/// process; surface that as the fatal variant rather than a generic
/// backend error.
fn connection_error(e: reqwest::Error) -> RetrievalError {
    if e.is_connect() || e.is_timeout() {
        RetrievalError::ModelUnavailable
    } else {
        RetrievalError::Embedding(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_for_embedding("minimum wage"), "minimum wage");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // Devanagari chars are 3 bytes; force the limit to land mid-char.
        let text = "म".repeat(MAX_EMBED_CHARS); // 3 * MAX bytes
        let truncated = truncate_for_embedding(&text);
        assert!(truncated.len() <= MAX_EMBED_CHARS);
        assert!(truncated.is_char_boundary(truncated.len()));
        assert!(!truncated.is_empty());
    }

    #[test]
    fn test_check_dimension_rejects_empty_and_mismatched_vectors() {
        assert!(matches!(
            check_dimension(Vec::new(), 3),
            Err(RetrievalError::Embedding(_))
        ));
        assert!(matches!(
            check_dimension(vec![1.0, 2.0], 3),
            Err(RetrievalError::Embedding(_))
        ));
        assert_eq!(check_dimension(vec![1.0, 2.0, 3.0], 3).unwrap().len(), 3);
        // Dimension 0 disables the check.
        assert_eq!(check_dimension(vec![1.0, 2.0], 0).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unconfigured_backend_is_model_unavailable() {
        let config = EmbeddingConfig {
            base_url: String::new(),
            ..EmbeddingConfig::default()
        };
        let embedder = HttpEmbedder::new(config).unwrap();
        let err = embedder.embed("wages", Language::En).await.unwrap_err();
        assert!(matches!(err, RetrievalError::ModelUnavailable));
    }
}
