//! Embedding provider boundary.
//!
//! Everything downstream depends only on the "text in, fixed-dimension
//! vector out" contract, so the concrete provider (remote API or the mock)
//! is swappable behind `Arc<dyn Embedder>`.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::config::EmbeddingsConfig;
use crate::errors::AppError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single query string. Empty input returns an empty vector
    /// without a provider call.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, AppError>;

    /// Embed a batch of document chunks, one vector per input, same order.
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError>;

    /// Output dimensionality of this provider.
    fn dimension(&self) -> usize;
}

/// OpenAI-compatible `/v1/embeddings` client.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    config: EmbeddingsConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, AppError> {
        if text.is_empty() {
            return Ok(vec![]);
        }

        let payload = serde_json::json!({
            "input": text,
            "model": self.config.model,
        });

        let res = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::EmbeddingProvider(format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::EmbeddingProvider(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::EmbeddingProvider(format!("parse error: {}", e)))?;

        let embedding: Vec<f32> = body["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| {
                AppError::EmbeddingProvider("invalid response format".to_string())
            })?
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect();

        if embedding.len() != self.config.dimension {
            return Err(AppError::EmbeddingProvider(format!(
                "expected {} dimensions, got {}",
                self.config.dimension,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        // One call per chunk. The first failure aborts the batch, which the
        // ingestion service turns into an all-or-nothing outcome.
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_query(&text).await?);
        }
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

/// Deterministic offline embedder for local development and tests. The
/// vector is derived from a SHA-256 of the input so identical text always
/// maps to the identical vector.
pub struct MockEmbedder {
    dim: usize,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn hash_vector(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        (0..self.dim)
            .map(|i| {
                let byte = digest[i % digest.len()];
                // Spread bytes into [-1, 1), perturbed by position so the
                // vector is not periodic in the hash length.
                (byte as f32 - 128.0) / 128.0 + (i as f32 * 1e-4)
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, AppError> {
        if text.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.hash_vector(text))
    }

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        texts
            .iter()
            .map(|t| {
                if t.is_empty() {
                    Ok(vec![])
                } else {
                    Ok(self.hash_vector(t))
                }
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embedder_has_fixed_dimension() {
        let embedder = MockEmbedder::new(1536);
        let v = embedder.embed_query("hello world").await.unwrap();
        assert_eq!(v.len(), 1536);
    }

    #[tokio::test]
    async fn mock_embedder_is_deterministic() {
        let embedder = MockEmbedder::new(64);
        let a = embedder.embed_query("same text").await.unwrap();
        let b = embedder.embed_query("same text").await.unwrap();
        assert_eq!(a, b);

        let c = embedder.embed_query("different text").await.unwrap();
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn empty_input_embeds_to_nothing() {
        let embedder = MockEmbedder::new(64);
        let v = embedder.embed_query("").await.unwrap();
        assert!(v.is_empty());
    }

    #[tokio::test]
    async fn batch_embedding_preserves_order_and_count() {
        let embedder = MockEmbedder::new(32);
        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let vectors = embedder.embed_documents(texts.clone()).await.unwrap();
        assert_eq!(vectors.len(), 3);

        for (text, vector) in texts.iter().zip(&vectors) {
            assert_eq!(vector, &embedder.embed_query(text).await.unwrap());
        }
    }
}
