//! Language-model boundary: (query, context) in, free-text answer out.

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::errors::AppError;

/// System role for document Q&A completions.
pub const QA_SYSTEM_PROMPT: &str = "You are a document Q&A assistant.";

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError>;
}

/// Build the grounding prompt for retrieval-augmented answers. The
/// "answer not found" constraint is an instruction to the model, not a
/// programmatic guarantee; the model may still hallucinate.
pub fn build_rag_prompt(query: &str, context: &str) -> String {
    format!(
        r#"You are a helpful AI assistant.
Answer the user's question ONLY from the provided context.
If the answer is not in context, say: "Answer not found in uploaded documents."

Context:
{context}

Question:
{query}

Give a clear, short, and accurate answer."#
    )
}

/// OpenAI-compatible `/v1/chat/completions` client.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiChatModel {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.config.temperature,
        });

        let res = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::LlmProvider(format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::LlmProvider(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AppError::LlmProvider(format!("parse error: {}", e)))?;

        let answer = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AppError::LlmProvider("invalid response format".to_string()))?;

        Ok(answer.trim().to_string())
    }
}

/// Canned chat model for local development and tests. Records nothing,
/// returns a fixed answer.
#[derive(Default)]
pub struct MockChatModel {
    pub answer: Option<String>,
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AppError> {
        Ok(self
            .answer
            .clone()
            .unwrap_or_else(|| "mock answer".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rag_prompt_embeds_context_and_query() {
        let prompt = build_rag_prompt("What is the refund policy?", "Refunds within 30 days.");
        assert!(prompt.contains("Refunds within 30 days."));
        assert!(prompt.contains("What is the refund policy?"));
        assert!(prompt.contains("Answer not found in uploaded documents."));
    }
}
