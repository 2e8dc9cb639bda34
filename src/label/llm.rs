//! Remote LLM labeling over a chat-completions endpoint.
//!
//! Clusters are named one request at a time; any transport or API failure
//! aborts the run rather than silently falling back to term labels, so a
//! half-LLM half-term mapping never reaches disk.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::LlmConfig;
use crate::core::errors::{Result, SkaldError};

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// A single chat message.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Message content within a completion choice.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client that names clusters via a remote chat-completions API.
#[derive(Debug)]
pub struct LlmLabeler {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmLabeler {
    /// Build a labeler, reading the API key from the configured environment
    /// variable.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            SkaldError::config_field(
                format!("environment variable {} is not set", config.api_key_env),
                "labeling.llm.api_key_env",
            )
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            api_key,
        })
    }

    /// Name every cluster from its top terms, one request per cluster.
    pub async fn label_clusters(&self, top_terms: &[Vec<String>]) -> Result<Vec<String>> {
        let mut labels = Vec::with_capacity(top_terms.len());
        for (idx, terms) in top_terms.iter().enumerate() {
            let label = self.label_one(idx, terms).await?;
            info!("cluster {idx} labeled as '{label}'");
            labels.push(label);
        }
        Ok(labels)
    }

    async fn label_one(&self, cluster: usize, terms: &[String]) -> Result<String> {
        let shown: Vec<&str> = terms
            .iter()
            .take(self.config.top_terms)
            .map(String::as_str)
            .collect();

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "You name topic clusters from speech transcripts. \
                              Reply with a short lowercase label of one to three \
                              words and nothing else."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "The most representative terms of this cluster are: {}",
                        shown.join(", ")
                    ),
                },
            ],
            temperature: 0.2,
        };

        debug!("requesting label for cluster {cluster} with {} terms", shown.len());

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SkaldError::external_with_source("sending labeling request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SkaldError::external(format!(
                "labeling API returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SkaldError::external_with_source("parsing labeling response", e))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        let label = content.trim().trim_matches(['"', '\'']).to_string();
        if label.is_empty() {
            return Err(SkaldError::external(format!(
                "labeling API returned an empty label for cluster {cluster}"
            )));
        }
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_chat_shape() {
        let request = ChatRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "terms: pasta, sauce".to_string(),
            }],
            temperature: 0.2,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn response_deserializes_choice_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"cooking"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "cooking");
    }
}
