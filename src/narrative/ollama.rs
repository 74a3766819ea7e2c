//! Ollama-style chat endpoint client.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::NarrativeConfig;
use crate::error::NarrativeError;

use super::NarrativeService;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// `NarrativeService` implementation speaking the Ollama chat API
/// (`POST {base}/api/chat`, non-streaming).
pub struct OllamaService {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OllamaService {
    pub fn new(config: &NarrativeConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl NarrativeService for OllamaService {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatTurn {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let mut builder = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(NarrativeError::RequestFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;
        Ok(body.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let config = NarrativeConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..NarrativeConfig::default()
        };
        let service = OllamaService::new(&config);
        assert_eq!(service.base_url, "http://localhost:11434");
    }

    #[test]
    fn chat_request_serializes_as_wire_format() {
        let request = ChatRequest {
            model: "llama3.2:1b",
            messages: vec![ChatTurn {
                role: "user",
                content: "hello",
            }],
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2:1b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
