// SPDX-FileCopyrightText: 2026 Duckie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama-compatible HTTP model backend.
//!
//! Uses the blocking reqwest client: every call happens on the inference
//! worker thread, never on the async runtime.

use std::time::Duration;

use duckie_core::{ChatMessage, DuckieError, LanguageModel, ModelLoader, SamplingParams};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ─── Request Structures ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ShowRequest<'a> {
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    num_predict: u32,
}

impl From<&SamplingParams> for Options {
    fn from(params: &SamplingParams) -> Self {
        Self {
            // Greedy decoding when sampling is off.
            temperature: if params.do_sample { params.temperature } else { 0.0 },
            top_p: params.top_p,
            repeat_penalty: params.repetition_penalty,
            num_predict: params.max_new_tokens,
        }
    }
}

// ─── Response Structures ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

// ─── Implementation ───────────────────────────────────────────────────────────

/// Connects to a model server and checks the model is available.
#[derive(Debug, Clone)]
pub struct OllamaLoader {
    base_url: String,
    model: String,
    request_timeout: Duration,
}

impl OllamaLoader {
    pub fn new(base_url: &str, model: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            request_timeout,
        }
    }

    pub fn from_config(config: &duckie_config::model::InferenceConfig) -> Self {
        Self::new(
            &config.endpoint,
            config.model_name.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ModelLoader for OllamaLoader {
    fn load(&self) -> Result<Box<dyn LanguageModel>, DuckieError> {
        info!(endpoint = %self.base_url, model = %self.model, "loading model");

        let client = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| model_error("failed to build HTTP client", e))?;

        let url = format!("{}/api/show", self.base_url);
        let response = client
            .post(&url)
            .json(&ShowRequest { model: &self.model })
            .send()
            .map_err(|e| model_error("model server unreachable", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DuckieError::model(format!(
                "model {} unavailable: HTTP {status}",
                self.model
            )));
        }

        Ok(Box::new(OllamaModel {
            client,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }))
    }
}

/// A loaded model on an Ollama-compatible server.
pub struct OllamaModel {
    client: Client,
    base_url: String,
    model: String,
}

impl LanguageModel for OllamaModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn generate(
        &mut self,
        messages: &[ChatMessage],
        params: &SamplingParams,
    ) -> Result<String, DuckieError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: params.into(),
        };
        let url = format!("{}/api/chat", self.base_url);
        debug!(url = %url, messages = messages.len(), "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| model_error("chat request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DuckieError::model(format!(
                "chat request rejected: HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .map_err(|e| model_error("invalid chat response", e))?;
        Ok(chat.message.content)
    }
}

fn model_error(message: &str, source: reqwest::Error) -> DuckieError {
    DuckieError::Model {
        message: format!("{message}: {source}"),
        source: Some(Box::new(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let loader = OllamaLoader::new("http://gpu:11434/", "m", Duration::from_secs(1));
        assert_eq!(loader.base_url(), "http://gpu:11434");
    }

    #[test]
    fn options_map_sampling_params() {
        let options = Options::from(&SamplingParams::default());
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["num_predict"], 150);
        assert!((json["repeat_penalty"].as_f64().unwrap() - 1.2).abs() < 1e-6);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn sampling_off_means_zero_temperature() {
        let params = SamplingParams {
            do_sample: false,
            ..Default::default()
        };
        assert_eq!(Options::from(&params).temperature, 0.0);
    }

    #[test]
    fn chat_request_serializes_roles() {
        let messages = vec![ChatMessage::system("S"), ChatMessage::user("U")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            stream: false,
            options: (&SamplingParams::default()).into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "U");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn response_with_missing_content_defaults_to_empty() {
        let json = r#"{"message":{"role":"assistant"}}"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(resp.message.content.is_empty());
    }
}
