use crate::config::Config;
use crate::remote::{RemoteError, RemoteTranslator};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gemini `generateContent` request
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Build the instruction sent for one translation
pub fn build_translation_prompt(text: &str, language_name: &str) -> String {
    format!(
        "Translate this text to {}. Provide ONLY the translated text with no additional commentary, explanations or formatting: \"{}\"",
        language_name, text
    )
}

/// Remote translator backed by Google's Gemini API
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            api_url: api_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl RemoteTranslator for GeminiClient {
    async fn call(&self, prompt: &str) -> Result<String, RemoteError> {
        let api_key = self.api_key.as_deref().ok_or(RemoteError::NotConfigured)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(RemoteError::RateLimited(body));
            }
            return Err(RemoteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            RemoteError::MalformedResponse(format!("failed to parse Gemini response: {}", e))
        })?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .unwrap_or_default();

        debug!(chars = text.len(), "Gemini response received");
        Ok(text)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
