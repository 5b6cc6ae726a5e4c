use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use super::TextGenerator;
use crate::common::config::ProviderConfig;
use crate::common::error::ProviderError;

/// `generateContent` client for Gemini models.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    config: ProviderConfig,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("provider.api_key is not set".to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key,
            config: config.clone(),
        })
    }

    fn payload(&self, prompt: &str) -> Value {
        serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": prompt}]
                }
            ],
            "generationConfig": {
                "temperature": self.config.temperature,
                "topP": self.config.top_p,
                "topK": self.config.top_k,
                "maxOutputTokens": self.config.max_output_tokens
            }
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .http
            .post(endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.payload(prompt))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(ProviderError::Auth),
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::InvalidResponse(format!(
                    "status {status} body {body}"
                )));
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;
        candidate_text(&body)
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(body: &Value) -> Result<String, ProviderError> {
    let parts = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::InvalidResponse("missing text candidate".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        return Err(ProviderError::InvalidResponse("empty text candidate".to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_text_joins_parts() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}}]
        });
        assert_eq!(candidate_text(&body).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_candidate_text_missing() {
        let err = candidate_text(&json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));

        let empty = json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]});
        assert!(candidate_text(&empty).is_err());
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = ProviderConfig::default();
        assert!(matches!(
            GeminiClient::new(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_payload_carries_generation_config() {
        let config = ProviderConfig {
            api_key: Some("key".to_string()),
            ..ProviderConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        let payload = client.payload("hello");
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(payload["generationConfig"]["topK"], 40);
        assert_eq!(payload["generationConfig"]["maxOutputTokens"], 1024);
    }
}
