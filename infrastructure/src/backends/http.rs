//! OpenAI-compatible completion client.
//!
//! Posts to `{url}/v1/completions` and returns the first choice's text.
//! Errors map onto [`BackendError`] so the router and the finalization
//! dispatcher can fall back without knowing about HTTP.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use steward_application::ports::generation::{BackendError, GenerationBackend, GenerationRequest};
use tracing::debug;

/// HTTP completion backend
#[derive(Clone)]
pub struct HttpCompletionBackend {
    name: String,
    endpoint: String,
    model: Option<String>,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpCompletionBackend {
    pub fn new(name: impl Into<String>, base_url: &str) -> Self {
        Self {
            name: name.into(),
            endpoint: completions_endpoint(base_url),
            model: None,
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "prompt": request.prompt,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if let Some(model) = &self.model {
            body["model"] = json!(model);
        }
        if !request.stop.is_empty() {
            body["stop"] = json!(request.stop);
        }
        body
    }
}

fn completions_endpoint(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/v1/completions") {
        base.to_string()
    } else if base.ends_with("/v1") {
        format!("{}/completions", base)
    } else {
        format!("{}/v1/completions", base)
    }
}

/// Server errors and throttling may clear up; client errors will not.
fn status_error(status: u16, body: &str) -> BackendError {
    let detail = format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>());
    if status >= 500 || status == 429 {
        BackendError::Unavailable(detail)
    } else {
        BackendError::RequestFailed(detail)
    }
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

fn first_text(response: CompletionResponse) -> Result<String, BackendError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(BackendError::EmptyResponse)
}

#[async_trait]
impl GenerationBackend for HttpCompletionBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: GenerationRequest) -> Result<String, BackendError> {
        let mut builder = self.client.post(&self.endpoint).json(&self.body(&request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::RequestFailed(format!("invalid response body: {}", e)))?;
        let text = first_text(parsed)?;
        debug!("{} returned {} chars", self.name, text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        assert_eq!(completions_endpoint("http://localhost:8080"), "http://localhost:8080/v1/completions");
        assert_eq!(completions_endpoint("http://localhost:8080/"), "http://localhost:8080/v1/completions");
        assert_eq!(completions_endpoint("https://api.x.io/v1"), "https://api.x.io/v1/completions");
        assert_eq!(
            completions_endpoint("https://api.x.io/v1/completions"),
            "https://api.x.io/v1/completions"
        );
    }

    #[test]
    fn test_body_carries_request_fields() {
        let backend = HttpCompletionBackend::new("fast", "http://localhost").with_model("small");
        let request = GenerationRequest::new("route this")
            .with_max_tokens(64)
            .with_stop("\n\n");

        let body = backend.body(&request);
        assert_eq!(body["prompt"], "route this");
        assert_eq!(body["model"], "small");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["stop"], json!(["\n\n"]));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(503, "busy"), BackendError::Unavailable(_)));
        assert!(matches!(status_error(429, ""), BackendError::Unavailable(_)));
        assert!(matches!(status_error(400, "bad"), BackendError::RequestFailed(_)));
    }

    #[test]
    fn test_first_text() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"choices":[{"text":"hi"}]}"#).unwrap();
        assert_eq!(first_text(parsed).unwrap(), "hi");

        let empty: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(first_text(empty), Err(BackendError::EmptyResponse));
    }
}
