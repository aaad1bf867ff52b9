//! OpenRouter adapter (chat completions).
//!
//! Implements the `corrector-core` CompletionPort over the OpenRouter
//! `chat/completions` HTTP endpoint.

use async_trait::async_trait;

use corrector_core::{
    completion::{port::CompletionPort, types::CompletionRequest},
    config::Config,
    errors::Error,
    Result,
};

#[derive(Clone, Debug)]
pub struct OpenRouterClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    http_referer: Option<String>,
    x_title: String,
    temperature: f32,
    max_tokens: u32,
    http: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(cfg: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(cfg.completion_timeout)
            .build()
            .expect("reqwest client build");

        Self {
            api_key: cfg.openrouter_api_key.clone(),
            base_url: cfg.openrouter_base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            http_referer: cfg.http_referer.clone(),
            x_title: cfg.x_title.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_completion_tokens,
            http,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionPort for OpenRouterClient {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            return Err(Error::ServiceUnavailable);
        };

        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": req.system },
                { "role": "user", "content": req.user },
            ],
        });

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .header("X-Title", &self.x_title)
            .json(&body);
        if let Some(referer) = &self.http_referer {
            request = request.header("HTTP-Referer", referer);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::Completion(format!("openrouter request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Completion(format!(
                "openrouter completion failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::Completion(format!("openrouter json error: {e}")))?;

        let text = extract_content(&v)?;
        tracing::debug!(
            chars = text.len(),
            "openrouter completion received"
        );
        Ok(text)
    }
}

/// Pull the completion text out of a chat-completions response body.
fn extract_content(v: &serde_json::Value) -> Result<String> {
    // Providers surface their own failures as an `error` object with 200s
    // often enough that it is worth checking before the happy path.
    if let Some(message) = v
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(Error::Completion(format!("provider error: {message}")));
    }

    let text = v
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| Error::Completion("malformed completion response".to_string()))?
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(Error::Completion(
            "completion returned empty text".to_string(),
        ));
    }

    Ok(text)
}
