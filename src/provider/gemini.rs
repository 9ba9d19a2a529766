//! Gemini generateContent client.
//!
//! One POST per model per batch; responses are plain text assembled from the
//! first candidate's parts.  API errors are surfaced with the server's own
//! message so availability wording ("model not found", "not available")
//! reaches the dispatcher's placeholder classification intact.

use anyhow::{anyhow, bail, Context as _, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::TextModel;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    /// Fully qualified name, e.g. `models/gemini-2.5-pro`.
    #[serde(default)]
    name: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// List model identifiers the API key can reach (`models/` prefix stripped).
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/v1beta/models?key={}", self.base_url, self.api_key);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("model list request failed")?;
        let status = resp.status();
        let body = resp.text().await.context("model list body unreadable")?;
        if !status.is_success() {
            bail!("model list failed ({status}): {}", api_error_message(&body));
        }
        let list: ModelList = serde_json::from_str(&body).context("model list malformed")?;
        Ok(list
            .models
            .into_iter()
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect())
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(
        &self,
        model_id: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model_id, self.api_key
        );
        let body = json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": [{ "role": "user", "parts": [{ "text": user_prompt }] }],
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {model_id} failed"))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .with_context(|| format!("response from {model_id} unreadable"))?;
        if !status.is_success() {
            return Err(anyhow!(
                "{model_id} returned {status}: {}",
                api_error_message(&text)
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).with_context(|| format!("{model_id} reply malformed"))?;
        let reply: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();
        if reply.is_empty() {
            bail!("{model_id} returned no candidates");
        }
        debug!(model = model_id, chars = reply.len(), "reply received");
        Ok(reply)
    }
}

/// Pull the server's error message out of an error body, falling back to the
/// raw body when it is not the documented envelope.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect())
}
