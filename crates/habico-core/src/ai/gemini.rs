//! Gemini REST client.
//!
//! Uses `models/{model}:generateContent` for one-shot requests and
//! `models/{model}:streamGenerateContent?alt=sse` for chat. List-shaped
//! replies are constrained with a JSON response schema.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::traits::AiService;
use crate::chat::{ChatMessage, ChatUpdate, GroundingSource};
use crate::error::AiError;
use crate::storage::keyring_store;
use crate::storage::AiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| {
                        let web = chunk.web.as_ref()?;
                        Some(GroundingSource {
                            uri: web.uri.clone().filter(|u| !u.is_empty())?,
                            title: web.title.clone().filter(|t| !t.is_empty())?,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct SuggestionList {
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Client for the Gemini `generativelanguage` API.
pub struct GeminiClient {
    http_client: Client,
    base_url: Url,
    model: String,
    api_key: String,
    search_grounding: bool,
}

impl GeminiClient {
    /// Build a client with an explicit key.
    pub fn new(config: &AiConfig, api_key: impl Into<String>) -> Result<Self, AiError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http_client,
            base_url: Url::parse(&base)?,
            model: config.model.clone(),
            api_key: api_key.into(),
            search_grounding: config.search_grounding,
        })
    }

    /// Build a client with the key from the environment or the OS keyring.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = keyring_store::resolve_api_key()?;
        Self::new(config, api_key)
    }

    fn endpoint(&self, method: &str) -> Result<Url, AiError> {
        Ok(self
            .base_url
            .join(&format!("models/{}:{method}", self.model))?)
    }

    async fn post(&self, url: Url, body: &Value) -> Result<reqwest::Response, AiError> {
        debug!(model = %self.model, url = %url.path(), "gemini request");
        let resp = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(AiError::Status { status, body })
        }
    }

    async fn generate(&self, body: Value) -> Result<GenerateResponse, AiError> {
        let url = self.endpoint("generateContent")?;
        let resp = self.post(url, &body).await?;
        resp.json::<GenerateResponse>()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))
    }
}

fn text_contents(prompt: &str) -> Value {
    json!([{ "role": "user", "parts": [{ "text": prompt }] }])
}

fn history_contents(history: &[ChatMessage]) -> Value {
    Value::Array(
        history
            .iter()
            .map(|msg| json!({ "role": msg.role.as_str(), "parts": [{ "text": msg.text }] }))
            .collect(),
    )
}

fn suggestion_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestions": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        }
    })
}

/// Splits an SSE byte stream into `data:` payloads.
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(payload) = Self::payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        Self::payload(&rest)
    }

    fn payload(line: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(line);
        let data = line.trim_end_matches(['\r', '\n']).strip_prefix("data:")?;
        let data = data.trim_start();
        (!data.is_empty() && data != "[DONE]").then(|| data.to_string())
    }
}

#[async_trait]
impl AiService for GeminiClient {
    async fn stream_chat(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
        on_update: &mut (dyn FnMut(ChatUpdate) + Send),
    ) -> Result<(), AiError> {
        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": system_instruction }] },
            "contents": history_contents(history),
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } },
        });
        if self.search_grounding {
            body["tools"] = json!([{ "google_search": {} }]);
        }

        let mut url = self.endpoint("streamGenerateContent")?;
        url.query_pairs_mut().append_pair("alt", "sse");
        let mut resp = self.post(url, &body).await?;

        let mut buffer = SseBuffer::default();
        let mut sources_sent = false;
        let mut handle = |payload: String| -> Result<(), AiError> {
            let chunk: GenerateResponse =
                serde_json::from_str(&payload).map_err(|e| AiError::Malformed(e.to_string()))?;
            let text = chunk.text();
            if !text.is_empty() {
                on_update(ChatUpdate::text(text));
            }
            if !sources_sent {
                let sources = chunk.sources();
                if !sources.is_empty() {
                    on_update(ChatUpdate::sources(sources));
                    sources_sent = true;
                }
            }
            Ok(())
        };

        while let Some(bytes) = resp.chunk().await? {
            for payload in buffer.push(&bytes) {
                handle(payload)?;
            }
        }
        if let Some(payload) = buffer.finish() {
            handle(payload)?;
        }
        Ok(())
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, AiError> {
        let resp = self
            .generate(json!({ "contents": text_contents(prompt) }))
            .await?;
        let text = resp.text();
        if text.trim().is_empty() {
            return Err(AiError::Malformed("empty response text".into()));
        }
        Ok(text)
    }

    async fn generate_list(&self, prompt: &str) -> Result<Vec<String>, AiError> {
        let resp = self
            .generate(json!({
                "contents": text_contents(prompt),
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": suggestion_schema(),
                },
            }))
            .await?;
        let list: SuggestionList = serde_json::from_str(resp.text().trim())
            .map_err(|e| AiError::Malformed(e.to_string()))?;
        Ok(list.suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;
    use mockito::Matcher;

    fn client(base_url: &str) -> GeminiClient {
        let config = AiConfig {
            base_url: base_url.to_string(),
            ..AiConfig::default()
        };
        GeminiClient::new(&config, "test-key").unwrap()
    }

    fn text_body(text: &str) -> String {
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
            .to_string()
    }

    #[test]
    fn sse_buffer_handles_split_lines() {
        let mut buffer = SseBuffer::default();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        assert_eq!(buffer.push(b":1}\r\n\r\ndata: {}\n"), vec!["{\"a\":1}", "{}"]);
        assert!(buffer.push(b": keep-alive\n").is_empty());
        buffer.push(b"data: tail");
        assert_eq!(buffer.finish().as_deref(), Some("tail"));
    }

    #[tokio::test]
    async fn generate_text_returns_joined_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header(API_KEY_HEADER, "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(text_body("Evenings are heavy."))
            .create_async()
            .await;

        let text = client(&server.url()).generate_text("hello").await.unwrap();
        assert_eq!(text, "Evenings are heavy.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(429)
            .with_body("quota")
            .create_async()
            .await;

        let err = client(&server.url()).generate_text("hi").await.unwrap_err();
        assert!(matches!(err, AiError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn generate_list_parses_schema_reply() {
        let mut server = mockito::Server::new_async().await;
        let reply = json!({ "suggestions": ["Hide the charger.", "Leave it in the car."] });
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_body(Matcher::PartialJson(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .with_status(200)
            .with_body(text_body(&reply.to_string()))
            .create_async()
            .await;

        let list = client(&server.url()).generate_list("ideas").await.unwrap();
        assert_eq!(list, vec!["Hide the charger.", "Leave it in the car."]);
    }

    #[tokio::test]
    async fn generate_list_rejects_prose() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_body(text_body("Sure! Here are some ideas"))
            .create_async()
            .await;

        let err = client(&server.url()).generate_list("ideas").await.unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
    }

    #[tokio::test]
    async fn stream_chat_emits_chunks_and_sources_once() {
        let mut server = mockito::Server::new_async().await;
        let grounded = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "that happened." }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://example.org/a", "title": "A" } },
                    { "web": { "uri": "", "title": "skipped" } }
                ]}
            }]
        });
        let body = format!(
            "data: {}\r\n\r\ndata: {}\r\n\r\ndata: {}\r\n\r\n",
            text_body("Well, "),
            grounded,
            grounded
        );
        server
            .mock("POST", "/models/gemini-2.5-flash:streamGenerateContent")
            .match_query(Matcher::UrlEncoded("alt".into(), "sse".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "rough day" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let history = vec![ChatMessage {
            role: ChatRole::User,
            text: "rough day".into(),
            timestamp: 0,
            sources: None,
        }];
        let mut updates = Vec::new();
        client(&server.url())
            .stream_chat("persona", &history, &mut |u: ChatUpdate| updates.push(u))
            .await
            .unwrap();

        let text: String = updates.iter().filter_map(|u| u.text_chunk.clone()).collect();
        assert_eq!(text, "Well, that happened.that happened.");
        let sources: Vec<_> = updates.iter().filter_map(|u| u.sources.clone()).collect();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0][0].uri, "https://example.org/a");
    }
}
