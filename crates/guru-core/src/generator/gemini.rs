//! Streaming client for the Gemini `generateContent` API.
//!
//! Uses the `streamGenerateContent` endpoint with `alt=sse`, so the
//! response body is a server-sent-event stream. Bytes are buffered until
//! complete lines are available, `data:` payload lines are parsed as
//! [`GenerateContentResponse`] JSON, and every candidate text part
//! becomes one fragment.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::{FragmentStream, Generator, GeneratorError};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini REST client implementing [`Generator`].
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root, e.g. a local fake server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Generator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn stream(&self, prompt: &str) -> Result<FragmentStream, GeneratorError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut lines = SseLineBuffer::default();

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        // The connection is gone; report it and stop.
                        yield Err(GeneratorError::Http(e));
                        return;
                    }
                };

                for line in lines.push(chunk) {
                    for item in fragments_in_line(&line) {
                        yield item;
                    }
                }
            }

            // A truncated upstream can leave one unterminated line behind.
            if let Some(line) = lines.flush() {
                for item in fragments_in_line(&line) {
                    yield item;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

// ---------------------------------------------------------------------------
// SSE decoding
// ---------------------------------------------------------------------------

/// Accumulates raw bytes and hands back complete lines.
///
/// Chunks split at arbitrary byte boundaries, including inside multi-byte
/// characters, so the buffer holds bytes and conversion happens per
/// complete line. Trailing `\r` is stripped along with the `\n`.
#[derive(Debug, Default)]
struct SseLineBuffer {
    partial: Vec<u8>,
}

impl SseLineBuffer {
    /// Append a chunk and return every line it completed.
    fn push(&mut self, chunk: Bytes) -> Vec<String> {
        self.partial.extend_from_slice(&chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.partial.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }

    /// Hand back the unterminated remainder, if any.
    fn flush(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.partial);
        Some(String::from_utf8_lossy(&raw).into_owned())
    }
}

/// Strip the SSE `data:` field name from a line, if it carries one.
/// Blank lines and `:` comment lines carry no payload.
fn sse_data(line: &str) -> Option<&str> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data:")
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}

/// Decode one SSE line into fragment items.
///
/// Lines without a payload produce nothing; a payload that fails to parse
/// produces a single `Err` item for the consumer to skip.
fn fragments_in_line(line: &str) -> Vec<Result<String, GeneratorError>> {
    let Some(payload) = sse_data(line) else {
        return Vec::new();
    };

    match parse_data_payload(payload) {
        Ok(fragments) => fragments.into_iter().map(Ok).collect(),
        Err(e) => vec![Err(e)],
    }
}

/// Extract the text fragments carried by one `data:` payload.
fn parse_data_payload(payload: &str) -> Result<Vec<String>, GeneratorError> {
    let response: GenerateContentResponse = serde_json::from_str(payload)
        .map_err(|e| GeneratorError::Decode(format!("bad stream JSON: {e}")))?;

    Ok(response
        .candidates
        .into_iter()
        .flat_map(|candidate| candidate.content.parts)
        .filter_map(|part| part.text)
        .collect())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}
