use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::{CompletionProvider, CompletionStream};
use crate::connector::adapter::SseDecoder;
use crate::domain::{CompletionChunk, CompletionRequest, DomainError, FinishReason, TokenUsage};

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const DONE_SENTINEL: &str = "[DONE]";
/// Whole-call ceiling for a streamed completion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    reasoning_format: &'a str,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: String,
}

/// One `data:` payload of the completion stream.
#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<ApiUsage>,
    x_groq: Option<GroqExtension>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

/// Groq reports usage of a streamed call under `x_groq` on the last chunk.
#[derive(Deserialize)]
struct GroqExtension {
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Streaming client for Groq chat completions.
///
/// Implements [`CompletionProvider`] so the relay stays decoupled from
/// transport and serialization details. Any OpenAI-compatible server that
/// accepts `reasoning_format` works when `base_url` points at it.
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    /// Full endpoint URL (base + CHAT_COMPLETIONS_PATH).
    url: String,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_timeout(api_key, base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), CHAT_COMPLETIONS_PATH);
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_body<'a>(request: &'a CompletionRequest) -> ApiRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ApiMessage {
            role: "system",
            content: request.system_prompt.clone(),
        });
        messages.extend(request.messages.iter().map(|m| ApiMessage {
            role: m.role.as_str(),
            content: m.full_text(),
        }));

        ApiRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
            reasoning_format: request.reasoning_format.as_str(),
        }
    }

    /// Pull the error message out of a non-success response body.
    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
            _ => format!("Groq API returned {status}"),
        }
    }
}

/// Translate one SSE data payload into stream items.
///
/// Returns `None` for the terminating `[DONE]` sentinel.
fn parse_event(data: &str) -> Option<Vec<Result<CompletionChunk, DomainError>>> {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return None;
    }

    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(vec![Err(DomainError::provider(format!(
                "Malformed stream chunk: {e}"
            )))]);
        }
    };

    if let Some(error) = chunk.error {
        return Some(vec![Err(DomainError::provider(error.message))]);
    }

    let usage = chunk
        .x_groq
        .and_then(|x| x.usage)
        .or(chunk.usage)
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });

    let mut items = Vec::new();
    for choice in chunk.choices {
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            items.push(Ok(CompletionChunk::Text(text)));
        }
        if let Some(reason) = choice.finish_reason {
            items.push(Ok(CompletionChunk::Finish {
                reason: FinishReason::from_provider(&reason),
                usage,
            }));
        }
    }
    Some(items)
}

struct StreamState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<CompletionChunk, DomainError>>,
    done: bool,
}

impl StreamState {
    /// Queue the items of `events`; stops at `[DONE]` or the first error.
    fn enqueue(&mut self, events: Vec<String>) {
        for data in events {
            match parse_event(&data) {
                None => {
                    self.done = true;
                    return;
                }
                Some(items) => {
                    for item in items {
                        let failed = item.is_err();
                        self.pending.push_back(item);
                        if failed {
                            self.done = true;
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn completion_stream(body: BoxStream<'static, reqwest::Result<Bytes>>) -> CompletionStream {
    let state = StreamState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    let events = state.decoder.push(&bytes);
                    state.enqueue(events);
                }
                Some(Err(e)) => {
                    warn!("GroqClient: stream interrupted: {e}");
                    state.pending.push_back(Err(DomainError::provider(e.to_string())));
                    state.done = true;
                }
                None => {
                    let tail: Vec<String> = state.decoder.finish().into_iter().collect();
                    state.enqueue(tail);
                    state.done = true;
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, DomainError> {
        let body = Self::build_body(&request);
        debug!(
            "GroqClient: requesting {} with {} message(s)",
            body.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::provider(format!("Groq request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!("GroqClient: API returned {status}: {text}");
            return Err(DomainError::provider(Self::error_message(status, &text)));
        }

        Ok(completion_stream(response.bytes_stream().boxed()))
    }

    fn name(&self) -> &str {
        "groq"
    }
}
