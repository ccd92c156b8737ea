//! Framing for the browser chat client's "data stream" protocol (v1).
//!
//! Every part is one line, `<code>:<json>\n`. The relay emits a start part
//! carrying the message id, one text part per chunk, an error part when the
//! provider fails mid-stream, and the finish-step / finish-message pair.

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::CompletionStream;
use crate::domain::{CompletionChunk, FinishReason, TokenUsage};

pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";
pub const DATA_STREAM_VERSION: &str = "v1";
/// Client-facing text of a mid-stream failure; the raw error is only logged.
pub const STREAM_ERROR_MESSAGE: &str = "An error occurred.";

const CHANNEL_CAPACITY: usize = 32;

fn part(code: char, value: Value) -> Bytes {
    Bytes::from(format!("{code}:{value}\n"))
}

pub fn start_part(message_id: &str) -> Bytes {
    part('f', json!({ "messageId": message_id }))
}

pub fn text_part(text: &str) -> Bytes {
    part('0', Value::String(text.to_string()))
}

pub fn error_part(message: &str) -> Bytes {
    part('3', Value::String(message.to_string()))
}

fn usage_json(usage: &TokenUsage) -> Value {
    json!({
        "promptTokens": usage.prompt_tokens,
        "completionTokens": usage.completion_tokens,
    })
}

pub fn finish_step_part(reason: FinishReason, usage: &TokenUsage) -> Bytes {
    part(
        'e',
        json!({
            "finishReason": reason,
            "usage": usage_json(usage),
            "isContinued": false,
        }),
    )
}

pub fn finish_message_part(reason: FinishReason, usage: &TokenUsage) -> Bytes {
    part(
        'd',
        json!({
            "finishReason": reason,
            "usage": usage_json(usage),
        }),
    )
}

/// Forward `stream` to the caller as a live data-stream response.
///
/// A spawned task pumps provider chunks into the body as they arrive. It
/// stops, dropping the provider stream, when the caller goes away or when
/// `max_duration` has elapsed.
pub fn stream_response(stream: CompletionStream, max_duration: Duration) -> Response {
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(CHANNEL_CAPACITY);

    tokio::spawn(forward(stream, tx, Instant::now() + max_duration));

    let mut response = Response::new(Body::from_stream(ReceiverStream::new(rx)));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(DATA_STREAM_HEADER, HeaderValue::from_static(DATA_STREAM_VERSION));
    response
}

async fn forward(
    mut stream: CompletionStream,
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
    deadline: Instant,
) {
    let message_id = format!("msg-{}", Uuid::new_v4().simple());
    if tx.send(Ok(start_part(&message_id))).await.is_err() {
        return;
    }

    let mut reason = FinishReason::Stop;
    let mut usage = TokenUsage::default();
    let mut forwarded = 0usize;

    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                debug!("Client disconnected after {} chunk(s), dropping provider stream", forwarded);
                return;
            }
            next = tokio::time::timeout_at(deadline, stream.next()) => next,
        };

        let frame = match next {
            Err(_) => {
                warn!("Chat stream exceeded its time budget after {} chunk(s)", forwarded);
                reason = FinishReason::Error;
                error_part(STREAM_ERROR_MESSAGE)
            }
            Ok(None) => break,
            Ok(Some(Ok(CompletionChunk::Text(text)))) => {
                forwarded += 1;
                text_part(&text)
            }
            Ok(Some(Ok(CompletionChunk::Finish {
                reason: finish,
                usage: reported,
            }))) => {
                reason = finish;
                if let Some(reported) = reported {
                    usage = reported;
                }
                continue;
            }
            // Already logged by the relay; output sent so far stands.
            Ok(Some(Err(_))) => {
                reason = FinishReason::Error;
                error_part(STREAM_ERROR_MESSAGE)
            }
        };

        if tx.send(Ok(frame)).await.is_err() {
            debug!("Client disconnected after {} chunk(s), dropping provider stream", forwarded);
            return;
        }
        if reason == FinishReason::Error {
            break;
        }
    }

    let _ = tx.send(Ok(finish_step_part(reason, &usage))).await;
    let _ = tx.send(Ok(finish_message_part(reason, &usage))).await;
    info!(
        "Chat stream complete: {} chunk(s), finish reason {:?}",
        forwarded, reason
    );
}
