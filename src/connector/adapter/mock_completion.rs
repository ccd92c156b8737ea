use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use tracing::debug;

use crate::application::{CompletionProvider, CompletionStream};
use crate::domain::{CompletionChunk, CompletionRequest, DomainError};

const DEFAULT_REPLY: &str = "Zap! I'm BugZapBot, a friendly bot whose main job is to zap \
mosquitoes and other pesky bugs. How can I help you today?";

/// Scripted in-process provider.
///
/// Replays a fixed list of chunks and records every request it receives, so
/// callers can inspect the exact system prompt and options that were sent.
pub struct MockCompletion {
    chunks: Vec<String>,
    fail_before_stream: Option<String>,
    fail_mid_stream: Option<String>,
    chunk_delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    /// Replays a persona-affirming reply word by word.
    pub fn new() -> Self {
        let chunks = DEFAULT_REPLY
            .split_inclusive(' ')
            .map(String::from)
            .collect::<Vec<_>>();
        Self::with_chunks(chunks)
    }

    pub fn with_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            fail_before_stream: None,
            fail_mid_stream: None,
            chunk_delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Rejects every call before any output, with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let mut mock = Self::with_chunks(Vec::<String>::new());
        mock.fail_before_stream = Some(message.into());
        mock
    }

    /// Emits the scripted chunks, then fails with `message`.
    pub fn failing_mid_stream(mut self, message: impl Into<String>) -> Self {
        self.fail_mid_stream = Some(message.into());
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests().last().cloned()
    }

    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests().clone()
    }

    fn requests(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, DomainError> {
        debug!(
            "MockCompletion: received {} message(s) for model {}",
            request.messages.len(),
            request.model
        );
        self.requests().push(request);

        if let Some(message) = &self.fail_before_stream {
            return Err(DomainError::provider(message.clone()));
        }

        let mut items: Vec<Result<CompletionChunk, DomainError>> = self
            .chunks
            .iter()
            .map(|c| Ok(CompletionChunk::text(c.clone())))
            .collect();

        match &self.fail_mid_stream {
            Some(message) => items.push(Err(DomainError::provider(message.clone()))),
            None => items.push(Ok(CompletionChunk::stop())),
        }

        let delay = self.chunk_delay;
        Ok(stream::iter(items)
            .then(move |item| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                item
            })
            .boxed())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
