use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{CompletionChunk, CompletionRequest, DomainError};

/// Incremental output of one completion call.
///
/// Errors yielded by the stream are mid-stream failures; the items already
/// delivered stand.
pub type CompletionStream = BoxStream<'static, Result<CompletionChunk, DomainError>>;

/// Sends a conversation to a hosted model and streams back its reply.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Dropping the returned stream releases the upstream connection.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Start a streamed completion.
    ///
    /// Fails with [`DomainError::ProviderError`] when the call is rejected
    /// before any output is produced.
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionStream, DomainError>;

    /// Provider name, for logging.
    fn name(&self) -> &str;
}
