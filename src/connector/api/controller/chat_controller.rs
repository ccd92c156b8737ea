use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::{info, warn};

use crate::application::RequestMetadata;
use crate::connector::api::data_stream::stream_response;
use crate::connector::api::{ApiError, Container};

fn header_str<'h>(headers: &'h HeaderMap, name: header::HeaderName) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Response, ApiError> {
        let metadata = RequestMetadata {
            method: method.as_str(),
            content_type: header_str(headers, header::CONTENT_TYPE),
            origin: header_str(headers, header::ORIGIN),
            referer: header_str(headers, header::REFERER),
        };

        if !self.container.validate_use_case().execute(&metadata) {
            warn!(
                "Rejected chat request: method={} origin={:?} referer={:?}",
                metadata.method, metadata.origin, metadata.referer
            );
            return Err(ApiError::forbidden());
        }

        let stream = self.container.relay_use_case().execute_json(body).await?;

        info!("Streaming completion to caller");
        Ok(stream_response(stream, self.container.max_duration()))
    }
}

/// `ANY /api/chat`: every method reaches the validator so that non-POST
/// requests are rejected with 403 rather than 405.
pub async fn chat_handler(
    State(container): State<Arc<Container>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match ChatController::new(&container)
        .chat(&method, &headers, &body)
        .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
