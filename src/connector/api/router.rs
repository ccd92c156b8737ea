use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::container::Container;
use super::controller::chat_handler;

pub const CHAT_PATH: &str = "/api/chat";

pub fn build_router(container: Arc<Container>) -> Router {
    Router::new()
        .route(CHAT_PATH, any(chat_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(container)
}
