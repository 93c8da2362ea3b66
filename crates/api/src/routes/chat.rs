//! Route definitions for the inbound chat-platform callbacks.

use axum::routing::post;
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Chat callback routes mounted at `/chat`.
///
/// ```text
/// POST /events          -> events (Events API)
/// POST /interactions    -> interactions (buttons, modals, workflow config)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(chat::events))
        .route("/interactions", post(chat::interactions))
}
