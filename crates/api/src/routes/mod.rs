pub mod chat;
pub mod editor;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (health is mounted separately at root).
///
/// ```text
/// /chat/events           platform Events API callbacks
/// /chat/interactions     platform interactivity callbacks
/// /editor/{token}/...    tokenized browser editing API
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .nest("/chat", chat::router())
        .nest("/editor", editor::router())
}
