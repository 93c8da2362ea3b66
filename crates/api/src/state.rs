use std::sync::Arc;

use crate::chat::client::ChatClient;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: guidetree_db::DbPool,
    /// Server configuration (accessed by handlers and signature verification).
    pub config: Arc<ServerConfig>,
    /// Outbound chat platform client (trait object so tests can substitute
    /// a recording fake).
    pub chat: Arc<dyn ChatClient>,
}
