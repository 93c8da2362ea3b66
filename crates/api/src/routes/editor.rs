//! Route definitions for the tokenized browser editing API.
//!
//! Every route takes the edit token as its first path segment; the handlers
//! authorize it on each request and scope all lookups to the token's tree.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::editor;
use crate::state::AppState;

/// Browser editor routes mounted at `/editor`.
///
/// ```text
/// GET    /{token}                            -> get_snapshot
/// PUT    /{token}                            -> update_tree
/// POST   /{token}/nodes                      -> create_node
/// PUT    /{token}/nodes/{node_id}            -> update_node
/// DELETE /{token}/nodes/{node_id}            -> delete_node
/// POST   /{token}/nodes/{node_id}/options    -> create_option
/// PUT    /{token}/options/{option_id}        -> update_option
/// DELETE /{token}/options/{option_id}        -> delete_option
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(editor::get_snapshot).put(editor::update_tree))
        .route("/{token}/nodes", post(editor::create_node))
        .route(
            "/{token}/nodes/{node_id}",
            put(editor::update_node).delete(editor::delete_node),
        )
        .route(
            "/{token}/nodes/{node_id}/options",
            post(editor::create_option),
        )
        .route(
            "/{token}/options/{option_id}",
            put(editor::update_option).delete(editor::delete_option),
        )
}
