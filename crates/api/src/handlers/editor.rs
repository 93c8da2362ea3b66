//! Handlers for the tokenized browser editor surface.
//!
//! Every endpoint is gated by an edit token in the URL path. The token row
//! is loaded and checked on every request; `tree_id` is always re-derived
//! from the token, never taken from the client. Absent, expired, and
//! mismatched tokens all produce the same `401` so nothing is leaked.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use guidetree_core::error::CoreError;
use guidetree_core::token::{constant_time_eq, is_expired};
use guidetree_core::types::{DbId, Timestamp};
use guidetree_db::models::edit_token::EditToken;
use guidetree_db::models::node::{CreateNode, Node, UpdateNode};
use guidetree_db::models::node_option::{CreateNodeOption, NodeOption, UpdateNodeOption};
use guidetree_db::models::tree::{Tree, UpdateTree};
use guidetree_db::repositories::{EditTokenRepo, NodeOptionRepo, NodeRepo, TreeRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::engine::authoring;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Everything the browser editor needs to render a tree.
#[derive(Debug, Serialize)]
pub struct EditorSnapshot {
    pub tree: Tree,
    pub nodes: Vec<Node>,
    pub options: Vec<NodeOption>,
    pub expires_at: Timestamp,
}

/// Validate an edit token and return its row.
///
/// Lookup is by exact value; the stored value is additionally compared in
/// constant time, and the expiry predicate is applied per-request (expired
/// rows are never deleted, they just always fail here).
async fn authorize(pool: &PgPool, token: &str) -> AppResult<EditToken> {
    let row = EditTokenRepo::find_by_token(pool, token)
        .await?
        .ok_or(AppError::InvalidToken)?;
    if !constant_time_eq(&row.token, token) {
        return Err(AppError::InvalidToken);
    }
    if is_expired(row.expires_at, Utc::now()) {
        return Err(AppError::InvalidToken);
    }
    Ok(row)
}

/// GET /editor/{token}
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<EditorSnapshot>> {
    let auth = authorize(&state.pool, &token).await?;

    let tree = TreeRepo::find_by_id(&state.pool, auth.tree_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Tree",
            id: auth.tree_id,
        })?;
    let nodes = NodeRepo::list_by_tree(&state.pool, auth.tree_id).await?;
    let options = NodeOptionRepo::list_by_tree(&state.pool, auth.tree_id).await?;

    Ok(Json(EditorSnapshot {
        tree,
        nodes,
        options,
        expires_at: auth.expires_at,
    }))
}

/// PUT /editor/{token}
pub async fn update_tree(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<UpdateTree>,
) -> AppResult<Json<Tree>> {
    let auth = authorize(&state.pool, &token).await?;
    let (tree, _) =
        authoring::update_tree_info(&state.pool, auth.tree_id, &input.name, input.description)
            .await?;
    Ok(Json(tree))
}

/// POST /editor/{token}/nodes
pub async fn create_node(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<CreateNode>,
) -> AppResult<(StatusCode, Json<Node>)> {
    let auth = authorize(&state.pool, &token).await?;
    let (node, _) = authoring::create_node(
        &state.pool,
        auth.tree_id,
        &input.node_type,
        &input.title,
        input.content,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(node)))
}

/// PUT /editor/{token}/nodes/{node_id}
pub async fn update_node(
    State(state): State<AppState>,
    Path((token, node_id)): Path<(String, DbId)>,
    Json(input): Json<UpdateNode>,
) -> AppResult<Json<Node>> {
    let auth = authorize(&state.pool, &token).await?;
    let (node, _) = authoring::update_node(
        &state.pool,
        Some(auth.tree_id),
        node_id,
        &input.node_type,
        &input.title,
        input.content,
    )
    .await?;
    Ok(Json(node))
}

/// DELETE /editor/{token}/nodes/{node_id}
pub async fn delete_node(
    State(state): State<AppState>,
    Path((token, node_id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let auth = authorize(&state.pool, &token).await?;
    authoring::delete_node(&state.pool, Some(auth.tree_id), node_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /editor/{token}/nodes/{node_id}/options
pub async fn create_option(
    State(state): State<AppState>,
    Path((token, node_id)): Path<(String, DbId)>,
    Json(input): Json<CreateNodeOption>,
) -> AppResult<(StatusCode, Json<NodeOption>)> {
    let auth = authorize(&state.pool, &token).await?;
    let (option, _) = authoring::create_option(
        &state.pool,
        Some(auth.tree_id),
        node_id,
        &input.label,
        input.next_node_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(option)))
}

/// PUT /editor/{token}/options/{option_id}
pub async fn update_option(
    State(state): State<AppState>,
    Path((token, option_id)): Path<(String, DbId)>,
    Json(input): Json<UpdateNodeOption>,
) -> AppResult<Json<NodeOption>> {
    let auth = authorize(&state.pool, &token).await?;
    let (option, _) = authoring::update_option(
        &state.pool,
        Some(auth.tree_id),
        option_id,
        &input.label,
        input.next_node_id,
    )
    .await?;
    Ok(Json(option))
}

/// DELETE /editor/{token}/options/{option_id}
pub async fn delete_option(
    State(state): State<AppState>,
    Path((token, option_id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let auth = authorize(&state.pool, &token).await?;
    authoring::delete_option(&state.pool, Some(auth.tree_id), option_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
