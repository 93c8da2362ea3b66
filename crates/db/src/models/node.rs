//! Node entity model and DTOs.

use guidetree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `nodes` table.
///
/// `node_type` is either `decision` or `answer` (enforced by a CHECK
/// constraint); parse it with [`guidetree_core::graph::NodeKind`] where the
/// distinction matters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Node {
    pub id: DbId,
    pub tree_id: DbId,
    pub node_type: String,
    pub title: String,
    pub content: Option<String>,
    /// Kept for data compatibility; navigation never reads it.
    pub parent_node_id: Option<DbId>,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new node.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNode {
    pub node_type: String,
    pub title: String,
    pub content: Option<String>,
}

/// DTO for updating a node. The editing protocol replaces type, title, and
/// content wholesale; `content: None` clears the field.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNode {
    pub node_type: String,
    pub title: String,
    pub content: Option<String>,
}
