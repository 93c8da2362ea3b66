//! Tree entity model and DTOs.

use guidetree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `trees` table. Root aggregate: owns its nodes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tree {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new tree.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTree {
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
}

/// DTO for updating a tree's info. `description` is replaced as given
/// (passing `None` clears it, matching the editor's PUT semantics).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTree {
    pub name: String,
    pub description: Option<String>,
}
