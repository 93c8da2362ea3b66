//! Node option entity model and DTOs.

use guidetree_core::types::{DbId, Timestamp};
use guidetree_core::view::OptionEdge;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `node_options` table: a labeled edge from a decision
/// node to another node in the same tree.
///
/// `next_node_id` is a weak reference, not ownership -- when the target
/// node is deleted the store sets it to NULL and the option renders as
/// "not set".
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NodeOption {
    pub id: DbId,
    pub node_id: DbId,
    pub label: String,
    pub next_node_id: Option<DbId>,
    pub order_index: i32,
    pub created_at: Timestamp,
}

impl NodeOption {
    /// View of this row as a core option edge (for ordering/rendering).
    pub fn as_edge(&self) -> OptionEdge {
        OptionEdge {
            option_id: self.id,
            label: self.label.clone(),
            next_node_id: self.next_node_id,
            order_index: self.order_index,
            created_at: self.created_at,
        }
    }
}

/// DTO for creating a new option.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNodeOption {
    pub label: String,
    pub next_node_id: Option<DbId>,
}

/// DTO for updating an option. Label and target are replaced as given;
/// `next_node_id: None` unsets the edge.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNodeOption {
    pub label: String,
    pub next_node_id: Option<DbId>,
}
