//! Repository for the `nodes` table.

use guidetree_core::types::DbId;
use sqlx::PgPool;

use crate::models::node::{CreateNode, Node, UpdateNode};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tree_id, node_type, title, content, parent_node_id, \
    order_index, created_at, updated_at";

/// Provides CRUD operations for nodes.
pub struct NodeRepo;

impl NodeRepo {
    /// Insert a new node into a tree, returning the created row.
    ///
    /// `order_index` is assigned after the tree's current maximum so new
    /// nodes list last.
    pub async fn create(
        pool: &PgPool,
        tree_id: DbId,
        input: &CreateNode,
    ) -> Result<Node, sqlx::Error> {
        let query = format!(
            "INSERT INTO nodes (tree_id, node_type, title, content, order_index)
             VALUES ($1, $2, $3, $4,
                     (SELECT COALESCE(MAX(order_index) + 1, 0) FROM nodes WHERE tree_id = $1))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(tree_id)
            .bind(&input.node_type)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// Find a node by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Node>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM nodes WHERE id = $1");
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all nodes of a tree, ordered by `order_index`, creation time,
    /// then id.
    pub async fn list_by_tree(pool: &PgPool, tree_id: DbId) -> Result<Vec<Node>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM nodes
             WHERE tree_id = $1
             ORDER BY order_index, created_at, id"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(tree_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a node's type, title, and content.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateNode,
    ) -> Result<Option<Node>, sqlx::Error> {
        let query = format!(
            "UPDATE nodes SET node_type = $2, title = $3, content = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Node>(&query)
            .bind(id)
            .bind(&input.node_type)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a node by ID. Returns `true` if a row was removed.
    ///
    /// A single statement: the schema cascades the delete to the node's own
    /// options and sets `next_node_id` to NULL on any option elsewhere that
    /// referenced this node.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
