//! Repository for the `node_options` table.

use guidetree_core::types::DbId;
use sqlx::PgPool;

use crate::models::node_option::{CreateNodeOption, NodeOption, UpdateNodeOption};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, node_id, label, next_node_id, order_index, created_at";

/// Provides CRUD operations for node options.
pub struct NodeOptionRepo;

impl NodeOptionRepo {
    /// Insert a new option under a node, returning the created row.
    ///
    /// `order_index` is assigned after the node's current maximum so new
    /// options render last.
    pub async fn create(
        pool: &PgPool,
        node_id: DbId,
        input: &CreateNodeOption,
    ) -> Result<NodeOption, sqlx::Error> {
        let query = format!(
            "INSERT INTO node_options (node_id, label, next_node_id, order_index)
             VALUES ($1, $2, $3,
                     (SELECT COALESCE(MAX(order_index) + 1, 0) FROM node_options WHERE node_id = $1))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NodeOption>(&query)
            .bind(node_id)
            .bind(&input.label)
            .bind(input.next_node_id)
            .fetch_one(pool)
            .await
    }

    /// Find an option by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<NodeOption>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM node_options WHERE id = $1");
        sqlx::query_as::<_, NodeOption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all options of a node, ordered by `order_index`, creation time,
    /// then id (the display order navigation renders).
    pub async fn list_by_node(pool: &PgPool, node_id: DbId) -> Result<Vec<NodeOption>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM node_options
             WHERE node_id = $1
             ORDER BY order_index, created_at, id"
        );
        sqlx::query_as::<_, NodeOption>(&query)
            .bind(node_id)
            .fetch_all(pool)
            .await
    }

    /// List every option belonging to any node of a tree.
    ///
    /// Used by root inference and the editor snapshot, which need the whole
    /// edge set at once.
    pub async fn list_by_tree(pool: &PgPool, tree_id: DbId) -> Result<Vec<NodeOption>, sqlx::Error> {
        sqlx::query_as::<_, NodeOption>(
            "SELECT o.id, o.node_id, o.label, o.next_node_id, o.order_index, o.created_at
             FROM node_options o
             JOIN nodes n ON n.id = o.node_id
             WHERE n.tree_id = $1
             ORDER BY o.node_id, o.order_index, o.created_at, o.id",
        )
            .bind(tree_id)
            .fetch_all(pool)
            .await
    }

    /// Replace an option's label and target edge.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateNodeOption,
    ) -> Result<Option<NodeOption>, sqlx::Error> {
        let query = format!(
            "UPDATE node_options SET label = $2, next_node_id = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NodeOption>(&query)
            .bind(id)
            .bind(&input.label)
            .bind(input.next_node_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an option by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM node_options WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
