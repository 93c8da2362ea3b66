//! Repository for the `trees` table.

use guidetree_core::types::DbId;
use sqlx::PgPool;

use crate::models::tree::{CreateTree, Tree, UpdateTree};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, is_active, created_by, created_at, updated_at";

/// Provides CRUD operations for trees.
pub struct TreeRepo;

impl TreeRepo {
    /// Insert a new tree, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTree) -> Result<Tree, sqlx::Error> {
        let query = format!(
            "INSERT INTO trees (name, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tree>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a tree by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tree>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trees WHERE id = $1");
        sqlx::query_as::<_, Tree>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all trees, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Tree>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trees ORDER BY name, id");
        sqlx::query_as::<_, Tree>(&query).fetch_all(pool).await
    }

    /// Update a tree's name and description.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTree,
    ) -> Result<Option<Tree>, sqlx::Error> {
        let query = format!(
            "UPDATE trees SET name = $2, description = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tree>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a tree by ID, cascading to its nodes (and through them to
    /// options and edit tokens). Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trees WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
