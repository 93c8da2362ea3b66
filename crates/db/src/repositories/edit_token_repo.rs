//! Repository for the `edit_tokens` table.
//!
//! Rows are only ever looked up by token value, never listed, so expired
//! rows are left in place -- they fail the validity predicate forever.

use guidetree_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::edit_token::EditToken;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token, tree_id, created_by, expires_at, created_at";

/// Provides operations for edit tokens.
pub struct EditTokenRepo;

impl EditTokenRepo {
    /// Insert a new token scoped to one tree, returning the created row.
    pub async fn create(
        pool: &PgPool,
        token: &str,
        tree_id: DbId,
        created_by: &str,
        expires_at: Timestamp,
    ) -> Result<EditToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO edit_tokens (token, tree_id, created_by, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditToken>(&query)
            .bind(token)
            .bind(tree_id)
            .bind(created_by)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a token row by exact token value, regardless of expiry.
    ///
    /// The caller applies the constant-time comparison and the expiry
    /// predicate; the row lookup alone does not authorize anything.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<EditToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM edit_tokens WHERE token = $1");
        sqlx::query_as::<_, EditToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }
}
