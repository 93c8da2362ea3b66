//! Edit token entity model.

use guidetree_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `edit_tokens` table: a time-boxed capability granting
/// write access to one tree through the browser editor API.
///
/// Expired rows are never deleted; validity is a per-request predicate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EditToken {
    pub id: DbId,
    /// The opaque capability string. Skipped during serialization so an
    /// editor snapshot can embed the row without re-exposing the secret.
    #[serde(skip_serializing)]
    pub token: String,
    pub tree_id: DbId,
    pub created_by: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
