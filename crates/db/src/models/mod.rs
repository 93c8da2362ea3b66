//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO that replaces the editable fields wholesale

pub mod edit_token;
pub mod node;
pub mod node_option;
pub mod tree;
