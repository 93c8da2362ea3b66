//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod edit_token_repo;
pub mod node_option_repo;
pub mod node_repo;
pub mod tree_repo;

pub use edit_token_repo::EditTokenRepo;
pub use node_option_repo::NodeOptionRepo;
pub use node_repo::NodeRepo;
pub use tree_repo::TreeRepo;
