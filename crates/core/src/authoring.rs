//! Validation rules for the tree editing protocol.
//!
//! Both authoring surfaces (chat modals, tokenized browser API) run the
//! same checks before any mutation reaches the store.

use crate::error::CoreError;

/// Maximum allowed length for a tree name.
pub const MAX_TREE_NAME_LENGTH: usize = 100;

/// Maximum allowed length for a node title.
pub const MAX_NODE_TITLE_LENGTH: usize = 150;

/// Maximum allowed length for an option label.
pub const MAX_OPTION_LABEL_LENGTH: usize = 75;

/// Validate a tree name: non-empty after trimming, within
/// [`MAX_TREE_NAME_LENGTH`].
pub fn validate_tree_name(name: &str) -> Result<(), CoreError> {
    validate_required("Tree name", name, MAX_TREE_NAME_LENGTH)
}

/// Validate a node title.
pub fn validate_node_title(title: &str) -> Result<(), CoreError> {
    validate_required("Node title", title, MAX_NODE_TITLE_LENGTH)
}

/// Validate an option label.
pub fn validate_option_label(label: &str) -> Result<(), CoreError> {
    validate_required("Option label", label, MAX_OPTION_LABEL_LENGTH)
}

fn validate_required(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {max_len} characters, got {}",
            value.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_name() {
        assert!(validate_tree_name("Onboarding questions").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(validate_tree_name("").is_err());
    }

    #[test]
    fn rejects_whitespace_only_name() {
        assert!(validate_tree_name("   ").is_err());
    }

    #[test]
    fn accepts_name_at_max_length() {
        assert!(validate_tree_name(&"a".repeat(MAX_TREE_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn rejects_name_exceeding_max() {
        assert!(validate_tree_name(&"a".repeat(MAX_TREE_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn rejects_empty_node_title() {
        assert!(validate_node_title("").is_err());
    }

    #[test]
    fn rejects_empty_option_label() {
        assert!(validate_option_label("").is_err());
    }

    #[test]
    fn accepts_option_label_at_max_length() {
        assert!(validate_option_label(&"x".repeat(MAX_OPTION_LABEL_LENGTH)).is_ok());
    }
}
