//! Opaque action identifiers for chat interactions.
//!
//! Every button and modal submission carries an `action_id` (or
//! `callback_id`) of the form `verb` or `verb:{entity_id}`. The entity id
//! is the only state an interaction carries -- navigation and editing both
//! reconstruct everything else from the store.

use std::str::FromStr;

use guidetree_core::types::DbId;

/// A parsed interaction action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Run a tree: post its root view as a new message.
    Run(DbId),
    /// Advance navigation through the given option.
    Navigate(DbId),
    /// Open the tree editor modal.
    EditTree(DbId),
    /// Open the tree name/description form.
    RenameTree(DbId),
    /// Issue a browser edit link for the tree.
    BrowserLink(DbId),
    /// Open the create-tree modal.
    CreateTree,
    /// Open the create-node modal for a tree.
    AddNode(DbId),
    /// Open the edit-node modal.
    EditNode(DbId),
    /// Delete a node.
    DeleteNode(DbId),
    /// Open the node editor modal (options view) for a node.
    OpenNode(DbId),
    /// Open the create-option modal for a node.
    AddOption(DbId),
    /// Open the edit-option modal.
    EditOption(DbId),
    /// Delete an option.
    DeleteOption(DbId),
}

impl Action {
    /// Encode this action as an `action_id` string.
    pub fn encode(self) -> String {
        match self {
            Action::Run(id) => format!("run:{id}"),
            Action::Navigate(id) => format!("nav:{id}"),
            Action::EditTree(id) => format!("edit_tree:{id}"),
            Action::RenameTree(id) => format!("rename_tree:{id}"),
            Action::BrowserLink(id) => format!("browser:{id}"),
            Action::CreateTree => "create_tree".to_string(),
            Action::AddNode(id) => format!("add_node:{id}"),
            Action::EditNode(id) => format!("edit_node:{id}"),
            Action::DeleteNode(id) => format!("delete_node:{id}"),
            Action::OpenNode(id) => format!("open_node:{id}"),
            Action::AddOption(id) => format!("add_option:{id}"),
            Action::EditOption(id) => format!("edit_option:{id}"),
            Action::DeleteOption(id) => format!("delete_option:{id}"),
        }
    }
}

/// Error parsing an `action_id` string.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized action id: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "create_tree" {
            return Ok(Action::CreateTree);
        }
        let (verb, id) = s.split_once(':').ok_or_else(|| UnknownAction(s.into()))?;
        let id: DbId = id.parse().map_err(|_| UnknownAction(s.into()))?;
        match verb {
            "run" => Ok(Action::Run(id)),
            "nav" => Ok(Action::Navigate(id)),
            "edit_tree" => Ok(Action::EditTree(id)),
            "rename_tree" => Ok(Action::RenameTree(id)),
            "browser" => Ok(Action::BrowserLink(id)),
            "add_node" => Ok(Action::AddNode(id)),
            "edit_node" => Ok(Action::EditNode(id)),
            "delete_node" => Ok(Action::DeleteNode(id)),
            "open_node" => Ok(Action::OpenNode(id)),
            "add_option" => Ok(Action::AddOption(id)),
            "edit_option" => Ok(Action::EditOption(id)),
            "delete_option" => Ok(Action::DeleteOption(id)),
            _ => Err(UnknownAction(s.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        let actions = [
            Action::Run(1),
            Action::Navigate(2),
            Action::EditTree(3),
            Action::RenameTree(12),
            Action::BrowserLink(4),
            Action::CreateTree,
            Action::AddNode(5),
            Action::EditNode(6),
            Action::DeleteNode(7),
            Action::OpenNode(8),
            Action::AddOption(9),
            Action::EditOption(10),
            Action::DeleteOption(11),
        ];
        for action in actions {
            assert_eq!(action.encode().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn rejects_unknown_verb() {
        assert!("launch:1".parse::<Action>().is_err());
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!("run:abc".parse::<Action>().is_err());
    }

    #[test]
    fn rejects_bare_verb() {
        assert!("run".parse::<Action>().is_err());
    }
}
