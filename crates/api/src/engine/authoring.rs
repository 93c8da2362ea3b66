//! The surface-independent editing protocol.
//!
//! Both authoring surfaces (chat modal stack, tokenized browser API) route
//! their mutations through these commands. Each command re-validates
//! referenced-entity existence -- and, when a tree scope is supplied,
//! ownership -- immediately before mutating, so a race with the other
//! surface surfaces as a normal `NotFound` rather than a crash.
//!
//! Every command returns an [`EditContext`] naming the view the caller
//! should re-render next: the tree editor after node-level changes, the
//! owning node's editor after option-level changes. This is the pull-based
//! consistency model -- a stale view is only ever corrected by the command
//! that caused the change re-rendering it.

use guidetree_core::authoring::{
    validate_node_title, validate_option_label, validate_tree_name,
};
use guidetree_core::error::CoreError;
use guidetree_core::graph::NodeKind;
use guidetree_core::types::DbId;
use guidetree_db::models::node::{CreateNode, Node, UpdateNode};
use guidetree_db::models::node_option::{CreateNodeOption, NodeOption, UpdateNodeOption};
use guidetree_db::models::tree::{CreateTree, Tree, UpdateTree};
use guidetree_db::repositories::{NodeOptionRepo, NodeRepo, TreeRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Which view a surface should render after a command: the tree editor
/// (`node_id: None`) or a specific node's editor.
///
/// Replaces platform-specific modal-stack bookkeeping with an explicit
/// value threaded through every command and carried in modal metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditContext {
    pub tree_id: DbId,
    pub node_id: Option<DbId>,
}

impl EditContext {
    pub fn tree(tree_id: DbId) -> Self {
        Self {
            tree_id,
            node_id: None,
        }
    }

    pub fn node(tree_id: DbId, node_id: DbId) -> Self {
        Self {
            tree_id,
            node_id: Some(node_id),
        }
    }

    /// Encode for transport in modal `private_metadata`.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("EditContext serializes")
    }

    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Optional tree scope: the tokenized surface passes the token's tree id so
/// every referenced entity is checked against it; the chat surface passes
/// `None` (it may touch any tree, but cross-tree edges are still rejected).
pub type TreeScope = Option<DbId>;

// ---------------------------------------------------------------------------
// Tree commands
// ---------------------------------------------------------------------------

pub async fn create_tree(
    pool: &PgPool,
    name: &str,
    description: Option<String>,
    actor: &str,
) -> AppResult<Tree> {
    validate_tree_name(name)?;
    let tree = TreeRepo::create(
        pool,
        &CreateTree {
            name: name.to_string(),
            description,
            created_by: actor.to_string(),
        },
    )
    .await?;
    tracing::info!(tree_id = tree.id, actor, "Tree created");
    Ok(tree)
}

pub async fn update_tree_info(
    pool: &PgPool,
    tree_id: DbId,
    name: &str,
    description: Option<String>,
) -> AppResult<(Tree, EditContext)> {
    validate_tree_name(name)?;
    let tree = TreeRepo::update(
        pool,
        tree_id,
        &UpdateTree {
            name: name.to_string(),
            description,
        },
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Tree",
        id: tree_id,
    })?;
    Ok((tree, EditContext::tree(tree_id)))
}

// ---------------------------------------------------------------------------
// Node commands
// ---------------------------------------------------------------------------

pub async fn create_node(
    pool: &PgPool,
    tree_id: DbId,
    node_type: &str,
    title: &str,
    content: Option<String>,
) -> AppResult<(Node, EditContext)> {
    let kind: NodeKind = node_type.parse()?;
    validate_node_title(title)?;

    // Existence re-check keeps a racing tree delete from surfacing as a
    // raw FK error.
    TreeRepo::find_by_id(pool, tree_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Tree",
            id: tree_id,
        })?;

    let node = NodeRepo::create(
        pool,
        tree_id,
        &CreateNode {
            node_type: kind.as_str().to_string(),
            title: title.to_string(),
            content,
        },
    )
    .await?;
    tracing::info!(node_id = node.id, tree_id, "Node created");
    Ok((node, EditContext::tree(tree_id)))
}

pub async fn update_node(
    pool: &PgPool,
    scope: TreeScope,
    node_id: DbId,
    node_type: &str,
    title: &str,
    content: Option<String>,
) -> AppResult<(Node, EditContext)> {
    let kind: NodeKind = node_type.parse()?;
    validate_node_title(title)?;

    let existing = find_scoped_node(pool, scope, node_id).await?;
    let node = NodeRepo::update(
        pool,
        node_id,
        &UpdateNode {
            node_type: kind.as_str().to_string(),
            title: title.to_string(),
            content,
        },
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Node",
        id: node_id,
    })?;
    Ok((node, EditContext::tree(existing.tree_id)))
}

/// Delete a node. The store cascades its options and clears inbound weak
/// edges; any surface currently showing the node falls back to the tree
/// editor named by the returned context, never to a stale node view.
pub async fn delete_node(pool: &PgPool, scope: TreeScope, node_id: DbId) -> AppResult<EditContext> {
    let node = find_scoped_node(pool, scope, node_id).await?;
    if !NodeRepo::delete(pool, node_id).await? {
        return Err(CoreError::NotFound {
            entity: "Node",
            id: node_id,
        }
        .into());
    }
    tracing::info!(node_id, tree_id = node.tree_id, "Node deleted");
    Ok(EditContext::tree(node.tree_id))
}

// ---------------------------------------------------------------------------
// Option commands
// ---------------------------------------------------------------------------

pub async fn create_option(
    pool: &PgPool,
    scope: TreeScope,
    node_id: DbId,
    label: &str,
    next_node_id: Option<DbId>,
) -> AppResult<(NodeOption, EditContext)> {
    validate_option_label(label)?;
    let node = find_scoped_node(pool, scope, node_id).await?;
    ensure_target_in_tree(pool, node.tree_id, next_node_id).await?;

    let option = NodeOptionRepo::create(
        pool,
        node_id,
        &CreateNodeOption {
            label: label.to_string(),
            next_node_id,
        },
    )
    .await?;
    tracing::info!(option_id = option.id, node_id, "Option created");
    Ok((option, EditContext::node(node.tree_id, node_id)))
}

pub async fn update_option(
    pool: &PgPool,
    scope: TreeScope,
    option_id: DbId,
    label: &str,
    next_node_id: Option<DbId>,
) -> AppResult<(NodeOption, EditContext)> {
    validate_option_label(label)?;
    let (_, node) = find_scoped_option(pool, scope, option_id).await?;
    ensure_target_in_tree(pool, node.tree_id, next_node_id).await?;

    let option = NodeOptionRepo::update(
        pool,
        option_id,
        &UpdateNodeOption {
            label: label.to_string(),
            next_node_id,
        },
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Option",
        id: option_id,
    })?;
    Ok((option, EditContext::node(node.tree_id, node.id)))
}

pub async fn delete_option(
    pool: &PgPool,
    scope: TreeScope,
    option_id: DbId,
) -> AppResult<EditContext> {
    let (_, node) = find_scoped_option(pool, scope, option_id).await?;
    if !NodeOptionRepo::delete(pool, option_id).await? {
        return Err(CoreError::NotFound {
            entity: "Option",
            id: option_id,
        }
        .into());
    }
    Ok(EditContext::node(node.tree_id, node.id))
}

// ---------------------------------------------------------------------------
// Scope checks
// ---------------------------------------------------------------------------

/// Load a node, enforcing the tree scope when one is supplied.
///
/// Out-of-scope and absent are indistinguishable to the caller (both are
/// `NotFound`), so a token for tree A learns nothing about tree B.
async fn find_scoped_node(pool: &PgPool, scope: TreeScope, node_id: DbId) -> AppResult<Node> {
    let node = NodeRepo::find_by_id(pool, node_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Node",
            id: node_id,
        })?;
    if let Some(tree_id) = scope {
        if node.tree_id != tree_id {
            return Err(CoreError::NotFound {
                entity: "Node",
                id: node_id,
            }
            .into());
        }
    }
    Ok(node)
}

/// Load an option and its owning node, enforcing the tree scope.
async fn find_scoped_option(
    pool: &PgPool,
    scope: TreeScope,
    option_id: DbId,
) -> AppResult<(NodeOption, Node)> {
    let option = NodeOptionRepo::find_by_id(pool, option_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Option",
            id: option_id,
        })?;
    let node = find_scoped_node(pool, scope, option.node_id)
        .await
        .map_err(|_| {
            AppError::Core(CoreError::NotFound {
                entity: "Option",
                id: option_id,
            })
        })?;
    Ok((option, node))
}

/// A `next_node_id`, if given, must reference a node in the same tree as
/// the option's owning node. Cross-tree edges are rejected on every
/// surface.
async fn ensure_target_in_tree(
    pool: &PgPool,
    tree_id: DbId,
    next_node_id: Option<DbId>,
) -> AppResult<()> {
    let Some(target_id) = next_node_id else {
        return Ok(());
    };
    let target = NodeRepo::find_by_id(pool, target_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Node",
            id: target_id,
        })?;
    if target.tree_id != tree_id {
        return Err(CoreError::NotFound {
            entity: "Node",
            id: target_id,
        }
        .into());
    }
    Ok(())
}
