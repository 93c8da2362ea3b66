//! Tree navigation: resolve a starting node or follow a chosen option.
//!
//! Navigation holds no durable state. `start` derives the entry node from
//! the graph; `advance` resolves one option edge. The returned
//! [`RenderedView`] is presentation-target-agnostic -- the calling surface
//! decides whether it lands in a new message, an in-place message update,
//! or a modal.
//!
//! Cyclic graphs are navigable: each visited node renders on each visit,
//! with no loop guard.

use guidetree_core::graph::{infer_root, NodeKind, RootNotFound};
use guidetree_core::types::DbId;
use guidetree_core::view::{build_choices, RenderedView};
use guidetree_db::models::node::Node;
use guidetree_db::repositories::{NodeOptionRepo, NodeRepo, TreeRepo};
use sqlx::PgPool;

/// Why a navigation step could not produce a view.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// The tree has no well-defined entry node.
    #[error(transparent)]
    Root(#[from] RootNotFound),

    /// The tree itself does not exist.
    #[error("tree {0} not found")]
    TreeNotFound(DbId),

    /// The chosen option does not exist (raced with a delete).
    #[error("option {0} not found")]
    OptionNotFound(DbId),

    /// An option's target node is gone. Deletion clears inbound references,
    /// so this only surfaces on a read racing a delete.
    #[error("node {0} is missing")]
    NodeMissing(DbId),

    /// A stored node carries an unparseable type. The CHECK constraint
    /// makes this unreachable short of manual data edits.
    #[error("node {node_id} has invalid type: {kind}")]
    InvalidKind { node_id: DbId, kind: String },

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Start a run: infer the tree's root and render it.
pub async fn start(pool: &PgPool, tree_id: DbId) -> Result<RenderedView, NavError> {
    if TreeRepo::find_by_id(pool, tree_id).await?.is_none() {
        return Err(NavError::TreeNotFound(tree_id));
    }

    let nodes = NodeRepo::list_by_tree(pool, tree_id).await?;
    let options = NodeOptionRepo::list_by_tree(pool, tree_id).await?;

    let node_ids: Vec<DbId> = nodes.iter().map(|n| n.id).collect();
    let edge_targets: Vec<Option<DbId>> = options.iter().map(|o| o.next_node_id).collect();

    let root_id = infer_root(&node_ids, &edge_targets)?;
    let root = nodes
        .into_iter()
        .find(|n| n.id == root_id)
        .ok_or(NavError::NodeMissing(root_id))?;

    render_node(pool, &root).await
}

/// Follow a chosen option.
///
/// Returns `Ok(None)` when the option's target is unset: the transition is
/// a deliberate no-op and the surface leaves its current view untouched.
pub async fn advance(pool: &PgPool, option_id: DbId) -> Result<Option<RenderedView>, NavError> {
    let option = NodeOptionRepo::find_by_id(pool, option_id)
        .await?
        .ok_or(NavError::OptionNotFound(option_id))?;

    let Some(next_id) = option.next_node_id else {
        return Ok(None);
    };

    let node = NodeRepo::find_by_id(pool, next_id)
        .await?
        .ok_or(NavError::NodeMissing(next_id))?;

    render_node(pool, &node).await.map(Some)
}

/// Render one node: terminal for answers, ordered choices for decisions.
async fn render_node(pool: &PgPool, node: &Node) -> Result<RenderedView, NavError> {
    let kind: NodeKind = node.node_type.parse().map_err(|_| NavError::InvalidKind {
        node_id: node.id,
        kind: node.node_type.clone(),
    })?;

    let view = match kind {
        NodeKind::Answer => {
            RenderedView::terminal(node.id, node.title.clone(), node.content.clone())
        }
        NodeKind::Decision => {
            let options = NodeOptionRepo::list_by_node(pool, node.id).await?;
            let edges = options.iter().map(|o| o.as_edge()).collect();
            RenderedView::decision(
                node.id,
                node.title.clone(),
                node.content.clone(),
                build_choices(edges),
            )
        }
    };
    Ok(view)
}
