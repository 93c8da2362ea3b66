//! Tree graph primitives: node classification and root inference.
//!
//! A tree's entry point is never stored. The root is *derived*: it is the
//! unique node that no option's `next_node_id` points at. Everything here
//! operates on plain ids so the module stays independent of the storage
//! layer.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Node kind
// ---------------------------------------------------------------------------

/// The two node classifications: `decision` nodes present options,
/// `answer` nodes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Decision,
    Answer,
}

impl NodeKind {
    /// The database/storage representation of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Decision => "decision",
            NodeKind::Answer => "answer",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decision" => Ok(NodeKind::Decision),
            "answer" => Ok(NodeKind::Answer),
            other => Err(CoreError::Validation(format!(
                "Node type must be 'decision' or 'answer', got '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Root inference
// ---------------------------------------------------------------------------

/// Why a tree has no well-defined entry node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RootNotFound {
    /// The tree has no nodes at all.
    #[error("tree has no nodes")]
    NoNodes,

    /// Zero or more than one node is unreferenced by any option.
    ///
    /// `candidates == 0` means every node is some option's target (a cycle
    /// covering the whole tree); `candidates > 1` means several disconnected
    /// entry points exist. Either way the engine refuses to guess.
    #[error("tree has no unambiguous entry node ({candidates} candidates)")]
    Ambiguous { candidates: usize },
}

/// Infer the root of a tree from its node ids and option edge targets.
///
/// The root is the single node id absent from the set of non-null
/// `next_node_id` values. Degenerate shapes report [`RootNotFound`] rather
/// than silently picking a node.
pub fn infer_root(
    node_ids: &[DbId],
    edge_targets: &[Option<DbId>],
) -> Result<DbId, RootNotFound> {
    if node_ids.is_empty() {
        return Err(RootNotFound::NoNodes);
    }

    let referenced: HashSet<DbId> = edge_targets.iter().filter_map(|t| *t).collect();

    let mut candidates = node_ids.iter().filter(|id| !referenced.contains(*id));

    match (candidates.next(), candidates.next()) {
        (Some(&root), None) => Ok(root),
        (None, _) => Err(RootNotFound::Ambiguous { candidates: 0 }),
        (Some(_), Some(_)) => {
            // Count the rest for the diagnostic message.
            let total = node_ids
                .iter()
                .filter(|id| !referenced.contains(*id))
                .count();
            Err(RootNotFound::Ambiguous { candidates: total })
        }
    }
}
