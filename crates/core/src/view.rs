//! Presentation-agnostic rendered views for tree navigation.
//!
//! The navigation engine produces a [`RenderedView`]; the surrounding
//! surface (chat message, modal, workflow delivery) decides where to apply
//! it. No durable navigation state exists anywhere -- a view carries the
//! resolved node id and each choice carries its option id, and that is the
//! entire "session".

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A selectable option as rendered to the user.
#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    /// Opaque token the surface embeds in the control's action.
    pub option_id: DbId,
    pub label: String,
    /// `false` when the option's `next_node_id` is unset or dangling;
    /// such a choice renders as "not set" and selecting it is a no-op.
    pub target_set: bool,
}

/// The body of a rendered view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewBody {
    /// An answer node: title + content + completed marker, no controls.
    Terminal,
    /// A decision node: one actionable control per choice.
    Decision { choices: Vec<Choice> },
}

/// A renderable snapshot of one node, handed to whichever surface asked.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    pub node_id: DbId,
    pub title: String,
    pub content: Option<String>,
    pub body: ViewBody,
}

impl RenderedView {
    pub fn terminal(node_id: DbId, title: String, content: Option<String>) -> Self {
        Self {
            node_id,
            title,
            content,
            body: ViewBody::Terminal,
        }
    }

    pub fn decision(
        node_id: DbId,
        title: String,
        content: Option<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            node_id,
            title,
            content,
            body: ViewBody::Decision { choices },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.body, ViewBody::Terminal)
    }

    pub fn choices(&self) -> &[Choice] {
        match &self.body {
            ViewBody::Terminal => &[],
            ViewBody::Decision { choices } => choices,
        }
    }
}

/// The fields of an option row that choice ordering depends on.
///
/// Storage-layer option models convert into this; keeping a local struct
/// avoids a dependency on the db crate.
#[derive(Debug, Clone)]
pub struct OptionEdge {
    pub option_id: DbId,
    pub label: String,
    pub next_node_id: Option<DbId>,
    pub order_index: i32,
    pub created_at: Timestamp,
}

/// Order option edges for display: `order_index` ascending, ties broken by
/// creation order, then id for full determinism.
pub fn order_edges(mut edges: Vec<OptionEdge>) -> Vec<OptionEdge> {
    edges.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.option_id.cmp(&b.option_id))
    });
    edges
}

/// Build the choice list for a decision node from its option edges.
pub fn build_choices(edges: Vec<OptionEdge>) -> Vec<Choice> {
    order_edges(edges)
        .into_iter()
        .map(|e| Choice {
            option_id: e.option_id,
            label: e.label,
            target_set: e.next_node_id.is_some(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn edge(option_id: DbId, order_index: i32, created_secs: i64) -> OptionEdge {
        OptionEdge {
            option_id,
            label: format!("opt-{option_id}"),
            next_node_id: Some(99),
            order_index,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn orders_by_order_index() {
        let choices = build_choices(vec![edge(1, 2, 0), edge(2, 0, 0), edge(3, 1, 0)]);
        let ids: Vec<DbId> = choices.iter().map(|c| c.option_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn breaks_order_ties_by_creation_time() {
        let choices = build_choices(vec![edge(1, 0, 20), edge(2, 0, 10)]);
        let ids: Vec<DbId> = choices.iter().map(|c| c.option_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn dangling_edge_renders_as_not_set() {
        let mut e = edge(1, 0, 0);
        e.next_node_id = None;
        let choices = build_choices(vec![e]);
        assert!(!choices[0].target_set);
    }

    #[test]
    fn terminal_view_exposes_no_choices() {
        let view = RenderedView::terminal(1, "Done".into(), Some("All set".into()));
        assert!(view.is_terminal());
        assert!(view.choices().is_empty());
    }

    #[test]
    fn decision_view_exposes_all_choices() {
        let view = RenderedView::decision(
            1,
            "Pick".into(),
            None,
            build_choices(vec![edge(1, 0, 0), edge(2, 1, 0)]),
        );
        assert!(!view.is_terminal());
        assert_eq!(view.choices().len(), 2);
    }
}
