//! Block payload builders for the chat surface.
//!
//! Everything here produces plain `serde_json::Value` block structures; the
//! platform's rendering kit is an external collaborator and this module is
//! the only place its shapes appear.

use guidetree_core::graph::RootNotFound;
use guidetree_core::view::{RenderedView, ViewBody};
use guidetree_db::models::node::Node;
use guidetree_db::models::node_option::NodeOption;
use guidetree_db::models::tree::Tree;
use serde_json::{json, Value};

use crate::chat::actions::Action;
use crate::engine::authoring::EditContext;

// ---------------------------------------------------------------------------
// Home surface
// ---------------------------------------------------------------------------

/// The app home tab: every tree with run/edit affordances, plus create.
pub fn home_view(trees: &[Tree]) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": "Decision Trees" }
        }),
        json!({
            "type": "actions",
            "elements": [button("New tree", Action::CreateTree.encode(), Some("primary"))]
        }),
        json!({ "type": "divider" }),
    ];

    for tree in trees {
        let description = tree.description.as_deref().unwrap_or("_No description_");
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*{}*\n{description}", tree.name) }
        }));
        blocks.push(json!({
            "type": "actions",
            "elements": [
                button("Run", Action::Run(tree.id).encode(), Some("primary")),
                button("Edit", Action::EditTree(tree.id).encode(), None),
                button("Edit in browser", Action::BrowserLink(tree.id).encode(), None),
            ]
        }));
    }

    json!({ "type": "home", "blocks": blocks })
}

// ---------------------------------------------------------------------------
// Navigation rendering
// ---------------------------------------------------------------------------

/// Render a navigation view as message blocks.
///
/// Decision nodes get one button per choice, each carrying the option id as
/// an opaque `nav:` action. Answer nodes are terminal: title, content, and
/// a completed marker -- no actionable controls.
pub fn navigation_blocks(view: &RenderedView) -> Value {
    let mut blocks = vec![json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": format!("*{}*", view.title) }
    })];

    if let Some(content) = &view.content {
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": content }
        }));
    }

    match &view.body {
        ViewBody::Terminal => {
            blocks.push(json!({
                "type": "context",
                "elements": [{ "type": "mrkdwn", "text": ":white_check_mark: Completed" }]
            }));
        }
        ViewBody::Decision { choices } if choices.is_empty() => {
            // An actions block with no elements is rejected by the platform.
            blocks.push(json!({
                "type": "context",
                "elements": [{ "type": "mrkdwn", "text": "_No options yet._" }]
            }));
        }
        ViewBody::Decision { choices } => {
            let elements: Vec<Value> = choices
                .iter()
                .map(|c| {
                    let label = if c.target_set {
                        c.label.clone()
                    } else {
                        format!("{} (not set)", c.label)
                    };
                    button(&label, Action::Navigate(c.option_id).encode(), None)
                })
                .collect();
            blocks.push(json!({ "type": "actions", "elements": elements }));
        }
    }

    Value::Array(blocks)
}

/// Fallback text for surfaces that cannot render blocks.
pub fn navigation_text(view: &RenderedView) -> String {
    view.title.clone()
}

/// User-facing copy for a tree with no well-defined entry point.
pub fn not_runnable_text(reason: RootNotFound) -> String {
    match reason {
        RootNotFound::NoNodes => "This tree has no nodes yet. Add a question first.".to_string(),
        RootNotFound::Ambiguous { .. } => {
            "This tree has no unambiguous starting question. \
             Make sure exactly one node is not the target of any option."
                .to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Editing modals
// ---------------------------------------------------------------------------

/// Modal for creating a new tree.
pub fn create_tree_modal() -> Value {
    modal(
        "create_tree",
        "New tree",
        Some("Create"),
        vec![
            text_input("name", "Name", None, false),
            text_input("description", "Description", None, true),
        ],
    )
}

/// The tree editor: name/description plus the node list with per-node
/// affordances. Re-rendered after every node-level command so the modal
/// always reflects persisted state.
pub fn tree_editor_modal(tree: &Tree, nodes: &[Node]) -> Value {
    let mut blocks = vec![
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*{}*", tree.name) },
            "accessory": button("Rename", Action::RenameTree(tree.id).encode(), None)
        }),
        json!({
            "type": "actions",
            "elements": [button("Add node", Action::AddNode(tree.id).encode(), Some("primary"))]
        }),
        json!({ "type": "divider" }),
    ];

    for node in nodes {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*{}* `{}`", node.title, node.node_type)
            }
        }));
        blocks.push(json!({
            "type": "actions",
            "elements": [
                button("Options", Action::OpenNode(node.id).encode(), None),
                button("Edit", Action::EditNode(node.id).encode(), None),
                button("Delete", Action::DeleteNode(node.id).encode(), Some("danger")),
            ]
        }));
    }

    modal_with_metadata(
        "tree_editor",
        "Edit tree",
        None,
        blocks,
        &EditContext::tree(tree.id),
    )
}

/// The node editor: the node's options with per-option affordances.
pub fn node_editor_modal(node: &Node, options: &[NodeOption], tree_nodes: &[Node]) -> Value {
    let mut blocks = vec![
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*{}* `{}`", node.title, node.node_type) }
        }),
        json!({
            "type": "actions",
            "elements": [button("Add option", Action::AddOption(node.id).encode(), Some("primary"))]
        }),
        json!({ "type": "divider" }),
    ];

    for option in options {
        let target = option
            .next_node_id
            .and_then(|id| tree_nodes.iter().find(|n| n.id == id))
            .map(|n| n.title.as_str())
            .unwrap_or("_not set_");
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": format!("*{}* → {target}", option.label) }
        }));
        blocks.push(json!({
            "type": "actions",
            "elements": [
                button("Edit", Action::EditOption(option.id).encode(), None),
                button("Delete", Action::DeleteOption(option.id).encode(), Some("danger")),
            ]
        }));
    }

    modal_with_metadata(
        "node_editor",
        "Edit node",
        None,
        blocks,
        &EditContext::node(node.tree_id, node.id),
    )
}

/// Form modal for renaming a tree / editing its description.
pub fn tree_info_modal(tree: &Tree) -> Value {
    modal_with_metadata(
        "submit_tree_info",
        "Tree info",
        Some("Save"),
        vec![
            text_input("name", "Name", Some(&tree.name), false),
            text_input(
                "description",
                "Description",
                tree.description.as_deref(),
                true,
            ),
        ],
        &EditContext::tree(tree.id),
    )
}

/// Form modal for creating or editing a node. `existing` pre-fills fields.
pub fn node_form_modal(tree_id: i64, existing: Option<&Node>) -> Value {
    let callback_id = match existing {
        Some(node) => format!("submit_node:{}", node.id),
        None => "submit_node:new".to_string(),
    };
    modal_with_metadata(
        &callback_id,
        if existing.is_some() { "Edit node" } else { "New node" },
        Some("Save"),
        vec![
            static_select(
                "node_type",
                "Type",
                &[("Decision", "decision"), ("Answer", "answer")],
                existing.map(|n| n.node_type.as_str()),
            ),
            text_input("title", "Title", existing.map(|n| n.title.as_str()), false),
            text_input(
                "content",
                "Content",
                existing.and_then(|n| n.content.as_deref()),
                true,
            ),
        ],
        &EditContext::tree(tree_id),
    )
}

/// Form modal for creating or editing an option under `node`.
///
/// The target select lists every node in the tree (same-tree targets only;
/// the authoring commands re-verify ownership on submit) plus a "not set"
/// entry.
pub fn option_form_modal(node: &Node, tree_nodes: &[Node], existing: Option<&NodeOption>) -> Value {
    let callback_id = match existing {
        Some(option) => format!("submit_option:{}", option.id),
        None => "submit_option:new".to_string(),
    };

    let mut targets: Vec<(String, String)> = vec![("Not set".to_string(), "none".to_string())];
    for n in tree_nodes {
        targets.push((n.title.clone(), n.id.to_string()));
    }
    let target_refs: Vec<(&str, &str)> = targets
        .iter()
        .map(|(l, v)| (l.as_str(), v.as_str()))
        .collect();

    let selected = existing
        .and_then(|o| o.next_node_id)
        .map(|id| id.to_string());

    modal_with_metadata(
        &callback_id,
        if existing.is_some() { "Edit option" } else { "New option" },
        Some("Save"),
        vec![
            text_input("label", "Label", existing.map(|o| o.label.as_str()), false),
            static_select("next_node", "Leads to", &target_refs, selected.as_deref()),
        ],
        &EditContext::node(node.tree_id, node.id),
    )
}

/// Configuration modal for a workflow step: which tree to run and into
/// which channel. Carries the platform's edit session id in its metadata.
pub fn workflow_config_modal(trees: &[(&str, &str)], edit_id: &str) -> Value {
    let mut view = modal(
        "workflow_config",
        "Run a decision tree",
        Some("Save"),
        vec![
            static_select("tree", "Tree", trees, None),
            text_input("channel", "Channel ID", None, false),
        ],
    );
    view["private_metadata"] = json!(edit_id);
    view
}

// ---------------------------------------------------------------------------
// Block primitives
// ---------------------------------------------------------------------------

fn button(text: &str, action_id: String, style: Option<&str>) -> Value {
    let mut b = json!({
        "type": "button",
        "text": { "type": "plain_text", "text": text },
        "action_id": action_id,
    });
    if let Some(style) = style {
        b["style"] = json!(style);
    }
    b
}

fn text_input(block_id: &str, label: &str, initial: Option<&str>, optional: bool) -> Value {
    let mut element = json!({
        "type": "plain_text_input",
        "action_id": "value",
        "multiline": block_id == "content" || block_id == "description",
    });
    if let Some(initial) = initial {
        element["initial_value"] = json!(initial);
    }
    json!({
        "type": "input",
        "block_id": block_id,
        "label": { "type": "plain_text", "text": label },
        "element": element,
        "optional": optional,
    })
}

fn static_select(
    block_id: &str,
    label: &str,
    options: &[(&str, &str)],
    selected: Option<&str>,
) -> Value {
    let opts: Vec<Value> = options
        .iter()
        .map(|(text, value)| {
            json!({
                "text": { "type": "plain_text", "text": text },
                "value": value,
            })
        })
        .collect();
    let mut element = json!({
        "type": "static_select",
        "action_id": "value",
        "options": opts,
    });
    if let Some(selected) = selected {
        if let Some(initial) = options.iter().find(|(_, v)| *v == selected) {
            element["initial_option"] = json!({
                "text": { "type": "plain_text", "text": initial.0 },
                "value": initial.1,
            });
        }
    }
    json!({
        "type": "input",
        "block_id": block_id,
        "label": { "type": "plain_text", "text": label },
        "element": element,
    })
}

fn modal(callback_id: &str, title: &str, submit: Option<&str>, blocks: Vec<Value>) -> Value {
    let mut view = json!({
        "type": "modal",
        "callback_id": callback_id,
        "title": { "type": "plain_text", "text": title },
        "close": { "type": "plain_text", "text": "Close" },
        "blocks": blocks,
    });
    // Display modals (tree and node editors) submit nothing; only form
    // modals get a submit button.
    if let Some(submit) = submit {
        view["submit"] = json!({ "type": "plain_text", "text": submit });
    }
    view
}

fn modal_with_metadata(
    callback_id: &str,
    title: &str,
    submit: Option<&str>,
    blocks: Vec<Value>,
    context: &EditContext,
) -> Value {
    let mut view = modal(callback_id, title, submit, blocks);
    view["private_metadata"] = json!(context.encode());
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use guidetree_core::view::Choice;

    fn tree(id: i64, name: &str) -> Tree {
        Tree {
            id,
            name: name.to_string(),
            description: None,
            is_active: true,
            created_by: "U1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn home_view_lists_every_tree() {
        let view = home_view(&[tree(1, "Alpha"), tree(2, "Beta")]);
        let rendered = view.to_string();
        assert!(rendered.contains("Alpha"));
        assert!(rendered.contains("Beta"));
        assert!(rendered.contains("run:1"));
        assert!(rendered.contains("run:2"));
    }

    #[test]
    fn decision_blocks_have_one_button_per_choice() {
        let view = RenderedView::decision(
            1,
            "Pick".to_string(),
            None,
            vec![
                Choice { option_id: 10, label: "Yes".into(), target_set: true },
                Choice { option_id: 11, label: "No".into(), target_set: true },
            ],
        );
        let blocks = navigation_blocks(&view);
        let rendered = blocks.to_string();
        assert!(rendered.contains("nav:10"));
        assert!(rendered.contains("nav:11"));
    }

    #[test]
    fn terminal_blocks_have_no_actions() {
        let view = RenderedView::terminal(1, "Done".to_string(), Some("All set".into()));
        let blocks = navigation_blocks(&view);
        let rendered = blocks.to_string();
        assert!(!rendered.contains("\"type\":\"actions\""));
        assert!(rendered.contains("Completed"));
    }

    #[test]
    fn unset_choice_is_labeled_not_set() {
        let view = RenderedView::decision(
            1,
            "Pick".to_string(),
            None,
            vec![Choice { option_id: 10, label: "Maybe".into(), target_set: false }],
        );
        assert!(navigation_blocks(&view).to_string().contains("Maybe (not set)"));
    }

    #[test]
    fn decision_without_options_renders_no_actions_block() {
        let view = RenderedView::decision(1, "Pick".to_string(), None, vec![]);
        let rendered = navigation_blocks(&view).to_string();
        assert!(!rendered.contains("\"type\":\"actions\""));
        assert!(rendered.contains("No options yet"));
    }

    #[test]
    fn display_modals_have_no_submit_button() {
        let t = tree(1, "Alpha");
        let editor = tree_editor_modal(&t, &[]);
        assert!(editor.get("submit").is_none());
        assert!(create_tree_modal().get("submit").is_some());
    }

    #[test]
    fn root_failure_copy_distinguishes_reasons() {
        assert_ne!(
            not_runnable_text(RootNotFound::NoNodes),
            not_runnable_text(RootNotFound::Ambiguous { candidates: 0 })
        );
    }
}
