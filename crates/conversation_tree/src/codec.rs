use std::collections::{HashMap, VecDeque};

use chat_provider::{InvalidRole, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{MessageTree, Node, NodeId};

/// Top-level persisted document: the root message plus the id of the node
/// that was current when the chat was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedChat {
    pub cur_id: String,
    pub messages: SavedNode,
}

/// One persisted message; `next` holds children in creation order.
///
/// All fields are required. `depth` and `index` are trusted as written and
/// not recomputed on load, so a hand-edited document can produce an
/// inconsistent tree; partial documents are rejected wholesale instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNode {
    pub id: String,
    pub role: String,
    pub content: String,
    pub time: String,
    pub depth: usize,
    pub index: usize,
    pub next: Vec<SavedNode>,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed chat document: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    #[error(transparent)]
    InvalidRole(#[from] InvalidRole),

    #[error("chat document contains duplicate node id '{id}'")]
    DuplicateNodeId { id: String },

    #[error("failed to serialize chat document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Emits the whole tree plus `current` as a persistable document.
///
/// Children are emitted in live (creation) order. The traversal keeps an
/// explicit stack so arbitrarily deep conversations cannot overflow the
/// call stack.
#[must_use]
pub fn serialize(tree: &MessageTree, current: &NodeId) -> SavedChat {
    enum Frame<'a> {
        Visit(&'a NodeId),
        Assemble(&'a NodeId),
    }

    let mut stack = vec![Frame::Visit(tree.root_id())];
    let mut built: Vec<SavedNode> = Vec::new();

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Visit(id) => {
                let node = tree.node(id).expect("tree ids resolve during traversal");
                stack.push(Frame::Assemble(id));
                for child in node.children().iter().rev() {
                    stack.push(Frame::Visit(child));
                }
            }
            Frame::Assemble(id) => {
                let node = tree.node(id).expect("tree ids resolve during traversal");
                let children = built.split_off(built.len() - node.children().len());
                built.push(SavedNode {
                    id: node.id().to_string(),
                    role: node.role().as_str().to_string(),
                    content: node.content().to_string(),
                    time: node.timestamp().to_string(),
                    depth: node.depth(),
                    index: node.sibling_index(),
                    next: children,
                });
            }
        }
    }

    let messages = built.pop().expect("traversal yields exactly the root");
    SavedChat {
        cur_id: current.to_string(),
        messages,
    }
}

/// Rebuilds a tree from a persisted document.
///
/// Returns the tree plus the node matching `cur_id`, or `None` when no node
/// carries that id (corrupt or foreign file); the caller then treats the
/// root as current.
pub fn deserialize(document: SavedChat) -> Result<(MessageTree, Option<NodeId>), CodecError> {
    let SavedChat { cur_id, messages } = document;

    let mut nodes: HashMap<NodeId, Node> = HashMap::new();
    let mut current: Option<NodeId> = None;
    let root_id = NodeId::new(messages.id.clone());

    let mut queue: VecDeque<(SavedNode, Option<NodeId>)> = VecDeque::new();
    queue.push_back((messages, None));

    while let Some((saved, parent)) = queue.pop_front() {
        let SavedNode {
            id,
            role,
            content,
            time,
            depth,
            index,
            next,
        } = saved;

        let node_id = NodeId::new(id);
        if nodes.contains_key(&node_id) {
            return Err(CodecError::DuplicateNodeId {
                id: node_id.to_string(),
            });
        }
        if node_id.as_str() == cur_id {
            current = Some(node_id.clone());
        }

        let node = Node {
            id: node_id.clone(),
            role: Role::parse(&role)?,
            content,
            timestamp: time,
            depth,
            sibling_index: index,
            parent: parent.clone(),
            children: Vec::new(),
        };
        nodes.insert(node_id.clone(), node);

        if let Some(parent_id) = parent {
            if let Some(parent_node) = nodes.get_mut(&parent_id) {
                parent_node.children.push(node_id.clone());
            }
        }

        for child in next {
            queue.push_back((child, Some(node_id.clone())));
        }
    }

    Ok((MessageTree::from_restored_parts(nodes, root_id), current))
}

/// Parses a persisted chat from its JSON text form.
pub fn from_json(input: &str) -> Result<(MessageTree, Option<NodeId>), CodecError> {
    let document =
        serde_json::from_str::<SavedChat>(input).map_err(CodecError::MalformedDocument)?;
    deserialize(document)
}

/// Renders the tree plus `current` as pretty-printed JSON.
pub fn to_json_pretty(tree: &MessageTree, current: &NodeId) -> Result<String, CodecError> {
    serde_json::to_string_pretty(&serialize(tree, current)).map_err(CodecError::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branching_tree() -> (MessageTree, NodeId) {
        let mut tree = MessageTree::new(Role::System, "be concise", "2026-01-05 09:00:00");
        let root = tree.root_id().clone();
        let question = tree
            .create_child(&root, Role::User, "what is ownership?", "2026-01-05 09:00:01")
            .expect("question node");
        tree.create_child(&question, Role::Assistant, "a move model", "2026-01-05 09:00:02")
            .expect("first answer");
        let second_answer = tree
            .create_child(&question, Role::Assistant, "a borrow model", "2026-01-05 09:00:03")
            .expect("second answer");
        (tree, second_answer)
    }

    #[test]
    fn serialize_emits_live_child_order_and_cur_id() {
        let (tree, current) = branching_tree();
        let document = serialize(&tree, &current);

        assert_eq!(document.cur_id, current.to_string());
        assert_eq!(document.messages.role, "system");
        assert_eq!(document.messages.next.len(), 1);

        let question = &document.messages.next[0];
        assert_eq!(question.index, 1);
        assert_eq!(question.next.len(), 2);
        assert_eq!(question.next[0].content, "a move model");
        assert_eq!(question.next[1].content, "a borrow model");
        assert_eq!(question.next[1].index, 2);
    }

    #[test]
    fn round_trip_restores_tree_and_current() {
        let (tree, current) = branching_tree();
        let document = serialize(&tree, &current);

        let (restored, restored_current) =
            deserialize(document).expect("document round-trips");

        assert_eq!(restored, tree);
        assert_eq!(restored_current, Some(current));
    }

    #[test]
    fn json_round_trip_preserves_structure() {
        let (tree, current) = branching_tree();
        let json = to_json_pretty(&tree, &current).expect("tree serializes");

        let (restored, restored_current) = from_json(&json).expect("json parses");

        assert_eq!(restored, tree);
        assert_eq!(restored_current, Some(current));
    }

    #[test]
    fn dangling_cur_id_yields_no_current() {
        let (tree, current) = branching_tree();
        let mut document = serialize(&tree, &current);
        document.cur_id = "not-a-node".to_string();

        let (restored, restored_current) =
            deserialize(document).expect("dangling cur_id is non-fatal");

        assert_eq!(restored.len(), tree.len());
        assert_eq!(restored_current, None);
    }

    #[test]
    fn missing_required_fields_are_rejected_wholesale() {
        let error = from_json(r#"{"cur_id":"x","messages":{"id":"x","content":"hi"}}"#)
            .expect_err("missing fields should fail");

        assert!(matches!(error, CodecError::MalformedDocument(_)));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let json = r#"{
            "cur_id": "r",
            "messages": {
                "id": "r", "role": "narrator", "content": "hi",
                "time": "2026-01-05 09:00:00", "depth": 0, "index": 1, "next": []
            }
        }"#;

        let error = from_json(json).expect_err("unknown role should fail");
        assert!(matches!(error, CodecError::InvalidRole(_)));
        assert!(error.to_string().contains("narrator"));
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let json = r#"{
            "cur_id": "r",
            "messages": {
                "id": "r", "role": "system", "content": "hi",
                "time": "2026-01-05 09:00:00", "depth": 0, "index": 1,
                "next": [
                    {"id": "r", "role": "user", "content": "again",
                     "time": "2026-01-05 09:00:01", "depth": 1, "index": 1, "next": []}
                ]
            }
        }"#;

        let error = from_json(json).expect_err("duplicate ids should fail");
        assert!(matches!(error, CodecError::DuplicateNodeId { .. }));
    }

    #[test]
    fn deep_chain_serializes_without_recursion() {
        let mut tree = MessageTree::new(Role::System, "s", "2026-01-05 09:00:00");
        let mut tip = tree.root_id().clone();
        for turn in 0..4096 {
            let role = if turn % 2 == 0 { Role::User } else { Role::Assistant };
            tip = tree
                .create_child(&tip, role, format!("turn {turn}"), "2026-01-05 09:00:01")
                .expect("chain node");
        }

        let document = serialize(&tree, &tip);
        let (restored, restored_current) = deserialize(document).expect("deep chain restores");

        assert_eq!(restored.len(), tree.len());
        assert_eq!(restored_current, Some(tip));
    }
}
