use std::collections::HashMap;
use std::fmt;

use chat_provider::Role;
use thiserror::Error;
use uuid::Uuid;

/// Stable, opaque identifier of one conversation node.
///
/// Ids are generated at creation time and survive save/load unchanged, so a
/// persisted `cur_id` can be resolved against a reloaded tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unknown node id '{0}'")]
    UnknownNodeId(NodeId),
}

/// One message in the conversation tree.
///
/// Nodes are append-only: `role`, `content` and `timestamp` never change
/// after creation, and children are only ever appended, so sibling indices
/// are permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) role: Role,
    pub(crate) content: String,
    pub(crate) timestamp: String,
    pub(crate) depth: usize,
    pub(crate) sibling_index: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Distance from the root; the root has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 1-based position among this node's siblings, in creation order.
    #[must_use]
    pub fn sibling_index(&self) -> usize {
        self.sibling_index
    }

    #[must_use]
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Child ids in creation order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Append-only conversation tree.
///
/// Nodes live in a single id-keyed map; parent/child relations are ids, and
/// per-node child order is an explicit list, so no cyclic ownership exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
}

impl MessageTree {
    /// Creates a tree holding only its root node.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>, timestamp: impl Into<String>) -> Self {
        let id = NodeId::generate();
        let root = Node {
            id: id.clone(),
            role,
            content: content.into(),
            timestamp: timestamp.into(),
            depth: 0,
            sibling_index: 1,
            parent: None,
            children: Vec::new(),
        };

        let mut nodes = HashMap::new();
        nodes.insert(id.clone(), root);
        Self { nodes, root: id }
    }

    /// Appends a new child under `parent` and returns its id.
    ///
    /// The child's depth is `parent.depth + 1` and its sibling index is the
    /// next free slot in the parent's child list.
    pub fn create_child(
        &mut self,
        parent: &NodeId,
        role: Role,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        let (depth, sibling_index) = {
            let parent_node = self.get(parent)?;
            (parent_node.depth + 1, parent_node.children.len() + 1)
        };

        let id = NodeId::generate();
        let child = Node {
            id: id.clone(),
            role,
            content: content.into(),
            timestamp: timestamp.into(),
            depth,
            sibling_index,
            parent: Some(parent.clone()),
            children: Vec::new(),
        };

        self.nodes.insert(id.clone(), child);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id.clone());
        }

        Ok(id)
    }

    #[must_use]
    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[&self.root]
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get(&self, id: &NodeId) -> Result<&Node, TreeError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::UnknownNodeId(id.clone()))
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `(total, position)` among the node's siblings.
    ///
    /// A root reports `(1, 1)`. The persisted `index` field must stay
    /// consistent with this contract, which display code relies on.
    pub fn sibling_counts(&self, id: &NodeId) -> Result<(usize, usize), TreeError> {
        let node = self.get(id)?;
        match &node.parent {
            Some(parent) => {
                let parent_node = self.get(parent)?;
                Ok((parent_node.children.len(), node.sibling_index))
            }
            None => Ok((1, 1)),
        }
    }

    pub(crate) fn from_restored_parts(nodes: HashMap<NodeId, Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }
}
