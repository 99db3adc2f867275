use chat_provider::ChatMessage;
use thiserror::Error;

use crate::tree::{MessageTree, NodeId};

#[derive(Debug, Error)]
pub enum PathError {
    #[error("unknown node id '{0}'")]
    UnknownNodeId(NodeId),

    #[error("node '{0}' is not a child of the current node")]
    NotAChildOfCurrent(NodeId),

    #[error("node '{0}' is not a sibling of the current node")]
    NotASibling(NodeId),

    #[error("cannot ascend above the root")]
    AscendFromRoot,
}

/// The ordered `(role, content)` list from root to the current node.
///
/// This list is the exact payload for the next completion request. It is
/// built once per load and afterwards changed only through the operations
/// below, each O(1), so no navigation command re-walks the tree. After every
/// operation the list equals what a fresh root-to-current walk would
/// produce and its length equals `current.depth + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePath {
    current: NodeId,
    messages: Vec<ChatMessage>,
}

impl ActivePath {
    /// Builds the path by walking parent links from `current` to the root.
    pub fn from_tree(tree: &MessageTree, current: &NodeId) -> Result<Self, PathError> {
        let mut messages = Vec::new();
        let mut cursor = Some(current.clone());

        while let Some(id) = cursor {
            let node = tree
                .node(&id)
                .ok_or_else(|| PathError::UnknownNodeId(id.clone()))?;
            messages.push(ChatMessage::new(node.role(), node.content()));
            cursor = node.parent().cloned();
        }
        messages.reverse();

        Ok(Self {
            current: current.clone(),
            messages,
        })
    }

    #[must_use]
    pub fn current(&self) -> &NodeId {
        &self.current
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Moves to `to_child`, which must be a child of the current node.
    pub fn descend(&mut self, tree: &MessageTree, to_child: &NodeId) -> Result<(), PathError> {
        let current = tree
            .node(&self.current)
            .ok_or_else(|| PathError::UnknownNodeId(self.current.clone()))?;
        if !current.children().contains(to_child) {
            return Err(PathError::NotAChildOfCurrent(to_child.clone()));
        }

        let child = tree
            .node(to_child)
            .ok_or_else(|| PathError::UnknownNodeId(to_child.clone()))?;
        self.messages
            .push(ChatMessage::new(child.role(), child.content()));
        self.current = to_child.clone();
        Ok(())
    }

    /// Moves to the current node's parent.
    pub fn ascend(&mut self, tree: &MessageTree) -> Result<(), PathError> {
        let current = tree
            .node(&self.current)
            .ok_or_else(|| PathError::UnknownNodeId(self.current.clone()))?;
        let parent = current.parent().ok_or(PathError::AscendFromRoot)?.clone();

        self.messages.pop();
        self.current = parent;
        Ok(())
    }

    /// Moves sideways to `to_sibling`, which must share the current node's
    /// parent. Selecting the current node again is a no-op.
    pub fn switch_sibling(
        &mut self,
        tree: &MessageTree,
        to_sibling: &NodeId,
    ) -> Result<(), PathError> {
        let current = tree
            .node(&self.current)
            .ok_or_else(|| PathError::UnknownNodeId(self.current.clone()))?;
        let sibling = tree
            .node(to_sibling)
            .ok_or_else(|| PathError::UnknownNodeId(to_sibling.clone()))?;
        if current.parent().is_none() || current.parent() != sibling.parent() {
            return Err(PathError::NotASibling(to_sibling.clone()));
        }

        self.messages.pop();
        self.messages
            .push(ChatMessage::new(sibling.role(), sibling.content()));
        self.current = to_sibling.clone();
        Ok(())
    }

    /// Extends the path with a brand-new node (typed message or generated
    /// reply) created as a child of the current node.
    pub fn append_new(&mut self, tree: &MessageTree, node: &NodeId) -> Result<(), PathError> {
        self.descend(tree, node)
    }

    /// Replaces the active slot with a freshly created sibling, used when an
    /// edit supersedes the current node.
    pub fn replace_current(&mut self, tree: &MessageTree, node: &NodeId) -> Result<(), PathError> {
        self.switch_sibling(tree, node)
    }
}
