use chat_provider::{ChatMessage, ChatProvider, Role};
use thiserror::Error;

use crate::codec::{self, SavedChat};
use crate::path::{ActivePath, PathError};
use crate::timestamp::now_timestamp;
use crate::tree::{MessageTree, Node, NodeId, TreeError};

/// Navigation/editing commands recognized by [`ChatSession::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    TypeMessage(String),
    EditCurrent(String),
    Generate,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::TypeMessage(_) => "type_message",
            Self::EditCurrent(_) => "edit_current",
            Self::Generate => "generate",
        }
    }
}

/// What a dispatched command did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing changed (no-op navigation at an edge of the tree).
    Idle,
    /// The tree and/or the selected position changed without a generation.
    Moved,
    /// A generation call completed; its result (content or error text) is
    /// now the current node.
    Generated,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("failed to format current timestamp: {0}")]
    Clock(#[from] time::error::Format),
}

/// One open conversation: the tree, the current node, and the active path,
/// kept in lockstep.
///
/// The triple is a single unit; commands are processed one at a time to
/// completion (a generation blocks the command loop until the provider
/// terminates), so no internal locking exists. Hosts embedding this in a
/// concurrent setting must serialize whole commands externally.
#[derive(Debug)]
pub struct ChatSession {
    tree: MessageTree,
    path: ActivePath,
}

impl ChatSession {
    /// Starts a fresh conversation holding only a system-prompt root.
    pub fn new(system_prompt: impl Into<String>) -> Result<Self, SessionError> {
        let tree = MessageTree::new(Role::System, system_prompt, now_timestamp()?);
        let path = ActivePath::from_tree(&tree, tree.root_id())?;
        Ok(Self { tree, path })
    }

    /// Restores a session from a loaded tree.
    ///
    /// `current = None` (e.g. a dangling `cur_id`) selects the root.
    pub fn from_parts(tree: MessageTree, current: Option<NodeId>) -> Result<Self, SessionError> {
        let current = current.unwrap_or_else(|| tree.root_id().clone());
        let path = ActivePath::from_tree(&tree, &current)?;
        Ok(Self { tree, path })
    }

    #[must_use]
    pub fn tree(&self) -> &MessageTree {
        &self.tree
    }

    #[must_use]
    pub fn current_id(&self) -> &NodeId {
        self.path.current()
    }

    #[must_use]
    pub fn current(&self) -> &Node {
        self.tree
            .node(self.path.current())
            .expect("current id always resolves in the session tree")
    }

    /// The exact message payload for the next completion request.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.path.messages()
    }

    /// Emits the persistable document for this session (`serializeForSave`).
    #[must_use]
    pub fn to_document(&self) -> SavedChat {
        codec::serialize(&self.tree, self.path.current())
    }

    /// Applies one command, mutating tree + path and triggering generation
    /// where the command implies it. Generation failures are recorded as
    /// assistant content, never returned as errors.
    pub fn dispatch(
        &mut self,
        command: Command,
        provider: &dyn ChatProvider,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<DispatchOutcome, SessionError> {
        tracing::debug!(command = command.name(), "dispatching command");

        match command {
            Command::MoveUp => {
                if self.current().is_root() {
                    return Ok(DispatchOutcome::Idle);
                }
                self.path.ascend(&self.tree)?;
                Ok(DispatchOutcome::Moved)
            }

            Command::MoveDown => {
                let Some(first_child) = self.current().children().first().cloned() else {
                    return Ok(DispatchOutcome::Idle);
                };
                self.path.descend(&self.tree, &first_child)?;
                Ok(DispatchOutcome::Moved)
            }

            Command::MoveLeft => {
                let current = self.current();
                let Some(parent) = current.parent().cloned() else {
                    return Ok(DispatchOutcome::Idle);
                };
                let position = current.sibling_index();
                if position == 1 {
                    // First sibling re-selects itself.
                    return Ok(DispatchOutcome::Idle);
                }
                let target = self.tree.get(&parent)?.children()[position - 2].clone();
                self.path.switch_sibling(&self.tree, &target)?;
                Ok(DispatchOutcome::Moved)
            }

            Command::MoveRight => {
                let current = self.current();
                let Some(parent) = current.parent().cloned() else {
                    return Ok(DispatchOutcome::Idle);
                };
                let position = current.sibling_index();
                let siblings = self.tree.get(&parent)?.children();
                if position < siblings.len() {
                    let target = siblings[position].clone();
                    self.path.switch_sibling(&self.tree, &target)?;
                    return Ok(DispatchOutcome::Moved);
                }

                // Past the last sibling: regenerate a new branch under the
                // parent, which becomes the new last sibling and current.
                self.path.ascend(&self.tree)?;
                self.generate(provider, on_chunk)?;
                Ok(DispatchOutcome::Generated)
            }

            Command::TypeMessage(text) => {
                let current = self.path.current().clone();
                let typed =
                    self.tree
                        .create_child(&current, Role::User, text, now_timestamp()?)?;
                self.path.append_new(&self.tree, &typed)?;
                self.generate(provider, on_chunk)?;
                Ok(DispatchOutcome::Generated)
            }

            Command::EditCurrent(text) => {
                let current = self.current();
                let Some(parent) = current.parent().cloned() else {
                    // The root/system message is not editable.
                    return Ok(DispatchOutcome::Idle);
                };
                let role = current.role();
                let edited = self
                    .tree
                    .create_child(&parent, role, text, now_timestamp()?)?;
                self.path.replace_current(&self.tree, &edited)?;

                if role == Role::User {
                    self.generate(provider, on_chunk)?;
                    Ok(DispatchOutcome::Generated)
                } else {
                    Ok(DispatchOutcome::Moved)
                }
            }

            Command::Generate => {
                self.generate(provider, on_chunk)?;
                Ok(DispatchOutcome::Generated)
            }
        }
    }

    /// Invokes the provider with the current path and appends the outcome as
    /// an assistant child of the current node. A failed call is recorded as
    /// a visible message, not retried.
    fn generate(
        &mut self,
        provider: &dyn ChatProvider,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<(), SessionError> {
        tracing::debug!(messages = self.path.len(), "requesting completion");

        let content = match provider.generate(self.path.messages(), on_chunk) {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(error = %error, "generation failed; recording error as reply");
                error.message().to_string()
            }
        };

        let current = self.path.current().clone();
        let reply =
            self.tree
                .create_child(&current, Role::Assistant, content, now_timestamp()?)?;
        self.path.append_new(&self.tree, &reply)?;
        Ok(())
    }
}
