//! Branching conversation tree and its active-path synchronization.
//!
//! History is a tree, not a transcript: editing or regenerating any prior
//! message appends a sibling branch and never rewrites what was said. The
//! session keeps three things in lockstep:
//!
//! - the append-only [`MessageTree`] of id-addressed nodes,
//! - the current node selection,
//! - the [`ActivePath`], the ordered root-to-current `(role, content)` list
//!   that is the exact payload for the next completion request.
//!
//! All mutation funnels through [`ChatSession::dispatch`]; the path is only
//! ever changed through its own operations, never by ad hoc list edits, so
//! the "path equals root-to-current walk" invariant survives every command.
//!
//! The [`codec`] module round-trips a tree plus its current node through the
//! persisted JSON document format.

mod path;
mod session;
mod timestamp;
mod tree;

pub mod codec;

pub use path::{ActivePath, PathError};
pub use session::{ChatSession, Command, DispatchOutcome, SessionError};
pub use timestamp::{now_timestamp, TIMESTAMP_FORMAT};
pub use tree::{MessageTree, Node, NodeId, TreeError};
