//! Terminal client for branching LLM conversations.
//!
//! History is a tree: editing or regenerating any message forks a sibling
//! branch, and arrow keys walk ancestors, children, and siblings. The core
//! tree/path semantics live in the `conversation_tree` crate; this crate is
//! the thin terminal shell around them: raw-mode input, ANSI rendering,
//! and the chat / loader / save / settings screens.
//!
//! ## Provider bootstrap
//!
//! The provider is configured through the settings screen (an
//! OpenAI-compatible chat-completions endpoint). Set `ARBOR_PROVIDER=mock`
//! to run offline against the deterministic mock provider.

pub mod input;
pub mod logging;
pub mod providers;
pub mod render;
pub mod screens;
pub mod term;
