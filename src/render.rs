//! ANSI rendering of the active conversation branch.
//!
//! Each message sits under a full-width rule carrying a centered
//! `time | depth | position/total` header colored by role, followed by the
//! raw content. Only the last few non-system messages of the active path
//! are painted; the system prompt stays out of view.

use chat_provider::Role;
use conversation_tree::{ChatSession, Node};
use unicode_width::UnicodeWidthStr;

/// How many trailing messages of the active path are rendered.
pub const RENDERED_MSGS: usize = 5;

pub const RESET: &str = "\x1b[0m";
pub const BOLD_RED: &str = "\x1b[1;31m";
pub const BOLD_GREEN: &str = "\x1b[1;32m";
pub const BOLD_BLUE: &str = "\x1b[1;34m";
pub const BOLD_WHITE: &str = "\x1b[1;37m";
pub const BOLD_CYAN: &str = "\x1b[1;36m";
pub const ON_BLUE: &str = "\x1b[44m";

const CONTROL_HINTS: &str = "\
up/down: walk the branch | left/right: switch sibling (right past the last regenerates)\r\n\
enter: new message | e: edit | s: settings | c: save & switch chat | q: save & quit";

fn role_style(role: Role) -> &'static str {
    match role {
        Role::Assistant => BOLD_RED,
        Role::User => BOLD_GREEN,
        Role::System => BOLD_BLUE,
    }
}

/// A plain horizontal rule.
#[must_use]
pub fn rule(style: &str, width: usize) -> String {
    format!("{style}{}{RESET}\r\n", "─".repeat(width.max(1)))
}

/// A horizontal rule with a centered header.
#[must_use]
pub fn rule_with_header(header: &str, style: &str, width: usize) -> String {
    let label = format!(" {header} ");
    let label_width = UnicodeWidthStr::width(label.as_str());
    if label_width + 2 > width {
        return format!("{style}{label}{RESET}\r\n");
    }

    let remaining = width - label_width;
    let left = remaining / 2;
    let right = remaining - left;
    format!(
        "{style}{}{label}{}{RESET}\r\n",
        "─".repeat(left),
        "─".repeat(right)
    )
}

/// Marks one picker row, inverting the selected entry.
#[must_use]
pub fn selectable_row(label: &str, selected: bool) -> String {
    if selected {
        format!("{ON_BLUE}{BOLD_WHITE}{label}{RESET}\r\n")
    } else {
        format!("{BOLD_CYAN}{label}{RESET}\r\n")
    }
}

/// Converts content newlines to CRLF for raw-mode output.
#[must_use]
pub fn to_terminal_lines(text: &str) -> String {
    text.replace('\n', "\r\n")
}

/// Renders one message: its header rule plus content.
#[must_use]
pub fn render_message(node: &Node, total: usize, position: usize, width: usize) -> String {
    let header = format!(
        "{} | {} | {}/{}",
        node.timestamp(),
        node.depth(),
        position,
        total
    );
    let style = role_style(node.role());
    format!(
        "{}{}\r\n",
        rule_with_header(&header, style, width),
        to_terminal_lines(node.content())
    )
}

/// Renders the tail of the active path plus the control-hints footer.
#[must_use]
pub fn render_chat(session: &ChatSession, width: usize) -> String {
    let tree = session.tree();
    let mut visible = Vec::new();
    let mut cursor = Some(session.current_id().clone());
    let mut remaining = RENDERED_MSGS;

    while remaining > 0 {
        let Some(id) = cursor else { break };
        let Some(node) = tree.node(&id) else { break };
        if node.role() != Role::System {
            visible.push(id.clone());
        }
        cursor = node.parent().cloned();
        remaining -= 1;
    }
    visible.reverse();

    let mut output = String::new();
    for id in &visible {
        if let (Some(node), Ok((total, position))) = (tree.node(id), tree.sibling_counts(id)) {
            output.push_str(&render_message(node, total, position, width));
        }
    }
    output.push_str(&rule(BOLD_WHITE, width));
    output.push_str(CONTROL_HINTS);
    output.push_str("\r\n");
    output.push_str(&rule(BOLD_WHITE, width));
    output
}

#[cfg(test)]
mod tests {
    use chat_provider::{ChatMessage, ChatProvider, GenerationError, ProviderProfile};
    use conversation_tree::{ChatSession, Command};

    use super::*;

    struct CannedProvider;

    impl ChatProvider for CannedProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "canned".to_string(),
                model_id: "canned".to_string(),
            }
        }

        fn generate(
            &self,
            _messages: &[ChatMessage],
            _on_chunk: &mut dyn FnMut(&str),
        ) -> Result<String, GenerationError> {
            Ok("reply".to_string())
        }
    }

    #[test]
    fn rule_with_header_fills_the_requested_width() {
        let line = rule_with_header("2026-01-05 09:00:00 | 2 | 1/1", BOLD_GREEN, 60);
        let stripped: String = line
            .replace(BOLD_GREEN, "")
            .replace(RESET, "")
            .trim_end()
            .to_string();
        assert_eq!(UnicodeWidthStr::width(stripped.as_str()), 60);
        assert!(stripped.contains("| 1/1"));
    }

    #[test]
    fn over_long_headers_degrade_to_the_bare_label() {
        let line = rule_with_header("a very long header", BOLD_GREEN, 10);
        assert!(line.contains("a very long header"));
    }

    #[test]
    fn chat_render_skips_the_system_prompt_and_limits_depth() {
        let mut session = ChatSession::new("the hidden system prompt").expect("session");
        for turn in 0..6 {
            session
                .dispatch(
                    Command::TypeMessage(format!("question {turn}")),
                    &CannedProvider,
                    &mut |_| {},
                )
                .expect("turn dispatches");
        }

        let output = render_chat(&session, 80);

        assert!(!output.contains("the hidden system prompt"));
        // The walk covers the last five nodes: replies 3..=5 plus
        // questions 4 and 5; older turns fall out of view.
        assert!(output.contains("question 5"));
        assert!(output.contains("question 4"));
        assert!(!output.contains("question 3"));
        assert!(output.contains("reply"));
    }
}
