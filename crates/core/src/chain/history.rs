//! Chat history preparation.

use dc_protocol::chat_models::{ChatMessage, Role};
use dc_protocol::framing::SOURCE_DOCUMENTS_SEPARATOR;

/// Drop a framed source document block from a message, if present.
pub fn strip_source_documents(content: &str) -> &str {
    match content.find(SOURCE_DOCUMENTS_SEPARATOR) {
        Some(index) => content[..index].trim_end(),
        None => content,
    }
}

/// Prepare the history for the question generator.
///
/// Non-user messages lose their source document block, and only the last
/// `context_window` exchanges (two messages each) are kept.
pub fn format_chat_history(history: &[ChatMessage], context_window: usize) -> Vec<ChatMessage> {
    let keep = context_window.saturating_mul(2);
    let skip = history.len().saturating_sub(keep);

    history[skip..]
        .iter()
        .map(|message| match message.role {
            Role::User => message.clone(),
            role => ChatMessage {
                role,
                content: strip_source_documents(&message.content).to_string(),
            },
        })
        .collect()
}

/// Render the history as the transcript the condense prompt expects.
pub fn render_chat_history(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|message| {
            let speaker = match message.role {
                Role::User => "Human",
                Role::Assistant => "Assistant",
                Role::System => "System",
            };
            format!("{speaker}: {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
