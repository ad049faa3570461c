//! Replay of recorded callback sequences.
//!
//! A script is a JSON-lines file with one [`CallbackEvent`] per line. Blank
//! lines and lines starting with `#` are skipped:
//!
//! ```text
//! # single streamed answer
//! {"type":"chainStart","payload":{"run_id":"run1"}}
//! {"type":"llmNewToken","payload":{"token":"Hello "}}
//! {"type":"chainEnd","payload":{"run_id":"run1","outputs":{"sourceDocuments":[]}}}
//! ```

use crate::chain::error::ChainError;
use crate::stream::callbacks::CallbackHandler;
use anyhow::{Context, Result};
use dc_protocol::callback::CallbackEvent;
use std::path::Path;

/// Invoke the hook matching `event` on `handler`.
pub async fn dispatch(handler: &dyn CallbackHandler, event: &CallbackEvent) {
    match event {
        CallbackEvent::LlmStart { run_id } => handler.handle_llm_start(run_id).await,
        CallbackEvent::LlmNewToken { token, run_id } => {
            handler.handle_llm_new_token(token, run_id.as_ref()).await
        }
        CallbackEvent::LlmEnd { run_id } => handler.handle_llm_end(run_id).await,
        CallbackEvent::LlmError { run_id, error } => {
            handler
                .handle_llm_error(&ChainError::Model(error.clone()), run_id)
                .await
        }
        CallbackEvent::ChainStart { run_id } => handler.handle_chain_start(run_id).await,
        CallbackEvent::ChainEnd { run_id, outputs } => {
            handler.handle_chain_end(outputs, run_id).await
        }
        CallbackEvent::ChainError { run_id, error } => {
            handler
                .handle_chain_error(&ChainError::Run(error.clone()), run_id)
                .await
        }
        CallbackEvent::ToolStart { run_id } => handler.handle_tool_start(run_id).await,
        CallbackEvent::ToolEnd { run_id, output } => handler.handle_tool_end(output, run_id).await,
        CallbackEvent::ToolError { run_id, error } => {
            handler
                .handle_tool_error(&ChainError::Tool(error.clone()), run_id)
                .await
        }
    }
}

/// Dispatch every event in order, awaiting each hook before the next.
pub async fn replay<'a, I>(handler: &dyn CallbackHandler, events: I)
where
    I: IntoIterator<Item = &'a CallbackEvent>,
{
    for event in events {
        dispatch(handler, event).await;
    }
}

/// Parse a JSON-lines callback script.
pub fn parse_script(content: &str) -> Result<Vec<CallbackEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line.trim())
                .with_context(|| format!("Invalid callback event on line {line_number}", line_number = index + 1))
        })
        .collect()
}

/// Read and parse a callback script from disk.
pub fn load_script(path: &Path) -> Result<Vec<CallbackEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read callback script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("Failed to parse callback script {}", path.display()))
}
