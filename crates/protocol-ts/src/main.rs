//! Exports the client-facing dc-protocol types as TypeScript declarations.
//!
//! Usage: `dc-protocol-ts [OUT_DIR]` (defaults to `bindings/`).

use dc_protocol::{
    CallbackEvent, ChatConfig, ChatMessage, ChatRequest, FrameEvent, Framing, ParsedMessage,
    Role, SourceDocument,
};
use std::path::PathBuf;
use ts_rs::{ExportError, TS};

fn main() -> Result<(), ExportError> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bindings"));

    // export_all_to also writes every type these depend on
    SourceDocument::export_all_to(&out_dir)?;
    ParsedMessage::export_all_to(&out_dir)?;
    Role::export_all_to(&out_dir)?;
    ChatMessage::export_all_to(&out_dir)?;
    ChatRequest::export_all_to(&out_dir)?;
    Framing::export_all_to(&out_dir)?;
    FrameEvent::export_all_to(&out_dir)?;
    CallbackEvent::export_all_to(&out_dir)?;
    ChatConfig::export_all_to(&out_dir)?;

    println!("TypeScript bindings written to {}", out_dir.display());
    Ok(())
}
