//! Test fixtures for creating sample projects and test data.

use dc_protocol::callback::CallbackEvent;
use dc_protocol::document::SourceDocument;
use dc_protocol::run_models::RunId;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

/// Create a temporary project directory with a `.docchat` configuration.
///
/// Uses NDJSON framing, retrieves two documents and overrides the QA prompt.
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let dc_dir = temp_dir.path().join(".docchat");

    std::fs::create_dir_all(dc_dir.join("prompts"))?;

    let config_toml = r#"
qa_model = "test-model"
source_documents_total = 2
context_window = 1
stream_capacity = 2
framing = "ndjson"
"#;
    std::fs::write(dc_dir.join("config.toml"), config_toml)?;

    let qa_md = r#"---
name: qa
description: Test QA prompt
input_variables: [context, question]
---
CONTEXT
{context}
QUESTION
{question}"#;
    std::fs::write(dc_dir.join("prompts/qa.md"), qa_md)?;

    Ok(temp_dir)
}

/// A small corpus about Rust crates.
#[allow(dead_code)]
pub fn sample_documents() -> Vec<SourceDocument> {
    vec![
        SourceDocument::new("Tokio is an asynchronous runtime for Rust.", "tokio.md"),
        SourceDocument::new("Serde is a framework for serializing Rust data.", "serde.md"),
        SourceDocument::new("Clap parses command line arguments.", "clap.md")
            .with_metadata("page", json!(3)),
    ]
}

/// `{"sourceDocuments": [...]}` chain outputs.
#[allow(dead_code)]
pub fn outputs_with_documents(documents: &[SourceDocument]) -> Map<String, Value> {
    let mut outputs = Map::new();
    outputs.insert(
        "sourceDocuments".to_string(),
        serde_json::to_value(documents).expect("documents serialize"),
    );
    outputs
}

/// The canonical single-answer scenario: a chain wrapping one model run that
/// streams "Hello" and " world", ending with one source document.
#[allow(dead_code)]
pub fn hello_world_script() -> Vec<CallbackEvent> {
    let chain = RunId::from("c1");
    let llm = RunId::from("l1");

    vec![
        CallbackEvent::ChainStart { run_id: chain.clone() },
        CallbackEvent::LlmStart { run_id: llm.clone() },
        CallbackEvent::LlmNewToken {
            token: "Hello".to_string(),
            run_id: Some(llm.clone()),
        },
        CallbackEvent::LlmNewToken {
            token: " world".to_string(),
            run_id: Some(llm.clone()),
        },
        CallbackEvent::LlmEnd { run_id: llm },
        CallbackEvent::ChainEnd {
            run_id: chain,
            outputs: outputs_with_documents(&[SourceDocument::new("x", "a.pdf")]),
        },
    ]
}
