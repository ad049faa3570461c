//! Integration tests for the answer stream multiplexer.
//!
//! These tests verify that the multiplexer:
//! - Closes only when every started run has ended
//! - Aborts exactly once on the first run error
//! - Ignores writes after a terminal state
//! - Serializes writes and applies backpressure from a slow consumer

mod common;

use common::*;
use dc_core::chain::error::ChainError;
use dc_core::stream::{open, replay, CallbackHandler, StreamError, StreamOptions, StreamState};
use dc_protocol::framing::{parse_message, parse_ndjson, Framing, SOURCE_DOCUMENTS_SEPARATOR};
use dc_protocol::run_models::{RunId, RunKind};
use serde_json::{json, Map};
use std::time::Duration;
use tokio_stream::StreamExt;

#[tokio::test]
async fn test_single_answer_scenario() {
    let (stream, handlers) = open(StreamOptions::default(), None);
    let run = RunId::from("run1");

    handlers.handle_chain_start(&run).await;
    handlers.handle_llm_new_token("Hello ", Some(&run)).await;
    handlers.handle_llm_new_token("world", Some(&run)).await;
    handlers
        .handle_chain_end(
            &outputs_with_documents(&[dc_protocol::SourceDocument::new("doc1", "a.pdf")]),
            &run,
        )
        .await;

    assert_eq!(handlers.state().await, StreamState::Closed);
    assert_eq!(
        stream.collect_text().await.unwrap(),
        "Hello world\n##SOURCE_DOCUMENTS##[{\"pageContent\":\"doc1\",\"metadata\":{\"source\":\"a.pdf\"}}]"
    );
}

#[tokio::test]
async fn test_error_aborts_while_sibling_active() {
    let (stream, handlers) = open(StreamOptions::default(), None);
    let run1 = RunId::from("run1");
    let run2 = RunId::from("run2");

    handlers.handle_llm_start(&run1).await;
    handlers.handle_llm_start(&run2).await;
    handlers.handle_llm_end(&run1).await;

    assert_eq!(handlers.state().await, StreamState::Open);
    assert_eq!(handlers.active_runs().await, 1);

    let error = ChainError::Model("rate limited".to_string());
    handlers.handle_llm_error(&error, &run2).await;

    assert_eq!(handlers.state().await, StreamState::Aborted);
    assert_eq!(handlers.active_runs().await, 0);

    match stream.collect_text().await {
        Err(StreamError::RunFailed { kind, run_id, source }) => {
            assert_eq!(kind, RunKind::Llm);
            assert_eq!(run_id, run2);
            assert_eq!(source, error);
        }
        other => panic!("Expected RunFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_closes_only_after_last_end() {
    // Every order in which three nested runs can end
    let orders: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for order in orders {
        let (stream, handlers) = open(StreamOptions::default(), None);
        let runs: Vec<RunId> = (0..3).map(|i| RunId::from(format!("run{i}"))).collect();

        handlers.handle_chain_start(&runs[0]).await;
        handlers.handle_llm_start(&runs[1]).await;
        handlers.handle_tool_start(&runs[2]).await;

        for (position, &index) in order.iter().enumerate() {
            assert_eq!(
                handlers.state().await,
                StreamState::Open,
                "closed early for order {:?}",
                order
            );
            match index {
                0 => handlers.handle_chain_end(&Map::new(), &runs[0]).await,
                1 => handlers.handle_llm_end(&runs[1]).await,
                _ => handlers.handle_tool_end("done", &runs[2]).await,
            }
            assert_eq!(handlers.active_runs().await, 2 - position);
        }

        assert_eq!(handlers.state().await, StreamState::Closed);
        assert_eq!(stream.collect_text().await.unwrap(), "");
    }
}

#[tokio::test]
async fn test_writes_after_abort_are_ignored() {
    let (stream, handlers) = open(StreamOptions::default(), None);
    let chain = RunId::from("chain");
    let tool = RunId::from("tool");
    let llm = RunId::from("llm");

    handlers.handle_chain_start(&chain).await;
    handlers.handle_tool_start(&tool).await;
    handlers.handle_llm_start(&llm).await;
    handlers.handle_llm_new_token("partial", Some(&llm)).await;
    handlers
        .handle_tool_error(&ChainError::Tool("search timed out".to_string()), &tool)
        .await;

    // Siblings keep reporting after the abort
    handlers.handle_llm_new_token(" more", Some(&llm)).await;
    handlers.handle_llm_end(&llm).await;
    handlers
        .handle_chain_end(&outputs_with_documents(&sample_documents()), &chain)
        .await;
    handlers
        .handle_chain_error(&ChainError::Run("late".to_string()), &chain)
        .await;
    handlers.handle_llm_start(&RunId::from("new")).await;

    assert_eq!(handlers.state().await, StreamState::Aborted);

    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 2, "partial chunk then exactly one error");
    assert_eq!(items[0], Ok("partial".to_string()));
    match &items[1] {
        Err(error) => {
            assert_eq!(error.cause(), &ChainError::Tool("search timed out".to_string()));
            assert_contains_ci(&error.to_string(), "tool run tool failed");
        }
        Ok(chunk) => panic!("Expected error, got chunk {:?}", chunk),
    }
}

#[tokio::test]
async fn test_writes_after_close_are_ignored() {
    let (stream, handlers) = open(StreamOptions::default(), None);
    let run = RunId::from("run1");

    handlers.handle_llm_start(&run).await;
    handlers.handle_llm_new_token("done", Some(&run)).await;
    handlers.handle_llm_end(&run).await;

    handlers.handle_llm_new_token("late", Some(&run)).await;
    handlers.handle_llm_end(&run).await;
    handlers
        .handle_llm_error(&ChainError::Model("late".to_string()), &run)
        .await;

    assert_eq!(handlers.state().await, StreamState::Closed);
    assert_eq!(stream.collect_text().await.unwrap(), "done");
}

#[tokio::test]
async fn test_end_of_unknown_run_before_any_start_keeps_stream_open() {
    let (_stream, handlers) = open(StreamOptions::default(), None);

    handlers.handle_llm_end(&RunId::from("ghost")).await;

    assert_eq!(handlers.state().await, StreamState::Open);
}

#[tokio::test]
async fn test_null_source_documents_write_no_block() {
    let (stream, handlers) = open(StreamOptions::default(), None);
    let run = RunId::from("chain");

    let mut outputs = Map::new();
    outputs.insert("sourceDocuments".to_string(), serde_json::Value::Null);

    handlers.handle_chain_start(&run).await;
    handlers.handle_llm_new_token("answer", None).await;
    handlers.handle_chain_end(&outputs, &run).await;

    let text = stream.collect_text().await.unwrap();
    assert_eq!(text, "answer");
    assert!(!text.contains(SOURCE_DOCUMENTS_SEPARATOR));
}

#[tokio::test]
async fn test_documents_reach_the_client_unchanged() {
    let documents = json!([
        {"pageContent": "doc1", "metadata": {"source": "a.pdf"}, "id": "7"},
        {"metadata": {"source": "b.pdf", "loc": {"lines": {"from": 3, "to": 8}}}},
        "loose note"
    ]);

    for framing in [Framing::Sentinel, Framing::Ndjson] {
        let (stream, handlers) = open(StreamOptions::default().with_framing(framing), None);
        let run = RunId::from("chain");

        let mut outputs = Map::new();
        outputs.insert("sourceDocuments".to_string(), documents.clone());

        handlers.handle_chain_start(&run).await;
        handlers.handle_llm_new_token("answer", None).await;
        handlers.handle_chain_end(&outputs, &run).await;

        let text = stream.collect_text().await.unwrap();
        let parsed = framing.parse(&text);
        assert_eq!(
            serde_json::Value::Array(parsed.documents.clone()),
            documents,
            "documents changed under {framing} framing"
        );
        assert_eq!(parsed.sources(), vec![Some("a.pdf"), Some("b.pdf"), None]);
    }

    // The sentinel parser sees the same list a client would
    let (stream, handlers) = open(StreamOptions::default(), None);
    let run = RunId::from("chain");
    let mut outputs = Map::new();
    outputs.insert("sourceDocuments".to_string(), documents.clone());
    handlers.handle_chain_start(&run).await;
    handlers.handle_chain_end(&outputs, &run).await;

    let parsed = parse_message(&stream.collect_text().await.unwrap());
    assert_eq!(parsed.answer, "\n");
    assert_eq!(parsed.documents.len(), 3);
}

#[tokio::test]
async fn test_dropped_consumer_closes_stream() {
    let (stream, handlers) = open(StreamOptions::default().with_capacity(1), None);
    let run = RunId::from("run1");

    handlers.handle_llm_start(&run).await;
    drop(stream);

    // Would block forever on a full buffer if the dropped reader were not noticed
    let result = tokio::time::timeout(Duration::from_secs(1), async {
        for _ in 0..5 {
            handlers.handle_llm_new_token("x", Some(&run)).await;
        }
        handlers.handle_llm_end(&run).await;
    })
    .await;

    assert!(result.is_ok(), "writes to a dropped consumer must not hang");
    assert_eq!(handlers.state().await, StreamState::Closed);
}

#[tokio::test]
async fn test_slow_consumer_throttles_producer() {
    let (mut stream, handlers) = open(StreamOptions::default().with_capacity(1), None);

    let mut producer = tokio::spawn(async move {
        let run = RunId::from("run1");
        handlers.handle_llm_start(&run).await;
        for token in ["a", "b", "c", "d"] {
            handlers.handle_llm_new_token(token, Some(&run)).await;
        }
        handlers.handle_llm_end(&run).await;
    });

    // One chunk fits in the buffer, the producer must then wait for us
    let blocked = tokio::time::timeout(Duration::from_millis(50), &mut producer).await;
    assert!(blocked.is_err(), "producer finished without a reader");

    let mut text = String::new();
    while let Some(item) = stream.next().await {
        text.push_str(&item.unwrap());
    }

    producer.await.unwrap();
    assert_eq!(text, "abcd");
}

#[tokio::test]
async fn test_concurrent_runs_share_one_stream() {
    let (stream, handlers) = open(StreamOptions::default().with_capacity(4), None);
    let chain = RunId::from("chain");

    handlers.handle_chain_start(&chain).await;

    let mut tasks = Vec::new();
    for i in 0..10 {
        let handlers = handlers.clone();
        tasks.push(tokio::spawn(async move {
            let run = RunId::from(format!("llm{i}"));
            handlers.handle_llm_start(&run).await;
            handlers.handle_llm_new_token("[token]", Some(&run)).await;
            handlers.handle_llm_end(&run).await;
        }));
    }

    let reader = tokio::spawn(stream.collect_text());

    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(handlers.state().await, StreamState::Open);

    handlers
        .handle_chain_end(&outputs_with_documents(&sample_documents()[..1]), &chain)
        .await;

    let text = reader.await.unwrap().unwrap();
    // Chunks never interleave at the byte level
    assert_eq!(text.matches("[token]").count(), 10);
    assert_occurs_once(&text, SOURCE_DOCUMENTS_SEPARATOR);
    assert_framed_answer(&text, &format!("{}\n", "[token]".repeat(10)), &["tokio.md"]);
}

#[tokio::test]
async fn test_replayed_script_matches_direct_calls() {
    let (stream, handlers) = open(StreamOptions::default(), None);

    replay(&handlers, &hello_world_script()).await;

    let text = stream.collect_text().await.unwrap();
    assert_eq!(
        text,
        "Hello world\n##SOURCE_DOCUMENTS##[{\"pageContent\":\"x\",\"metadata\":{\"source\":\"a.pdf\"}}]"
    );
    assert_framed_answer(&text, "Hello world\n", &["a.pdf"]);
}

#[tokio::test]
async fn test_ndjson_framing() {
    let (stream, handlers) = open(StreamOptions::default().with_framing(Framing::Ndjson), None);

    replay(&handlers, &hello_world_script()).await;

    let text = stream.collect_text().await.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], r#"{"type":"token","text":"Hello"}"#);
    assert_eq!(lines[3], r#"{"type":"done"}"#);

    let parsed = parse_ndjson(&text);
    assert_eq!(parsed.answer, "Hello world");
    assert_eq!(parsed.documents.len(), 1);
    assert_eq!(parsed.sources()[0], Some("a.pdf"));
}

#[tokio::test]
async fn test_ndjson_tokens_may_contain_separator() {
    let (stream, handlers) = open(StreamOptions::default().with_framing(Framing::Ndjson), None);
    let run = RunId::from("llm");

    handlers.handle_llm_start(&run).await;
    handlers
        .handle_llm_new_token("literal ##SOURCE_DOCUMENTS## text", Some(&run))
        .await;
    handlers.handle_llm_end(&run).await;

    let parsed = Framing::Ndjson.parse(&stream.collect_text().await.unwrap());
    assert_eq!(parsed.answer, "literal ##SOURCE_DOCUMENTS## text");
    assert!(parsed.documents.is_empty());
}
