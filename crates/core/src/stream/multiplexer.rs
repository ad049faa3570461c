//! Answer stream multiplexer.
//!
//! [`open`] returns a pair: the readable [`ResponseStream`] handed to the
//! HTTP layer, and the [`StreamHandlers`] callback object handed to the
//! chain runtime. Every model, chain and tool run registers itself through
//! the handlers; tokens are written as they arrive, the chain's source
//! documents are appended as one framed block, and the stream closes when
//! the last run ends or aborts on the first run error.
//!
//! # Example
//!
//! ```
//! use dc_core::stream::{open, CallbackHandler, StreamOptions};
//! use dc_protocol::RunId;
//!
//! # async fn example() {
//! let (stream, handlers) = open(StreamOptions::default(), None);
//! let run = RunId::from("run1");
//!
//! tokio::spawn(async move {
//!     handlers.handle_llm_start(&run).await;
//!     handlers.handle_llm_new_token("Hello", Some(&run)).await;
//!     handlers.handle_llm_end(&run).await;
//! });
//!
//! assert_eq!(stream.collect_text().await.unwrap(), "Hello");
//! # }
//! ```

use crate::chain::error::ChainError;
use crate::stream::callbacks::{CallbackHandler, ChainValues, SOURCE_DOCUMENTS_KEY};
use crate::stream::error::StreamError;
use crate::stream::writer::{FramedWriter, StreamItem, StreamState};
use async_trait::async_trait;
use dc_protocol::config_models::ChatConfig;
use dc_protocol::framing::Framing;
use dc_protocol::run_models::{RunId, RunKind};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};

/// Default number of chunks buffered before writers wait.
pub const DEFAULT_STREAM_CAPACITY: usize = 32;

/// Options for opening an answer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Wire framing of tokens and the document block.
    pub framing: Framing,

    /// Chunks buffered between writers and the consumer. Clamped to at least 1.
    pub capacity: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            framing: Framing::Sentinel,
            capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

impl StreamOptions {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            framing: config.framing,
            capacity: config.stream_capacity,
        }
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Observes the readable side of an answer stream.
///
/// Called from inside the consumer's poll, in stream order.
pub trait StreamObserver: Send + Sync {
    /// The consumer started reading.
    fn on_start(&self) {}

    /// A chunk was delivered to the consumer.
    fn on_token(&self, _chunk: &str) {}

    /// The stream closed normally; `text` is everything that was delivered.
    fn on_completion(&self, _text: &str) {}

    /// The stream was aborted.
    fn on_error(&self, _error: &StreamError) {}
}

/// Readable side of an answer stream.
///
/// Yields text chunks in write order and ends either normally or with a
/// single `Err` item after the chunks written before the abort.
pub struct ResponseStream {
    inner: Pin<Box<dyn Stream<Item = StreamItem> + Send>>,
}

impl ResponseStream {
    /// Read the whole stream, failing on abort.
    pub async fn collect_text(self) -> Result<String, StreamError> {
        let (text, error) = self.collect_partial().await;
        match error {
            Some(error) => Err(error),
            None => Ok(text),
        }
    }

    /// Read the whole stream, keeping the partial text on abort.
    pub async fn collect_partial(mut self) -> (String, Option<StreamError>) {
        let mut text = String::new();
        while let Some(item) = self.next().await {
            match item {
                Ok(chunk) => text.push_str(&chunk),
                Err(error) => return (text, Some(error)),
            }
        }
        (text, None)
    }
}

impl Stream for ResponseStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Callback object that writes into one answer stream.
///
/// Cheap to clone; all clones share the same run set and writer.
#[derive(Clone)]
pub struct StreamHandlers {
    writer: Arc<FramedWriter>,
}

impl StreamHandlers {
    /// Current lifecycle state of the stream.
    pub async fn state(&self) -> StreamState {
        self.writer.state().await
    }

    /// Number of runs currently in flight.
    pub async fn active_runs(&self) -> usize {
        self.writer.active_runs().await
    }
}

#[async_trait]
impl CallbackHandler for StreamHandlers {
    async fn handle_llm_start(&self, run_id: &RunId) {
        self.writer.start_run(RunKind::Llm, run_id).await;
    }

    async fn handle_llm_new_token(&self, token: &str, _run_id: Option<&RunId>) {
        self.writer.write_token(token).await;
    }

    async fn handle_llm_end(&self, run_id: &RunId) {
        self.writer.end_run(RunKind::Llm, run_id, None).await;
    }

    async fn handle_llm_error(&self, error: &ChainError, run_id: &RunId) {
        self.writer.abort(RunKind::Llm, run_id, error).await;
    }

    async fn handle_chain_start(&self, run_id: &RunId) {
        self.writer.start_run(RunKind::Chain, run_id).await;
    }

    async fn handle_chain_end(&self, outputs: &ChainValues, run_id: &RunId) {
        let documents = outputs
            .get(SOURCE_DOCUMENTS_KEY)
            .filter(|documents| !documents.is_null());
        self.writer.end_run(RunKind::Chain, run_id, documents).await;
    }

    async fn handle_chain_error(&self, error: &ChainError, run_id: &RunId) {
        self.writer.abort(RunKind::Chain, run_id, error).await;
    }

    async fn handle_tool_start(&self, run_id: &RunId) {
        self.writer.start_run(RunKind::Tool, run_id).await;
    }

    async fn handle_tool_end(&self, _output: &str, run_id: &RunId) {
        self.writer.end_run(RunKind::Tool, run_id, None).await;
    }

    async fn handle_tool_error(&self, error: &ChainError, run_id: &RunId) {
        self.writer.abort(RunKind::Tool, run_id, error).await;
    }
}

/// Open a new answer stream.
///
/// Returns immediately. The stream stays open until every run that was
/// started through the handlers has ended, or until any run errors.
pub fn open(
    options: StreamOptions,
    observer: Option<Arc<dyn StreamObserver>>,
) -> (ResponseStream, StreamHandlers) {
    let (tx, rx) = mpsc::channel(options.capacity.max(1));
    let writer = Arc::new(FramedWriter::new(options.framing, tx));

    let stream = ResponseStream {
        inner: Box::pin(observe(rx, observer)),
    };

    (stream, StreamHandlers { writer })
}

fn observe(
    mut rx: mpsc::Receiver<StreamItem>,
    observer: Option<Arc<dyn StreamObserver>>,
) -> impl Stream<Item = StreamItem> + Send {
    async_stream::stream! {
        if let Some(observer) = &observer {
            observer.on_start();
        }

        let mut text = String::new();
        let mut aborted = false;

        while let Some(item) = rx.recv().await {
            match item {
                Ok(chunk) => {
                    if let Some(observer) = &observer {
                        observer.on_token(&chunk);
                        text.push_str(&chunk);
                    }
                    yield Ok(chunk);
                }
                Err(error) => {
                    if let Some(observer) = &observer {
                        observer.on_error(&error);
                    }
                    aborted = true;
                    yield Err(error);
                    break;
                }
            }
        }

        if !aborted {
            if let Some(observer) = &observer {
                observer.on_completion(&text);
            }
        }
    }
}
