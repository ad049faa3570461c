//! Single-writer side of the answer stream.
//!
//! `FramedWriter` owns the active run set and the only sender of the output
//! channel. Every operation takes the same async mutex and holds it until
//! the channel accepted the chunk, so writes never interleave and a slow
//! consumer throttles every producer.

use crate::chain::error::ChainError;
use crate::stream::error::StreamError;
use dc_protocol::framing::Framing;
use dc_protocol::run_models::{RunId, RunKind};
use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::{mpsc, Mutex};

/// Item carried by the output channel.
pub type StreamItem = Result<String, StreamError>;

/// Lifecycle state of an answer stream.
///
/// Open -> Closed once the last active run ends, or Open -> Aborted on the
/// first run error. Both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Accepting writes.
    Open,
    /// End of stream signaled (or the consumer went away).
    Closed,
    /// A run failed and the error was delivered to the consumer.
    Aborted,
}

pub(crate) struct FramedWriter {
    framing: Framing,
    inner: Mutex<WriterInner>,
}

struct WriterInner {
    state: StreamState,
    runs: HashSet<RunId>,
    /// Set by the first run start; an empty run set only closes the stream
    /// after it has held at least one run.
    started: bool,
    tx: Option<mpsc::Sender<StreamItem>>,
}

impl FramedWriter {
    pub(crate) fn new(framing: Framing, tx: mpsc::Sender<StreamItem>) -> Self {
        Self {
            framing,
            inner: Mutex::new(WriterInner {
                state: StreamState::Open,
                runs: HashSet::new(),
                started: false,
                tx: Some(tx),
            }),
        }
    }

    pub(crate) async fn state(&self) -> StreamState {
        self.inner.lock().await.state
    }

    pub(crate) async fn active_runs(&self) -> usize {
        self.inner.lock().await.runs.len()
    }

    pub(crate) async fn start_run(&self, kind: RunKind, run_id: &RunId) {
        let mut inner = self.inner.lock().await;
        if inner.state != StreamState::Open {
            tracing::debug!(kind = %kind, run_id = %run_id, state = ?inner.state, "Ignoring run start on terminated stream");
            return;
        }

        inner.runs.insert(run_id.clone());
        inner.started = true;
        tracing::debug!(kind = %kind, run_id = %run_id, active = inner.runs.len(), "Run started");
    }

    pub(crate) async fn write_token(&self, token: &str) {
        let mut inner = self.inner.lock().await;
        if inner.state != StreamState::Open {
            tracing::debug!(state = ?inner.state, "Ignoring token on terminated stream");
            return;
        }

        match self.framing.encode_token(token) {
            Ok(chunk) => inner.send(chunk).await,
            Err(error) => tracing::warn!(error = %error, "Failed to encode token"),
        }
    }

    /// End a run, first writing the document block when one is given.
    pub(crate) async fn end_run(&self, kind: RunKind, run_id: &RunId, documents: Option<&Value>) {
        let mut inner = self.inner.lock().await;
        if inner.state != StreamState::Open {
            tracing::debug!(kind = %kind, run_id = %run_id, state = ?inner.state, "Ignoring run end on terminated stream");
            return;
        }

        if let Some(documents) = documents {
            match self.framing.encode_documents(documents) {
                Ok(block) => inner.send(block).await,
                Err(error) => tracing::warn!(run_id = %run_id, error = %error, "Failed to encode source documents"),
            }
        }

        inner.runs.remove(run_id);
        tracing::debug!(kind = %kind, run_id = %run_id, active = inner.runs.len(), "Run ended");

        if inner.state == StreamState::Open && inner.started && inner.runs.is_empty() {
            match self.framing.encode_done() {
                Ok(Some(trailer)) => inner.send(trailer).await,
                Ok(None) => {}
                Err(error) => tracing::warn!(error = %error, "Failed to encode stream trailer"),
            }
            inner.close();
        }
    }

    /// Abort the stream with a run's error, regardless of other active runs.
    pub(crate) async fn abort(&self, kind: RunKind, run_id: &RunId, error: &ChainError) {
        let mut inner = self.inner.lock().await;
        inner.runs.remove(run_id);
        if inner.state != StreamState::Open {
            tracing::debug!(kind = %kind, run_id = %run_id, state = ?inner.state, "Ignoring run error on terminated stream");
            return;
        }

        inner.state = StreamState::Aborted;
        tracing::info!(kind = %kind, run_id = %run_id, error = %error, "Answer stream aborted");

        if let Some(tx) = inner.tx.take() {
            let item = Err(StreamError::RunFailed {
                kind,
                run_id: run_id.clone(),
                source: error.clone(),
            });
            if tx.send(item).await.is_err() {
                tracing::debug!("Answer stream consumer already gone; abort not delivered");
            }
        }
    }
}

impl WriterInner {
    async fn send(&mut self, chunk: String) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };

        if tx.send(Ok(chunk)).await.is_err() {
            tracing::warn!("Answer stream consumer dropped; discarding further output");
            self.tx = None;
            self.state = StreamState::Closed;
        }
    }

    fn close(&mut self) {
        // Dropping the only sender ends the receiving stream
        self.tx = None;
        self.state = StreamState::Closed;
        tracing::info!("Answer stream closed");
    }
}
