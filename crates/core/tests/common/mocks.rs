//! Mock collaborators for deterministic testing.

use async_trait::async_trait;
use dc_core::chain::error::{ChainError, ChainResult};
use dc_core::chain::model::Retriever;
use dc_core::stream::callbacks::{CallbackHandler, ChainValues};
use dc_protocol::document::SourceDocument;
use dc_protocol::run_models::RunId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A retriever that always fails.
#[allow(dead_code)]
pub struct FailingRetriever {
    pub message: String,
}

impl FailingRetriever {
    #[allow(dead_code)]
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Retriever for FailingRetriever {
    async fn retrieve(&self, _query: &str, _k: usize) -> ChainResult<Vec<SourceDocument>> {
        Err(ChainError::Retrieval(self.message.clone()))
    }
}

/// A retriever that returns a fixed list after a delay and records queries.
#[allow(dead_code)]
#[derive(Clone)]
pub struct FixedRetriever {
    documents: Vec<SourceDocument>,
    delay: Duration,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FixedRetriever {
    #[allow(dead_code)]
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self {
            documents,
            delay: Duration::ZERO,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[allow(dead_code)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[allow(dead_code)]
    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> ChainResult<Vec<SourceDocument>> {
        self.queries.lock().await.push(query.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.documents.iter().take(k).cloned().collect())
    }
}

/// Records every callback as a short string such as `chain_end:c1`.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<String>>,
}

impl RecordingHandler {
    #[allow(dead_code)]
    pub async fn events(&self) -> Vec<String> {
        self.events.lock().await.clone()
    }

    async fn push(&self, event: String) {
        self.events.lock().await.push(event);
    }
}

#[async_trait]
impl CallbackHandler for RecordingHandler {
    async fn handle_llm_start(&self, run_id: &RunId) {
        self.push(format!("llm_start:{run_id}")).await;
    }

    async fn handle_llm_new_token(&self, token: &str, _run_id: Option<&RunId>) {
        self.push(format!("token:{token}")).await;
    }

    async fn handle_llm_end(&self, run_id: &RunId) {
        self.push(format!("llm_end:{run_id}")).await;
    }

    async fn handle_llm_error(&self, error: &ChainError, run_id: &RunId) {
        self.push(format!("llm_error:{run_id}:{error}")).await;
    }

    async fn handle_chain_start(&self, run_id: &RunId) {
        self.push(format!("chain_start:{run_id}")).await;
    }

    async fn handle_chain_end(&self, _outputs: &ChainValues, run_id: &RunId) {
        self.push(format!("chain_end:{run_id}")).await;
    }

    async fn handle_chain_error(&self, error: &ChainError, run_id: &RunId) {
        self.push(format!("chain_error:{run_id}:{error}")).await;
    }

    async fn handle_tool_start(&self, run_id: &RunId) {
        self.push(format!("tool_start:{run_id}")).await;
    }

    async fn handle_tool_end(&self, output: &str, run_id: &RunId) {
        self.push(format!("tool_end:{run_id}:{output}")).await;
    }

    async fn handle_tool_error(&self, error: &ChainError, run_id: &RunId) {
        self.push(format!("tool_error:{run_id}:{error}")).await;
    }
}
