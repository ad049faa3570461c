//! Lifecycle callback surface.
//!
//! The chain runtime reports every run through a [`CallbackHandler`]: one
//! start/end/error triple per run kind (model, chain, tool) plus new tokens
//! from streaming models. All hooks default to no-ops so handlers only
//! implement what they observe.

use crate::chain::error::ChainError;
use async_trait::async_trait;
use dc_protocol::run_models::RunId;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Output mapping of a chain run.
pub type ChainValues = Map<String, Value>;

/// Key under which a chain reports its retrieved source documents.
pub const SOURCE_DOCUMENTS_KEY: &str = "sourceDocuments";

/// Receives lifecycle callbacks from models, chains and tools.
///
/// Hooks are awaited by the runtime, so a handler can apply backpressure
/// simply by not returning until it is ready for more.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    async fn handle_llm_start(&self, _run_id: &RunId) {}

    async fn handle_llm_new_token(&self, _token: &str, _run_id: Option<&RunId>) {}

    async fn handle_llm_end(&self, _run_id: &RunId) {}

    async fn handle_llm_error(&self, _error: &ChainError, _run_id: &RunId) {}

    async fn handle_chain_start(&self, _run_id: &RunId) {}

    async fn handle_chain_end(&self, _outputs: &ChainValues, _run_id: &RunId) {}

    async fn handle_chain_error(&self, _error: &ChainError, _run_id: &RunId) {}

    async fn handle_tool_start(&self, _run_id: &RunId) {}

    async fn handle_tool_end(&self, _output: &str, _run_id: &RunId) {}

    async fn handle_tool_error(&self, _error: &ChainError, _run_id: &RunId) {}
}

/// Fans every callback out to a list of handlers, in registration order.
#[derive(Clone, Default)]
pub struct CallbackManager {
    handlers: Vec<Arc<dyn CallbackHandler>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler.
    pub fn with_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[async_trait]
impl CallbackHandler for CallbackManager {
    async fn handle_llm_start(&self, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_llm_start(run_id).await;
        }
    }

    async fn handle_llm_new_token(&self, token: &str, run_id: Option<&RunId>) {
        for handler in &self.handlers {
            handler.handle_llm_new_token(token, run_id).await;
        }
    }

    async fn handle_llm_end(&self, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_llm_end(run_id).await;
        }
    }

    async fn handle_llm_error(&self, error: &ChainError, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_llm_error(error, run_id).await;
        }
    }

    async fn handle_chain_start(&self, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_chain_start(run_id).await;
        }
    }

    async fn handle_chain_end(&self, outputs: &ChainValues, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_chain_end(outputs, run_id).await;
        }
    }

    async fn handle_chain_error(&self, error: &ChainError, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_chain_error(error, run_id).await;
        }
    }

    async fn handle_tool_start(&self, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_tool_start(run_id).await;
        }
    }

    async fn handle_tool_end(&self, output: &str, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_tool_end(output, run_id).await;
        }
    }

    async fn handle_tool_error(&self, error: &ChainError, run_id: &RunId) {
        for handler in &self.handlers {
            handler.handle_tool_error(error, run_id).await;
        }
    }
}

/// Logs every callback through `tracing`.
///
/// Attached when `verbose` is enabled in the chat configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHandler;

#[async_trait]
impl CallbackHandler for TracingHandler {
    async fn handle_llm_start(&self, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, "[llm/start]");
    }

    async fn handle_llm_new_token(&self, token: &str, run_id: Option<&RunId>) {
        tracing::trace!(run_id = ?run_id.map(RunId::as_str), token, "[llm/token]");
    }

    async fn handle_llm_end(&self, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, "[llm/end]");
    }

    async fn handle_llm_error(&self, error: &ChainError, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, error = %error, "[llm/error]");
    }

    async fn handle_chain_start(&self, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, "[chain/start]");
    }

    async fn handle_chain_end(&self, outputs: &ChainValues, run_id: &RunId) {
        let keys: Vec<&str> = outputs.keys().map(String::as_str).collect();
        tracing::debug!(run_id = %run_id, outputs = ?keys, "[chain/end]");
    }

    async fn handle_chain_error(&self, error: &ChainError, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, error = %error, "[chain/error]");
    }

    async fn handle_tool_start(&self, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, "[tool/start]");
    }

    async fn handle_tool_end(&self, output: &str, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, output_len = output.len(), "[tool/end]");
    }

    async fn handle_tool_error(&self, error: &ChainError, run_id: &RunId) {
        tracing::debug!(run_id = %run_id, error = %error, "[tool/error]");
    }
}
