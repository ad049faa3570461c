//! Chat engine.
//!
//! The ChatEngine turns a chat request into a streamed answer. It opens a
//! multiplexed answer stream, runs the retrieval chain in the background
//! with the stream handlers attached, and hands the readable side back to
//! the caller right away.

use crate::chain::model::{ChatModel, Retriever};
use crate::chain::retrieval_qa::{ChainInput, ConversationalRetrievalChain};
use crate::config::models::AppConfig;
use crate::stream::callbacks::{CallbackManager, TracingHandler};
use crate::stream::multiplexer::{open, ResponseStream, StreamObserver, StreamOptions};
use dc_protocol::chat_models::ChatRequest;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised before a chat request starts streaming.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The request carried no messages, so there is no question to answer.
    #[error("Chat request has no messages")]
    EmptyConversation,
}

/// Answers chat requests with a streamed, framed response.
#[derive(Clone)]
pub struct ChatEngine {
    chain: Arc<ConversationalRetrievalChain>,
    options: StreamOptions,
    verbose: bool,
}

impl ChatEngine {
    /// Create a ChatEngine around a chain with default stream options.
    pub fn new(chain: ConversationalRetrievalChain) -> Self {
        Self {
            chain: Arc::new(chain),
            options: StreamOptions::default(),
            verbose: false,
        }
    }

    /// Create a ChatEngine using the chain limits, framing, buffer size and
    /// verbosity of a loaded configuration.
    pub fn from_config(
        config: &AppConfig,
        question_generator: Arc<dyn ChatModel>,
        qa_model: Arc<dyn ChatModel>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        let chain =
            ConversationalRetrievalChain::from_config(config, question_generator, qa_model, retriever);

        Self::new(chain)
            .with_stream_options(StreamOptions::from_config(&config.chat))
            .with_verbose(config.chat.verbose)
    }

    pub fn with_stream_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    /// Log every run of the chain through `tracing`.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn stream_options(&self) -> StreamOptions {
        self.options
    }

    /// Answer a chat request.
    ///
    /// Returns the answer stream immediately; the chain runs on a spawned
    /// task and writes into it. A chain failure shows up as the stream's
    /// final `Err` item. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyConversation` if the request has no
    /// messages.
    pub fn respond(
        &self,
        request: &ChatRequest,
        observer: Option<Arc<dyn StreamObserver>>,
    ) -> Result<ResponseStream, EngineError> {
        let input = ChainInput::from_request(request).ok_or(EngineError::EmptyConversation)?;

        tracing::info!(
            history = input.chat_history.len(),
            framing = %self.options.framing,
            "Answering chat request"
        );

        let (stream, handlers) = open(self.options, observer);

        let mut callbacks = CallbackManager::new().with_handler(Arc::new(handlers));
        if self.verbose {
            callbacks = callbacks.with_handler(Arc::new(TracingHandler));
        }

        let chain = Arc::clone(&self.chain);
        tokio::spawn(async move {
            if let Err(error) = chain.call(&input, &callbacks).await {
                tracing::warn!(error = %error, "Chat chain failed");
            }
        });

        Ok(stream)
    }
}
