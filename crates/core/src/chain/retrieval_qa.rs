//! Conversational retrieval chain.
//!
//! Condenses a follow-up question against the chat history, retrieves source
//! documents for it, and streams the answer from the QA model. Every step is
//! reported through a [`CallbackHandler`], which is how the answer reaches
//! the multiplexed response stream.

use crate::chain::error::{ChainError, ChainResult};
use crate::chain::history::{format_chat_history, render_chat_history};
use crate::chain::model::{ChatModel, Retriever};
use crate::config::models::{AppConfig, PromptSet};
use crate::stream::callbacks::{CallbackHandler, ChainValues, SOURCE_DOCUMENTS_KEY};
use dc_protocol::chat_models::{ChatMessage, ChatRequest};
use dc_protocol::document::SourceDocument;
use dc_protocol::run_models::RunId;
use serde_json::Value;
use std::sync::Arc;
use tokio_stream::StreamExt;

/// Key of the answer text in the chain outputs.
pub const TEXT_KEY: &str = "text";

/// A question plus the conversation that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInput {
    pub question: String,
    pub chat_history: Vec<ChatMessage>,
}

impl ChainInput {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            chat_history: Vec::new(),
        }
    }

    pub fn with_history(mut self, chat_history: Vec<ChatMessage>) -> Self {
        self.chat_history = chat_history;
        self
    }

    /// Returns `None` for a request without messages.
    pub fn from_request(request: &ChatRequest) -> Option<Self> {
        request.split().map(|(question, history)| Self {
            question: question.to_string(),
            chat_history: history.to_vec(),
        })
    }
}

#[derive(Clone)]
pub struct ConversationalRetrievalChain {
    question_generator: Arc<dyn ChatModel>,
    qa_model: Arc<dyn ChatModel>,
    retriever: Arc<dyn Retriever>,
    prompts: PromptSet,
    source_documents_total: usize,
    context_window: usize,
    return_source_documents: bool,
}

impl ConversationalRetrievalChain {
    pub fn new(
        question_generator: Arc<dyn ChatModel>,
        qa_model: Arc<dyn ChatModel>,
        retriever: Arc<dyn Retriever>,
        prompts: PromptSet,
    ) -> Self {
        Self {
            question_generator,
            qa_model,
            retriever,
            prompts,
            source_documents_total: 4,
            context_window: 10,
            return_source_documents: true,
        }
    }

    /// Build a chain with the prompts and limits of a loaded configuration.
    pub fn from_config(
        config: &AppConfig,
        question_generator: Arc<dyn ChatModel>,
        qa_model: Arc<dyn ChatModel>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        Self::new(
            question_generator,
            qa_model,
            retriever,
            config.prompts.clone(),
        )
        .with_source_documents_total(config.chat.source_documents_total)
        .with_context_window(config.chat.context_window)
    }

    pub fn with_source_documents_total(mut self, total: usize) -> Self {
        self.source_documents_total = total;
        self
    }

    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    /// Whether the outputs carry the retrieved documents under `sourceDocuments`.
    pub fn with_return_source_documents(mut self, enabled: bool) -> Self {
        self.return_source_documents = enabled;
        self
    }

    /// Run the chain as one chain run.
    ///
    /// Returns `{"text": answer, "sourceDocuments": [...]}`. On failure the
    /// error hook of the failing run and of every enclosing chain run fires
    /// before the error is returned.
    pub async fn call(
        &self,
        input: &ChainInput,
        callbacks: &dyn CallbackHandler,
    ) -> ChainResult<ChainValues> {
        let run_id = RunId::new();
        callbacks.handle_chain_start(&run_id).await;

        match self.run(input, callbacks).await {
            Ok(outputs) => {
                callbacks.handle_chain_end(&outputs, &run_id).await;
                Ok(outputs)
            }
            Err(error) => {
                callbacks.handle_chain_error(&error, &run_id).await;
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        input: &ChainInput,
        callbacks: &dyn CallbackHandler,
    ) -> ChainResult<ChainValues> {
        let history = format_chat_history(&input.chat_history, self.context_window);

        let question = if history.is_empty() {
            input.question.clone()
        } else {
            self.condense_question(&input.question, &history, callbacks)
                .await?
        };

        let documents = self
            .retriever
            .retrieve(&question, self.source_documents_total)
            .await?;
        tracing::debug!(
            question = %question,
            documents = documents.len(),
            "Retrieved source documents"
        );

        let context = documents
            .iter()
            .map(|document| document.page_content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = self
            .prompts
            .qa
            .format(&[("context", &context), ("question", &question)])?;

        let text = self.stream_answer(&prompt, callbacks).await?;

        let mut outputs = ChainValues::new();
        outputs.insert(TEXT_KEY.to_string(), Value::String(text));
        if self.return_source_documents {
            outputs.insert(
                SOURCE_DOCUMENTS_KEY.to_string(),
                documents_value(&documents)?,
            );
        }

        Ok(outputs)
    }

    /// Nested chain run that rephrases the question with the history.
    async fn condense_question(
        &self,
        question: &str,
        history: &[ChatMessage],
        callbacks: &dyn CallbackHandler,
    ) -> ChainResult<String> {
        let run_id = RunId::new();
        callbacks.handle_chain_start(&run_id).await;

        let result = self
            .generate_standalone_question(question, history, callbacks)
            .await;

        match &result {
            Ok(standalone) => {
                let mut outputs = ChainValues::new();
                outputs.insert(TEXT_KEY.to_string(), Value::String(standalone.clone()));
                callbacks.handle_chain_end(&outputs, &run_id).await;
            }
            Err(error) => callbacks.handle_chain_error(error, &run_id).await,
        }

        result
    }

    async fn generate_standalone_question(
        &self,
        question: &str,
        history: &[ChatMessage],
        callbacks: &dyn CallbackHandler,
    ) -> ChainResult<String> {
        let chat_history = render_chat_history(history);
        let prompt = self
            .prompts
            .condense_question
            .format(&[("question", question), ("chat_history", &chat_history)])?;

        let run_id = RunId::new();
        callbacks.handle_llm_start(&run_id).await;

        match self.question_generator.generate(&prompt).await {
            Ok(text) => {
                callbacks.handle_llm_end(&run_id).await;
                let standalone = text.trim();
                if standalone.is_empty() {
                    Ok(question.to_string())
                } else {
                    Ok(standalone.to_string())
                }
            }
            Err(error) => {
                callbacks.handle_llm_error(&error, &run_id).await;
                Err(error)
            }
        }
    }

    /// Streaming model run for the answer.
    async fn stream_answer(
        &self,
        prompt: &str,
        callbacks: &dyn CallbackHandler,
    ) -> ChainResult<String> {
        let run_id = RunId::new();
        callbacks.handle_llm_start(&run_id).await;

        match self.collect_tokens(prompt, &run_id, callbacks).await {
            Ok(text) => {
                callbacks.handle_llm_end(&run_id).await;
                Ok(text)
            }
            Err(error) => {
                callbacks.handle_llm_error(&error, &run_id).await;
                Err(error)
            }
        }
    }

    async fn collect_tokens(
        &self,
        prompt: &str,
        run_id: &RunId,
        callbacks: &dyn CallbackHandler,
    ) -> ChainResult<String> {
        let mut tokens = self.qa_model.stream(prompt).await?;
        let mut text = String::new();

        while let Some(token) = tokens.next().await {
            let token = token?;
            callbacks.handle_llm_new_token(&token, Some(run_id)).await;
            text.push_str(&token);
        }

        Ok(text)
    }
}

fn documents_value(documents: &[SourceDocument]) -> ChainResult<Value> {
    serde_json::to_value(documents)
        .map_err(|e| ChainError::Run(format!("Failed to serialize source documents: {e}")))
}
