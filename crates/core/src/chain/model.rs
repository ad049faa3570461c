//! Model and retriever traits.
//!
//! Hosted language models and vector stores live outside this crate. The
//! chain only depends on these two seams.

use crate::chain::error::ChainResult;
use async_trait::async_trait;
use dc_protocol::document::SourceDocument;
use std::pin::Pin;
use tokio_stream::Stream;

/// Stream of tokens produced by a streaming model call.
pub type TokenStream = Pin<Box<dyn Stream<Item = ChainResult<String>> + Send>>;

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Name of the underlying model, for logging.
    fn model_name(&self) -> &str;

    /// Run the prompt to completion and return the full response.
    async fn generate(&self, prompt: &str) -> ChainResult<String>;

    /// Run the prompt and stream the response token by token.
    ///
    /// Models without streaming support yield the whole response as one token.
    async fn stream(&self, prompt: &str) -> ChainResult<TokenStream> {
        let text = self.generate(prompt).await?;
        Ok(Box::pin(tokio_stream::once(Ok(text))))
    }
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Fetch up to `k` documents relevant to `query`, most relevant first.
    async fn retrieve(&self, query: &str, k: usize) -> ChainResult<Vec<SourceDocument>>;
}
