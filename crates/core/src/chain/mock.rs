//! Mock chat model for testing.

use crate::chain::error::{ChainError, ChainResult};
use crate::chain::model::{ChatModel, TokenStream};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Replays a fixed token script and records every prompt it receives.
#[derive(Clone)]
pub struct MockChatModel {
    name: String,
    tokens: Vec<ChainResult<String>>,
    rejection: Option<ChainError>,
    delay: Option<Duration>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockChatModel {
    pub fn new(tokens: Vec<ChainResult<String>>) -> Self {
        Self {
            name: "mock-model".to_string(),
            tokens,
            rejection: None,
            delay: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Streams the given tokens and completes.
    pub fn streaming(tokens: &[&str]) -> Self {
        Self::new(tokens.iter().map(|token| Ok(token.to_string())).collect())
    }

    /// Answers with a single chunk.
    pub fn answering(text: &str) -> Self {
        Self::streaming(&[text])
    }

    /// Streams the given tokens, then fails.
    pub fn failing_after(tokens: &[&str], message: &str) -> Self {
        let mut script: Vec<ChainResult<String>> =
            tokens.iter().map(|token| Ok(token.to_string())).collect();
        script.push(Err(ChainError::Model(message.to_string())));
        Self::new(script)
    }

    /// Fails before producing anything.
    pub fn rejecting(message: &str) -> Self {
        let mut model = Self::new(Vec::new());
        model.rejection = Some(ChainError::Model(message.to_string()));
        model
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sleep before each streamed token.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    async fn record(&self, prompt: &str) -> ChainResult<()> {
        self.prompts.lock().await.push(prompt.to_string());
        match &self.rejection {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> ChainResult<String> {
        self.record(prompt).await?;
        self.tokens.iter().cloned().collect()
    }

    async fn stream(&self, prompt: &str) -> ChainResult<TokenStream> {
        self.record(prompt).await?;

        let tokens = self.tokens.clone();
        let delay = self.delay;
        let stream = async_stream::stream! {
            for token in tokens {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield token;
            }
        };

        Ok(Box::pin(stream))
    }
}
