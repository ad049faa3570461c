//! Error types for chain execution.

use thiserror::Error;

/// Errors raised by models, retrievers, tools and prompts while a chain runs.
///
/// Cloneable so the same error can be reported to every callback handler
/// and carried in the answer stream's abort item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The language model call failed or its token stream broke.
    #[error("Model call failed: {0}")]
    Model(String),

    /// The retriever could not fetch source documents.
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// A tool invocation failed.
    #[error("Tool call failed: {0}")]
    Tool(String),

    /// A prompt template is malformed or was formatted without a value.
    #[error("Invalid prompt: {0}")]
    Prompt(String),

    /// Any other run failure.
    #[error("Run failed: {0}")]
    Run(String),
}

/// Type alias for Result with ChainError.
pub type ChainResult<T> = Result<T, ChainError>;
