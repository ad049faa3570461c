//! Error types for the answer stream.

use crate::chain::error::ChainError;
use dc_protocol::run_models::{RunId, RunKind};
use thiserror::Error;

/// Errors delivered to the consumer of an answer stream.
///
/// A stream ends with at most one of these, after any chunks that were
/// already written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A run reported an error and the stream was aborted.
    #[error("{kind} run {run_id} failed: {source}")]
    RunFailed {
        kind: RunKind,
        run_id: RunId,
        source: ChainError,
    },
}

impl StreamError {
    /// The run error that aborted the stream.
    pub fn cause(&self) -> &ChainError {
        match self {
            StreamError::RunFailed { source, .. } => source,
        }
    }
}

/// Type alias for Result with StreamError.
pub type StreamResult<T> = Result<T, StreamError>;
