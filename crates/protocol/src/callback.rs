//! Serializable lifecycle callbacks.
//!
//! The model/chain runtime reports progress through a set of hooks: start,
//! end and error for each run kind, plus new tokens from streaming models.
//! `CallbackEvent` is the serializable form of one hook invocation, used to
//! record and replay a run's callback sequence.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "chainEnd",
//!   "payload": {
//!     "run_id": "run1",
//!     "outputs": { "sourceDocuments": [] }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::run_models::{RunId, RunKind};

/// One invocation of a lifecycle hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CallbackEvent {
    /// A model run started.
    LlmStart { run_id: RunId },

    /// A streaming model produced a token.
    LlmNewToken {
        token: String,
        #[serde(default)]
        run_id: Option<RunId>,
    },

    /// A model run finished.
    LlmEnd { run_id: RunId },

    /// A model run failed.
    LlmError { run_id: RunId, error: String },

    /// A chain run started.
    ChainStart { run_id: RunId },

    /// A chain run finished with the given outputs.
    ChainEnd {
        run_id: RunId,
        #[serde(default)]
        #[ts(type = "Record<string, unknown>")]
        outputs: Map<String, Value>,
    },

    /// A chain run failed.
    ChainError { run_id: RunId, error: String },

    /// A tool run started.
    ToolStart { run_id: RunId },

    /// A tool run finished with the given output.
    ToolEnd {
        run_id: RunId,
        #[serde(default)]
        output: String,
    },

    /// A tool run failed.
    ToolError { run_id: RunId, error: String },
}

impl CallbackEvent {
    /// The run this event belongs to, if it names one.
    pub fn run_id(&self) -> Option<&RunId> {
        match self {
            CallbackEvent::LlmNewToken { run_id, .. } => run_id.as_ref(),
            CallbackEvent::LlmStart { run_id }
            | CallbackEvent::LlmEnd { run_id }
            | CallbackEvent::LlmError { run_id, .. }
            | CallbackEvent::ChainStart { run_id }
            | CallbackEvent::ChainEnd { run_id, .. }
            | CallbackEvent::ChainError { run_id, .. }
            | CallbackEvent::ToolStart { run_id }
            | CallbackEvent::ToolEnd { run_id, .. }
            | CallbackEvent::ToolError { run_id, .. } => Some(run_id),
        }
    }

    /// The kind of run this event belongs to.
    pub fn kind(&self) -> RunKind {
        match self {
            CallbackEvent::LlmStart { .. }
            | CallbackEvent::LlmNewToken { .. }
            | CallbackEvent::LlmEnd { .. }
            | CallbackEvent::LlmError { .. } => RunKind::Llm,
            CallbackEvent::ChainStart { .. }
            | CallbackEvent::ChainEnd { .. }
            | CallbackEvent::ChainError { .. } => RunKind::Chain,
            CallbackEvent::ToolStart { .. }
            | CallbackEvent::ToolEnd { .. }
            | CallbackEvent::ToolError { .. } => RunKind::Tool,
        }
    }
}
