//! Run identity models.
//!
//! A run is one in-flight unit of work reported through the callback
//! surface: a model call, a chain execution, or a tool call. Runs are only
//! ever tracked by their identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

/// Opaque identifier of a single run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Generate a fresh random run id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RunId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The kind of work a run represents.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// A language model invocation.
    Llm,
    /// A chain execution.
    Chain,
    /// A tool invocation.
    Tool,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Llm => write!(f, "llm"),
            RunKind::Chain => write!(f, "chain"),
            RunKind::Tool => write!(f, "tool"),
        }
    }
}
