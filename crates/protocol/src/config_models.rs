//! Chat configuration models for `.docchat/config.toml`.
//!
//! This module defines the structure of the configuration file that controls
//! which models answer questions, how many source documents are retrieved,
//! and how the answer stream is framed.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

use crate::framing::Framing;

/// Represents settings from `.docchat/config.toml`.
///
/// Every field is optional in the file; missing fields take the defaults
/// shown below.
///
/// # Example
///
/// ```toml
/// # .docchat/config.toml
/// question_generator_model = "gpt-3.5-turbo"
/// question_generator_temperature = 0.0
/// qa_model = "gpt-4"
/// qa_temperature = 0.2
/// source_documents_total = 4
/// context_window = 10
/// stream_capacity = 32
/// framing = "sentinel"
/// verbose = false
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct ChatConfig {
    /// Model used to rephrase follow-up questions into standalone questions.
    ///
    /// Its output is never streamed to the client, so a cheaper model works.
    pub question_generator_model: String,

    /// Sampling temperature for the question generator (0-1).
    pub question_generator_temperature: f32,

    /// Model that writes the streamed answer.
    pub qa_model: String,

    /// Sampling temperature for the answer model (0-1).
    pub qa_temperature: f32,

    /// Number of source documents retrieved per question and shown in the UI.
    pub source_documents_total: usize,

    /// Number of past exchanges (question and answer pairs) kept as history.
    pub context_window: usize,

    /// Number of chunks the answer stream buffers before writers wait.
    pub stream_capacity: usize,

    /// Wire framing of the answer stream.
    pub framing: Framing,

    /// Log every chain, model and tool run.
    pub verbose: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            question_generator_model: "gpt-3.5-turbo".to_string(),
            question_generator_temperature: 0.0,
            qa_model: "gpt-3.5-turbo".to_string(),
            qa_temperature: 0.0,
            source_documents_total: 4,
            context_window: 10,
            stream_capacity: 32,
            framing: Framing::Sentinel,
            verbose: false,
        }
    }
}
