//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines the
//! chat settings and the prompt templates into a single configuration object.

use crate::chain::prompt::PromptTemplate;
use crate::config::error::ConfigResult;
use crate::config::loader::builtin_prompts;
use dc_protocol::config_models::ChatConfig;

/// Variables the condense-question prompt must declare.
pub const CONDENSE_QUESTION_VARIABLES: &[&str] = &["question", "chat_history"];

/// Variables the QA prompt must declare.
pub const QA_VARIABLES: &[&str] = &["question", "context"];

/// The two prompts the retrieval chain runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Rephrases a follow-up question into a standalone question.
    pub condense_question: PromptTemplate,

    /// Produces the streamed answer from the retrieved context.
    pub qa: PromptTemplate,
}

/// Unified application configuration loaded from the `.docchat/` directory.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Chat settings
/// - `prompts/*.md`: Prompt templates overriding the built-in ones
///
/// # Example
///
/// ```rust,no_run
/// use dc_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Answering with {}", config.chat.qa_model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Settings from `config.toml`.
    pub chat: ChatConfig,

    /// Effective prompt templates.
    pub prompts: PromptSet,
}

impl AppConfig {
    /// Default settings with the embedded prompt templates.
    pub fn builtin() -> ConfigResult<Self> {
        Ok(Self {
            chat: ChatConfig::default(),
            prompts: builtin_prompts()?,
        })
    }
}
