//! Prompt configuration models for `.docchat/prompts/*.md`.
//!
//! Prompts are defined as Markdown files with YAML front matter. The front
//! matter names the prompt and declares its placeholders; the file body is
//! the template itself.

use serde::{Deserialize, Serialize};

/// Represents a prompt template and its declared placeholders.
///
/// # Example
///
/// ```markdown
/// ---
/// name: qa
/// description: Answers the question from the retrieved context
/// input_variables: [question, context]
/// ---
///
/// Use the following pieces of context to answer the question at the end.
///
/// {context}
///
/// Question: {question}
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PromptDefinition {
    /// Unique identifier for this prompt (`condense-question` or `qa`).
    pub name: String,

    /// Human-readable description of the prompt's purpose.
    #[serde(default)]
    pub description: String,

    /// Placeholders the template uses, without braces.
    #[serde(default)]
    pub input_variables: Vec<String>,

    /// The body of the .md file, not part of the front matter.
    #[serde(skip)]
    pub template: String,
}
