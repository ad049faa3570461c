//! Prompt templates.
//!
//! Templates use `{name}` placeholders; `{{` and `}}` stand for literal
//! braces. A template is validated against its declared input variables
//! when it is built, so a misconfigured prompt fails at load time rather
//! than in the middle of a chat.

use crate::chain::error::{ChainError, ChainResult};
use dc_protocol::prompt_models::PromptDefinition;

/// Name of the prompt that condenses a follow-up into a standalone question.
pub const CONDENSE_QUESTION_PROMPT: &str = "condense-question";

/// Name of the prompt that answers from the retrieved context.
pub const QA_PROMPT: &str = "qa";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Build a template, checking that it uses exactly the declared variables.
    pub fn new(template: impl Into<String>, input_variables: Vec<String>) -> ChainResult<Self> {
        let template = template.into();
        let used = placeholders(&template)?;

        if let Some(missing) = input_variables.iter().find(|var| !used.contains(var)) {
            return Err(ChainError::Prompt(format!(
                "template never uses declared variable '{missing}'"
            )));
        }
        if let Some(undeclared) = used.iter().find(|name| !input_variables.contains(name)) {
            return Err(ChainError::Prompt(format!(
                "template uses undeclared variable '{undeclared}'"
            )));
        }

        Ok(Self {
            template,
            input_variables,
        })
    }

    pub fn from_definition(definition: &PromptDefinition) -> ChainResult<Self> {
        Self::new(definition.template.clone(), definition.input_variables.clone())
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Fail unless every name in `required` is a declared input variable.
    pub fn require(&self, required: &[&str]) -> ChainResult<()> {
        match required
            .iter()
            .find(|name| !self.input_variables.iter().any(|var| var == *name))
        {
            Some(name) => Err(ChainError::Prompt(format!(
                "prompt must declare the '{name}' variable"
            ))),
            None => Ok(()),
        }
    }

    /// Substitute every placeholder with its value.
    pub fn format(&self, values: &[(&str, &str)]) -> ChainResult<String> {
        render(&self.template, |name, out| {
            let value = values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| ChainError::Prompt(format!("missing value for '{name}'")))?;
            out.push_str(value);
            Ok(())
        })
    }
}

/// Names of all placeholders in order of first appearance.
fn placeholders(template: &str) -> ChainResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    render(template, |name, _| {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
        Ok(())
    })?;
    Ok(names)
}

fn render(
    template: &str,
    mut on_placeholder: impl FnMut(&str, &mut String) -> ChainResult<()>,
) -> ChainResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|(_, next)| *next) == Some('{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let start = index + 1;
                let end = loop {
                    match chars.next() {
                        Some((end, '}')) => break end,
                        Some((_, '{')) | None => {
                            return Err(ChainError::Prompt(format!(
                                "unclosed placeholder at byte {index}"
                            )))
                        }
                        Some(_) => {}
                    }
                };
                let name = template[start..end].trim();
                if name.is_empty() {
                    return Err(ChainError::Prompt(format!(
                        "empty placeholder at byte {index}"
                    )));
                }
                on_placeholder(name, &mut out)?;
            }
            '}' if chars.peek().map(|(_, next)| *next) == Some('}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(ChainError::Prompt(format!(
                    "unmatched '}}' at byte {index}"
                )))
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
