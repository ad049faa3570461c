//! Configuration file loader for `.docchat/` directory structure.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.docchat/` directory, including:
//! - `config.toml`: Chat settings
//! - `prompts/*.md`: Prompt templates with YAML front matter

use crate::chain::prompt::{PromptTemplate, CONDENSE_QUESTION_PROMPT, QA_PROMPT};
use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{AppConfig, PromptSet, CONDENSE_QUESTION_VARIABLES, QA_VARIABLES};
use crate::init::templates::get_template;
use dc_protocol::config_models::ChatConfig;
use dc_protocol::prompt_models::PromptDefinition;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the project configuration directory.
pub const CONFIG_DIR: &str = ".docchat";

/// Loads all configuration from the `.docchat/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.docchat/` folder
///
/// # Returns
///
/// An `AppConfig` containing the chat settings and effective prompts. If the
/// directory or individual files are missing, the embedded defaults are used
/// rather than returning an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML or Markdown front matter)
/// - Settings are out of range or a prompt does not declare and use its
///   required placeholders
///
/// # Example
///
/// ```rust,no_run
/// use dc_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Retrieving {} documents", config.chat.source_documents_total);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let dc_dir = root.join(CONFIG_DIR);

    // If .docchat doesn't exist, return the built-in config
    if !dc_dir.exists() {
        return AppConfig::builtin();
    }

    let chat = load_chat_config(&dc_dir)?;
    let prompts = load_prompts(&dc_dir)?;

    Ok(AppConfig { chat, prompts })
}

/// Loads chat settings from `config.toml`.
fn load_chat_config(dc_dir: &Path) -> ConfigResult<ChatConfig> {
    let config_path = dc_dir.join("config.toml");

    // If config.toml doesn't exist, return default
    if !config_path.exists() {
        return Ok(ChatConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: ChatConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    validate_chat_config(&config_path, &config)?;

    Ok(config)
}

/// Checks that chat settings are within their allowed ranges.
pub fn validate_chat_config(path: &Path, config: &ChatConfig) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    };

    for (name, value) in [
        (
            "question_generator_temperature",
            config.question_generator_temperature,
        ),
        ("qa_temperature", config.qa_temperature),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(invalid(format!("{name} must be between 0 and 1, got {value}")));
        }
    }

    if config.source_documents_total == 0 {
        return Err(invalid("source_documents_total must be at least 1".to_string()));
    }

    if config.stream_capacity == 0 {
        return Err(invalid("stream_capacity must be at least 1".to_string()));
    }

    Ok(())
}

/// Parses a Markdown prompt file with YAML front matter.
///
/// The front matter becomes the `PromptDefinition` and the trimmed body
/// becomes its template.
pub fn parse_prompt_definition(path: &Path, content: &str) -> ConfigResult<PromptDefinition> {
    let matter = Matter::<YAML>::new();
    let result = matter.parse(content);

    let mut definition: PromptDefinition = result
        .data
        .ok_or_else(|| ConfigError::MarkdownParse {
            path: path.to_path_buf(),
            reason: "Missing YAML front matter".to_string(),
        })?
        .deserialize()
        .map_err(|e| ConfigError::MarkdownParse {
            path: path.to_path_buf(),
            reason: format!("Failed to deserialize front matter: {e}"),
        })?;

    definition.template = result.content.trim().to_string();

    Ok(definition)
}

/// Loads the prompt templates embedded in the binary.
pub fn builtin_prompts() -> ConfigResult<PromptSet> {
    let condense_path = "prompts/condense-question.md";
    let qa_path = "prompts/qa.md";

    Ok(PromptSet {
        condense_question: prompt_template(
            Path::new(condense_path),
            &builtin_definition(condense_path)?,
            CONDENSE_QUESTION_VARIABLES,
        )?,
        qa: prompt_template(Path::new(qa_path), &builtin_definition(qa_path)?, QA_VARIABLES)?,
    })
}

fn builtin_definition(template_path: &str) -> ConfigResult<PromptDefinition> {
    let content = get_template(template_path).ok_or_else(|| ConfigError::InvalidConfig {
        path: PathBuf::from(template_path),
        reason: "Embedded prompt template is missing".to_string(),
    })?;

    parse_prompt_definition(Path::new(template_path), &content)
}

/// Builds a template and checks it declares the variables the chain fills in.
fn prompt_template(
    path: &Path,
    definition: &PromptDefinition,
    required: &[&str],
) -> ConfigResult<PromptTemplate> {
    let invalid = |reason: String| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    };

    let name = &definition.name;
    let template = PromptTemplate::from_definition(definition)
        .map_err(|e| invalid(format!("Prompt '{name}': {e}")))?;
    template
        .require(required)
        .map_err(|e| invalid(format!("Prompt '{name}': {e}")))?;

    Ok(template)
}

/// Loads prompt overrides from `prompts/*.md` on top of the built-in prompts.
fn load_prompts(dc_dir: &Path) -> ConfigResult<PromptSet> {
    let mut prompts = builtin_prompts()?;
    let prompts_dir = dc_dir.join("prompts");

    // If prompts directory doesn't exist, keep the built-in prompts
    if !prompts_dir.exists() {
        return Ok(prompts);
    }

    // Later files win when two define the same prompt name
    for entry in WalkDir::new(&prompts_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: prompts_dir.clone(),
            source,
        })?;

        let path = entry.path();

        // Only process .md files
        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let definition = parse_prompt_definition(path, &content)?;

        match definition.name.as_str() {
            CONDENSE_QUESTION_PROMPT => {
                prompts.condense_question =
                    prompt_template(path, &definition, CONDENSE_QUESTION_VARIABLES)?;
            }
            QA_PROMPT => {
                prompts.qa = prompt_template(path, &definition, QA_VARIABLES)?;
            }
            other => {
                tracing::warn!(path = %path.display(), name = other, "Ignoring unknown prompt");
            }
        }
    }

    Ok(prompts)
}
