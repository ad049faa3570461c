//! Errors raised while loading `.docchat/`.
//!
//! A missing directory or file is never an error here; the loader falls back
//! to the embedded defaults. These variants cover files that exist but cannot
//! be used.

use std::path::PathBuf;
use thiserror::Error;

/// Why a project configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `config.toml` or a prompt file exists but could not be read.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `config.toml` is not valid TOML or has fields of the wrong type.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A prompt file has no YAML front matter, or it does not describe a
    /// prompt (missing `name`, bad `input_variables`).
    #[error("Failed to parse Markdown front matter in {path}: {reason}")]
    MarkdownParse { path: PathBuf, reason: String },

    /// The `prompts/` directory could not be listed.
    #[error("Failed to traverse directory {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// A chat setting is out of range, or a prompt template is unusable.
    ///
    /// For prompts the reason starts with `Prompt '<name>':` and names the
    /// template problem: unbalanced braces, placeholders that disagree with
    /// `input_variables`, or a variable the chain fills that is not declared.
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
