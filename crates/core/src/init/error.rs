//! Errors from `docchat init`.

use std::path::PathBuf;
use thiserror::Error;

pub type InitResult<T> = Result<T, InitError>;

/// Why the `.docchat/` scaffold could not be written.
#[derive(Debug, Error)]
pub enum InitError {
    /// A `.docchat/` directory is already there and `force` was not given.
    #[error(".docchat directory already exists at {0:?}. Use --force to overwrite.")]
    DirectoryExists(PathBuf),

    /// `config.toml` or a prompt is missing from the templates built into
    /// the binary.
    #[error("Template file not found: {0}")]
    TemplateNotFound(String),

    /// `.docchat/` or `.docchat/prompts/` could not be created.
    #[error("Failed to create directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A scaffold file could not be written.
    #[error("Failed to write file {path:?}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
