//! Configuration loading and management.
//!
//! This module provides functionality to load and validate the chat settings
//! and prompt templates from the `.docchat/` directory structure, falling
//! back to the embedded defaults.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::{AppConfig, PromptSet};
