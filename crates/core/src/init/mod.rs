//! Initialization module for creating .docchat directory structures.
//!
//! This module generates a `.docchat/` directory with:
//! - Chat settings (`config.toml`)
//! - Prompt templates (`prompts/*.md`)
//!
//! # Example
//!
//! ```no_run
//! use dc_core::init::{InitOptions, generate_docchat_structure};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//!     minimal: false,
//! };
//!
//! generate_docchat_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_docchat_structure, InitOptions};
pub use templates::{get_template, list_templates};
