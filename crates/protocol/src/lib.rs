//! # dc-protocol
//!
//! Core protocol definitions and data models for docchat-kit.
//!
//! This crate defines all shared data structures used for:
//! - Framing streamed answers and their source documents
//! - Chat requests sent by the client
//! - Configuration file parsing (TOML config, Markdown prompts)
//! - Replaying model/chain/tool lifecycle callbacks
//!
//! ## Modules
//!
//! - [`document`]: Source documents returned by retrieval
//! - [`framing`]: Sentinel and NDJSON framing of the answer stream
//! - [`chat_models`]: Chat messages and requests
//! - [`config_models`]: Settings from `.docchat/config.toml`
//! - [`prompt_models`]: Prompt definitions from `.docchat/prompts/*.md`
//! - [`run_models`]: Run identifiers and run kinds
//! - [`callback`]: Serializable lifecycle callback events
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, serde_json, ts-rs, and uuid
//! - TypeScript generation: Client-facing types derive `TS`
//! - Independent compilation: No dependencies on other docchat-kit crates

pub mod callback;
pub mod chat_models;
pub mod config_models;
pub mod document;
pub mod framing;
pub mod prompt_models;
pub mod run_models;

// Re-export all public types for convenience
pub use callback::*;
pub use chat_models::*;
pub use config_models::*;
pub use document::*;
pub use framing::*;
pub use prompt_models::*;
pub use run_models::*;
