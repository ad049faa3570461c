//! # dc-core
//!
//! Answer streaming and retrieval chain for docchat-kit.
//!
//! This crate provides:
//! - The answer stream multiplexer that fans lifecycle callbacks from many
//!   concurrent model/chain/tool runs into one framed output stream
//! - The conversational retrieval chain that drives those callbacks
//! - Configuration loading from the `.docchat/` directory
//! - Project initialization from embedded templates
//!
//! ## Modules
//!
//! - [`stream`]: Callback surface, multiplexer and callback replay
//! - [`chain`]: Model/retriever traits, prompts, history and the QA chain
//! - [`engine`]: Chat request entry point
//! - [`config`]: Configuration loading and management
//! - [`init`]: `.docchat/` scaffolding

pub mod chain;
pub mod config;
pub mod engine;
pub mod init;
pub mod stream;
