//! Answer streaming.
//!
//! This module provides:
//! - The lifecycle callback surface (`CallbackHandler`) and its fan-out
//! - The multiplexer that turns callbacks from many runs into one framed
//!   answer stream
//! - Replay of recorded callback sequences

pub mod callbacks;
pub mod error;
pub mod multiplexer;
pub mod replay;
mod writer;

pub use callbacks::{
    CallbackHandler, CallbackManager, ChainValues, TracingHandler, SOURCE_DOCUMENTS_KEY,
};
pub use error::{StreamError, StreamResult};
pub use multiplexer::{
    open, ResponseStream, StreamHandlers, StreamObserver, StreamOptions, DEFAULT_STREAM_CAPACITY,
};
pub use replay::{dispatch, load_script, parse_script, replay};
pub use writer::{StreamItem, StreamState};
