//! Retrieval chain and the collaborators it drives.
//!
//! - [`model`]: `ChatModel` and `Retriever` seams
//! - [`prompt`]: Prompt templates
//! - [`history`]: Chat history preparation
//! - [`retrieval_qa`]: The conversational retrieval chain
//! - [`mock`] and [`memory`]: In-process stand-ins for hosted models and
//!   vector stores

pub mod error;
pub mod history;
pub mod memory;
pub mod mock;
pub mod model;
pub mod prompt;
pub mod retrieval_qa;

pub use error::{ChainError, ChainResult};
pub use memory::InMemoryRetriever;
pub use mock::MockChatModel;
pub use model::{ChatModel, Retriever, TokenStream};
pub use prompt::PromptTemplate;
pub use retrieval_qa::{ChainInput, ConversationalRetrievalChain};
