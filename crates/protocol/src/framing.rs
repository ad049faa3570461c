//! Framing of the streamed answer.
//!
//! The answer stream is plain text tokens. Once the chain finishes, the
//! retrieved source documents are appended as a JSON array behind a fixed
//! sentinel string, and the client splits them back out with
//! [`parse_message`]:
//!
//! ```text
//! Hello world
//! ##SOURCE_DOCUMENTS##[{"pageContent":"doc1","metadata":{"source":"a.pdf"}}]
//! ```
//!
//! Documents are opaque JSON on both sides of the wire. Whatever the chain
//! reports is written as-is, and the parser hands back every element of the
//! trailing array without imposing a schema on it.
//!
//! The sentinel framing breaks if a token ever contains the separator. The
//! [`Framing::Ndjson`] alternative writes one tagged JSON object per line
//! instead, so structured data never shares a channel with free text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// Literal marker separating the answer text from the source document JSON.
pub const SOURCE_DOCUMENTS_SEPARATOR: &str = "##SOURCE_DOCUMENTS##";

/// A finalized message split into answer text and source documents.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, TS)]
pub struct ParsedMessage {
    /// Human-readable answer (everything before the separator).
    pub answer: String,

    /// Documents recovered from the trailing JSON block, element for element.
    ///
    /// Empty when there is no block or the block is not a valid JSON array.
    #[ts(type = "Array<unknown>")]
    pub documents: Vec<Value>,
}

impl ParsedMessage {
    /// The `metadata.source` entry of each document, where it is a string.
    pub fn sources(&self) -> Vec<Option<&str>> {
        self.documents.iter().map(document_source).collect()
    }
}

/// The `metadata.source` entry of a raw document value.
pub fn document_source(document: &Value) -> Option<&str> {
    document.get("metadata")?.get("source")?.as_str()
}

/// Decode a document block, keeping every element untouched.
fn document_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(documents) => documents,
        _ => Vec::new(),
    }
}

/// Split a finalized message into its answer and source documents.
///
/// Only the first separator counts. A malformed trailing block never fails
/// the parse; it yields an empty document list and the answer is still
/// truncated at the separator.
pub fn parse_message(content: &str) -> ParsedMessage {
    let Some(index) = content.find(SOURCE_DOCUMENTS_SEPARATOR) else {
        return ParsedMessage {
            answer: content.to_string(),
            documents: Vec::new(),
        };
    };

    let trailing = &content[index + SOURCE_DOCUMENTS_SEPARATOR.len()..];

    ParsedMessage {
        answer: content[..index].to_string(),
        documents: serde_json::from_str(trailing)
            .map(document_list)
            .unwrap_or_default(),
    }
}

/// Build a framed message from an answer and its documents.
///
/// This is the exact inverse of [`parse_message`] for answers that do not
/// contain the separator: the parsed documents equal the JSON values of
/// `documents`, whatever shape each element has.
pub fn frame_message<D: Serialize>(answer: &str, documents: &[D]) -> serde_json::Result<String> {
    let json = serde_json::to_string(documents)?;
    Ok(format!("{answer}{SOURCE_DOCUMENTS_SEPARATOR}{json}"))
}

/// The block appended to the stream when the chain reports its documents.
///
/// Starts with a newline so the separator sits on its own line after the
/// streamed answer.
pub fn source_documents_block(documents: &Value) -> serde_json::Result<String> {
    let json = serde_json::to_string(documents)?;
    Ok(format!("\n{SOURCE_DOCUMENTS_SEPARATOR}{json}"))
}

/// One line of the NDJSON framing.
///
/// ```json
/// {"type":"token","text":"Hello "}
/// {"type":"sourceDocuments","documents":[{"pageContent":"doc1","metadata":{}}]}
/// {"type":"done"}
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FrameEvent {
    /// A chunk of answer text.
    Token { text: String },

    /// The source documents reported by the chain.
    SourceDocuments {
        #[ts(type = "unknown")]
        documents: Value,
    },

    /// End of the answer.
    Done,
}

impl FrameEvent {
    /// Serialize as a single newline-terminated line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Parse a message written with the NDJSON framing.
///
/// Token texts are concatenated, the last document list wins, malformed
/// lines are skipped, and parsing stops at the `done` event.
pub fn parse_ndjson(content: &str) -> ParsedMessage {
    let mut parsed = ParsedMessage::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<FrameEvent>(line) {
            Ok(FrameEvent::Token { text }) => parsed.answer.push_str(&text),
            Ok(FrameEvent::SourceDocuments { documents }) => {
                parsed.documents = document_list(documents);
            }
            Ok(FrameEvent::Done) => break,
            Err(_) => continue,
        }
    }

    parsed
}

/// Wire framing used for the answer stream.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Raw tokens followed by a sentinel-separated JSON block.
    #[default]
    Sentinel,

    /// One tagged JSON object per line.
    Ndjson,
}

impl Framing {
    /// Encode a model token for this framing.
    pub fn encode_token(self, token: &str) -> serde_json::Result<String> {
        match self {
            Framing::Sentinel => Ok(token.to_string()),
            Framing::Ndjson => FrameEvent::Token {
                text: token.to_string(),
            }
            .to_line(),
        }
    }

    /// Encode the chain's source documents for this framing.
    pub fn encode_documents(self, documents: &Value) -> serde_json::Result<String> {
        match self {
            Framing::Sentinel => source_documents_block(documents),
            Framing::Ndjson => FrameEvent::SourceDocuments {
                documents: documents.clone(),
            }
            .to_line(),
        }
    }

    /// The trailer written when the stream closes normally, if any.
    pub fn encode_done(self) -> serde_json::Result<Option<String>> {
        match self {
            Framing::Sentinel => Ok(None),
            Framing::Ndjson => FrameEvent::Done.to_line().map(Some),
        }
    }

    /// Parse a finalized message written with this framing.
    pub fn parse(self, content: &str) -> ParsedMessage {
        match self {
            Framing::Sentinel => parse_message(content),
            Framing::Ndjson => parse_ndjson(content),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Sentinel => write!(f, "sentinel"),
            Framing::Ndjson => write!(f, "ndjson"),
        }
    }
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sentinel" => Ok(Framing::Sentinel),
            "ndjson" => Ok(Framing::Ndjson),
            other => Err(format!("unknown framing '{other}', expected sentinel or ndjson")),
        }
    }
}
