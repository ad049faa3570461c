//! In-memory retriever.
//!
//! Ranks a fixed document list by how many distinct query terms each
//! document contains. Stands in for a vector store in tests and demos.

use crate::chain::error::ChainResult;
use crate::chain::model::Retriever;
use async_trait::async_trait;
use dc_protocol::document::SourceDocument;
use std::cmp::Reverse;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct InMemoryRetriever {
    documents: Vec<SourceDocument>,
}

impl InMemoryRetriever {
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> ChainResult<Vec<SourceDocument>> {
        let query_terms = terms(query);

        let mut scored: Vec<(usize, &SourceDocument)> = self
            .documents
            .iter()
            .map(|document| {
                let score = terms(&document.page_content)
                    .intersection(&query_terms)
                    .count();
                (score, document)
            })
            .collect();

        // Stable sort: equally scored documents keep their original order
        scored.sort_by_key(|(score, _)| Reverse(*score));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, document)| document.clone())
            .collect())
    }
}
