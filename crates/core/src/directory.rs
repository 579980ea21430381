//! Topic directory: the curated-link database collaborator.
//!
//! A directory holds records tagged with a category and carrying a URL.
//! It is queried with a disjunctive exact-match filter over the category
//! field. The handle is built once at startup and passed explicitly to the
//! components that need it; it is read-only after construction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, ProtocolError};

/// A set of topics to look up. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicQuery {
    topics: Vec<String>,
}

impl TopicQuery {
    /// Build from a comma-separated topic list. Entries are trimmed, empty
    /// entries and repeats dropped, first occurrence order kept.
    pub fn parse(list: &str) -> Result<Self, ProtocolError> {
        let mut topics: Vec<String> = Vec::new();
        for topic in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !topics.iter().any(|t| t == topic) {
                topics.push(topic.to_string());
            }
        }
        if topics.is_empty() {
            return Err(ProtocolError::EmptyField("topics"));
        }
        Ok(Self { topics })
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

/// One record returned by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// The record's URL field, if it was set
    pub url: Option<String>,
}

/// Access to an external curated-link directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Human-readable backend name (e.g., "notion").
    fn name(&self) -> &str;

    /// Return every record whose category equals one of the query topics.
    async fn query_by_topics(
        &self,
        database_id: &str,
        query: &TopicQuery,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError>;

    /// The category values the directory knows about.
    async fn categories(&self, database_id: &str) -> Result<Vec<String>, DirectoryError>;
}
