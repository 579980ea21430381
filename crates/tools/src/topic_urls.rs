//! Directory lookup tool: homepage URLs for a set of topics.

use async_trait::async_trait;
use siftwire_core::directory::{DirectoryClient, TopicQuery};
use siftwire_core::protocol::{FIELD_DELIMITER, split_fields};
use siftwire_core::tool::{Tool, ToolResult};
use std::sync::Arc;

pub const NAME: &str = "get_urls_from_directory_by_topics";

pub const NONE_FOUND: &str = "No URLs found for the specified topics.";

pub struct TopicUrlsTool {
    directory: Option<Arc<dyn DirectoryClient>>,
}

impl TopicUrlsTool {
    /// `None` when no directory is configured; every call then reports it.
    pub fn new(directory: Option<Arc<dyn DirectoryClient>>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for TopicUrlsTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Look up homepage URLs in the curated directory whose category matches any of the topics. \
         Returns one URL per line."
    }

    fn input_format(&self) -> &str {
        "<database_id>|||<topic1,topic2>"
    }

    async fn call(&self, input: &str) -> ToolResult {
        let Some(directory) = &self.directory else {
            return ToolResult::failure("Error: directory client not initialized.");
        };
        let Ok(fields) = split_fields(input, FIELD_DELIMITER, 2) else {
            return ToolResult::failure(
                "Error: Invalid input format. Expected 'DATABASE_ID|||topic1,topic2'.",
            );
        };
        let database_id = fields[0];
        let Ok(query) = TopicQuery::parse(fields[1]) else {
            return ToolResult::failure("Error: No topics provided for directory query.");
        };

        let records = match directory.query_by_topics(database_id, &query).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(directory = directory.name(), error = %e, "Directory lookup failed");
                return ToolResult::failure(format!(
                    "Error fetching URLs from directory: {e}. \
                     Ensure DATABASE_ID is correct and the token has access."
                ));
            }
        };

        let urls: Vec<String> = records
            .into_iter()
            .filter_map(|r| r.url)
            .filter(|u| !u.trim().is_empty())
            .collect();
        if urls.is_empty() {
            ToolResult::ok(NONE_FOUND)
        } else {
            ToolResult::ok(urls.join("\n"))
        }
    }
}
