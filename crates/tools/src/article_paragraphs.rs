//! Article extraction tool: fetch one article and render its record.

use async_trait::async_trait;
use siftwire_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use std::time::Duration;

use crate::extract::extract_article;
use crate::fetch::PageFetcher;

pub const NAME: &str = "get_article_paragraphs";

pub struct ArticleParagraphsTool {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
}

impl ArticleParagraphsTool {
    pub fn new(fetcher: Arc<dyn PageFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }
}

#[async_trait]
impl Tool for ArticleParagraphsTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Fetch an article and extract its title, subtitle and body paragraphs as \
         'H1 Title: ... ||| H2 Subtitle: ... ||| Content: ...'."
    }

    fn input_format(&self) -> &str {
        "<article_url>"
    }

    async fn call(&self, input: &str) -> ToolResult {
        let url = input.trim();
        match self.fetcher.fetch(url, self.timeout).await {
            Ok(html) => ToolResult::ok(extract_article(url, &html).to_wire()),
            Err(e) => ToolResult::failure(format!("Error fetching article from {url}: {e}")),
        }
    }
}
