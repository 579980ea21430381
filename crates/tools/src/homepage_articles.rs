//! Homepage scan tool: harvest title/link candidates from a homepage and
//! keep the ones that look like relevant articles on the same site.

use async_trait::async_trait;
use siftwire_core::protocol::{FIELD_DELIMITER, parse_list, split_fields};
use siftwire_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::fetch::PageFetcher;
use crate::harvest::harvest_links;
use crate::relevance::RelevanceFilter;
use crate::urls::ensure_scheme;

pub const NAME: &str = "get_relevant_articles_from_homepage";

/// Returned when the scan completes but nothing is admitted.
pub const NONE_FOUND: &str = "No relevant articles found on this homepage.";

pub struct HomepageArticlesTool {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
}

impl HomepageArticlesTool {
    pub fn new(fetcher: Arc<dyn PageFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }
}

#[async_trait]
impl Tool for HomepageArticlesTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Scan a homepage for article links whose titles mention any of the keywords. \
         Returns one 'Title: ... | URL: ...' line per article."
    }

    fn input_format(&self) -> &str {
        "<homepage_url>|||<keyword1,keyword2>"
    }

    async fn call(&self, input: &str) -> ToolResult {
        let Ok(fields) = split_fields(input, FIELD_DELIMITER, 2) else {
            return ToolResult::failure(
                "Error: Invalid input format. Expected 'homepage_url|||keyword1,keyword2'.",
            );
        };
        let homepage = ensure_scheme(fields[0]);
        let filter = RelevanceFilter::new(parse_list(fields[1]));

        let Ok(base) = Url::parse(&homepage) else {
            return ToolResult::failure(format!(
                "Error fetching homepage {homepage}: invalid url"
            ));
        };

        let html = match self.fetcher.fetch(&homepage, self.timeout).await {
            Ok(html) => html,
            Err(e) => {
                return ToolResult::failure(format!("Error fetching homepage {homepage}: {e}"));
            }
        };

        let candidates = harvest_links(&html);
        let admitted = filter.filter(&candidates, &base);
        tracing::info!(
            homepage = %homepage,
            admitted = admitted.len(),
            "Homepage scan complete"
        );

        if admitted.is_empty() {
            return ToolResult::ok(NONE_FOUND);
        }
        ToolResult::ok(
            admitted
                .iter()
                .map(|link| link.to_line())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}
