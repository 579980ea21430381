//! The Siftwire extraction tools.
//!
//! Each pipeline component is exposed as a string-in/string-out [`Tool`]:
//! homepage scanning, article extraction, directory lookup, query mapping
//! and answer synthesis. The HTML heuristics behind them live in their own
//! modules and can be used without the tool wrappers.
//!
//! [`Tool`]: siftwire_core::tool::Tool

pub mod analyze_query;
pub mod answer_question;
pub mod article_paragraphs;
pub mod delegate;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod homepage_articles;
pub mod html;
pub mod notion;
pub mod relevance;
pub mod topic_urls;
pub mod urls;

use siftwire_config::AppConfig;
use siftwire_core::directory::DirectoryClient;
use siftwire_core::provider::Provider;
use siftwire_core::tool::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

pub use delegate::Delegate;
pub use extract::extract_article;
pub use fetch::{HttpFetcher, PageFetcher};
pub use harvest::{CandidateLink, harvest_links};
pub use notion::NotionDirectory;
pub use relevance::RelevanceFilter;

/// The collaborators shared by the tools.
#[derive(Clone)]
pub struct ToolKit {
    pub fetcher: Arc<dyn PageFetcher>,
    pub delegate: Delegate,
    pub directory: Option<Arc<dyn DirectoryClient>>,
    pub homepage_timeout: Duration,
    pub article_timeout: Duration,
}

impl ToolKit {
    /// Build the kit from configuration: an HTTP fetcher, a delegate on the
    /// configured model, and a Notion directory when a token is set.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        let directory = NotionDirectory::from_config(&config.directory)
            .map(|d| Arc::new(d) as Arc<dyn DirectoryClient>);
        if directory.is_none() {
            tracing::warn!("No directory token configured; directory lookups will fail");
        }

        Self {
            fetcher: Arc::new(HttpFetcher::new(&config.scraper.user_agent)),
            delegate: Delegate::new(
                provider,
                config.default_model.clone(),
                config.default_temperature,
            ),
            directory,
            homepage_timeout: Duration::from_secs(config.scraper.homepage_timeout_secs),
            article_timeout: Duration::from_secs(config.scraper.article_timeout_secs),
        }
    }

    /// A registry holding all five tools.
    pub fn build_registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(homepage_articles::HomepageArticlesTool::new(
            self.fetcher.clone(),
            self.homepage_timeout,
        )));
        registry.register(Box::new(article_paragraphs::ArticleParagraphsTool::new(
            self.fetcher.clone(),
            self.article_timeout,
        )));
        registry.register(Box::new(topic_urls::TopicUrlsTool::new(
            self.directory.clone(),
        )));
        registry.register(Box::new(analyze_query::AnalyzeQueryTool::new(
            self.delegate.clone(),
        )));
        registry.register(Box::new(answer_question::AnswerQuestionTool::new(
            self.delegate.clone(),
        )));
        registry
    }
}
