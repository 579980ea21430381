//! Research pipeline: answers a free-text question end to end.
//!
//! The steps run strictly in sequence, each one a call to a registered tool
//! through the string protocol:
//!
//! 1. map the question onto keywords and subject categories
//! 2. look up homepages for those subjects in the directory
//! 3. scan each homepage for articles matching the keywords
//! 4. extract each admitted article, up to `max_articles`
//! 5. synthesize an answer from the extracted articles
//!
//! Tool results are never fatal: a failed step contributes nothing and the
//! pipeline moves on. Every call is recorded as a [`Thought`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siftwire_config::AppConfig;
use siftwire_core::directory::DirectoryClient;
use siftwire_core::error::{DirectoryError, ToolError};
use siftwire_core::protocol::{
    AdmittedLink, ArticleContext, ArticleRecord, FIELD_DELIMITER, QueryAnalysis,
    SPACED_FIELD_DELIMITER, parse_admitted_links, render_context,
};
use siftwire_core::tool::{ToolRegistry, ToolResult};
use siftwire_tools::{
    analyze_query, answer_question, article_paragraphs, homepage_articles, topic_urls,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Observations longer than this are cut in the recorded trace.
const OBSERVATION_LIMIT: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("no directory database id configured")]
    MissingDatabaseId,

    #[error("no subject categories available: {0}")]
    NoCategories(String),
}

/// One tool call made by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    pub tool: String,
    pub input: String,
    /// The tool's output, truncated
    pub observation: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// The answer together with the calls that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub answer: String,
    pub thoughts: Vec<Thought>,
}

pub struct ResearchPipeline {
    tools: Arc<ToolRegistry>,
    directory: Option<Arc<dyn DirectoryClient>>,
    database_id: Option<String>,
    categories: Vec<String>,
    max_articles: usize,
}

impl ResearchPipeline {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            directory: None,
            database_id: None,
            categories: Vec::new(),
            max_articles: 8,
        }
    }

    /// Settings from config: database id, static categories and the
    /// article cap.
    pub fn from_config(
        tools: Arc<ToolRegistry>,
        directory: Option<Arc<dyn DirectoryClient>>,
        config: &AppConfig,
    ) -> Self {
        let mut pipeline = Self::new(tools)
            .with_categories(config.directory.categories.clone())
            .with_max_articles(config.scraper.max_articles);
        pipeline.directory = directory;
        pipeline.database_id = config.directory.database_id.clone();
        pipeline
    }

    /// Directory used to discover categories when none are configured.
    pub fn with_directory(mut self, directory: Arc<dyn DirectoryClient>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_database_id(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = Some(database_id.into());
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_max_articles(mut self, max: usize) -> Self {
        self.max_articles = max.max(1);
        self
    }

    /// Answer `question`.
    pub async fn run(&self, question: &str) -> Result<PipelineOutcome, PipelineError> {
        let database_id = self
            .database_id
            .as_deref()
            .ok_or(PipelineError::MissingDatabaseId)?;
        let categories = self.categories(database_id).await?;
        // The question travels inside delimited inputs.
        let question = question.replace(FIELD_DELIMITER, " ");
        let question = question.trim();

        let mut run = Run {
            tools: &self.tools,
            thoughts: Vec::new(),
        };

        let mapped = run
            .call(
                analyze_query::NAME,
                format!("{question}{SPACED_FIELD_DELIMITER}{}", categories.join(", ")),
            )
            .await?;
        let analysis = QueryAnalysis::parse(&mapped.output).unwrap_or_default();
        info!(
            keywords = ?analysis.keywords(),
            subjects = ?analysis.subjects(),
            "Mapped question"
        );

        let mut contexts = Vec::new();
        if !analysis.subjects().is_empty() {
            let homepages = run.homepages(database_id, analysis.subjects()).await?;
            let links = run.articles(&homepages, analysis.keywords(), self.max_articles).await?;
            for link in links {
                if let Some(context) = run.extract(&link).await? {
                    contexts.push(context);
                }
            }
        }
        info!(articles = contexts.len(), "Collected article context");

        let answer = run
            .call(
                answer_question::NAME,
                format!("{question}{FIELD_DELIMITER}{}", render_context(&contexts)),
            )
            .await?;

        Ok(PipelineOutcome {
            answer: answer.output,
            thoughts: run.thoughts,
        })
    }

    async fn categories(&self, database_id: &str) -> Result<Vec<String>, PipelineError> {
        if !self.categories.is_empty() {
            return Ok(self.categories.clone());
        }
        let directory = self
            .directory
            .as_ref()
            .ok_or_else(|| PipelineError::NoCategories(DirectoryError::NotConfigured.to_string()))?;
        let categories = directory
            .categories(database_id)
            .await
            .map_err(|e| PipelineError::NoCategories(e.to_string()))?;
        if categories.is_empty() {
            return Err(PipelineError::NoCategories(
                "the directory defines no categories".into(),
            ));
        }
        debug!(count = categories.len(), "Discovered categories from directory");
        Ok(categories)
    }
}

/// The state of one pipeline run.
struct Run<'a> {
    tools: &'a ToolRegistry,
    thoughts: Vec<Thought>,
}

impl Run<'_> {
    async fn call(&mut self, tool: &str, input: String) -> Result<ToolResult, ToolError> {
        let result = self.tools.execute(tool, &input).await?;
        debug!(tool, success = result.success, "Pipeline step finished");
        self.thoughts.push(Thought {
            tool: tool.to_string(),
            input,
            observation: truncate(&result.output, OBSERVATION_LIMIT),
            success: result.success,
            timestamp: Utc::now(),
        });
        Ok(result)
    }

    async fn homepages(
        &mut self,
        database_id: &str,
        subjects: &[String],
    ) -> Result<Vec<String>, ToolError> {
        let result = self
            .call(
                topic_urls::NAME,
                format!("{database_id}{FIELD_DELIMITER}{}", subjects.join(",")),
            )
            .await?;
        if !result.success || result.output == topic_urls::NONE_FOUND {
            return Ok(Vec::new());
        }
        Ok(result
            .output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Admitted links across all homepages in discovery order, each URL
    /// once, at most `limit` of them.
    async fn articles(
        &mut self,
        homepages: &[String],
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<AdmittedLink>, ToolError> {
        let keywords = keywords.join(",");
        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for homepage in homepages {
            if links.len() >= limit {
                break;
            }
            let result = self
                .call(
                    homepage_articles::NAME,
                    format!("{homepage}{FIELD_DELIMITER}{keywords}"),
                )
                .await?;
            for link in parse_admitted_links(&result.output) {
                if links.len() < limit && seen.insert(link.url.clone()) {
                    links.push(link);
                }
            }
        }
        Ok(links)
    }

    async fn extract(&mut self, link: &AdmittedLink) -> Result<Option<ArticleContext>, ToolError> {
        let result = self.call(article_paragraphs::NAME, link.url.clone()).await?;
        if !result.success {
            return Ok(None);
        }
        Ok(ArticleRecord::parse_wire(&link.url, &result.output)
            .ok()
            .map(|record| record.to_context(Some(&link.title))))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use siftwire_core::directory::{DirectoryRecord, TopicQuery};
    use siftwire_core::tool::Tool;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<(String, String)>>>;

    /// A tool whose output is computed from its input.
    struct ScriptedTool {
        name: &'static str,
        reply: fn(&str) -> ToolResult,
        log: Log,
    }

    #[async_trait]
    impl Tool for ScriptedTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "scripted"
        }
        fn input_format(&self) -> &str {
            "<any>"
        }
        async fn call(&self, input: &str) -> ToolResult {
            self.log
                .lock()
                .unwrap()
                .push((self.name.to_string(), input.to_string()));
            (self.reply)(input)
        }
    }

    fn mapper(_: &str) -> ToolResult {
        ToolResult::ok("Keywords: robotics ||| Subjects: technology")
    }

    fn mapper_without_subjects(_: &str) -> ToolResult {
        ToolResult::ok("Keywords: None ||| Subjects: None")
    }

    fn directory_lookup(_: &str) -> ToolResult {
        ToolResult::ok("https://a.com\nhttps://b.com")
    }

    fn homepage(input: &str) -> ToolResult {
        if input.starts_with("https://a.com") {
            ToolResult::ok(
                "Title: Robot arms | URL: https://a.com/news/arms\n\
                 Title: Robot legs | URL: https://a.com/news/legs",
            )
        } else {
            ToolResult::ok(
                "Title: Arms again | URL: https://a.com/news/arms\n\
                 Title: Robot farms | URL: https://b.com/story/farms",
            )
        }
    }

    fn article(url: &str) -> ToolResult {
        if url.ends_with("legs") {
            return ToolResult::failure(format!(
                "Error fetching article from {url}: 404 for url: {url}"
            ));
        }
        ToolResult::ok("H1 Title: N/A ||| H2 Subtitle: N/A ||| Content: Robots did things today.")
    }

    fn answer(input: &str) -> ToolResult {
        ToolResult::ok(format!("ANSWER[{input}]"))
    }

    fn registry(map: fn(&str) -> ToolResult) -> (Arc<ToolRegistry>, Log) {
        let log: Log = Arc::default();
        let mut registry = ToolRegistry::new();
        let script: [(&'static str, fn(&str) -> ToolResult); 5] = [
            (analyze_query::NAME, map),
            (topic_urls::NAME, directory_lookup),
            (homepage_articles::NAME, homepage),
            (article_paragraphs::NAME, article),
            (answer_question::NAME, answer),
        ];
        for (name, reply) in script {
            registry.register(Box::new(ScriptedTool {
                name,
                reply,
                log: log.clone(),
            }));
        }
        (Arc::new(registry), log)
    }

    fn pipeline(tools: Arc<ToolRegistry>) -> ResearchPipeline {
        ResearchPipeline::new(tools)
            .with_database_id("db1")
            .with_categories(vec!["Technology".into(), "Sports".into()])
    }

    fn calls(log: &Log) -> Vec<(String, String)> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn runs_every_step_in_order() {
        let (tools, log) = registry(mapper);
        let outcome = pipeline(tools).run("What is new in robotics?").await.unwrap();
        let calls = calls(&log);
        let names: Vec<&str> = calls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                analyze_query::NAME,
                topic_urls::NAME,
                homepage_articles::NAME,
                homepage_articles::NAME,
                article_paragraphs::NAME,
                article_paragraphs::NAME,
                article_paragraphs::NAME,
                answer_question::NAME,
            ]
        );
        assert_eq!(calls[0].1, "What is new in robotics? ||| Technology, Sports");
        assert_eq!(calls[1].1, "db1|||technology");
        assert_eq!(calls[2].1, "https://a.com|||robotics");
        // The repeated arms URL from the second homepage is skipped.
        assert_eq!(calls[4].1, "https://a.com/news/arms");
        assert_eq!(calls[5].1, "https://a.com/news/legs");
        assert_eq!(calls[6].1, "https://b.com/story/farms");

        let answer_input = &calls[7].1;
        assert!(answer_input.starts_with("What is new in robotics?|||"));
        // The failed legs article contributes nothing.
        assert!(!answer_input.contains("legs"));
        assert!(answer_input.contains(
            "H1 Title: N/A | Original Title: Robot arms | URL: https://a.com/news/arms | Content: Robots did things today."
        ));
        assert!(answer_input.contains("Original Title: Robot farms"));
        assert!(outcome.answer.starts_with("ANSWER["));
        assert_eq!(outcome.thoughts.len(), 8);
        assert!(!outcome.thoughts[5].success);
    }

    #[tokio::test]
    async fn article_cap_limits_extraction() {
        let (tools, log) = registry(mapper);
        pipeline(tools).with_max_articles(1).run("robots").await.unwrap();
        let calls = calls(&log);
        let homepage_scans = calls
            .iter()
            .filter(|(n, _)| n == homepage_articles::NAME)
            .count();
        let extractions = calls
            .iter()
            .filter(|(n, _)| n == article_paragraphs::NAME)
            .count();
        assert_eq!(homepage_scans, 1);
        assert_eq!(extractions, 1);
    }

    #[tokio::test]
    async fn no_subjects_goes_straight_to_the_answer() {
        let (tools, log) = registry(mapper_without_subjects);
        let outcome = pipeline(tools).run("Hello?").await.unwrap();
        let calls = calls(&log);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1], (answer_question::NAME.to_string(), "Hello?|||".to_string()));
        assert_eq!(outcome.answer, "ANSWER[Hello?|||]");
    }

    #[tokio::test]
    async fn delimiters_in_the_question_are_neutralized() {
        let (tools, log) = registry(mapper_without_subjects);
        pipeline(tools).run("a ||| b").await.unwrap();
        assert_eq!(calls(&log)[0].1, "a   b ||| Technology, Sports");
    }

    #[tokio::test]
    async fn missing_database_id_is_an_error() {
        let (tools, _) = registry(mapper);
        let err = ResearchPipeline::new(tools).run("q").await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingDatabaseId));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let err = ResearchPipeline::new(Arc::new(ToolRegistry::new()))
            .with_database_id("db")
            .with_categories(vec!["x".into()])
            .run("q")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Tool(ToolError::NotFound(_))));
    }

    struct CategoryDirectory(Vec<String>);

    #[async_trait]
    impl DirectoryClient for CategoryDirectory {
        fn name(&self) -> &str {
            "categories"
        }
        async fn query_by_topics(
            &self,
            _database_id: &str,
            _query: &TopicQuery,
        ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
            Ok(Vec::new())
        }
        async fn categories(&self, _database_id: &str) -> Result<Vec<String>, DirectoryError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn categories_are_discovered_from_the_directory() {
        let (tools, log) = registry(mapper_without_subjects);
        ResearchPipeline::new(tools)
            .with_database_id("db")
            .with_directory(Arc::new(CategoryDirectory(vec!["science".into(), "health".into()])))
            .run("q")
            .await
            .unwrap();
        assert_eq!(calls(&log)[0].1, "q ||| science, health");
    }

    #[tokio::test]
    async fn no_categories_anywhere_is_an_error() {
        let (tools, _) = registry(mapper);
        let err = ResearchPipeline::new(tools.clone())
            .with_database_id("db")
            .run("q")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoCategories(_)));

        let err = ResearchPipeline::new(tools)
            .with_database_id("db")
            .with_directory(Arc::new(CategoryDirectory(Vec::new())))
            .run("q")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoCategories(_)));
    }

    #[test]
    fn from_config_reads_directory_and_scraper_settings() {
        let mut config = AppConfig::default();
        config.directory.database_id = Some("db9".into());
        config.directory.categories = vec!["tech".into()];
        config.scraper.max_articles = 3;
        let pipeline = ResearchPipeline::from_config(Arc::new(ToolRegistry::new()), None, &config);
        assert_eq!(pipeline.database_id.as_deref(), Some("db9"));
        assert_eq!(pipeline.categories, vec!["tech"]);
        assert_eq!(pipeline.max_articles, 3);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("short", 10), "short");
    }
}
