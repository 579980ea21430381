//! Answer synthesis tool: answer a question from extracted articles, citing
//! their URLs.

use async_trait::async_trait;
use siftwire_core::prompt::PromptTemplate;
use siftwire_core::protocol::{ArticleContext, NOT_AVAILABLE, parse_context, split_head};
use siftwire_core::tool::{Tool, ToolResult};

use crate::delegate::Delegate;

pub const NAME: &str = "answer_question_with_articles";

/// Returned, without a delegate call, when no article data is supplied.
pub const NO_INFORMATION: &str =
    "I could not find any relevant information to answer your question from the available articles.";

const NO_CONTENT_AVAILABLE: &str = "No content available.";

const PROMPT: PromptTemplate = PromptTemplate::new(
    r#"Answer the following question based ONLY on the provided context.
Your answer should be a short paragraph.
Crucially, include the URLs from the context where you found the information.
Question: "{question}"
Context: {context}
Answer:"#,
);

pub struct AnswerQuestionTool {
    delegate: Delegate,
}

impl AnswerQuestionTool {
    pub fn new(delegate: Delegate) -> Self {
        Self { delegate }
    }
}

/// Render the articles as numbered context sections, in input order.
pub fn build_context(articles: &[ArticleContext]) -> String {
    let mut sections = Vec::with_capacity(articles.len() * 6);
    for (i, article) in articles.iter().enumerate() {
        sections.push(format!("--- Article {} ---", i + 1));
        sections.push(format!("Title: {}", article.title().unwrap_or(NOT_AVAILABLE)));
        sections.push(format!("URL: {}", article.get("URL").unwrap_or(NOT_AVAILABLE)));
        sections.push("Content:".to_string());
        sections.push(
            article
                .get("Content")
                .unwrap_or(NO_CONTENT_AVAILABLE)
                .to_string(),
        );
        sections.push(String::new());
    }
    sections.join("\n")
}

#[async_trait]
impl Tool for AnswerQuestionTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Answer a question in a short paragraph using only the supplied article data, \
         citing the source URLs."
    }

    fn input_format(&self) -> &str {
        "<question>|||<one 'H1 Title: ... | URL: ... | Content: ...' line per article>"
    }

    async fn call(&self, input: &str) -> ToolResult {
        let Ok((question, data)) = split_head(input) else {
            return ToolResult::failure(
                "Error: Invalid input format. Expected 'user_question|||processed_articles_data_string'.",
            );
        };
        if data.is_empty() {
            return ToolResult::ok(NO_INFORMATION);
        }

        let articles = parse_context(data);
        tracing::debug!(articles = articles.len(), "Synthesizing answer");
        let context = build_context(&articles);

        match self
            .delegate
            .generate(&PROMPT, &[("question", question), ("context", context.as_str())])
            .await
        {
            Ok(answer) => ToolResult::ok(answer.trim()),
            Err(e) => ToolResult::failure(format!(
                "Error in answer_question_with_articles tool: {e}"
            )),
        }
    }
}
