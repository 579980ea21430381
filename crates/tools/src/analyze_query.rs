//! Query mapping tool: keywords and subject categories for a question.

use async_trait::async_trait;
use siftwire_core::prompt::PromptTemplate;
use siftwire_core::protocol::{QueryAnalysis, SPACED_FIELD_DELIMITER, parse_list, split_fields};
use siftwire_core::tool::{Tool, ToolResult};

use crate::delegate::Delegate;

pub const NAME: &str = "analyze_query_and_map_subjects";

const PROMPT: PromptTemplate = PromptTemplate::new(
    r#"Given the user query: "{query}" and the available subject categories: [{types_list}]
1. Extract the most important keywords or key phrases from the query.
2. Identify the most relevant subject categories from the provided list.
Return the results in the exact format: "Keywords: [comma-separated keywords or None] ||| Subjects: [comma-separated subjects or None]"
Write the category names in lower case."#,
);

pub struct AnalyzeQueryTool {
    delegate: Delegate,
}

impl AnalyzeQueryTool {
    pub fn new(delegate: Delegate) -> Self {
        Self { delegate }
    }
}

#[async_trait]
impl Tool for AnalyzeQueryTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Extract keywords from a question and map it onto the known subject categories. \
         Returns 'Keywords: ... ||| Subjects: ...'."
    }

    fn input_format(&self) -> &str {
        "<query> ||| <type1,type2>"
    }

    async fn call(&self, input: &str) -> ToolResult {
        let Ok(fields) = split_fields(input, SPACED_FIELD_DELIMITER, 2) else {
            return ToolResult::failure(
                "Error: Invalid input format. Expected 'user_query ||| types_list'.",
            );
        };
        let types = parse_list(fields[1]);
        if types.is_empty() {
            return ToolResult::failure(
                "Error: No available website types provided in the input.",
            );
        }

        let types_list = types.join(", ");
        let raw = match self
            .delegate
            .generate(&PROMPT, &[("query", fields[0]), ("types_list", types_list.as_str())])
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                return ToolResult::failure(format!(
                    "Error in analyze_query_and_map_subjects tool: {e}"
                ));
            }
        };

        let analysis = QueryAnalysis::parse(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Delegate reply broke the marker contract");
            QueryAnalysis::fallback()
        });
        ToolResult::ok(analysis.to_string())
    }
}
