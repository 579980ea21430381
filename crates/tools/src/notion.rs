//! Notion-backed topic directory.
//!
//! Records live in a Notion database with a select property for the
//! category and a URL property for the site. Lookups are one
//! `databases/{id}/query` call with an `or` filter of exact select matches.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use siftwire_config::DirectoryConfig;
use siftwire_core::directory::{DirectoryClient, DirectoryRecord, TopicQuery};
use siftwire_core::error::DirectoryError;
use tracing::{debug, warn};

const NOTION_VERSION: &str = "2022-06-28";

/// Directory client for the Notion REST API.
pub struct NotionDirectory {
    base_url: String,
    token: String,
    category_property: String,
    url_property: String,
    client: reqwest::Client,
}

impl NotionDirectory {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            category_property: "Category".into(),
            url_property: "Website".into(),
            client,
        }
    }

    /// Override the property names used for the category filter and URL.
    pub fn with_properties(
        mut self,
        category_property: impl Into<String>,
        url_property: impl Into<String>,
    ) -> Self {
        self.category_property = category_property.into();
        self.url_property = url_property.into();
        self
    }

    /// Build a client from config; `None` when no token is configured.
    pub fn from_config(config: &DirectoryConfig) -> Option<Self> {
        let token = config.token.as_deref().filter(|t| !t.trim().is_empty())?;
        Some(
            Self::new(&config.api_url, token)
                .with_properties(&config.category_property, &config.url_property),
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, DirectoryError> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| DirectoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Directory API returned error");
            return Err(DirectoryError::Api {
                status_code: status.as_u16(),
                message: api_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DirectoryError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl DirectoryClient for NotionDirectory {
    fn name(&self) -> &str {
        "notion"
    }

    async fn query_by_topics(
        &self,
        database_id: &str,
        query: &TopicQuery,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        debug!(database_id, topics = ?query.topics(), "Querying directory");

        let body = filter_body(&self.category_property, query);
        let response = self.send(self.client.post(&url).json(&body)).await?;
        let records = extract_records(&response, &self.url_property)?;
        debug!(records = records.len(), "Directory query returned");
        Ok(records)
    }

    async fn categories(&self, database_id: &str) -> Result<Vec<String>, DirectoryError> {
        let url = format!("{}/databases/{}", self.base_url, database_id);
        let response = self.send(self.client.get(&url)).await?;
        select_options(&response, &self.category_property)
    }
}

/// The query body: an `or` of exact select matches, one per topic.
pub fn filter_body(category_property: &str, query: &TopicQuery) -> Value {
    let clauses: Vec<Value> = query
        .topics()
        .iter()
        .map(|topic| {
            serde_json::json!({
                "property": category_property,
                "select": { "equals": topic }
            })
        })
        .collect();
    serde_json::json!({ "filter": { "or": clauses } })
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    properties: Map<String, Value>,
}

/// Read the URL property of every result page. Pages without it yield a
/// record with no URL.
pub fn extract_records(
    response: &Value,
    url_property: &str,
) -> Result<Vec<DirectoryRecord>, DirectoryError> {
    let parsed = QueryResponse::deserialize(response)
        .map_err(|e| DirectoryError::Malformed(e.to_string()))?;
    Ok(parsed
        .results
        .into_iter()
        .map(|page| DirectoryRecord {
            url: page
                .properties
                .get(url_property)
                .and_then(|p| p.get("url"))
                .and_then(Value::as_str)
                .map(String::from),
        })
        .collect())
}

/// The option names of a select property in a database schema.
pub fn select_options(schema: &Value, property: &str) -> Result<Vec<String>, DirectoryError> {
    let options = schema
        .pointer(&format!("/properties/{}/select/options", escape_pointer(property)))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            DirectoryError::Malformed(format!("no select options for property '{property}'"))
        })?;
    Ok(options
        .iter()
        .filter_map(|o| o.get("name").and_then(Value::as_str))
        .map(String::from)
        .collect())
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Notion error bodies carry a `message`; fall back to the raw body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
