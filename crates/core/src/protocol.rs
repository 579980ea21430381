//! The tool wire protocol.
//!
//! Tools exchange plain strings. Multi-field inputs are separated by `|||`,
//! multi-article context lines carry ` | `-separated `Key: Value` pairs, and
//! article records use a fixed `H1 Title: … ||| H2 Subtitle: … ||| Content: …`
//! layout. This module is the single codec for all of them: every component
//! parses into and renders from the typed records below instead of
//! splitting strings on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProtocolError;

/// Separates top-level input fields.
pub const FIELD_DELIMITER: &str = "|||";

/// The spaced variant used inside article records and query analyses.
pub const SPACED_FIELD_DELIMITER: &str = " ||| ";

/// Separates `Key: Value` pairs on one context line.
pub const PAIR_DELIMITER: &str = " | ";

/// Separates a key from its value.
pub const KEY_VALUE_DELIMITER: &str = ": ";

/// Placeholder for a title or subtitle that was not found.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for an article without usable paragraphs.
pub const NO_CONTENT: &str = "No content found.";

/// Split `input` on `delimiter` and require exactly `expected` fields.
/// Fields come back trimmed.
pub fn split_fields<'a>(
    input: &'a str,
    delimiter: &'static str,
    expected: usize,
) -> Result<Vec<&'a str>, ProtocolError> {
    let fields: Vec<&str> = input.split(delimiter).map(str::trim).collect();
    if fields.len() != expected {
        return Err(ProtocolError::FieldCount {
            expected,
            actual: fields.len(),
            delimiter,
        });
    }
    Ok(fields)
}

/// Split on the first `|||` only; everything after it is the second field.
pub fn split_head(input: &str) -> Result<(&str, &str), ProtocolError> {
    input
        .split_once(FIELD_DELIMITER)
        .map(|(head, tail)| (head.trim(), tail.trim()))
        .ok_or(ProtocolError::FieldCount {
            expected: 2,
            actual: 1,
            delimiter: FIELD_DELIMITER,
        })
}

/// Parse a comma-separated list: entries trimmed, empty entries dropped.
pub fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Parse one context line into its `Key: Value` pairs.
///
/// Pieces without a `": "` are skipped rather than rejected.
pub fn parse_pairs(line: &str) -> Vec<(String, String)> {
    line.split(PAIR_DELIMITER)
        .filter_map(|piece| piece.split_once(KEY_VALUE_DELIMITER))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Flatten a value so it fits on one context line without being split.
fn flatten_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(PAIR_DELIMITER, " / ")
}

// --- Links -------------------------------------------------------------

/// A link that passed relevance and domain filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdmittedLink {
    pub title: String,
    /// Absolute URL
    pub url: String,
}

impl AdmittedLink {
    /// Render as `Title: {title} | URL: {url}`. A ` | ` inside the title
    /// becomes ` / ` so the line parses back.
    pub fn to_line(&self) -> String {
        format!("Title: {} | URL: {}", flatten_value(&self.title), self.url)
    }

    /// Parse a line produced by [`AdmittedLink::to_line`].
    pub fn parse_line(line: &str) -> Option<Self> {
        let pairs = parse_pairs(line);
        let title = lookup(&pairs, "Title")?;
        let url = lookup(&pairs, "URL")?;
        Some(Self {
            title: title.to_string(),
            url: url.to_string(),
        })
    }
}

/// Parse every admitted-link line in a homepage tool result.
/// Lines that are not links (sentinels, errors) are ignored.
pub fn parse_admitted_links(output: &str) -> Vec<AdmittedLink> {
    output.lines().filter_map(AdmittedLink::parse_line).collect()
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

// --- Article records ---------------------------------------------------

/// The extracted content of one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub h1_title: String,
    pub h2_subtitle: String,
    pub paragraphs: Vec<String>,
}

impl ArticleRecord {
    /// An empty record: both titles unavailable, no paragraphs.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            h1_title: NOT_AVAILABLE.to_string(),
            h2_subtitle: NOT_AVAILABLE.to_string(),
            paragraphs: Vec::new(),
        }
    }

    /// Paragraphs joined by a blank line, or the no-content sentinel.
    pub fn content(&self) -> String {
        if self.paragraphs.is_empty() {
            NO_CONTENT.to_string()
        } else {
            self.paragraphs.join("\n\n")
        }
    }

    /// Render the record in its fixed wire layout.
    pub fn to_wire(&self) -> String {
        format!(
            "H1 Title: {} ||| H2 Subtitle: {} ||| Content: {}",
            self.h1_title,
            self.h2_subtitle,
            self.content()
        )
    }

    /// Parse a wire-format record produced for `url`.
    pub fn parse_wire(url: &str, wire: &str) -> Result<Self, ProtocolError> {
        let mut parts = wire.splitn(3, SPACED_FIELD_DELIMITER);
        let h1 = strip_marker(parts.next(), "H1 Title:")?;
        let h2 = strip_marker(parts.next(), "H2 Subtitle:")?;
        let content = strip_marker(parts.next(), "Content:")?;
        let paragraphs = if content == NO_CONTENT {
            Vec::new()
        } else {
            content
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect()
        };
        Ok(Self {
            url: url.to_string(),
            h1_title: h1.to_string(),
            h2_subtitle: h2.to_string(),
            paragraphs,
        })
    }

    /// The record as one context line, carrying the harvested title too.
    pub fn to_context(&self, original_title: Option<&str>) -> ArticleContext {
        let mut fields = vec![("H1 Title".to_string(), self.h1_title.clone())];
        if let Some(title) = original_title {
            fields.push(("Original Title".to_string(), title.to_string()));
        }
        fields.push(("URL".to_string(), self.url.clone()));
        fields.push(("Content".to_string(), self.content()));
        ArticleContext { fields }
    }
}

fn strip_marker<'a>(
    part: Option<&'a str>,
    marker: &'static str,
) -> Result<&'a str, ProtocolError> {
    part.map(str::trim)
        .and_then(|p| p.strip_prefix(marker))
        .map(str::trim)
        .ok_or(ProtocolError::MissingMarker(marker))
}

// --- Multi-article context ---------------------------------------------

/// One article on a multi-article context line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContext {
    pub fields: Vec<(String, String)>,
}

impl ArticleContext {
    pub fn get(&self, key: &str) -> Option<&str> {
        lookup(&self.fields, key)
    }

    /// The best available title: `H1 Title`, then `Original Title`, then `Title`.
    pub fn title(&self) -> Option<&str> {
        self.get("H1 Title")
            .filter(|t| *t != NOT_AVAILABLE)
            .or_else(|| self.get("Original Title"))
            .or_else(|| self.get("Title"))
            .or_else(|| self.get("H1 Title"))
    }

    /// Render as one line of ` | `-joined pairs.
    pub fn to_line(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}{KEY_VALUE_DELIMITER}{}", flatten_value(v)))
            .collect::<Vec<_>>()
            .join(PAIR_DELIMITER)
    }
}

/// Parse newline-delimited context lines. Blank lines and lines without a
/// single well-formed pair are dropped.
pub fn parse_context(data: &str) -> Vec<ArticleContext> {
    data.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| ArticleContext {
            fields: parse_pairs(line),
        })
        .filter(|article| !article.fields.is_empty())
        .collect()
}

/// Render context lines, one article per line.
pub fn render_context(articles: &[ArticleContext]) -> String {
    articles
        .iter()
        .map(ArticleContext::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

// --- Query analysis ----------------------------------------------------

/// Keywords and subjects extracted from a free-text question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub keywords: Option<Vec<String>>,
    /// Always lower-cased
    pub subjects: Option<Vec<String>>,
}

const KEYWORDS_MARKER: &str = "Keywords:";
const SUBJECTS_MARKER: &str = "Subjects:";

impl QueryAnalysis {
    /// The canonical value used when a response breaks the marker contract.
    pub fn fallback() -> Self {
        Self::default()
    }

    /// Parse a generated response. Both markers must be present.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let keywords = marker_segment(raw, KEYWORDS_MARKER)
            .ok_or(ProtocolError::MissingMarker(KEYWORDS_MARKER))?;
        let subjects = marker_segment(raw, SUBJECTS_MARKER)
            .ok_or(ProtocolError::MissingMarker(SUBJECTS_MARKER))?;
        Ok(Self {
            keywords: parse_marker_list(keywords),
            subjects: parse_marker_list(subjects)
                .map(|list| list.into_iter().map(|s| s.to_lowercase()).collect()),
        })
    }

    pub fn keywords(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or_default()
    }

    pub fn subjects(&self) -> &[String] {
        self.subjects.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for QueryAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |list: &Option<Vec<String>>| match list {
            Some(items) if !items.is_empty() => items.join(", "),
            _ => "None".to_string(),
        };
        write!(
            f,
            "Keywords: {} ||| Subjects: {}",
            render(&self.keywords),
            render(&self.subjects)
        )
    }
}

/// The text after `marker`, up to the next delimiter or marker.
fn marker_segment<'a>(raw: &'a str, marker: &str) -> Option<&'a str> {
    let start = raw.find(marker)? + marker.len();
    let rest = &raw[start..];
    let end = [FIELD_DELIMITER, KEYWORDS_MARKER, SUBJECTS_MARKER]
        .iter()
        .filter_map(|stop| rest.find(stop))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Items are separated by commas or line breaks. The list ends at the first
/// blank line after its first item.
fn parse_marker_list(segment: &str) -> Option<Vec<String>> {
    const NOISE: &[char] = &['[', ']', '"', '\'', '*', '`'];
    const BULLETS: &[char] = &['-', '*'];
    let items: Vec<String> = segment
        .lines()
        .map(|line| line.trim().trim_start_matches(BULLETS).trim_start())
        .skip_while(|line| line.is_empty())
        .take_while(|line| !line.is_empty())
        .flat_map(|line| line.split(','))
        .map(|item| item.trim().trim_matches(NOISE).trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();
    match items.as_slice() {
        [] => None,
        [only] if only.eq_ignore_ascii_case("none") => None,
        _ => Some(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fields_requires_exact_count() {
        assert_eq!(
            split_fields(" https://a.com ||| ai, ml ", FIELD_DELIMITER, 2).unwrap(),
            vec!["https://a.com", "ai, ml"]
        );
        let err = split_fields("a|||b|||c", FIELD_DELIMITER, 2).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::FieldCount {
                expected: 2,
                actual: 3,
                delimiter: FIELD_DELIMITER
            }
        );
    }

    #[test]
    fn split_head_keeps_later_delimiters() {
        let (q, data) = split_head("why? ||| H1 Title: a ||| b").unwrap();
        assert_eq!(q, "why?");
        assert_eq!(data, "H1 Title: a ||| b");
        assert!(split_head("no delimiter").is_err());
    }

    #[test]
    fn pairs_split_on_first_colon_and_skip_malformed() {
        let pairs = parse_pairs("Title: Rust: the book | garbage | URL: https://x.io/a");
        assert_eq!(
            pairs,
            vec![
                ("Title".to_string(), "Rust: the book".to_string()),
                ("URL".to_string(), "https://x.io/a".to_string()),
            ]
        );
    }

    #[test]
    fn admitted_links_parse_from_tool_output() {
        let out = "Title: A story | URL: https://e.com/news/a\nNo relevant articles found on this homepage.";
        let links = parse_admitted_links(out);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://e.com/news/a");
        assert_eq!(links[0].to_line(), "Title: A story | URL: https://e.com/news/a");
    }

    #[test]
    fn pipe_in_title_survives_the_line_format() {
        let link = AdmittedLink {
            title: "Robots | Tech News".into(),
            url: "https://e.com/news/robots".into(),
        };
        let line = link.to_line();
        assert_eq!(line, "Title: Robots / Tech News | URL: https://e.com/news/robots");
        let parsed = AdmittedLink::parse_line(&line).unwrap();
        assert_eq!(parsed.title, "Robots / Tech News");
        assert_eq!(parsed.url, link.url);
    }

    #[test]
    fn article_record_wire_layout() {
        let mut record = ArticleRecord::empty("https://e.com/a");
        assert_eq!(
            record.to_wire(),
            "H1 Title: N/A ||| H2 Subtitle: N/A ||| Content: No content found."
        );
        record.h1_title = "Big Story".into();
        record.paragraphs = vec!["first paragraph".into(), "second paragraph".into()];
        let wire = record.to_wire();
        assert!(wire.ends_with("Content: first paragraph\n\nsecond paragraph"));
        assert_eq!(ArticleRecord::parse_wire("https://e.com/a", &wire).unwrap(), record);
    }

    #[test]
    fn error_text_is_not_an_article_record() {
        let err = ArticleRecord::parse_wire("u", "Error fetching article from u: timeout");
        assert_eq!(err, Err(ProtocolError::MissingMarker("H1 Title:")));
    }

    #[test]
    fn context_line_is_flattened() {
        let mut record = ArticleRecord::empty("https://e.com/a");
        record.paragraphs = vec!["one | two".into(), "three\nfour".into()];
        let line = record.to_context(Some("Harvested")).to_line();
        assert!(!line.contains('\n'));
        let parsed = parse_context(&line);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].get("Content"), Some("one / two three four"));
        assert_eq!(parsed[0].title(), Some("Harvested"));
    }

    #[test]
    fn context_title_fallbacks() {
        let ctx = parse_context("H1 Title: Real | URL: u\nTitle: Only | URL: v\nURL: w");
        assert_eq!(ctx[0].title(), Some("Real"));
        assert_eq!(ctx[1].title(), Some("Only"));
        assert_eq!(ctx[2].title(), None);
    }

    #[test]
    fn query_analysis_parses_bracketed_lists() {
        let qa = QueryAnalysis::parse(
            "Keywords: [Galaxy Z Fold 7, Samsung] ||| Subjects: [Technology, Gadgets]\n",
        )
        .unwrap();
        assert_eq!(qa.keywords(), ["Galaxy Z Fold 7", "Samsung"]);
        assert_eq!(qa.subjects(), ["technology", "gadgets"]);
        assert_eq!(
            qa.to_string(),
            "Keywords: Galaxy Z Fold 7, Samsung ||| Subjects: technology, gadgets"
        );
    }

    #[test]
    fn query_analysis_none_values() {
        let qa = QueryAnalysis::parse("Keywords: None ||| Subjects: none").unwrap();
        assert_eq!(qa, QueryAnalysis::fallback());
        assert_eq!(qa.to_string(), "Keywords: None ||| Subjects: None");
    }

    #[test]
    fn query_analysis_values_on_following_lines() {
        let qa = QueryAnalysis::parse("Keywords:\nrobotics, AI\nSubjects:\ntechnology").unwrap();
        assert_eq!(qa.keywords(), ["robotics", "AI"]);
        assert_eq!(qa.subjects(), ["technology"]);

        let qa = QueryAnalysis::parse(
            "Keywords: robotics\nlaundry\n\nSubjects:\n- Technology\nScience\n\nHope this helps!",
        )
        .unwrap();
        assert_eq!(qa.keywords(), ["robotics", "laundry"]);
        assert_eq!(qa.subjects(), ["technology", "science"]);
    }

    #[test]
    fn query_analysis_requires_both_markers() {
        assert_eq!(
            QueryAnalysis::parse("Keywords: a, b"),
            Err(ProtocolError::MissingMarker("Subjects:"))
        );
        assert_eq!(
            QueryAnalysis::parse("Subjects: a"),
            Err(ProtocolError::MissingMarker("Keywords:"))
        );
    }
}
