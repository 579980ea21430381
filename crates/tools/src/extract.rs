//! Article content extraction from a fetched page.
//!
//! The title, subtitle and main content container are each chosen by the
//! first matching entry of a priority table, so support for a new site
//! layout is one more selector row rather than new logic.

use scraper::{ElementRef, Html};
use siftwire_core::protocol::ArticleRecord;

use crate::html::{readable_text, selector};

/// Title selectors, highest priority first.
pub const TITLE_SELECTORS: &[&str] = &["h1.mainTitle", "span.headline", "h1"];

/// Subtitle selectors, highest priority first.
pub const SUBTITLE_SELECTORS: &[&str] = &["span.subTitle", "h2"];

/// Main content container selectors, highest priority first. Known site
/// layouts come before the generic `article` and `main` fallbacks; when
/// nothing matches the whole document is used.
pub const CONTAINER_SELECTORS: &[&str] = &[
    r#"section[itemprop="articleBody"]"#,
    "div#find-article-content",
    "div.text_editor_section",
    "div#article_content_wrapper",
    "div#article_text_content",
    "div.article-content",
    "div.entry-content",
    "div.post-content",
    "div.story-body",
    "div.main-content-article",
    "div.main-article-body",
    "div.text_editor",
    "div.article-body",
    "div.story-text",
    "div.item-container",
    "div.article-container",
    "div.news_story_content",
    "div.article-text",
    "div.content-wrapper",
    "div.col-md-8",
    "div.s-article",
    "div.slot_body_content",
    "div.article_general_wrapper",
    "div#articleBody",
    "div#content",
    "div#mainContent",
    "div#story",
    "div#main",
    "div#paywall_article_parent",
    "div#ArticleBodyComponent",
    "section.article-paragraph-wrap",
    "article",
    "main",
];

/// Element kinds inspected inside the container.
const PARAGRAPH_KINDS: &str = "p, section, div, span";

/// Classes that mark a non-`<p>` element as body text.
pub const PARAGRAPH_CLASSES: &[&str] = &[
    "text_editor_paragraph",
    "text_editor_section",
    "article-body-paragraph",
];

/// Paragraphs must be longer than this many characters.
pub const MIN_PARAGRAPH_CHARS: usize = 20;

/// Extract title, subtitle and body paragraphs from an article page.
pub fn extract_article(url: &str, html: &str) -> ArticleRecord {
    let document = Html::parse_document(html);

    let mut record = ArticleRecord::empty(url);
    if let Some(title) = first_text(&document, TITLE_SELECTORS) {
        record.h1_title = title;
    }
    if let Some(subtitle) = first_text(&document, SUBTITLE_SELECTORS) {
        record.h2_subtitle = subtitle;
    }

    let (container, rule) = select_container(&document);
    tracing::debug!(url, container = rule, "Selected content container");
    record.paragraphs = collect_paragraphs(container);
    record
}

/// Text of the first element matched by the earliest selector whose match
/// has non-empty text.
fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let sel = selector(css)?;
        let element = document.select(&sel).next()?;
        let text = readable_text(element);
        (!text.is_empty()).then_some(text)
    })
}

/// The content container and the rule that chose it.
pub fn select_container(document: &Html) -> (ElementRef<'_>, &'static str) {
    CONTAINER_SELECTORS
        .iter()
        .find_map(|css| {
            let sel = selector(css)?;
            document.select(&sel).next().map(|element| (element, *css))
        })
        .unwrap_or((document.root_element(), "document"))
}

/// Plain `<p>`s, or elements flagged as body text by class or `data-text`.
pub fn is_paragraph(element: ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "p"
        || value.classes().any(|c| PARAGRAPH_CLASSES.contains(&c))
        || value.attr("data-text") == Some("true")
}

/// Body paragraphs below `container` in document order: long enough and
/// not seen before.
pub fn collect_paragraphs(container: ElementRef<'_>) -> Vec<String> {
    let Some(kinds) = selector(PARAGRAPH_KINDS) else {
        return Vec::new();
    };
    let mut paragraphs: Vec<String> = Vec::new();
    let candidates = container
        .select(&kinds)
        .filter(|e| e.id() != container.id() && is_paragraph(*e));
    for element in candidates {
        let text = readable_text(element);
        if text.chars().count() > MIN_PARAGRAPH_CHARS && !paragraphs.contains(&text) {
            paragraphs.push(text);
        }
    }
    paragraphs
}
