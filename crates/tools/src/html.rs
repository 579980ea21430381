//! Text extraction helpers over parsed HTML.

use scraper::{ElementRef, Selector};

/// Tags whose contents are never readable text.
pub const NON_TEXT_TAGS: &[&str] = &[
    "script",
    "style",
    "iframe",
    "figure",
    "img",
    "video",
    "audio",
    "figcaption",
    "noscript",
];

/// Parse a selector, `None` if it is not valid CSS.
pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// The element's text with the subtrees named in `skip` left out.
///
/// Text nodes are trimmed and joined by single spaces; inner whitespace
/// runs collapse to one space.
pub fn text_without(element: ElementRef<'_>, skip: &[&str]) -> String {
    let mut raw = String::new();
    collect_text(element, skip, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The element's readable text: scripts, styles and embedded media excluded.
pub fn readable_text(element: ElementRef<'_>) -> String {
    text_without(element, NON_TEXT_TAGS)
}

fn collect_text(element: ElementRef<'_>, skip: &[&str], out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(' ');
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !skip.contains(&child.value().name()) {
                collect_text(child, skip, out);
            }
        }
    }
}
