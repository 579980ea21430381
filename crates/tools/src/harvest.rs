//! Link harvesting: pairs title-bearing elements on a homepage with links.
//!
//! Sites disagree on whether a headline sits inside its link, above it or
//! beside it. Each text-bearing element is run through [`LINK_RULES`] in
//! order and takes the link from the first rule that yields one.

use scraper::{ElementRef, Html};
use std::collections::HashSet;

use crate::html::{selector, text_without};

/// Tag kinds that may carry an article title.
pub const TITLE_TAGS: &str = "h1, h2, h3, div, span, p, a";

/// A (title, href) pair found on a homepage, not yet validated or resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateLink {
    pub title: String,
    pub raw_href: String,
}

/// One link-association rule: find the element that carries the link,
/// then read `attr` from it.
pub struct LinkRule {
    pub name: &'static str,
    pub locate: for<'a> fn(ElementRef<'a>) -> Option<ElementRef<'a>>,
    pub attr: &'static str,
}

impl LinkRule {
    /// The rule's link for `element`, if it has a non-empty one.
    pub fn apply(&self, element: ElementRef<'_>) -> Option<String> {
        let carrier = (self.locate)(element)?;
        let value = carrier.value().attr(self.attr)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Link-association rules in priority order.
pub const LINK_RULES: &[LinkRule] = &[
    LinkRule {
        name: "enclosing anchor",
        locate: enclosing_anchor,
        attr: "href",
    },
    LinkRule {
        name: "enclosing data-url",
        locate: enclosing_data_url,
        attr: "data-url",
    },
    LinkRule {
        name: "enclosing data-destinationlink",
        locate: enclosing_destination_link,
        attr: "data-destinationlink",
    },
    LinkRule {
        name: "self anchor",
        locate: self_anchor,
        attr: "href",
    },
    LinkRule {
        name: "next sibling anchor",
        locate: next_sibling_anchor,
        attr: "href",
    },
    LinkRule {
        name: "previous sibling anchor",
        locate: previous_sibling_anchor,
        attr: "href",
    },
];

fn is_linked_anchor(element: &ElementRef<'_>) -> bool {
    element.value().name() == "a" && element.value().attr("href").is_some()
}

fn enclosing<'a>(
    element: ElementRef<'a>,
    pred: impl Fn(&ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    element.ancestors().filter_map(ElementRef::wrap).find(pred)
}

fn enclosing_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    enclosing(element, is_linked_anchor)
}

fn enclosing_data_url(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    enclosing(element, |e| e.value().attr("data-url").is_some())
}

fn enclosing_destination_link(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    enclosing(element, |e| e.value().attr("data-destinationlink").is_some())
}

fn self_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    (element.value().name() == "a").then_some(element)
}

fn next_sibling_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(is_linked_anchor)
}

fn previous_sibling_anchor(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(is_linked_anchor)
}

/// The link associated with `element` by the first matching rule.
pub fn associated_link(element: ElementRef<'_>) -> Option<String> {
    LINK_RULES.iter().find_map(|rule| rule.apply(element))
}

/// Scan a homepage for candidate links, in document order, deduplicated
/// by (title, href).
pub fn harvest_links(html: &str) -> Vec<CandidateLink> {
    let Some(title_selector) = selector(TITLE_TAGS) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut seen: HashSet<CandidateLink> = HashSet::new();
    let mut candidates = Vec::new();
    for element in document.select(&title_selector) {
        let title = text_without(element, &["script", "style", "noscript"]);
        if title.is_empty() {
            continue;
        }
        let Some(raw_href) = associated_link(element) else {
            continue;
        };
        let candidate = CandidateLink { title, raw_href };
        if seen.insert(candidate.clone()) {
            candidates.push(candidate);
        }
    }
    tracing::debug!(candidates = candidates.len(), "Harvested homepage links");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&selector(css).unwrap()).next().unwrap()
    }

    fn rule_name(doc: &Html, css: &str) -> Option<&'static str> {
        let el = element(doc, css);
        LINK_RULES
            .iter()
            .find(|rule| rule.apply(el).is_some())
            .map(|rule| rule.name)
    }

    #[test]
    fn enclosing_anchor_wins_over_data_attributes() {
        let doc = Html::parse_fragment(
            r#"<div data-url="/data"><a href="/anchor"><h2 id="t">Title</h2></a></div>"#,
        );
        assert_eq!(associated_link(element(&doc, "#t")), Some("/anchor".into()));
        assert_eq!(rule_name(&doc, "#t"), Some("enclosing anchor"));
    }

    #[test]
    fn data_url_beats_destination_link() {
        let doc = Html::parse_fragment(
            r#"<div data-destinationlink="/dest"><div data-url="/data"><span id="t">Title</span></div></div>"#,
        );
        assert_eq!(associated_link(element(&doc, "#t")), Some("/data".into()));
    }

    #[test]
    fn destination_link_attribute() {
        let doc = Html::parse_fragment(
            r#"<section data-destinationlink="/dest"><p id="t">Title</p></section>"#,
        );
        assert_eq!(rule_name(&doc, "#t"), Some("enclosing data-destinationlink"));
    }

    #[test]
    fn empty_enclosing_href_falls_through() {
        let doc = Html::parse_fragment(
            r#"<div data-url="/data"><a href=""><span id="t">Title</span></a></div>"#,
        );
        assert_eq!(associated_link(element(&doc, "#t")), Some("/data".into()));
    }

    #[test]
    fn anchor_uses_its_own_href() {
        let doc = Html::parse_fragment(r#"<a id="t" href="/self">Title</a>"#);
        assert_eq!(rule_name(&doc, "#t"), Some("self anchor"));
    }

    #[test]
    fn next_sibling_before_previous_sibling() {
        let doc = Html::parse_fragment(
            r#"<div><a href="/prev">p</a><h3 id="t">Title</h3><span>x</span><a href="/next">n</a></div>"#,
        );
        assert_eq!(associated_link(element(&doc, "#t")), Some("/next".into()));
    }

    #[test]
    fn previous_sibling_as_last_resort() {
        let doc = Html::parse_fragment(
            r#"<div><a href="/prev">p</a><h3 id="t">Title</h3><a>no href</a></div>"#,
        );
        assert_eq!(rule_name(&doc, "#t"), Some("previous sibling anchor"));
    }

    #[test]
    fn unlinked_element_has_no_candidate() {
        let doc = Html::parse_fragment(r#"<div><p id="t">Lonely text</p></div>"#);
        assert_eq!(associated_link(element(&doc, "#t")), None);
    }

    #[test]
    fn harvest_dedups_and_skips_empty_text() {
        let html = r#"<html><body>
            <a href="/article/ai-progress">AI breakthroughs in robotics</a>
            <a href="/article/ai-progress">AI breakthroughs in robotics</a>
            <a href="/empty">   </a>
            <a href="/about">About us</a>
        </body></html>"#;
        let links = harvest_links(html);
        assert_eq!(
            links,
            vec![
                CandidateLink {
                    title: "AI breakthroughs in robotics".into(),
                    raw_href: "/article/ai-progress".into()
                },
                CandidateLink {
                    title: "About us".into(),
                    raw_href: "/about".into()
                },
            ]
        );
    }

    #[test]
    fn harvest_pairs_nested_headline_with_its_card_link() {
        let html = r#"<div class="card"><a href="/news/x"><h2>Quantum chips ship</h2></a></div>"#;
        let links = harvest_links(html);
        assert!(links.contains(&CandidateLink {
            title: "Quantum chips ship".into(),
            raw_href: "/news/x".into()
        }));
        // The wrapping div has no link of its own.
        assert!(links.iter().all(|l| l.raw_href == "/news/x"));
    }
}
