//! Relevance filtering: decides which harvested links are articles worth
//! reading.
//!
//! Each candidate goes through, in order: the keyword test, href
//! normalization, the hard-reject filters, and finally the article-path
//! heuristic. Hard rejects are absolute; the heuristic only sees survivors.

use siftwire_core::protocol::AdmittedLink;
use std::collections::HashSet;
use std::fmt;
use url::Url;

use crate::harvest::CandidateLink;
use crate::urls::{is_same_site, normalize_href};

/// Substrings that disqualify a URL outright.
pub const EXCLUDED_SUBSTRINGS: &[&str] = &[
    "category", "tag", "author", "login", "search", "about", "contact", "privacy", ".pdf",
    ".xml", ".css", ".js",
];

/// Path fragments that mark a URL as an article.
pub const ARTICLE_PATH_MARKERS: &[&str] = &[
    "/news/", "/article/", "/story/", "/blog/", "/post/", ".html", ".php",
];

/// Shortest path length (in bytes) a link may have and still be admitted.
const MIN_PATH_LEN: usize = 6;

/// Why a candidate was not admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NoKeyword,
    Unresolvable,
    ForeignHost,
    ShortPath,
    NotNavigable,
    Excluded(&'static str),
    NotArticlePath,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoKeyword => write!(f, "title matches no keyword"),
            Self::Unresolvable => write!(f, "href does not resolve to a url"),
            Self::ForeignHost => write!(f, "host outside the homepage's site"),
            Self::ShortPath => write!(f, "path too short"),
            Self::NotNavigable => write!(f, "mailto or fragment link"),
            Self::Excluded(s) => write!(f, "url contains excluded '{s}'"),
            Self::NotArticlePath => write!(f, "path does not look like an article"),
        }
    }
}

/// Keyword- and path-based admission over harvested candidates.
#[derive(Debug, Clone, Default)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl RelevanceFilter {
    /// Keywords are trimmed and lower-cased; an empty list admits any title.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Case-insensitive substring match of any keyword against `title`.
    pub fn matches_keywords(&self, title: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let title = title.to_lowercase();
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }

    /// Run one candidate through the full admission pipeline.
    pub fn check(
        &self,
        candidate: &CandidateLink,
        homepage: &Url,
    ) -> Result<AdmittedLink, Rejection> {
        if !self.matches_keywords(&candidate.title) {
            return Err(Rejection::NoKeyword);
        }
        let url = normalize_href(&candidate.raw_href, homepage).ok_or(Rejection::Unresolvable)?;
        hard_filters(&url, homepage)?;
        if !looks_like_article(&url) {
            return Err(Rejection::NotArticlePath);
        }
        Ok(AdmittedLink {
            title: candidate.title.clone(),
            url: url.into(),
        })
    }

    /// Admit candidates, keeping input order and dropping repeated
    /// (title, url) pairs.
    pub fn filter(&self, candidates: &[CandidateLink], homepage: &Url) -> Vec<AdmittedLink> {
        let mut seen = HashSet::new();
        let mut admitted = Vec::new();
        for candidate in candidates {
            match self.check(candidate, homepage) {
                Ok(link) => {
                    if seen.insert(link.clone()) {
                        admitted.push(link);
                    }
                }
                Err(reason) => {
                    tracing::trace!(href = %candidate.raw_href, %reason, "Rejected link");
                }
            }
        }
        tracing::debug!(
            candidates = candidates.len(),
            admitted = admitted.len(),
            "Filtered homepage links"
        );
        admitted
    }
}

/// The absolute rejection rules. All must pass.
pub fn hard_filters(url: &Url, homepage: &Url) -> Result<(), Rejection> {
    if !is_same_site(url, homepage) {
        return Err(Rejection::ForeignHost);
    }
    if url.path().len() < MIN_PATH_LEN {
        return Err(Rejection::ShortPath);
    }
    let absolute = url.as_str();
    if absolute.starts_with("mailto:") || absolute.starts_with('#') {
        return Err(Rejection::NotNavigable);
    }
    if let Some(hit) = EXCLUDED_SUBSTRINGS
        .iter()
        .copied()
        .find(|s| absolute.contains(s))
    {
        return Err(Rejection::Excluded(hit));
    }
    Ok(())
}

/// The article heuristic: a known article marker in the path, or more than
/// two `/`-separated segments.
pub fn looks_like_article(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    ARTICLE_PATH_MARKERS.iter().any(|m| path.contains(m)) || path.split('/').count() > 2
}
