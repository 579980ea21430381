//! URL normalization and same-site checks.

use url::Url;

fn has_http_scheme(href: &str) -> bool {
    let head = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Prefix `https://` onto a homepage URL that has no http(s) scheme.
pub fn ensure_scheme(url: &str) -> String {
    let url = url.trim();
    if has_http_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Resolve a harvested href to an absolute URL.
///
/// - `//host/path` becomes `https://host/path`
/// - `/path` resolves against `base`
/// - anything else without an http(s) scheme is read as `https://{href}`,
///   so `www.site.com/a` keeps its host while `news/a` ends up with host
///   `news` and fails the same-site check later
///
/// Returns `None` when the result is not a valid URL.
pub fn normalize_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if let Some(rest) = href.strip_prefix("//") {
        return Url::parse(&format!("https://{rest}")).ok();
    }
    if has_http_scheme(href) {
        return Url::parse(href).ok();
    }
    if href.starts_with('/') {
        return base.join(href).ok();
    }
    Url::parse(&format!("https://{href}")).ok()
}

/// True when `candidate`'s host is `base`'s host or one of its subdomains.
pub fn is_same_site(candidate: &Url, base: &Url) -> bool {
    match (candidate.host_str(), base.host_str()) {
        (Some(host), Some(base_host)) => {
            host == base_host
                || host
                    .strip_suffix(base_host)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        _ => false,
    }
}
