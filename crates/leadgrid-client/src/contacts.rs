//! Contact-signal extraction from rendered HTML.

use std::collections::HashSet;
use std::sync::LazyLock;

use leadgrid_core::models::ContactSignals;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9._-]+").expect("valid email regex")
});

/// Hosts treated as social profiles, matched exactly or as a parent domain.
const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "instagram.com",
];

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid body selector"));

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Elements whose text never renders.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Harvest email addresses from the page's visible text and social-profile
/// links from its anchors, each deduplicated in document order.
///
/// Relative hrefs are resolved against `page_url`.
pub fn extract_contacts(html: &str, page_url: &Url) -> ContactSignals {
    let document = Html::parse_document(html);

    ContactSignals {
        emails: find_emails(&visible_text(&document)),
        social_media: social_links(&document, page_url),
    }
}

fn visible_text(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .map(|body| *body)
        .unwrap_or_else(|| document.tree.root());

    let mut text = String::new();
    for node in root.descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            ElementRef::wrap(a).is_some_and(|el| HIDDEN.contains(&el.value().name()))
        });
        if !hidden {
            text.push_str(chunk);
            text.push(' ');
        }
    }
    text
}

fn find_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

fn social_links(document: &Html, page_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .filter(|link| matches!(link.scheme(), "http" | "https"))
        .filter(is_social_profile)
        .map(String::from)
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

fn is_social_profile(link: &Url) -> bool {
    let Some(host) = link.host_str() else {
        return false;
    };
    let host = host.trim_end_matches('.');
    SOCIAL_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
