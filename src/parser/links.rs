use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::CrawlError;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static PAPER_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"id=(\d+\.\d+)").unwrap());

#[derive(Debug, Clone)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Anchors whose first text node starts with `prefix`, verbatim. The portal
/// markup puts a leading space inside proceedings anchors, so the prefix is
/// matched case- and whitespace-sensitively.
pub fn by_leading_text(doc: &Html, prefix: &str) -> Vec<Link> {
    doc.select(&ANCHOR)
        .filter(|a| a.text().next().is_some_and(|t| t.starts_with(prefix)))
        .filter_map(to_link)
        .collect()
}

/// Anchors whose href matches `re`.
pub fn by_href(doc: &Html, re: &Regex) -> Vec<Link> {
    doc.select(&ANCHOR)
        .filter(|a| a.value().attr("href").is_some_and(|h| re.is_match(h)))
        .filter_map(to_link)
        .collect()
}

/// The portal-assigned two-part dotted paper id, parsed out of a citation href.
pub fn paper_id(href: &str) -> Result<String, CrawlError> {
    PAPER_ID_RE
        .captures(href)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| CrawlError::Extract(format!("no paper id in href: {href}")))
}

fn to_link(a: ElementRef) -> Option<Link> {
    let href = a.value().attr("href")?.to_string();
    let text = a.text().next().unwrap_or("").to_string();
    Some(Link { text, href })
}

// ── Tests ──
