use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::config::TAG_QUERIES;
use crate::error::CrawlError;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TITLE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td.medium-text[colspan="3"]"#).unwrap());

const YEAR_LABEL: &str = "Year of Publication:";

/// Paper title. The portal renders it as a run of inline fragments inside one
/// table cell; the title is the concatenation of all of them, trimmed.
pub fn title(doc: &Html) -> Result<String, CrawlError> {
    let cell = doc
        .select(&TITLE_CELL)
        .next()
        .ok_or_else(|| CrawlError::Extract("title cell not found".into()))?;
    Ok(cell.text().collect::<String>().trim().to_string())
}

/// Publication year, from the labeled text node.
pub fn year(doc: &Html) -> Result<i32, CrawlError> {
    let label = doc
        .root_element()
        .text()
        .find(|t| t.contains(YEAR_LABEL))
        .ok_or_else(|| CrawlError::Extract("year label not found".into()))?;
    parse_year_label(label)
}

fn parse_year_label(text: &str) -> Result<i32, CrawlError> {
    let value = text
        .trim()
        .split(':')
        .nth(1)
        .ok_or_else(|| CrawlError::Extract(format!("malformed year label: {text}")))?;
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| CrawlError::Extract(format!("unparsable year in label: {text}")))
}

/// Keyword tags, in tag-query scan order, normalized to trimmed lowercase.
/// Duplicates are kept here; keyword identity collapses them at the store.
pub fn keyword_tags(doc: &Html) -> Vec<String> {
    let mut tags = Vec::new();
    for query in TAG_QUERIES {
        for anchor in doc.select(&ANCHOR) {
            let matches = anchor
                .value()
                .attr("href")
                .is_some_and(|h| h.contains(query));
            if !matches {
                continue;
            }
            if let Some(text) = anchor.text().next() {
                tags.push(text.trim().to_lowercase());
            }
        }
    }
    tags
}

// ── Tests ──
