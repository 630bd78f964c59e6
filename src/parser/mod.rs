pub mod citation;
pub mod links;

use scraper::Html;

use crate::error::CrawlError;

/// Everything we keep from one citation page. The paper id comes from the
/// href that led here, not from the page body.
pub struct PaperPage {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub tags: Vec<String>,
}

pub fn parse_citation(href: &str, doc: &Html) -> Result<PaperPage, CrawlError> {
    Ok(PaperPage {
        id: links::paper_id(href)?,
        title: citation::title(doc)?,
        year: citation::year(doc)?,
        tags: citation::keyword_tags(doc),
    })
}
