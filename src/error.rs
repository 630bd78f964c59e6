use thiserror::Error;

/// Everything that can abort a crawl. Key collisions on insert are not
/// errors anywhere; they surface as the `false` arm of the insert
/// primitives in `db`.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// An otherwise-valid page is missing the structure we expect.
    #[error("extraction failed: {0}")]
    Extract(String),
}
