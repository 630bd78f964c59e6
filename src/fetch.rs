use scraper::Html;
use tracing::debug;

use crate::error::CrawlError;

/// Page source for the crawl pipeline. The production impl talks HTTP;
/// tests substitute fixture documents.
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<Html, CrawlError>;
}

/// Plain GET against the portal. No timeout and no retry: a dead link or a
/// hanging server aborts (or stalls) the run.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Html, CrawlError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::Fetch {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|e| CrawlError::Body {
            url: url.to_string(),
            source: e,
        })?;

        // html5ever is lenient: malformed markup still yields a best-effort
        // tree, so body decoding above is the practical parse-failure surface.
        Ok(Html::parse_document(&body))
    }
}
