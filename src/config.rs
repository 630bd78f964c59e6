/// ACM portal host; relative hrefs discovered during the crawl resolve against it.
pub const PORTAL: &str = "http://portal.acm.org";

/// Citation links on an archive page carry the series query string in this order.
const CITATION_PATTERN: &str = "^citation.*type=series.*WantType=Proceedings";

/// Tag-link query parameters scanned on a citation page, in order.
pub const TAG_QUERIES: &[&str] = &[
    "query=PrimaryCCS",
    "query=CCS",
    "query=Subject",
    "query=General Terms",
    "query=Keywords",
];

/// One crawlable conference: where to start and what its links look like.
#[derive(Debug, Clone)]
pub struct ConferenceConfig {
    pub nick: String,
    pub fullname: String,
    pub seed_url: String,
    /// Leading text of proceedings-archive anchors on the seed page.
    /// Whitespace-sensitive; the portal markup really does start with a space.
    pub archive_prefix: String,
    /// Href pattern of citation links on an archive page.
    pub citation_pattern: String,
}

/// The fixed conference registry. Conferences are seeded here, never discovered.
pub fn registry() -> Vec<ConferenceConfig> {
    vec![
        ConferenceConfig {
            nick: "sosp".into(),
            fullname: "Symposium on Operating System Principles".into(),
            seed_url: format!(
                "{PORTAL}/toc.cfm?id=SERIES372&idx=SERIES372&type=series&coll=portal\
                 &dl=ACM&part=series&WantType=Proceedings&title=SOSP"
            ),
            archive_prefix: " Proceedings of".into(),
            citation_pattern: CITATION_PATTERN.into(),
        },
        ConferenceConfig {
            nick: "sigcomm".into(),
            fullname: "SIGCOMM".into(),
            seed_url: format!(
                "{PORTAL}/toc.cfm?id=SERIES419&idx=SERIES419&type=series&coll=portal\
                 &dl=ACM&part=series&WantType=Proceedings&title=COMM"
            ),
            archive_prefix: " Proceedings of the".into(),
            citation_pattern: CITATION_PATTERN.into(),
        },
    ]
}

/// Per-level truncation of the crawl frontier. `None` means unlimited.
#[derive(Debug, Clone, Copy)]
pub struct CrawlLimits {
    pub max_archives: Option<usize>,
    pub max_papers: Option<usize>,
}

impl CrawlLimits {
    pub fn unlimited() -> Self {
        Self {
            max_archives: None,
            max_papers: None,
        }
    }

    /// Debug runs keep only the first archive and its first two papers,
    /// always the same prefix so reruns are comparable.
    pub fn debug() -> Self {
        Self {
            max_archives: Some(1),
            max_papers: Some(2),
        }
    }
}
