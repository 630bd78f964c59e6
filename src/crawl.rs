use std::sync::LazyLock;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::{ConferenceConfig, CrawlLimits, PORTAL};
use crate::db;
use crate::fetch::Fetch;
use crate::parser::{self, links};

// Discovered at the archive level but deliberately not persisted; kept as an
// extension point for full-text retrieval.
static PDF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("type=pdf").unwrap());

/// New rows written during one run (already-seen keys are not counted).
#[derive(Default)]
pub struct CrawlCounts {
    pub conferences: usize,
    pub archives: usize,
    pub papers: usize,
    pub keywords: usize,
    pub associations: usize,
}

impl CrawlCounts {
    pub fn print(&self) {
        println!(
            "Saved {} conferences, {} papers, {} keywords, {} associations ({} archives visited).",
            self.conferences, self.papers, self.keywords, self.associations, self.archives,
        );
    }
}

/// Three-level depth-first crawl: conference seed page → yearly proceedings
/// archives → per-paper citation pages. One conference at a time, one fetch
/// at a time. The whole run is a single transaction committed at the end, so
/// an interrupted run persists nothing.
///
/// Any fetch or extraction failure propagates and aborts the run; only
/// key collisions are tolerated (they are the idempotence contract).
pub async fn run(
    conn: &Connection,
    fetcher: &impl Fetch,
    conferences: &[ConferenceConfig],
    limits: CrawlLimits,
) -> Result<CrawlCounts> {
    let tx = conn.unchecked_transaction()?;
    let mut counts = CrawlCounts::default();

    for conf in conferences {
        info!("Processing {}", conf.nick);
        if db::insert_conference(&tx, &conf.nick, &conf.fullname)? {
            counts.conferences += 1;
        }

        let citation_re = Regex::new(&conf.citation_pattern)?;

        debug!("Reading {}", conf.seed_url);
        let doc = fetcher.fetch(&conf.seed_url).await?;
        let mut archives = links::by_leading_text(&doc, &conf.archive_prefix);
        for a in &archives {
            debug!("Found archive {}", a.text.trim());
        }
        truncate(&mut archives, limits.max_archives);
        debug!("{}: {} proceedings archives", conf.nick, archives.len());

        for archive in &archives {
            counts.archives += 1;
            let url = portal_url(&archive.href);
            debug!("Opening {}", url);
            let doc = fetcher.fetch(&url).await?;

            let mut citations = links::by_href(&doc, &citation_re);
            for c in &citations {
                debug!("Found paper {}", c.text.trim());
            }
            let pdfs = links::by_href(&doc, &PDF_RE);
            if !pdfs.is_empty() {
                debug!("{}: {} pdf links found (not persisted)", conf.nick, pdfs.len());
            }
            truncate(&mut citations, limits.max_papers);

            let pb = ProgressBar::new(citations.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
                    .progress_chars("=> "),
            );

            for citation in &citations {
                let url = portal_url(&citation.href);
                debug!("Opening {}", url);
                let doc = fetcher.fetch(&url).await?;
                let paper = parser::parse_citation(&citation.href, &doc)?;

                info!("Processing {}", paper.title);
                if db::insert_paper(&tx, &paper.id, &conf.nick, paper.year, &paper.title)? {
                    counts.papers += 1;
                }

                for tag in &paper.tags {
                    let (kid, fresh) = db::insert_keyword(&tx, tag)?;
                    if fresh {
                        counts.keywords += 1;
                    }
                    debug!("{}: {}", tag, kid);
                    info!("{}:{}:{}", paper.year, paper.title, tag);
                    // The association is written even when the keyword
                    // already existed.
                    if db::insert_keymap(&tx, &paper.id, &kid)? {
                        counts.associations += 1;
                    }
                }
                pb.inc(1);
            }
            pb.finish_and_clear();
        }
    }

    tx.commit()?;
    Ok(counts)
}

/// The portal links with hrefs relative to the host root.
fn portal_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}/{}", PORTAL, href.trim_start_matches('/'))
    }
}

fn truncate<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(n) = limit {
        items.truncate(n);
    }
}

// ── Tests ──
