mod config;
mod crawl;
mod db;
mod error;
mod fetch;
mod parser;

use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::config::CrawlLimits;

#[derive(Parser)]
#[command(name = "acm_scraper", about = "ACM portal conference/paper indexer")]
struct Cli {
    /// Increase verbosity (per-paper progress lines)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Debug mode: fine-grained logging, crawl truncated to the first
    /// archive and its first two papers
    #[arg(short, long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the portal and index conferences, papers, and keywords
    Crawl,
    /// Show row counts for the index
    Stats,
    /// List indexed papers with their keywords
    Papers {
        /// Filter by conference nickname (e.g. "sosp")
        #[arg(short, long)]
        conference: Option<String>,
        /// Filter by publication year
        #[arg(short, long)]
        year: Option<i32>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let t0 = Instant::now();

    let result = match cli.command {
        Commands::Crawl => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let limits = if cli.debug {
                CrawlLimits::debug()
            } else {
                CrawlLimits::unlimited()
            };
            let fetcher = fetch::HttpFetcher::new();
            let counts = crawl::run(&conn, &fetcher, &config::registry(), limits).await?;
            counts.print();
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Conferences:  {}", s.conferences);
            println!("Papers:       {}", s.papers);
            println!("Keywords:     {}", s.keywords);
            println!("Associations: {}", s.associations);
            Ok(())
        }
        Commands::Papers {
            conference,
            year,
            limit,
        } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_papers(&conn, conference.as_deref(), year, limit)?;
            if rows.is_empty() {
                println!("No papers found.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<10} | {:<8} | {:>4} | {:<48}",
                "#", "Id", "Conf", "Year", "Title"
            );
            println!("{}", "-".repeat(84));

            for (i, r) in rows.iter().enumerate() {
                let title = truncate(&r.title, 48);
                let year = r.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{:>3} | {:<10} | {:<8} | {:>4} | {:<48}",
                    i + 1,
                    r.id,
                    r.conference,
                    year,
                    title
                );
            }

            // Keywords in a separate section to keep the table readable
            let with_keywords: Vec<_> = rows.iter().filter(|r| !r.keywords.is_empty()).collect();
            if !with_keywords.is_empty() {
                println!("\n--- Keywords ---");
                for r in &with_keywords {
                    println!("  {}: {}", r.id, r.keywords);
                }
            }

            println!("\n{} papers", rows.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
