//! CLI entry point for the citenet tool.

use std::io::{self, IsTerminal, Read};

use anyhow::Result;
use citenet_core::pipeline::ResolutionPipeline;
use citenet_core::{AbandonPolicy, AnystyleParser, Crawler, CrossrefClient, Database, GraphStore};
use clap::Parser;
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Citenet starting");

    // Read input: from positional args or stdin
    let dois: Vec<String> = if args.dois.is_empty() {
        if io::stdin().is_terminal() {
            info!("No input provided. Pipe DOIs via stdin or pass as arguments.");
            info!("Example: echo '10.1007/s11340-011-9584-y' | citenet -m you@example.org");
            return Ok(());
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect()
    } else {
        args.dois.clone()
    };

    if dois.is_empty() {
        info!("No DOIs found in input");
        return Ok(());
    }

    // Initialize database and graph store
    let db = Database::new(&args.db).await?;
    let store = GraphStore::new(db);
    store.ensure_schema().await?;

    let client = CrossrefClient::new(args.mailto.clone())?;
    let parser = AnystyleParser::with_program(&args.anystyle);

    let policy = if args.abandon_work {
        AbandonPolicy::Work
    } else {
        AbandonPolicy::Reference
    };
    let pipeline = ResolutionPipeline::new(client, parser).with_policy(policy);
    let crawler = Crawler::new(pipeline, store);

    // Crawl each work; one failure does not stop the batch
    let mut crawled = 0usize;
    let mut failed = 0usize;
    for doi in &dois {
        match crawler.crawl(doi).await {
            Ok(summary) => {
                crawled += 1;
                info!(
                    work = %summary.identifier,
                    edges = summary.edges_created,
                    unresolved = summary.unresolved,
                    halted = summary.halted,
                    "Crawl complete"
                );
            }
            Err(err) => {
                failed += 1;
                error!(work = %doi, error = %err, "Crawl failed");
            }
        }
    }

    info!(crawled, failed, total = dois.len(), "Citenet finished");

    Ok(())
}
