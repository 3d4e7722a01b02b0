//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Grow a citation network from seed DOIs.
///
/// Citenet fetches work metadata from Crossref, resolves each listed
/// reference to a DOI, and records the works and their citation links in a
/// local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "citenet")]
#[command(author, version, about)]
pub struct Args {
    /// DOIs of works to crawl (reads stdin when omitted)
    pub dois: Vec<String>,

    /// Path to the SQLite database file
    #[arg(short, long, default_value = "lit.db")]
    pub db: PathBuf,

    /// Contact email sent to Crossref in the User-Agent header
    #[arg(short, long, env = "CITENET_MAILTO")]
    pub mailto: String,

    /// Citation parser engine command (absolute path or on PATH)
    #[arg(long, default_value = "anystyle")]
    pub anystyle: String,

    /// Abandon a whole work when any of its references fails to resolve
    #[arg(long)]
    pub abandon_work: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
