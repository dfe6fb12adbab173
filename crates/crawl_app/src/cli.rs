use std::path::PathBuf;

use clap::Parser;

use crate::platform::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "crawl_app")]
#[command(about = "Terminal client for the keyword crawl task service")]
#[command(version)]
pub struct Cli {
    /// RON configuration file
    #[arg(long, default_value = "crawl_app.ron")]
    pub config: PathBuf,

    /// Task service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Milliseconds between status polls
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Keywords, separated by commas or newlines
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Result pages to crawl per keyword
    #[arg(short, long)]
    pub pages: Option<String>,

    /// Ask the server to persist results
    #[arg(long)]
    pub save: bool,

    /// Submit the task right away
    #[arg(long)]
    pub start: bool,

    /// Where log output goes
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
}
