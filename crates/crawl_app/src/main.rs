mod cli;
mod platform;

use clap::Parser;
use crawl_logging::{crawl_info, crawl_warn};

use crate::cli::Cli;
use crate::platform::config::load_config;
use crate::platform::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config);
    let mut config = loaded.config;
    config.apply_cli(&cli);

    logging::initialize(
        config.log_destination,
        crawl_logging::parse_level(&config.log_level),
    );
    if let Some(warning) = loaded.warning {
        crawl_warn!("{}; using defaults", warning);
    }
    crawl_info!(
        "crawl_app starting: base_url={} poll_interval_ms={}",
        config.base_url,
        config.poll_interval_ms
    );

    platform::app::run(&cli, &config)
}
