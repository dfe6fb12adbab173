use std::fs;
use std::path::Path;
use std::time::Duration;

use crawl_engine::{ApiSettings, EngineSettings, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;
use crate::cli::Cli;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// `None` polls until the task reaches a terminal status.
    pub poll_deadline_secs: Option<u64>,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: 2500,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            poll_deadline_secs: None,
            log_level: "info".to_string(),
            log_destination: LogDestination::default(),
        }
    }
}

/// Config plus the reason the file was ignored, if it was.
///
/// The logger is not installed yet while loading, so the warning is handed
/// back instead of logged.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ClientConfig,
    pub warning: Option<String>,
}

pub fn load_config(path: &Path) -> LoadedConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return LoadedConfig {
                config: ClientConfig::default(),
                warning: None,
            };
        }
        Err(err) => {
            return LoadedConfig {
                config: ClientConfig::default(),
                warning: Some(format!("Failed to read config from {:?}: {}", path, err)),
            };
        }
    };

    match ron::from_str(&content) {
        Ok(config) => LoadedConfig {
            config,
            warning: None,
        },
        Err(err) => LoadedConfig {
            config: ClientConfig::default(),
            warning: Some(format!("Failed to parse config from {:?}: {}", path, err)),
        },
    }
}

impl ClientConfig {
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(poll_interval_ms) = cli.poll_interval_ms {
            self.poll_interval_ms = poll_interval_ms;
        }
        if let Some(destination) = cli.log {
            self.log_destination = destination;
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            api: ApiSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
            },
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_deadline: self.poll_deadline_secs.map(Duration::from_secs),
            ..EngineSettings::default()
        }
    }
}
