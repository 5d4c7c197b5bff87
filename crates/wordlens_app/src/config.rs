use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wordlens_core::{DEFAULT_MIN_LENGTH, DEFAULT_PAGE_SIZE};
use wordlens_engine::{ApiSettings, EngineSettings};
use wordlens_logging::wl_info;

use crate::cli::GlobalArgs;
use crate::logging::LogDestination;

const DEFAULT_CONFIG_FILENAME: &str = "wordlens.ron";

/// Client settings read from a RON file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub page_size: usize,
    pub min_length: usize,
    pub log_destination: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            poll_interval_ms: 1000,
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            page_size: DEFAULT_PAGE_SIZE,
            min_length: DEFAULT_MIN_LENGTH,
            log_destination: LogDestination::Terminal,
        }
    }
}

impl ClientConfig {
    /// Reads `explicit` when given, otherwise `./wordlens.ron` if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        load_from(explicit, Path::new(DEFAULT_CONFIG_FILENAME))
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(&mut self, args: &GlobalArgs) {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(page_size) = args.page_size {
            self.page_size = page_size;
        }
        if let Some(min_length) = args.min_length {
            self.min_length = min_length;
        }
        if let Some(destination) = args.log {
            self.log_destination = destination;
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            api: ApiSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                ..ApiSettings::default()
            },
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }

    /// Longest a single request may take before the transport gives up.
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs + self.request_timeout_secs + 1)
    }
}

fn load_from(explicit: Option<&Path>, default_path: &Path) -> Result<ClientConfig> {
    match explicit {
        Some(path) => read(path),
        None if default_path.exists() => read(default_path),
        None => Ok(ClientConfig::default()),
    }
}

fn read(path: &Path) -> Result<ClientConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("could not read config {}", path.display()))?;
    let config: ClientConfig = ron::from_str(&content)
        .with_context(|| format!("malformed config {}", path.display()))?;
    wl_info!("Loaded config from {:?}", path);
    Ok(config)
}
