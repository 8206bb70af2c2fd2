use std::collections::HashSet;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Fetch pool size; 0 means one worker per CPU.
    pub num_workers: usize,
    pub fetch_timeout_secs: u64,
    pub allowed_extensions: HashSet<String>,
    pub default_store: String,
    pub last_file_pointer: String,
    pub geocoder_url: String,
    pub user_agent: String,
    pub strict_load: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            num_workers: 0,
            fetch_timeout_secs: 5,
            allowed_extensions: ["jpg", "jpeg", "png"].iter().map(|s| s.to_string()).collect(),
            default_store: "markers.json".to_string(),
            last_file_pointer: "last_file.txt".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org/".to_string(),
            user_agent: concat!("geomark/", env!("CARGO_PKG_VERSION")).to_string(),
            strict_load: false,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = AppConfig::default();
        let extensions: Vec<String> = defaults.allowed_extensions.iter().cloned().collect();

        let s = Config::builder()
            .set_default("num_workers", defaults.num_workers as u64)?
            .set_default("fetch_timeout_secs", defaults.fetch_timeout_secs)?
            .set_default("allowed_extensions", extensions)?
            .set_default("default_store", defaults.default_store)?
            .set_default("last_file_pointer", defaults.last_file_pointer)?
            .set_default("geocoder_url", defaults.geocoder_url)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("strict_load", defaults.strict_load)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("GEOMARK"))
            .build()?;

        s.try_deserialize()
    }

    pub fn worker_count(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get()
        } else {
            self.num_workers
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
