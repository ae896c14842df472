use anyhow::Context;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use energy_client::domain::Month;

use crate::generator::FixedClock;
use crate::pipeline::SeedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Pgwire,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub kind: StoreKind,
    #[serde(default)]
    pub uri: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorConfig {
    pub seed: Option<u64>,
    pub as_of_year: Option<i32>,
    /// 1-based
    pub as_of_month: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Required unless running dry.
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

fn default_max_connections() -> u32 {
    2
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_batch_size() -> usize {
    500
}

fn default_csv_path() -> String {
    "energy_readings.csv".to_string()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_path(&config_path())
    }

    /// Like `load`, but a missing file yields the default config.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
        let mut cfg = Self::parse(&contents).with_context(|| format!("invalid config {}", path.display()))?;

        if let (Some(store), Ok(uri)) = (cfg.store.as_mut(), env::var("DATABASE_URL")) {
            store.uri = uri;
        }

        Ok(cfg)
    }

    pub fn parse(contents: &str) -> Result<Self, SeedError> {
        let cfg: AppConfig = toml::from_str(contents).map_err(|e| SeedError::Config(e.to_string()))?;
        if cfg.store.as_ref().is_some_and(|s| s.batch_size == 0) {
            return Err(SeedError::Config("store.batch_size must be positive".to_string()));
        }
        cfg.generator.fixed_clock()?;
        Ok(cfg)
    }

    pub fn store(&self) -> Result<&StoreConfig, SeedError> {
        self.store
            .as_ref()
            .ok_or_else(|| SeedError::Config("missing [store] section".to_string()))
    }
}

fn config_path() -> PathBuf {
    env::var("SEEDER_CONFIG")
        .unwrap_or_else(|_| "seeder-config.toml".to_string())
        .into()
}

impl GeneratorConfig {
    /// Clock pinned by `as_of_year`/`as_of_month`, if both are set.
    pub fn fixed_clock(&self) -> Result<Option<FixedClock>, SeedError> {
        match (self.as_of_year, self.as_of_month) {
            (None, None) => Ok(None),
            (Some(year), Some(month)) => {
                let month = month
                    .checked_sub(1)
                    .and_then(|idx| Month::from_index(idx as usize))
                    .ok_or_else(|| SeedError::Config(format!("generator.as_of_month {month} not in 1..=12")))?;
                Ok(Some(FixedClock::new(year, month)))
            }
            _ => Err(SeedError::Config(
                "generator.as_of_year and generator.as_of_month must be set together".to_string(),
            )),
        }
    }
}
