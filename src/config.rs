use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::providers::{intervals, systm};

/// Days synced when no end date is configured.
const DEFAULT_WINDOW_DAYS: i64 = 42;

/// Configuration file structure for suffersync.
///
/// Holds SYSTM credentials, the intervals.icu destination and the sync window.
/// Command-line flags and environment variables override file values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Wahoo SYSTM account
    #[serde(default)]
    pub systm: SystmConfig,

    /// intervals.icu account
    #[serde(default)]
    pub intervals: IntervalsConfig,

    /// Sync window and toggles
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystmConfig {
    pub username: Option<String>,

    pub password: Option<String>,

    /// GraphQL endpoint
    #[serde(default = "default_systm_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IntervalsConfig {
    /// Athlete id, e.g. `i12345`
    pub athlete_id: Option<String>,

    pub api_key: Option<String>,

    #[serde(default = "default_intervals_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyncConfig {
    /// First day to sync (defaults to today)
    pub start_date: Option<NaiveDate>,

    /// Last day to sync (defaults to six weeks after the start)
    pub end_date: Option<NaiveDate>,

    /// Maximum number of plan entries to request
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Also sync yoga sessions
    #[serde(default)]
    pub upload_yoga_workouts: bool,

    /// Upload sessions dated today or earlier
    #[serde(default)]
    pub upload_past_workouts: bool,

    /// Where `.zwo` files are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write files but skip uploads
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for SystmConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            base_url: default_systm_url(),
        }
    }
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            athlete_id: None,
            api_key: None,
            base_url: default_intervals_url(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            limit: default_limit(),
            upload_yoga_workouts: false,
            upload_past_workouts: false,
            output_dir: default_output_dir(),
            dry_run: false,
        }
    }
}

fn default_systm_url() -> String {
    systm::DEFAULT_GRAPHQL_URL.to_string()
}

fn default_intervals_url() -> String {
    intervals::DEFAULT_BASE_URL.to_string()
}

fn default_limit() -> usize {
    1000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./zwo")
}

impl SyncConfig {
    /// Resolves the configured window, filling gaps relative to `today`.
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = self.start_date.unwrap_or(today);
        let end = self
            .end_date
            .unwrap_or_else(|| start + Duration::days(DEFAULT_WINDOW_DAYS));
        (start, end)
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./suffersync.toml
    /// 3. ./suffersync.json
    /// 4. ./suffersync.yaml
    /// 5. ./suffersync.yml
    /// 6. `<config dir>/suffersync/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "suffersync.toml",
            "suffersync.json",
            "suffersync.yaml",
            "suffersync.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = dirs::config_dir().map(|dir| dir.join("suffersync").join("config.toml"))
        {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Checks that everything a sync run needs is present.
    ///
    /// Uploads are not required on a dry run, so the intervals.icu account is
    /// only checked otherwise.
    pub fn validate(&self) -> std::result::Result<(), SyncError> {
        require(&self.systm.username, "systm.username")?;
        require(&self.systm.password, "systm.password")?;

        if !self.sync.dry_run {
            require(&self.intervals.athlete_id, "intervals.athlete-id")?;
            require(&self.intervals.api_key, "intervals.api-key")?;
        }

        if let (Some(start), Some(end)) = (self.sync.start_date, self.sync.end_date) {
            if end < start {
                return Err(SyncError::Config(format!(
                    "end date {end} is before start date {start}"
                )));
            }
        }

        if self.sync.limit == 0 {
            return Err(SyncError::Config("sync.limit must be positive".to_string()));
        }

        Ok(())
    }
}

fn require(value: &Option<String>, key: &str) -> std::result::Result<(), SyncError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(SyncError::Config(format!("missing {key}"))),
    }
}
