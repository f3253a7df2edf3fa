//! Configuration stored in ~/.daybrief/config.json.
//!
//! Every field is defaulted, so an empty `{}` config file (or no file at
//! all, for library callers using `AppConfig::default()`) produces a
//! working setup. API credentials can live in the file or in the
//! environment; the environment wins when both are absent from the file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// How many days of email to pull per run.
    #[serde(default = "default_email_lookback_days")]
    pub email_lookback_days: u32,
    /// How many days ahead of calendar to include.
    #[serde(default = "default_calendar_horizon_days")]
    pub calendar_horizon_days: u32,
    /// How many top-scoring threads proceed to summarization.
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,
    /// Concurrent API call cap (body fetches, summarization).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Run-level timeout for the fetch and summarize phases.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    /// Display cap on email items in the do_now tier.
    #[serde(default = "default_do_now_email_cap")]
    pub do_now_email_cap: usize,
    /// Display cap on the do_soon tier.
    #[serde(default = "default_do_soon_cap")]
    pub do_soon_cap: usize,
    #[serde(default)]
    pub schedule: ScheduleEntry,
    /// Where plan artifacts (markdown, JSON) are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todoist_api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,
    /// Extra whitelist domains merged over the built-in list.
    #[serde(default)]
    pub extra_whitelist: Vec<String>,
    /// Extra suppressed sender substrings merged over the built-in list.
    #[serde(default)]
    pub extra_suppressed_senders: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            email_lookback_days: default_email_lookback_days(),
            calendar_horizon_days: default_calendar_horizon_days(),
            max_threads: default_max_threads(),
            concurrency: default_concurrency(),
            run_timeout_secs: default_run_timeout_secs(),
            do_now_email_cap: default_do_now_email_cap(),
            do_soon_cap: default_do_soon_cap(),
            schedule: ScheduleEntry::default(),
            output_dir: default_output_dir(),
            todoist_api_token: None,
            openrouter_api_key: None,
            extra_whitelist: Vec::new(),
            extra_suppressed_senders: Vec::new(),
        }
    }
}

/// A single cron schedule entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub enabled: bool,
    pub cron: String,
    pub timezone: String,
}

impl Default for ScheduleEntry {
    fn default() -> Self {
        Self {
            enabled: true,
            // Five touchpoints across the waking day.
            cron: "0 6,9,12,15,18 * * *".to_string(),
            timezone: "America/New_York".to_string(),
        }
    }
}

fn default_email_lookback_days() -> u32 {
    14
}

fn default_calendar_horizon_days() -> u32 {
    7
}

fn default_max_threads() -> usize {
    crate::threads::DEFAULT_MAX_THREADS
}

fn default_concurrency() -> usize {
    4
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_do_now_email_cap() -> usize {
    crate::bucketize::DO_NOW_EMAIL_CAP
}

fn default_do_soon_cap() -> usize {
    crate::bucketize::DO_SOON_CAP
}

fn default_output_dir() -> String {
    "~/daybrief".to_string()
}

/// Root of the configuration directory (~/.daybrief).
pub fn config_dir() -> Result<PathBuf, PlanningError> {
    let home = dirs::home_dir()
        .ok_or_else(|| PlanningError::ConfigurationError("Could not find home directory".into()))?;
    Ok(home.join(".daybrief"))
}

impl AppConfig {
    /// Load ~/.daybrief/config.json, falling back to defaults when the
    /// file does not exist. A present-but-invalid file is an error rather
    /// than a silent fallback.
    pub fn load() -> Result<Self, PlanningError> {
        let path = config_dir()?.join("config.json");
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            PlanningError::ConfigurationError(format!(
                "Failed to parse {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Todoist API token from config, else `TODOIST_API_TOKEN`.
    pub fn todoist_token(&self) -> Option<String> {
        self.todoist_api_token
            .clone()
            .or_else(|| std::env::var("TODOIST_API_TOKEN").ok())
    }

    /// OpenRouter API key from config, else `OPENROUTER_API_KEY`.
    pub fn openrouter_key(&self) -> Option<String> {
        self.openrouter_api_key
            .clone()
            .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
    }

    /// Output directory with a leading `~` expanded.
    pub fn resolved_output_dir(&self) -> Result<PathBuf, PlanningError> {
        if let Some(rest) = self.output_dir.strip_prefix("~/") {
            let home = dirs::home_dir().ok_or_else(|| {
                PlanningError::ConfigurationError("Could not find home directory".into())
            })?;
            Ok(home.join(rest))
        } else {
            Ok(PathBuf::from(&self.output_dir))
        }
    }
}
