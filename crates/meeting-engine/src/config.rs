//! TOML configuration: data file lifecycle, orchestration knobs, suggestion source
//! and log level.
//!
//! ```toml
//! [store]
//! data_file = "data/meetings.json"
//! persist_on_write = true
//!
//! [scheduling]
//! max_commit_attempts = 3
//! default_location = "Virtual"
//! max_agenda_items = 5
//!
//! [suggestions]
//! canned = "Review action items, Timebox discussion"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ScheduleError};
use crate::model::DEFAULT_LOCATION;
use crate::provider::MeetingStore;
use crate::suggest::{FixedSuggestions, NoSuggestions, SuggestionService};

/// Files searched, in order, by [`Config::load_default`].
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["meetplan.toml", "config/meetplan.toml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub scheduling: SchedulingConfig,
    pub suggestions: SuggestionsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON data file loaded on start. Without one the store starts empty.
    pub data_file: Option<PathBuf>,
    /// Write the data file back after every committed meeting.
    pub persist_on_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            persist_on_write: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Search-then-commit attempts before giving up with `NoAvailableSlot`.
    pub max_commit_attempts: u32,
    pub default_location: String,
    pub max_agenda_items: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: 3,
            default_location: DEFAULT_LOCATION.to_string(),
            max_agenda_items: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    /// Fixed reply for every prompt. Unset means the service is unavailable.
    pub canned: Option<String>,
}

impl SuggestionsConfig {
    pub fn service(&self) -> Arc<dyn SuggestionService> {
        match &self.canned {
            Some(text) => Arc::new(FixedSuggestions::new(text.clone())),
            None => Arc::new(NoSuggestions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl FromStr for Config {
    type Err = ScheduleError;

    fn from_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ScheduleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScheduleError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        content.parse()
    }

    /// Load the first config file found in [`DEFAULT_CONFIG_PATHS`], or defaults.
    pub fn load_default() -> Result<Self> {
        for path in DEFAULT_CONFIG_PATHS {
            if Path::new(path).exists() {
                info!("Loading config from: {}", path);
                return Self::from_file(path);
            }
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scheduling.max_commit_attempts == 0 {
            return Err(ScheduleError::Config(
                "scheduling.max_commit_attempts must be at least 1".to_string(),
            ));
        }
        if self.scheduling.max_agenda_items == 0 {
            return Err(ScheduleError::Config(
                "scheduling.max_agenda_items must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Open the configured data store.
    pub fn open_store(&self) -> Result<MeetingStore> {
        match &self.store.data_file {
            Some(path) => MeetingStore::open(path, self.store.persist_on_write),
            None => Ok(MeetingStore::default()),
        }
    }
}
