//! Application configuration value object

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

pub const DEFAULT_BUNDLE_NAME: &str = "NotifyTool";
pub const DEFAULT_BUNDLE_IDENTIFIER: &str = "com.agilesv.notifytool";
pub const DEFAULT_CODESIGN_PATH: &str = "/usr/bin/codesign";
pub const DEFAULT_LSREGISTER_PATH: &str = "/System/Library/Frameworks/CoreServices.framework/Frameworks/LaunchServices.framework/Support/lsregister";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub bundle_name: Option<String>,
    pub bundle_identifier: Option<String>,
    pub container_dir: Option<PathBuf>,
    pub codesign_path: Option<PathBuf>,
    pub lsregister_path: Option<PathBuf>,
    pub status_timeout_secs: Option<f64>,
    pub consent_timeout_secs: Option<f64>,
    pub schedule_timeout_secs: Option<f64>,
    pub settle_delay_secs: Option<f64>,
    pub delivery_check_timeout_secs: Option<f64>,
    pub trigger_delay_secs: Option<f64>,
    pub confirm_delivery: Option<bool>,
    pub time_sensitive: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            bundle_name: Some(DEFAULT_BUNDLE_NAME.to_string()),
            bundle_identifier: Some(DEFAULT_BUNDLE_IDENTIFIER.to_string()),
            container_dir: dirs::data_dir(),
            codesign_path: Some(PathBuf::from(DEFAULT_CODESIGN_PATH)),
            lsregister_path: Some(PathBuf::from(DEFAULT_LSREGISTER_PATH)),
            status_timeout_secs: Some(2.0),
            consent_timeout_secs: Some(60.0),
            schedule_timeout_secs: Some(5.0),
            settle_delay_secs: Some(1.0),
            delivery_check_timeout_secs: Some(2.0),
            trigger_delay_secs: Some(0.1),
            confirm_delivery: Some(true),
            time_sensitive: Some(true),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            bundle_name: other.bundle_name.or(self.bundle_name),
            bundle_identifier: other.bundle_identifier.or(self.bundle_identifier),
            container_dir: other.container_dir.or(self.container_dir),
            codesign_path: other.codesign_path.or(self.codesign_path),
            lsregister_path: other.lsregister_path.or(self.lsregister_path),
            status_timeout_secs: other.status_timeout_secs.or(self.status_timeout_secs),
            consent_timeout_secs: other.consent_timeout_secs.or(self.consent_timeout_secs),
            schedule_timeout_secs: other.schedule_timeout_secs.or(self.schedule_timeout_secs),
            settle_delay_secs: other.settle_delay_secs.or(self.settle_delay_secs),
            delivery_check_timeout_secs: other
                .delivery_check_timeout_secs
                .or(self.delivery_check_timeout_secs),
            trigger_delay_secs: other.trigger_delay_secs.or(self.trigger_delay_secs),
            confirm_delivery: other.confirm_delivery.or(self.confirm_delivery),
            time_sensitive: other.time_sensitive.or(self.time_sensitive),
        }
    }

    /// Resolve into typed settings, filling gaps from the defaults
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        let defaults = Self::defaults();
        let merged = defaults.merge(self.clone());

        let container_dir = merged.container_dir.ok_or_else(|| ConfigError::ValidationError {
            key: "container_dir".to_string(),
            message: "no per-user application support directory".to_string(),
        })?;
        let bundle_identifier = merged
            .bundle_identifier
            .unwrap_or_else(|| DEFAULT_BUNDLE_IDENTIFIER.to_string());
        if bundle_identifier.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                key: "bundle_identifier".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(Settings {
            bundle_name: merged
                .bundle_name
                .unwrap_or_else(|| DEFAULT_BUNDLE_NAME.to_string()),
            bundle_identifier,
            container_dir,
            codesign_path: merged
                .codesign_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CODESIGN_PATH)),
            lsregister_path: merged
                .lsregister_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LSREGISTER_PATH)),
            timeouts: Timeouts {
                status_query: secs("status_timeout_secs", merged.status_timeout_secs, 2.0)?,
                consent: secs("consent_timeout_secs", merged.consent_timeout_secs, 60.0)?,
                scheduling: secs("schedule_timeout_secs", merged.schedule_timeout_secs, 5.0)?,
                settle: secs("settle_delay_secs", merged.settle_delay_secs, 1.0)?,
                delivery_check: secs(
                    "delivery_check_timeout_secs",
                    merged.delivery_check_timeout_secs,
                    2.0,
                )?,
                trigger_delay: secs("trigger_delay_secs", merged.trigger_delay_secs, 0.1)?,
            },
            confirm_delivery: merged.confirm_delivery.unwrap_or(true),
            time_sensitive: merged.time_sensitive.unwrap_or(true),
        })
    }
}

fn secs(key: &str, value: Option<f64>, default: f64) -> Result<Duration, ConfigError> {
    let value = value.unwrap_or(default);
    Duration::try_from_secs_f64(value).map_err(|e| ConfigError::ValidationError {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Bounds for every wait in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Authorization status query
    pub status_query: Duration,
    /// Waiting on a human to answer the consent prompt
    pub consent: Duration,
    /// Scheduling callback
    pub scheduling: Duration,
    /// Pause before checking the delivered list
    pub settle: Duration,
    /// Delivered-list query
    pub delivery_check: Duration,
    /// Deferred trigger interval for the request itself
    pub trigger_delay: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            status_query: Duration::from_secs(2),
            consent: Duration::from_secs(60),
            scheduling: Duration::from_secs(5),
            settle: Duration::from_secs(1),
            delivery_check: Duration::from_secs(2),
            trigger_delay: Duration::from_millis(100),
        }
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub bundle_name: String,
    pub bundle_identifier: String,
    pub container_dir: PathBuf,
    pub codesign_path: PathBuf,
    pub lsregister_path: PathBuf,
    pub timeouts: Timeouts,
    pub confirm_delivery: bool,
    pub time_sensitive: bool,
}

impl Settings {
    /// Built-in settings with the container placed under `container_dir`
    pub fn defaults_in(container_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundle_name: DEFAULT_BUNDLE_NAME.to_string(),
            bundle_identifier: DEFAULT_BUNDLE_IDENTIFIER.to_string(),
            container_dir: container_dir.into(),
            codesign_path: PathBuf::from(DEFAULT_CODESIGN_PATH),
            lsregister_path: PathBuf::from(DEFAULT_LSREGISTER_PATH),
            timeouts: Timeouts::default(),
            confirm_delivery: true,
            time_sensitive: true,
        }
    }

    /// Fixed container location so repeated runs reuse it
    pub fn container_path(&self) -> PathBuf {
        self.container_dir.join(format!("{}.app", self.bundle_name))
    }
}
