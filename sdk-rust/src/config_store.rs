use crate::{ClientError, ClientResult, HealthReport, HealthState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

const APP_DIR: &str = "drivegen";
const CONFIG_FILE: &str = "config.json";

/// Summary of the last health probe, kept between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: HealthState,
    pub all_configured: Option<bool>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    health: Option<HealthStatus>,
}

/// Holds the user's API credential and the last known health status.
///
/// Load it once when a session starts; afterwards it only changes through
/// [`ConfigStore::save`], [`ConfigStore::clear`] and
/// [`ConfigStore::record_health`]. Each of those rewrites the whole file.
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    config: StoredConfig,
}

impl ConfigStore {
    /// `<config dir>/drivegen/config.json` for the current user.
    pub fn default_path() -> ClientResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| ClientError::Storage("Could not find config directory".to_string()))
    }

    /// Read the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|error| {
                ClientError::Storage(format!(
                    "Failed to parse config file {}: {error}",
                    path.display()
                ))
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => StoredConfig::default(),
            Err(error) => {
                return Err(ClientError::Storage(format!(
                    "Failed to read config file {}: {error}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), has_api_key = config.api_key.is_some(), "config loaded");
        Ok(Self {
            path: Some(path),
            config,
        })
    }

    /// A store that lives only as long as this value.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            config: StoredConfig::default(),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref()
    }

    #[must_use]
    pub fn health(&self) -> Option<&HealthStatus> {
        self.config.health.as_ref()
    }

    /// Store a trimmed, non-empty credential.
    pub fn save(&mut self, api_key: &str) -> ClientResult<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ClientError::InvalidInput(
                "API key must not be empty".to_string(),
            ));
        }

        let mut next = self.config.clone();
        next.api_key = Some(api_key.to_string());
        self.commit(next)
    }

    /// Forget the credential. The last health status is kept.
    pub fn clear(&mut self) -> ClientResult<()> {
        let mut next = self.config.clone();
        next.api_key = None;
        self.commit(next)
    }

    pub fn record_health(&mut self, report: &HealthReport) -> ClientResult<()> {
        let mut next = self.config.clone();
        next.health = Some(HealthStatus {
            status: report.status,
            all_configured: report.all_configured,
            checked_at: Utc::now(),
        });
        self.commit(next)
    }

    // Only adopt the new value once it is on disk.
    fn commit(&mut self, next: StoredConfig) -> ClientResult<()> {
        if let Some(path) = &self.path {
            write_atomically(path, &next)?;
        }
        self.config = next;
        Ok(())
    }
}

fn write_atomically(path: &Path, config: &StoredConfig) -> ClientResult<()> {
    let storage_error = |action: &str, error: &dyn std::fmt::Display| {
        ClientError::Storage(format!("Failed to {action} {}: {error}", path.display()))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| storage_error("create directory for", &error))?;
    }

    let contents =
        serde_json::to_string_pretty(config).map_err(|error| storage_error("serialize", &error))?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, contents).map_err(|error| storage_error("write", &error))?;
    fs::rename(&temp_path, path).map_err(|error| storage_error("replace", &error))?;
    Ok(())
}
