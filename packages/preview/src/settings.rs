// ABOUTME: Preview configuration and the persisted user preference store
// ABOUTME: Layers a JSON preference file over environment-variable defaults

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glance_config::constants;
use glance_config::{parse_env_bool, parse_env_or_default_with_validation, parse_env_with_fallback};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::PreviewResult;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_KEEP_ALIVE_MINUTES: u64 = 3;

/// Current preview configuration as read by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSettings {
    pub port: u16,
    pub run_as_task: bool,
    pub keep_alive_minutes: u64,
    pub notify_on_loose_files: bool,
    pub task_verbose: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            run_as_task: false,
            keep_alive_minutes: DEFAULT_KEEP_ALIVE_MINUTES,
            notify_on_loose_files: true,
            task_verbose: false,
        }
    }
}

impl PreviewSettings {
    /// Read the configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            port: parse_env_with_fallback(constants::GLANCE_PORT, constants::PORT, DEFAULT_PORT),
            run_as_task: parse_env_bool(constants::GLANCE_RUN_AS_TASK, false),
            keep_alive_minutes: parse_env_or_default_with_validation(
                constants::GLANCE_KEEP_ALIVE_MINUTES,
                DEFAULT_KEEP_ALIVE_MINUTES,
                |minutes| minutes <= 24 * 60,
            ),
            notify_on_loose_files: parse_env_bool(constants::GLANCE_NOTIFY_LOOSE_FILES, true),
            task_verbose: parse_env_bool(constants::GLANCE_TASK_VERBOSE, false),
        }
    }
}

/// Read access to the current configuration plus write access to the single
/// persisted user preference (suppressing the loose-file warning).
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> PreviewSettings;
    async fn set_notify_on_loose_files(&self, enabled: bool) -> PreviewResult<()>;
}

/// The on-disk record. Only overridden preferences are written; everything
/// else keeps coming from the environment.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedPreferences {
    notify_on_loose_files: Option<bool>,
    updated_at: DateTime<Utc>,
}

/// JSON-file backed settings store under `~/.glance/settings.json`.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| {
            warn!("Could not determine home directory, using current directory");
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });
        Self {
            path: home_dir.join(".glance").join("settings.json"),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn load(&self) -> PreviewSettings {
        let mut settings = PreviewSettings::from_env();
        if let Ok(content) = tokio::fs::read_to_string(&self.path).await {
            match serde_json::from_str::<PersistedPreferences>(&content) {
                Ok(preferences) => {
                    if let Some(notify) = preferences.notify_on_loose_files {
                        settings.notify_on_loose_files = notify;
                    }
                }
                Err(e) => {
                    warn!("Invalid settings file {:?}, ignoring: {}", self.path, e);
                }
            }
        }
        settings
    }

    async fn set_notify_on_loose_files(&self, enabled: bool) -> PreviewResult<()> {
        let preferences = PersistedPreferences {
            notify_on_loose_files: Some(enabled),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&preferences)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;

        info!("Persisted loose-file notification preference: {}", enabled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = PreviewSettings::default();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert!(!settings.run_as_task);
        assert_eq!(settings.keep_alive_minutes, DEFAULT_KEEP_ALIVE_MINUTES);
        assert!(settings.notify_on_loose_files);
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSettingsStore::with_path(temp_dir.path().join("settings.json"));

        store.set_notify_on_loose_files(false).await.unwrap();
        let settings = store.load().await;
        assert!(!settings.notify_on_loose_files);

        store.set_notify_on_loose_files(true).await.unwrap();
        let settings = store.load().await;
        assert!(settings.notify_on_loose_files);
    }

    #[tokio::test]
    async fn test_load_ignores_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileSettingsStore::with_path(path);
        let settings = store.load().await;
        assert_eq!(settings.port, PreviewSettings::from_env().port);
    }

    #[tokio::test]
    async fn test_load_without_file_uses_env_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSettingsStore::with_path(temp_dir.path().join("missing.json"));
        let settings = store.load().await;
        assert!(settings.notify_on_loose_files);
    }
}
