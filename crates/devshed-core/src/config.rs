//! Persisted client configuration and the process-wide context store.
//!
//! The configuration lives at `~/.devshed/config.json`, pretty-printed for
//! hand inspection. A missing or unparsable file means "not configured", not
//! an error; every failure that matters to a caller is a typed
//! [`ConfigError`].

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_DIR_NAME: &str = ".devshed";
const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted client configuration.
///
/// The four string fields are always present in a valid file; the current
/// project/task are set and cleared independently as the user moves around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the DevShed API. The client strips any trailing slash.
    pub api_url: String,
    /// Opaque credential, sent as the `X-API-KEY` header on every request.
    pub api_key: String,
    pub user_id: String,
    pub default_organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

/// Display and auto-save preferences.
///
/// Persisted verbatim for the interactive layer; nothing in the core acts on
/// them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_context_in_prompt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_persistence: Option<ContextPersistence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_task_view: Option<TaskView>,
}

/// Where context switches are remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPersistence {
    Session,
    Config,
    SessionAndConfig,
}

/// Task list rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskView {
    Compact,
    Detailed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    /// An update was attempted with nothing persisted yet.
    #[error("no configuration found to update")]
    NoConfig,

    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Partial update shallow-merged over the persisted configuration.
///
/// Plain `Option` fields replace the current value when set. The current
/// project/task fields are doubly optional so a patch can distinguish "leave
/// alone" from an explicit clear; the four required fields can be replaced
/// but never removed.
#[derive(Debug, Clone, Default)]
pub struct ConfigPatch {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
    pub default_organization_id: Option<String>,
    pub current_project_id: Option<Option<String>>,
    pub current_task_id: Option<Option<String>>,
    pub preferences: Option<Preferences>,
}

impl ConfigPatch {
    /// Patch that switches the current project.
    pub fn current_project(id: impl Into<String>) -> Self {
        Self {
            current_project_id: Some(Some(id.into())),
            ..Self::default()
        }
    }

    /// Patch that switches the current task.
    pub fn current_task(id: impl Into<String>) -> Self {
        Self {
            current_task_id: Some(Some(id.into())),
            ..Self::default()
        }
    }

    /// Patch that clears the current task.
    pub fn cleared_task() -> Self {
        Self {
            current_task_id: Some(None),
            ..Self::default()
        }
    }

    /// Patch that switches the default organization.
    pub fn organization(id: impl Into<String>) -> Self {
        Self {
            default_organization_id: Some(id.into()),
            ..Self::default()
        }
    }

    fn apply(self, mut config: Config) -> Config {
        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }
        if let Some(user_id) = self.user_id {
            config.user_id = user_id;
        }
        if let Some(org_id) = self.default_organization_id {
            config.default_organization_id = org_id;
        }
        if let Some(project_id) = self.current_project_id {
            config.current_project_id = project_id;
        }
        if let Some(task_id) = self.current_task_id {
            config.current_task_id = task_id;
        }
        if let Some(preferences) = self.preferences {
            config.preferences = Some(preferences);
        }
        config
    }
}

/// Store for the persisted configuration.
///
/// One instance per backing file. [`ConfigStore::shared`] is the process-wide
/// instance the interactive flows use; tests construct independent stores
/// pointed at temp paths. The last successfully loaded configuration is
/// cached in memory for the lifetime of the store.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    cache: Mutex<Option<Config>>,
}

static SHARED: OnceLock<ConfigStore> = OnceLock::new();

impl ConfigStore {
    /// Store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Store at the fixed per-user location, `~/.devshed/config.json`.
    pub fn open_default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// The process-wide instance, created on first access.
    pub fn shared() -> &'static ConfigStore {
        SHARED.get_or_init(Self::open_default)
    }

    /// Location of the backing file, for display.
    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The cached configuration, without touching the disk.
    pub fn current(&self) -> Option<Config> {
        self.cache.lock().clone()
    }

    /// Read the configuration, or `None` when the file is missing or
    /// unparsable.
    ///
    /// The first successful read is cached; later calls return the cached
    /// copy until the next `save`.
    pub fn load(&self) -> Option<Config> {
        {
            let cache = self.cache.lock();
            if cache.is_some() {
                return cache.clone();
            }
        }

        let content = std::fs::read_to_string(&self.path).ok()?;
        let config: Config = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "config file {} is unparsable, treating as absent: {}",
                    self.path.display(),
                    err
                );
                return None;
            }
        };

        *self.cache.lock() = Some(config.clone());
        Some(config)
    }

    /// Persist `config`, replacing the file atomically, then refresh the
    /// cache.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(config)?;

        // Write-to-temp-then-rename so a reader never observes a partially
        // written file.
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json).map_err(|source| ConfigError::Write {
            path: temp.clone(),
            source,
        })?;
        std::fs::rename(&temp, &self.path).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;

        *self.cache.lock() = Some(config.clone());
        tracing::debug!("saved config to {}", self.path.display());
        Ok(())
    }

    /// Shallow-merge `patch` over the persisted configuration and save the
    /// result.
    pub fn update(&self, patch: ConfigPatch) -> Result<Config, ConfigError> {
        let current = self.load().ok_or(ConfigError::NoConfig)?;
        let merged = patch.apply(current);
        self.save(&merged)?;
        Ok(merged)
    }

    /// Switch the current project.
    pub fn set_current_project(&self, project_id: &str) -> Result<(), ConfigError> {
        self.update(ConfigPatch::current_project(project_id))
            .map(drop)
    }

    /// Switch the current task.
    pub fn set_current_task(&self, task_id: &str) -> Result<(), ConfigError> {
        self.update(ConfigPatch::current_task(task_id)).map(drop)
    }

    /// Forget the current task, e.g. after it is completed or abandoned.
    pub fn clear_current_task(&self) -> Result<(), ConfigError> {
        self.update(ConfigPatch::cleared_task()).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_config() -> Config {
        Config {
            api_url: "https://api.devshed.dev".to_string(),
            api_key: "k-123".to_string(),
            user_id: "u-1".to_string(),
            default_organization_id: "o-1".to_string(),
            current_project_id: None,
            current_task_id: None,
            preferences: None,
        }
    }

    fn store_in(dir: &Path) -> ConfigStore {
        ConfigStore::new(dir.join("devshed").join("config.json"))
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let config = sample_config();
        store.save(&config).unwrap();
        assert_eq!(store.load(), Some(config.clone()));

        // A fresh store at the same path reads the file, not the cache.
        let fresh = store_in(dir.path());
        assert_eq!(fresh.load(), Some(config));
    }

    #[test]
    fn missing_or_unparsable_file_loads_as_absent() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.load(), None);
        assert!(!store.exists());

        std::fs::create_dir_all(store.config_path().parent().unwrap()).unwrap();
        std::fs::write(store.config_path(), "{ not json").unwrap();
        assert!(store.exists());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn update_changes_only_the_patched_field() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&sample_config()).unwrap();

        let merged = store
            .update(ConfigPatch::current_project("p1"))
            .unwrap();
        assert_eq!(merged.current_project_id.as_deref(), Some("p1"));
        assert_eq!(merged.api_url, sample_config().api_url);
        assert_eq!(merged.api_key, sample_config().api_key);
        assert_eq!(merged.current_task_id, None);
    }

    #[test]
    fn organization_switch_leaves_the_rest_alone() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let mut config = sample_config();
        config.current_project_id = Some("p1".to_string());
        store.save(&config).unwrap();

        let merged = store.update(ConfigPatch::organization("o-2")).unwrap();
        assert_eq!(merged.default_organization_id, "o-2");
        assert_eq!(merged.current_project_id.as_deref(), Some("p1"));
        assert_eq!(merged.user_id, config.user_id);
    }

    #[test]
    fn update_without_persisted_config_fails() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let err = store.update(ConfigPatch::current_project("p1")).unwrap_err();
        assert!(matches!(err, ConfigError::NoConfig));
    }

    #[test]
    fn clear_current_task_drops_the_key_from_disk() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let mut config = sample_config();
        config.current_task_id = Some("t1".to_string());
        store.save(&config).unwrap();

        store.clear_current_task().unwrap();
        assert_eq!(store.load().unwrap().current_task_id, None);

        let on_disk = std::fs::read_to_string(store.config_path()).unwrap();
        assert!(!on_disk.contains("currentTaskId"));
    }

    #[test]
    fn file_is_camel_case_and_pretty_printed() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&sample_config()).unwrap();

        let on_disk = std::fs::read_to_string(store.config_path()).unwrap();
        assert!(on_disk.contains("\"apiUrl\""));
        assert!(on_disk.contains("\"defaultOrganizationId\""));
        assert!(on_disk.contains('\n'));
    }

    #[test]
    fn current_peeks_at_the_cache_only() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let other = store_in(dir.path());
        other.save(&sample_config()).unwrap();

        // Nothing loaded through this store yet.
        assert_eq!(store.current(), None);
        store.load();
        assert_eq!(store.current(), Some(sample_config()));
    }

    #[test]
    fn switch_project_end_to_end() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let mut config = sample_config();
        config.api_url = "https://api.x/".to_string();
        store.save(&config).unwrap();
        let path_before = store.config_path().to_path_buf();

        store.set_current_project("p1").unwrap();

        let loaded = store_in(dir.path()).load().unwrap();
        assert_eq!(loaded.current_project_id.as_deref(), Some("p1"));
        assert_eq!(loaded.api_url, "https://api.x/");
        assert_eq!(loaded.user_id, config.user_id);
        assert_eq!(loaded.default_organization_id, config.default_organization_id);
        assert_eq!(store.config_path(), path_before.as_path());
    }

    #[test]
    fn preferences_round_trip() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let mut config = sample_config();
        config.preferences = Some(Preferences {
            auto_save_context: Some(true),
            show_context_in_prompt: Some(false),
            context_persistence: Some(ContextPersistence::SessionAndConfig),
            default_task_view: Some(TaskView::Compact),
        });
        store.save(&config).unwrap();

        let on_disk = std::fs::read_to_string(store.config_path()).unwrap();
        assert!(on_disk.contains("\"session_and_config\""));
        assert!(on_disk.contains("\"compact\""));

        let loaded = store_in(dir.path()).load().unwrap();
        assert_eq!(loaded.preferences, config.preferences);
    }
}
