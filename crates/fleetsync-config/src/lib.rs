//! Settings storage for fleetsync.
//!
//! A JSON key-value file under the user config dir holds the tenant
//! credential pair (application id + directory id), each value sealed
//! at rest by [`secrets`]. Environment variables overlay the stored
//! values via figment, so automation can run with nothing on disk:
//! `FLEETSYNC_APPLICATION_ID` / `FLEETSYNC_DIRECTORY_ID`.

pub mod secrets;

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "FLEETSYNC_";
const SETTINGS_FILE: &str = "settings.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve a config directory for this platform")]
    NoConfigDir,

    #[error(transparent)]
    Secret(#[from] secrets::SecretError),

    #[error("settings file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Credential pair ─────────────────────────────────────────────────

/// The tenant credential pair, in the clear (post-unsealing).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub directory_id: String,
}

impl Credentials {
    /// Both values present and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.application_id.is_empty() && !self.directory_id.is_empty()
    }
}

/// On-disk shape: the same fields, sealed.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    application_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    directory_id: Option<String>,
}

// ── Store ───────────────────────────────────────────────────────────

/// The settings file plus derived paths (log persistence).
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the platform config dir (created on first save).
    pub fn open_default() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("io", "fleetsync", "fleetsync")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(Self {
            path: dirs.config_dir().join(SETTINGS_FILE),
        })
    }

    /// Store at an explicit path (tests, portable setups).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a log buffer for `context` persists.
    pub fn log_path(&self, context: &str) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("logs")
            .join(format!("{context}.json"))
    }

    /// Load credentials: stored + unsealed, then overlaid with
    /// environment variables (env wins where set).
    pub fn load(&self) -> Result<Credentials, ConfigError> {
        let stored = if self.path.exists() {
            let raw = fs::read_to_string(&self.path)?;
            serde_json::from_str::<StoredSettings>(&raw)?
        } else {
            StoredSettings::default()
        };

        let unsealed = Credentials {
            application_id: stored
                .application_id
                .as_deref()
                .map(secrets::open)
                .transpose()?
                .unwrap_or_default(),
            directory_id: stored
                .directory_id
                .as_deref()
                .map(secrets::open)
                .transpose()?
                .unwrap_or_default(),
        };

        let merged: Credentials = Figment::from(Serialized::defaults(unsealed))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        Ok(merged)
    }

    /// Seal and persist the credential pair.
    pub fn save(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        let stored = StoredSettings {
            application_id: (!credentials.application_id.is_empty())
                .then(|| secrets::seal(&credentials.application_id))
                .transpose()?,
            directory_id: (!credentials.directory_id.is_empty())
                .then(|| secrets::seal(&credentials.directory_id))
                .transpose()?,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Whether a usable credential pair is available (stored or env).
    pub fn has_valid_credentials(&self) -> bool {
        self.load().map(|c| c.is_complete()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_round_trip_keeps_values_sealed_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::at(dir.path().join("settings.json"));

        let credentials = Credentials {
            application_id: "app-guid".into(),
            directory_id: "dir-guid".into(),
        };
        store.save(&credentials).expect("save");

        let raw = std::fs::read_to_string(store.path()).expect("read");
        assert!(!raw.contains("app-guid"));
        assert!(!raw.contains("dir-guid"));

        let loaded = store.load().expect("load");
        assert_eq!(loaded.application_id, "app-guid");
        assert_eq!(loaded.directory_id, "dir-guid");
        assert!(loaded.is_complete());
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::at(dir.path().join("absent.json"));
        let loaded = store.load().expect("load");
        assert!(!loaded.is_complete());
        assert!(!store.has_valid_credentials());
    }

    #[test]
    fn environment_overlays_stored_values() {
        figment::Jail::expect_with(|jail| {
            let path = jail.directory().join("settings.json");
            let store = SettingsStore::at(&path);
            store
                .save(&Credentials {
                    application_id: "from-disk".into(),
                    directory_id: String::new(),
                })
                .expect("save");

            jail.set_env("FLEETSYNC_DIRECTORY_ID", "from-env");

            let loaded = store.load().expect("load");
            assert_eq!(loaded.application_id, "from-disk");
            assert_eq!(loaded.directory_id, "from-env");
            assert!(loaded.is_complete());
            Ok(())
        });
    }

    #[test]
    fn log_paths_are_per_context() {
        let store = SettingsStore::at("/tmp/fleetsync/settings.json");
        assert_eq!(
            store.log_path("import"),
            PathBuf::from("/tmp/fleetsync/logs/import.json")
        );
        assert_ne!(store.log_path("import"), store.log_path("offboard"));
    }
}
