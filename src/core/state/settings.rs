use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

const APP_DIR_NAME: &str = "haven-launch";
const SETTINGS_FILE: &str = "settings.json";

/// User-editable launcher settings, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Where downloaded resources are cached.
    pub cache_dir: PathBuf,
    /// Explicit Java binary; auto-detected when unset.
    pub java_path: Option<PathBuf>,
    /// Maximum number of parallel fetches.
    pub concurrency: usize,
    /// Extra host properties visible through `${p:NAME}`.
    pub properties: HashMap<String, String>,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR_NAME),
            java_path: None,
            concurrency: 8,
            properties: HashMap::new(),
        }
    }
}

impl LauncherSettings {
    /// Load settings from the platform config dir, falling back to defaults.
    pub fn load() -> Self {
        let path = default_config_dir().join(SETTINGS_FILE);
        match Self::load_from(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Ignoring unreadable settings {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> LauncherResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&raw)?;
        debug!("Loaded settings from {:?}", path);
        Ok(Some(settings))
    }

    pub fn save_to(&self, path: &Path) -> LauncherResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
