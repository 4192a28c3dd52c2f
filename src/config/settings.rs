//! Configuration settings for Hent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub download: DownloadSettings,
    pub cleanup: CleanupSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Root directory for per-request download workspaces.
    pub temp_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/hent".to_string(),
        }
    }
}

/// Web server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind the web UI to.
    pub host: String,
    /// Port to bind the web UI to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Check that ffmpeg is installed before starting a download.
    /// When disabled, a missing encoder surfaces as a generic tool error.
    pub preflight: bool,
    /// Explicit yt-dlp binary path. PATH lookup when unset.
    pub yt_dlp_path: Option<String>,
    /// Explicit ffmpeg binary path. PATH lookup when unset.
    pub ffmpeg_path: Option<String>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            preflight: true,
            yt_dlp_path: None,
            ffmpeg_path: None,
        }
    }
}

/// What happens to per-request workspaces after a request ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Remove failed workspaces immediately and sweep served ones once they
    /// exceed `max_age_minutes`.
    #[default]
    Sweep,
    /// Never delete anything. Workspaces accumulate until removed externally.
    Keep,
}

impl std::fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupPolicy::Sweep => write!(f, "sweep"),
            CleanupPolicy::Keep => write!(f, "keep"),
        }
    }
}

/// Workspace cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Cleanup policy (sweep, keep).
    pub policy: CleanupPolicy,
    /// Minimum age in minutes before a served workspace may be swept.
    pub max_age_minutes: u64,
    /// How often the background sweep runs, in minutes.
    pub sweep_interval_minutes: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            policy: CleanupPolicy::Sweep,
            max_age_minutes: 60,
            sweep_interval_minutes: 10,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hent")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded workspace root path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}
