//! Pre-flight checks before downloads.
//!
//! Resolves the external tools a download needs, preferring explicitly
//! configured paths over a system PATH lookup. The encoder check runs before
//! any download starts so a missing ffmpeg fails fast with an actionable
//! message instead of midway through postprocessing.

use crate::config::Settings;
use crate::error::{HentError, Result};
use std::path::PathBuf;
use tracing::warn;

/// Resolve the yt-dlp binary.
pub fn yt_dlp_path(settings: &Settings) -> Result<PathBuf> {
    resolve_tool("yt-dlp", settings.download.yt_dlp_path.as_deref())
}

/// Resolve the ffmpeg binary.
pub fn ffmpeg_path(settings: &Settings) -> Result<PathBuf> {
    resolve_tool("ffmpeg", settings.download.ffmpeg_path.as_deref())
}

/// Run the encoder pre-flight check.
///
/// yt-dlp itself is resolved separately when the downloader is built; the
/// encoder is the dependency whose absence gets a dedicated user message.
pub fn check(settings: &Settings) -> Result<()> {
    ffmpeg_path(settings).map(|_| ())
}

fn resolve_tool(name: &str, configured: Option<&str>) -> Result<PathBuf> {
    if let Some(configured) = configured {
        let path = Settings::expand_path(configured);
        if path.exists() {
            return Ok(path);
        }
        // A stale override is still a missing tool from the user's side.
        warn!(
            "configured {} path does not exist: {}",
            name,
            path.display()
        );
        return Err(HentError::ToolNotFound(name.to_string()));
    }

    which::which(name).map_err(|_| HentError::ToolNotFound(name.to_string()))
}
