//! Error types for Hent.

use thiserror::Error;

/// Library-level error type for Hent operations.
#[derive(Error, Debug)]
pub enum HentError {
    #[error("No link provided")]
    EmptyLink,

    #[error("Unsupported link: {0}")]
    UnsupportedLink(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("No files were downloaded")]
    NoFilesDownloaded,

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Hent operations.
pub type Result<T> = std::result::Result<T, HentError>;

impl HentError {
    /// The status line shown in the UI for this error.
    ///
    /// Every failure reaches the browser as a plain sentence next to an empty
    /// file slot; nothing here ever panics or leaks a backtrace to the form.
    pub fn user_message(&self) -> String {
        match self {
            HentError::EmptyLink => "Please provide a YouTube link.".to_string(),
            HentError::UnsupportedLink(_) => {
                "Unsupported link. Please use a YouTube link.".to_string()
            }
            HentError::ToolNotFound(tool) if tool == "ffmpeg" => {
                "ffmpeg not found. Install ffmpeg and restart the app.".to_string()
            }
            HentError::NoFilesDownloaded => {
                "No files were downloaded. Check the link or ffmpeg.".to_string()
            }
            HentError::Download(msg) => format!("Error: {}", msg),
            other => format!("Error: {}", other),
        }
    }
}
