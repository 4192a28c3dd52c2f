//! Request pipeline for Hent.
//!
//! Coordinates one download request end to end: validate the link, create a
//! workspace, run the pre-flight check, download, then collect and package
//! the outputs. Every failure is folded into a [`Delivery`] carrying a user
//! message; nothing here ever reaches the presentation layer as an error.

use crate::cli::preflight;
use crate::config::Settings;
use crate::downloader::{DownloadOptions, Downloader};
use crate::error::{HentError, Result};
use crate::packager::{self, Packaged};
use crate::progress::ProgressSink;
use crate::validate::validate_link;
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Outcome of one request: an optional file on disk plus a status line.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub file: Option<PathBuf>,
    pub status: String,
}

/// The main orchestrator for the Hent pipeline.
pub struct Orchestrator {
    settings: Settings,
}

impl Orchestrator {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Run one download request end to end.
    #[instrument(skip(self, sink), fields(link = %link))]
    pub async fn download_music(&self, link: &str, sink: &dyn ProgressSink) -> Delivery {
        let link = match validate_link(link) {
            Ok(link) => link,
            Err(e) => return Delivery { file: None, status: e.user_message() },
        };

        sink.report(0.01, "Validating link");

        let mut workspace = match Workspace::create(&self.settings) {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!("failed to create workspace: {}", e);
                return Delivery { file: None, status: e.user_message() };
            }
        };

        let delivery = match self.run(&link, workspace.path(), sink).await {
            Ok(packaged) => {
                info!("delivered {}", packaged.file.display());
                workspace.retain();
                Delivery {
                    file: Some(packaged.file),
                    status: packaged.status,
                }
            }
            Err(e) => {
                warn!("download failed: {}", e);
                Delivery {
                    file: None,
                    status: e.user_message(),
                }
            }
        };

        workspace.finish();
        delivery
    }

    /// The fallible part of the pipeline.
    async fn run(&self, link: &str, dir: &Path, sink: &dyn ProgressSink) -> Result<Packaged> {
        if self.settings.download.preflight {
            preflight::check(&self.settings)?;
        }

        let yt_dlp = preflight::yt_dlp_path(&self.settings)?;
        let downloader = Downloader::new(yt_dlp, DownloadOptions::default());

        // The downloader takes a target list; the form supplies one link.
        let targets = vec![link.to_string()];
        downloader.download_all(&targets, dir, sink).await?;

        sink.report(0.98, "Finalizing");

        let files = packager::collect_outputs(dir)?;
        if files.is_empty() {
            return Err(HentError::NoFilesDownloaded);
        }

        info!("collected {} file(s)", files.len());
        packager::package(dir, &files)
    }
}
