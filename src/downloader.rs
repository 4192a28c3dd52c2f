//! Audio download via yt-dlp.
//!
//! This module spawns yt-dlp once per target with a fixed audio-extraction
//! configuration and streams its machine-readable progress reports into a
//! [`ProgressSink`]. Transcoding to MP3 happens inside yt-dlp's ffmpeg
//! postprocessor; this code never touches the media itself.

use crate::error::{HentError, Result};
use crate::progress::ProgressSink;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Progress stays at or below this until the pipeline's finalize step.
const DOWNLOAD_FRACTION_CAP: f64 = 0.95;

/// Renders each progress report as one JSON object per stdout line.
const PROGRESS_TEMPLATE: &str = "download:%(progress)j";

/// Fixed yt-dlp invocation settings.
///
/// One options object for every request: best available audio stream,
/// MP3 transcode at a fixed quality, title-based output names, quiet run.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Format selector passed to `-f`.
    pub format: String,
    /// Codec for the extract-audio postprocessor.
    pub audio_format: String,
    /// Encoder quality for the postprocessor.
    pub audio_quality: String,
    /// Suppress yt-dlp's own console output.
    pub quiet: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            format: "bestaudio/best".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192K".to_string(),
            quiet: true,
        }
    }
}

/// One progress report parsed from yt-dlp's progress template output.
///
/// Field names follow the keys of yt-dlp's progress dictionaries; anything
/// the tool omits simply deserializes to `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressEvent {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub downloaded_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes_estimate: Option<f64>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl ProgressEvent {
    /// Completion fraction, when the report carries a usable total.
    pub fn fraction(&self) -> Option<f64> {
        let total = self.total_bytes.or(self.total_bytes_estimate)?;
        if total <= 0.0 {
            return None;
        }
        let downloaded = self.downloaded_bytes.unwrap_or(0.0);
        Some((downloaded / total).clamp(0.0, 1.0))
    }

    /// Base name of the file currently being written.
    pub fn file_label(&self) -> String {
        let Some(filename) = self.filename.as_deref() else {
            return String::new();
        };
        Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string())
    }
}

/// Parses a single stdout line into a progress event.
///
/// Lines that are not progress reports yield `None`.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = line.trim();
    let json = line.strip_prefix("download:").unwrap_or(line);
    if !json.starts_with('{') {
        return None;
    }
    serde_json::from_str(json).ok()
}

/// Downloads audio for a list of targets using yt-dlp.
pub struct Downloader {
    yt_dlp: PathBuf,
    options: DownloadOptions,
}

impl Downloader {
    pub fn new(yt_dlp: PathBuf, options: DownloadOptions) -> Self {
        Self { yt_dlp, options }
    }

    /// Downloads every target into `output_dir`, forwarding progress as
    /// yt-dlp emits it. Stops at the first failing target.
    pub async fn download_all(
        &self,
        targets: &[String],
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        for (idx, target) in targets.iter().enumerate() {
            sink.report(0.05, &format!("Preparing {}/{}", idx + 1, targets.len()));
            self.download_one(target, output_dir, sink).await?;
        }

        Ok(())
    }

    #[instrument(skip(self, output_dir, sink), fields(target = %target))]
    async fn download_one(
        &self,
        target: &str,
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<()> {
        let template = output_dir.join("%(title)s.%(ext)s");

        let mut command = Command::new(&self.yt_dlp);
        command
            .arg("-f").arg(&self.options.format)
            .arg("--extract-audio")
            .arg("--audio-format").arg(&self.options.audio_format)
            .arg("--audio-quality").arg(&self.options.audio_quality)
            .arg("--output").arg(&template)
            .arg("--newline")
            .arg("--progress")
            .arg("--progress-template").arg(PROGRESS_TEMPLATE);

        if self.options.quiet {
            command.arg("--quiet").arg("--no-warnings");
        }

        let mut child = command
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    HentError::ToolNotFound("yt-dlp".into())
                } else {
                    HentError::Download(format!("yt-dlp execution failed: {e}"))
                }
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HentError::Download("yt-dlp stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| HentError::Download("yt-dlp stderr unavailable".into()))?;

        let stderr_task = tokio::spawn(async move {
            let mut collected = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });

        // The template keeps one JSON progress dictionary per line. When a
        // report has no usable total the last fraction is re-sent with the
        // updated description.
        let mut last_fraction = 0.0f64;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            let Some(event) = parse_progress_line(&line) else {
                continue;
            };
            if event.status != "downloading" {
                continue;
            }
            if let Some(fraction) = event.fraction() {
                last_fraction = fraction;
            }
            sink.report(
                last_fraction.min(DOWNLOAD_FRACTION_CAP),
                &format!("Downloading {}", event.file_label()),
            );
        }

        let status = child.wait().await?;
        let stderr_text = stderr_task.await.unwrap_or_default();

        if !status.success() {
            warn!("yt-dlp exited with {:?} for {}", status.code(), target);
            return Err(HentError::Download(reduce_tool_error(
                &stderr_text,
                status.code(),
            )));
        }

        debug!("yt-dlp finished for {}", target);
        Ok(())
    }
}

/// Reduces yt-dlp stderr to a single reportable line.
///
/// Prefers the last line carrying the tool's `ERROR:` prefix, then the last
/// non-empty line, then the bare exit status.
fn reduce_tool_error(stderr: &str, exit_code: Option<i32>) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if let Some(error_line) = lines.iter().rev().find(|l| l.starts_with("ERROR:")) {
        return error_line.trim_start_matches("ERROR:").trim().to_string();
    }

    if let Some(last) = lines.last() {
        return (*last).to_string();
    }

    match exit_code {
        Some(code) => format!("yt-dlp exited with status {}", code),
        None => "yt-dlp terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line_with_prefix() {
        let line = r#"download:{"status": "downloading", "downloaded_bytes": 512, "total_bytes": 1024, "filename": "/tmp/downloads_x/Song.webm"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.status, "downloading");
        assert_eq!(event.fraction(), Some(0.5));
        assert_eq!(event.file_label(), "Song.webm");
    }

    #[test]
    fn test_parse_progress_line_bare_json() {
        let line = r#"{"status": "finished", "filename": "Song.mp3"}"#;
        let event = parse_progress_line(line).unwrap();
        assert_eq!(event.status, "finished");
        assert_eq!(event.fraction(), None);
    }

    #[test]
    fn test_parse_progress_line_ignores_noise() {
        assert!(parse_progress_line("").is_none());
        assert!(parse_progress_line("[youtube] dQw4w9WgXcQ: Downloading webpage").is_none());
        assert!(parse_progress_line("download:not json").is_none());
    }

    #[test]
    fn test_fraction_uses_estimate_when_total_missing() {
        let event = parse_progress_line(
            r#"{"status": "downloading", "downloaded_bytes": 250.0, "total_bytes_estimate": 1000.0}"#,
        )
        .unwrap();
        assert_eq!(event.fraction(), Some(0.25));
    }

    #[test]
    fn test_fraction_clamps_overshoot() {
        let event = parse_progress_line(
            r#"{"status": "downloading", "downloaded_bytes": 2048, "total_bytes": 1024}"#,
        )
        .unwrap();
        assert_eq!(event.fraction(), Some(1.0));
    }

    #[test]
    fn test_fraction_none_without_total() {
        let event = parse_progress_line(
            r#"{"status": "downloading", "downloaded_bytes": 2048}"#,
        )
        .unwrap();
        assert_eq!(event.fraction(), None);
    }

    #[test]
    fn test_reduce_tool_error_prefers_error_line() {
        let stderr = "WARNING: some noise\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(
            reduce_tool_error(stderr, Some(1)),
            "[youtube] abc: Video unavailable"
        );
    }

    #[test]
    fn test_reduce_tool_error_takes_last_error() {
        let stderr = "ERROR: first\nERROR: second\n";
        assert_eq!(reduce_tool_error(stderr, Some(1)), "second");
    }

    #[test]
    fn test_reduce_tool_error_falls_back_to_last_line() {
        let stderr = "something broke\n\n";
        assert_eq!(reduce_tool_error(stderr, Some(1)), "something broke");
    }

    #[test]
    fn test_reduce_tool_error_empty_stderr() {
        assert_eq!(reduce_tool_error("", Some(101)), "yt-dlp exited with status 101");
        assert_eq!(reduce_tool_error("", None), "yt-dlp terminated by signal");
    }

    #[test]
    fn test_default_options_match_fixed_configuration() {
        let options = DownloadOptions::default();
        assert_eq!(options.format, "bestaudio/best");
        assert_eq!(options.audio_format, "mp3");
        assert_eq!(options.audio_quality, "192K");
        assert!(options.quiet);
    }
}
