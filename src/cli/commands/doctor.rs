//! Doctor command - verify system requirements and configuration.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Hent Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Check external tools
    println!("{}", style("External Tools").bold());
    checks.push(check_tool(
        settings,
        "yt-dlp",
        "--version",
        install_hint_ytdlp(),
    ));
    checks.push(check_tool(
        settings,
        "ffmpeg",
        "-version",
        install_hint_ffmpeg(),
    ));
    for check in &checks[checks.len() - 2..] {
        check.print();
    }

    println!();

    // Check directories
    println!("{}", style("Directories").bold());
    let dir_check = check_workspace_root(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    let cleanup_check = check_cleanup_policy(settings);
    cleanup_check.print();
    checks.push(config_check);
    checks.push(cleanup_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Hent.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! Hent is ready to use.");
    }

    Ok(())
}

/// Check that an external tool resolves and answers a version query.
fn check_tool(settings: &Settings, name: &str, version_arg: &str, hint: &str) -> CheckResult {
    let resolved = match name {
        "ffmpeg" => preflight::ffmpeg_path(settings),
        _ => preflight::yt_dlp_path(settings),
    };

    let path = match resolved {
        Ok(path) => path,
        Err(e) => return CheckResult::error(name, &e.to_string(), hint),
    };

    match Command::new(&path).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            // First line usually carries the version
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            CheckResult::ok(name, &version_display(version))
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Truncate long version strings on a character boundary.
fn version_display(version: String) -> String {
    if version.chars().count() > 50 {
        format!("{}...", version.chars().take(50).collect::<String>())
    } else {
        version
    }
}

/// Check the workspace root directory.
fn check_workspace_root(settings: &Settings) -> CheckResult {
    let temp_dir = settings.temp_dir();
    if temp_dir.exists() {
        let count = count_workspaces(&temp_dir);
        CheckResult::ok(
            "Workspace root",
            &format!("{} ({} workspace(s) on disk)", temp_dir.display(), count),
        )
    } else {
        CheckResult::warning(
            "Workspace root",
            &format!("{} (will be created)", temp_dir.display()),
            "Directory will be created on startup",
        )
    }
}

fn count_workspaces(root: &Path) -> usize {
    std::fs::read_dir(root)
        .map(|entries| {
            entries
                .flatten()
                .filter(|e| e.file_name().to_string_lossy().starts_with("downloads_"))
                .count()
        })
        .unwrap_or(0)
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to customize", config_path.display()),
        )
    }
}

/// Report the active cleanup policy.
fn check_cleanup_policy(settings: &Settings) -> CheckResult {
    match settings.cleanup.policy {
        crate::config::CleanupPolicy::Sweep => CheckResult::ok(
            "Cleanup policy",
            &format!(
                "sweep (workspaces older than {} min removed every {} min)",
                settings.cleanup.max_age_minutes, settings.cleanup.sweep_interval_minutes
            ),
        ),
        crate::config::CleanupPolicy::Keep => CheckResult::warning(
            "Cleanup policy",
            "keep (downloaded files are never deleted)",
            "Set cleanup.policy = \"sweep\" to reclaim disk space automatically",
        ),
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_version_display_keeps_short_lines() {
        let line = "yt-dlp 2024.08.06".to_string();
        assert_eq!(version_display(line), "yt-dlp 2024.08.06");
    }

    #[test]
    fn test_version_display_truncates_long_lines() {
        let shown = version_display("x".repeat(80));
        assert_eq!(shown, format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn test_version_display_respects_char_boundaries() {
        // Byte 50 lands inside a two-byte character here.
        let line = format!("a{}", "ø".repeat(60));
        let shown = version_display(line);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 53);
    }

    #[test]
    fn test_count_workspaces_filters_prefix() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("downloads_a")).unwrap();
        std::fs::create_dir(root.path().join("downloads_b")).unwrap();
        std::fs::create_dir(root.path().join("other")).unwrap();

        assert_eq!(count_workspaces(root.path()), 2);
    }

    #[test]
    fn test_keep_policy_warns() {
        let mut settings = Settings::default();
        settings.cleanup.policy = crate::config::CleanupPolicy::Keep;
        let result = check_cleanup_policy(&settings);
        assert_eq!(result.status, CheckStatus::Warning);
    }
}
