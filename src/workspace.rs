//! Per-request download workspaces and their cleanup.
//!
//! Every request writes into its own `downloads_`-prefixed directory under
//! the configured temp root. What happens to that directory afterwards is
//! governed by [`CleanupPolicy`]: `sweep` removes failed workspaces right
//! away and reaps served ones once they age out, `keep` leaves everything on
//! disk.

use crate::config::{CleanupPolicy, Settings};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Prefix for per-request directories under the temp root.
const WORKSPACE_PREFIX: &str = "downloads_";

/// An isolated directory one download request writes into.
pub struct Workspace {
    dir: PathBuf,
    policy: CleanupPolicy,
    retained: bool,
}

impl Workspace {
    /// Create a fresh workspace under the configured temp root.
    pub fn create(settings: &Settings) -> Result<Self> {
        let root = settings.temp_dir();
        fs::create_dir_all(&root)?;

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(&root)?
            .keep();

        debug!("created workspace {}", dir.display());

        Ok(Self {
            dir,
            policy: settings.cleanup.policy,
            retained: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Keep the directory so its contents stay servable after the request.
    pub fn retain(&mut self) {
        self.retained = true;
    }

    /// Remove the directory now unless it is retained or the policy keeps
    /// everything.
    pub fn finish(self) {
        if self.retained || self.policy == CleanupPolicy::Keep {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            warn!("failed to remove workspace {}: {}", self.dir.display(), e);
        }
    }
}

/// Delete workspaces under `root` older than `max_age`.
///
/// Only `downloads_`-prefixed directories are touched. Returns the number
/// of directories removed.
pub fn sweep(root: &Path, max_age: Duration) -> Result<usize> {
    if !root.exists() {
        return Ok(0);
    }

    let mut removed = 0;

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(WORKSPACE_PREFIX) {
            continue;
        }
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        let expired = SystemTime::now()
            .duration_since(modified)
            .map(|age| age >= max_age)
            .unwrap_or(false);

        if expired {
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    debug!("swept workspace {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("failed to sweep {}: {}", path.display(), e),
            }
        }
    }

    Ok(removed)
}

/// Spawn the periodic sweep task for the configured policy.
///
/// Returns `None` under the `keep` policy. The first sweep runs immediately,
/// clearing leftovers from previous runs.
pub fn spawn_sweeper(settings: &Settings) -> Option<tokio::task::JoinHandle<()>> {
    if settings.cleanup.policy != CleanupPolicy::Sweep {
        return None;
    }

    let root = settings.temp_dir();
    let max_age = Duration::from_secs(settings.cleanup.max_age_minutes * 60);
    let period = Duration::from_secs(settings.cleanup.sweep_interval_minutes.max(1) * 60);

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match sweep(&root, max_age) {
                Ok(0) => {}
                Ok(n) => info!("swept {} expired workspace(s)", n),
                Err(e) => warn!("workspace sweep failed: {}", e),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn settings_with_root(root: &Path, policy: CleanupPolicy) -> Settings {
        let mut settings = Settings::default();
        settings.general.temp_dir = root.to_string_lossy().into_owned();
        settings.cleanup.policy = policy;
        settings
    }

    #[test]
    fn test_create_uses_prefix_under_root() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_with_root(root.path(), CleanupPolicy::Sweep);

        let workspace = Workspace::create(&settings).unwrap();
        assert!(workspace.path().exists());
        assert!(workspace
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(WORKSPACE_PREFIX));
        assert_eq!(workspace.path().parent().unwrap(), root.path());
    }

    #[test]
    fn test_finish_removes_unretained_workspace() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_with_root(root.path(), CleanupPolicy::Sweep);

        let workspace = Workspace::create(&settings).unwrap();
        let dir = workspace.path().to_path_buf();
        workspace.finish();
        assert!(!dir.exists());
    }

    #[test]
    fn test_finish_keeps_retained_workspace() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_with_root(root.path(), CleanupPolicy::Sweep);

        let mut workspace = Workspace::create(&settings).unwrap();
        workspace.retain();
        let dir = workspace.path().to_path_buf();
        workspace.finish();
        assert!(dir.exists());
    }

    #[test]
    fn test_keep_policy_never_removes() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_with_root(root.path(), CleanupPolicy::Keep);

        let workspace = Workspace::create(&settings).unwrap();
        let dir = workspace.path().to_path_buf();
        workspace.finish();
        assert!(dir.exists());
    }

    #[test]
    fn test_sweep_removes_only_expired_prefixed_dirs() {
        let root = tempfile::tempdir().unwrap();
        let stale = root.path().join("downloads_stale");
        let other = root.path().join("unrelated");
        fs::create_dir(&stale).unwrap();
        fs::create_dir(&other).unwrap();

        // Zero max age makes every prefixed directory expired.
        let removed = sweep(root.path(), Duration::ZERO).unwrap();
        assert_eq!(removed, 1);
        assert!(!stale.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_sweep_spares_young_dirs() {
        let root = tempfile::tempdir().unwrap();
        let young = root.path().join("downloads_young");
        fs::create_dir(&young).unwrap();

        let removed = sweep(root.path(), Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);
        assert!(young.exists());
    }

    #[test]
    fn test_sweep_missing_root_is_noop() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("never_created");
        assert_eq!(sweep(&missing, Duration::ZERO).unwrap(), 0);
    }
}
