//! Job tracking for submitted downloads.
//!
//! The web form submits a link, gets a job id back, and polls until the
//! pipeline finishes. Jobs live in memory only; finished entries are pruned
//! after a retention window so the registry cannot grow without bound.

use crate::orchestrator::Delivery;
use crate::progress::ProgressSink;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long finished jobs stay queryable.
const JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

/// Point-in-time view of a job for the polling endpoint.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub fraction: f64,
    pub description: String,
    pub done: bool,
    pub status: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug)]
struct Job {
    fraction: f64,
    description: String,
    result: Option<Delivery>,
    updated: Instant,
}

/// Registry of submitted download jobs, shared across request handlers.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

impl JobRegistry {
    /// Register a new job and return its id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut jobs = self.entries();
        prune_finished(&mut jobs);
        jobs.insert(
            id,
            Job {
                fraction: 0.0,
                description: "Queued".to_string(),
                result: None,
                updated: Instant::now(),
            },
        );
        id
    }

    /// Record a progress update. Unknown ids are ignored.
    pub fn report(&self, id: Uuid, fraction: f64, description: &str) {
        let mut jobs = self.entries();
        if let Some(job) = jobs.get_mut(&id) {
            job.fraction = fraction.clamp(0.0, 1.0);
            job.description = description.to_string();
            job.updated = Instant::now();
        }
    }

    /// Record the final delivery for a job.
    pub fn finish(&self, id: Uuid, delivery: Delivery) {
        let mut jobs = self.entries();
        if let Some(job) = jobs.get_mut(&id) {
            if delivery.file.is_some() {
                job.fraction = 1.0;
            }
            job.result = Some(delivery);
            job.updated = Instant::now();
        }
    }

    /// Current state of a job, if it exists.
    pub fn snapshot(&self, id: Uuid) -> Option<JobSnapshot> {
        let jobs = self.entries();
        jobs.get(&id).map(|job| JobSnapshot {
            fraction: job.fraction,
            description: job.description.clone(),
            done: job.result.is_some(),
            status: job.result.as_ref().map(|d| d.status.clone()),
            file: job.result.as_ref().and_then(|d| d.file.clone()),
        })
    }

    /// Path of the deliverable for a finished job.
    pub fn file_for(&self, id: Uuid) -> Option<PathBuf> {
        let jobs = self.entries();
        jobs.get(&id)
            .and_then(|job| job.result.as_ref())
            .and_then(|delivery| delivery.file.clone())
    }

    // Every update is a single self-contained write, so the map stays
    // coherent even if a panicking thread poisoned the lock.
    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn prune_finished(jobs: &mut HashMap<Uuid, Job>) {
    jobs.retain(|_, job| job.result.is_none() || job.updated.elapsed() < JOB_RETENTION);
}

/// Progress sink that records into the registry under a job id.
pub struct JobSink {
    registry: Arc<JobRegistry>,
    id: Uuid,
}

impl JobSink {
    pub fn new(registry: Arc<JobRegistry>, id: Uuid) -> Self {
        Self { registry, id }
    }
}

impl ProgressSink for JobSink {
    fn report(&self, fraction: f64, description: &str) {
        self.registry.report(self.id, fraction, description);
    }
}
