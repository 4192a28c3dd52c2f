//! Progress reporting.

/// Sink for progress updates from a running download.
///
/// `fraction` is a completion estimate in `[0.0, 1.0]`; `description` is a
/// short line suitable for display next to a progress bar. Implementations
/// are called synchronously from the download loop and should return quickly.
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64, description: &str);
}

/// Sink that discards every update.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _fraction: f64, _description: &str) {}
}
