//! Trait for reporting publish progress.

use crate::planner::PublishRecord;

/// Receives progress from the [`PublishExecutor`](crate::executor::PublishExecutor).
///
/// This lets the core library report publishes without writing to
/// stdout/stderr itself.
pub trait PublishReporter: Send + Sync {
    /// Called before a package is written and published.
    ///
    /// # Arguments
    ///
    /// * `record` - The planned publish
    /// * `position` - 1-based position in the queue
    /// * `total` - Number of records in the queue
    fn report_start(&self, record: &PublishRecord, position: usize, total: usize);

    /// Called after a package was published successfully.
    fn report_published(&self, record: &PublishRecord);
}

/// Reporter that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl PublishReporter for SilentReporter {
    fn report_start(&self, _record: &PublishRecord, _position: usize, _total: usize) {}

    fn report_published(&self, _record: &PublishRecord) {}
}
