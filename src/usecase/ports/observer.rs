use crate::domain::entities::record::Record;
use crate::domain::entities::update::{BatchSummary, UpdateResult};
use crate::usecase::ports::error::PortError;

/// Everything a cleaning batch reports goes through here; the loop itself
/// does no logging.
pub trait BatchObserver {
    fn row_started(&mut self, _index: usize, _total: usize, _record: &Record) {}

    /// `progress` is in percent and never decreases within a batch.
    fn row_finished(&mut self, result: &UpdateResult, progress: f64);

    fn batch_aborted(&mut self, _result: &UpdateResult, _error: &PortError) {}

    fn batch_finished(&mut self, _summary: &BatchSummary) {}
}

#[derive(Debug, Default)]
pub struct LogObserver;

impl BatchObserver for LogObserver {
    fn row_started(&mut self, index: usize, total: usize, record: &Record) {
        log::debug!("cleaning row {} ({}/{})", record.row(), index + 1, total);
    }

    fn row_finished(&mut self, result: &UpdateResult, progress: f64) {
        match &result.error {
            Some(error) => log::warn!(
                "row {} ({}) failed: {} [{progress:.0}%]",
                result.row,
                result.company,
                error
            ),
            None if result.written => log::info!(
                "row {} ({}) updated [{progress:.0}%]",
                result.row,
                result.company
            ),
            None => log::info!(
                "row {} ({}) nothing found [{progress:.0}%]",
                result.row,
                result.company
            ),
        }
    }

    fn batch_aborted(&mut self, result: &UpdateResult, error: &PortError) {
        log::error!(
            "batch aborted at row {} ({}): {error}",
            result.row,
            result.company
        );
    }

    fn batch_finished(&mut self, summary: &BatchSummary) {
        log::info!(
            "batch finished: {}/{} processed, {} written, {} failed",
            summary.processed,
            summary.total,
            summary.written,
            summary.failed
        );
    }
}
