use crate::domain::entities::record::RowId;

const MIN_REQUEST_LEN: usize = 10;
const MIN_COLUMN_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningRequest {
    pub request: String,
    pub target_column: String,
}

impl CleaningRequest {
    pub fn new(request: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            target_column: target_column.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.request.trim().chars().count() < MIN_REQUEST_LEN {
            return Err("please provide a more detailed request".to_string());
        }
        if self.target_column.trim().chars().count() < MIN_COLUMN_LEN {
            return Err("target column is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Success,
    Error,
}

impl UpdateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStatus::Success => "success",
            UpdateStatus::Error => "error",
        }
    }
}

/// Outcome of one row of a cleaning batch. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub company: String,
    pub row: RowId,
    /// Empty means the model found nothing.
    pub value: String,
    pub status: UpdateStatus,
    pub error: Option<String>,
    pub written: bool,
}

impl UpdateResult {
    pub fn written(company: impl Into<String>, row: RowId, value: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            row,
            value: value.into(),
            status: UpdateStatus::Success,
            error: None,
            written: true,
        }
    }

    pub fn not_found(company: impl Into<String>, row: RowId) -> Self {
        Self {
            company: company.into(),
            row,
            value: String::new(),
            status: UpdateStatus::Success,
            error: None,
            written: false,
        }
    }

    pub fn failed(company: impl Into<String>, row: RowId, detail: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            row,
            value: String::new(),
            status: UpdateStatus::Error,
            error: Some(detail.into()),
            written: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UpdateStatus::Success
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub written: usize,
    pub aborted: bool,
}

impl BatchSummary {
    pub fn from_results(total: usize, results: &[UpdateResult], aborted: bool) -> Self {
        let succeeded = results.iter().filter(|result| result.is_success()).count();
        Self {
            total,
            processed: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            written: results.iter().filter(|result| result.written).count(),
            aborted,
        }
    }
}

/// Percentage of rows processed, clamped to `0..=100`. An empty batch is
/// complete.
pub fn progress_percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (processed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_reaches_one_hundred_and_clamps() {
        assert_eq!(progress_percent(0, 4), 0.0);
        assert_eq!(progress_percent(1, 4), 25.0);
        assert_eq!(progress_percent(4, 4), 100.0);
        assert_eq!(progress_percent(9, 4), 100.0);
        assert_eq!(progress_percent(0, 0), 100.0);
    }

    #[test]
    fn cleaning_request_rejects_short_input() {
        assert!(CleaningRequest::new("too short", "URL").validate().is_err());
        assert!(CleaningRequest::new("Find the LinkedIn URL", "U")
            .validate()
            .is_err());
        assert!(CleaningRequest::new("Find the LinkedIn URL", "URL")
            .validate()
            .is_ok());
    }

    #[test]
    fn batch_summary_counts_outcomes() {
        let results = vec![
            UpdateResult::written("Acme", RowId(2), "x"),
            UpdateResult::not_found("Globex", RowId(3)),
            UpdateResult::failed("Initech", RowId(4), "boom"),
        ];

        let summary = BatchSummary::from_results(5, &results, true);

        assert_eq!(
            summary,
            BatchSummary {
                total: 5,
                processed: 3,
                succeeded: 2,
                failed: 1,
                written: 1,
                aborted: true,
            }
        );
    }
}
