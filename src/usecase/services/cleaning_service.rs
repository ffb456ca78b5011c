use std::sync::Arc;

use crate::domain::column::{cell_address, resolve};
use crate::domain::entities::record::{Company, FieldNames, HeaderList, Record, RowId};
use crate::domain::entities::update::{
    progress_percent, BatchSummary, CleaningRequest, UpdateResult,
};
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::model::ValueDeterminer;
use crate::usecase::ports::observer::BatchObserver;
use crate::usecase::ports::sheet::SheetWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    /// One entry per processed record, in input order.
    pub results: Vec<UpdateResult>,
    /// Set when a configuration error stopped the batch early.
    pub aborted: Option<PortError>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_results(self.total, &self.results, self.aborted.is_some())
    }
}

/// Runs a natural-language cleaning request over records one at a time and
/// writes each non-empty answer back to its cell.
pub struct CleaningService {
    sheet: Arc<dyn SheetWriter>,
    model: Arc<dyn ValueDeterminer>,
    fields: FieldNames,
}

impl CleaningService {
    pub fn new(
        sheet: Arc<dyn SheetWriter>,
        model: Arc<dyn ValueDeterminer>,
        fields: FieldNames,
    ) -> Self {
        Self {
            sheet,
            model,
            fields,
        }
    }

    /// Row N+1 is not asked about until row N's write (or skip) has returned.
    /// Only [`PortError::ConfigurationMissing`] stops the loop; every other
    /// failure becomes an error result for its row. The outer `Err` is only
    /// for a request rejected before any row is touched.
    pub fn run(
        &self,
        headers: &HeaderList,
        records: &[Record],
        request: &CleaningRequest,
        observer: &mut dyn BatchObserver,
    ) -> Result<BatchReport, PortError> {
        request.validate().map_err(PortError::InvalidInput)?;

        let total = records.len();
        let mut results = Vec::with_capacity(total);
        let mut aborted = None;

        for (index, record) in records.iter().enumerate() {
            observer.row_started(index, total, record);
            let view = Company::new(record, &self.fields);
            let company = view.name().to_string();
            let row = view.row();

            let outcome = self
                .model
                .determine_value(request, record, headers)
                .and_then(|value| {
                    let value = value.trim();
                    if value.is_empty() {
                        return Ok(None);
                    }
                    self.write_back(headers, row, &request.target_column, value)?;
                    Ok(Some(value.to_string()))
                });

            let result = match outcome {
                Ok(Some(value)) => UpdateResult::written(&company, row, value),
                Ok(None) => UpdateResult::not_found(&company, row),
                Err(err) if err.is_fatal() => {
                    let result = UpdateResult::failed(&company, row, err.to_string());
                    observer.batch_aborted(&result, &err);
                    results.push(result);
                    aborted = Some(err);
                    break;
                }
                Err(err) => UpdateResult::failed(&company, row, err.to_string()),
            };

            observer.row_finished(&result, progress_percent(index + 1, total));
            results.push(result);
        }

        let report = BatchReport {
            total,
            results,
            aborted,
        };
        observer.batch_finished(&report.summary());
        Ok(report)
    }

    fn write_back(
        &self,
        headers: &HeaderList,
        row: RowId,
        column: &str,
        value: &str,
    ) -> Result<(), PortError> {
        let column_idx = resolve(column, headers)?;
        let address = cell_address(self.sheet.sheet_name(), column_idx, row);
        self.sheet.write_cell(&address, value)
    }
}
