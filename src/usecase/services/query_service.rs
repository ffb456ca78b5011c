use std::sync::Arc;

use crate::domain::column::resolve;
use crate::domain::entities::dataset::RecordQuery;
use crate::domain::entities::record::{FieldNames, SheetSnapshot};
use crate::domain::mapper;
use crate::domain::query::apply_query;
use crate::domain::summary::{summarize, DashboardSummary};
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::SheetSource;

pub struct QueryService {
    source: Arc<dyn SheetSource>,
    fields: FieldNames,
}

impl QueryService {
    pub fn new(source: Arc<dyn SheetSource>, fields: FieldNames) -> Self {
        Self { source, fields }
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    /// Fresh read of the whole tab. A sheet with headers but without the
    /// configured name column is rejected.
    pub fn load(&self) -> Result<SheetSnapshot, PortError> {
        let rows = self.source.read_rows()?;
        let snapshot = mapper::parse(&rows, &self.fields.name);
        if !snapshot.headers.is_empty() {
            resolve(&self.fields.name, &snapshot.headers)?;
        }
        log::debug!(
            "loaded {} records from {} sheet rows of {}",
            snapshot.records.len(),
            rows.len().saturating_sub(1),
            self.source.sheet_name()
        );
        Ok(snapshot)
    }

    pub fn query(&self, query: &RecordQuery) -> Result<SheetSnapshot, PortError> {
        let snapshot = self.load()?;
        let records = apply_query(&snapshot.records, query);
        Ok(SheetSnapshot {
            headers: snapshot.headers,
            records,
        })
    }

    pub fn summary(&self, snapshot: &SheetSnapshot) -> DashboardSummary {
        summarize(&snapshot.records, &self.fields)
    }
}
