use crate::domain::entities::record::{HeaderList, Record};
use crate::domain::entities::update::CleaningRequest;
use crate::usecase::ports::error::PortError;

/// Proposes the new value of the target column for one record. An empty
/// string means nothing was found.
pub trait ValueDeterminer: Send + Sync {
    fn determine_value(
        &self,
        request: &CleaningRequest,
        record: &Record,
        headers: &HeaderList,
    ) -> Result<String, PortError>;
}

impl<F> ValueDeterminer for F
where
    F: Fn(&CleaningRequest, &Record, &HeaderList) -> Result<String, PortError> + Send + Sync,
{
    fn determine_value(
        &self,
        request: &CleaningRequest,
        record: &Record,
        headers: &HeaderList,
    ) -> Result<String, PortError> {
        self(request, record, headers)
    }
}

pub trait InsightGenerator: Send + Sync {
    /// `company_data` is a JSON array of company objects.
    fn generate_insights(&self, company_data: &str) -> Result<String, PortError>;
}
