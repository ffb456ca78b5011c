use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::entities::record::{HeaderList, Record};
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::model::InsightGenerator;

pub struct InsightService {
    model: Arc<dyn InsightGenerator>,
}

impl InsightService {
    pub fn new(model: Arc<dyn InsightGenerator>) -> Self {
        Self { model }
    }

    pub fn generate(&self, headers: &HeaderList, records: &[Record]) -> Result<String, PortError> {
        if records.is_empty() {
            return Err(PortError::InvalidInput(
                "there is no company data to analyze".to_string(),
            ));
        }
        let payload = company_data_json(headers, records)?;
        log::debug!("requesting insights for {} companies", records.len());
        self.model.generate_insights(&payload)
    }
}

/// JSON array of `{ "id": <row>, <header>: <value>, ... }`.
pub fn company_data_json(headers: &HeaderList, records: &[Record]) -> Result<String, PortError> {
    let companies: Vec<Value> = records
        .iter()
        .map(|record| {
            let mut object = Map::new();
            object.insert("id".to_string(), Value::from(record.row().0));
            for (_, header) in headers.named_columns() {
                object.insert(
                    header.to_string(),
                    Value::String(record.get(header).to_string()),
                );
            }
            Value::Object(object)
        })
        .collect();
    serde_json::to_string(&companies).map_err(|err| PortError::Parse(err.to_string()))
}
