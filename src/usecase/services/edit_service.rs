use std::sync::Arc;

use crate::domain::column::{cell_address, resolve};
use crate::domain::entities::edit::{CellEdit, NewCompany};
use crate::domain::entities::record::{FieldNames, HeaderList, Record, RowId};
use crate::domain::mapper::serialize;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::SheetWriter;

pub struct EditService {
    sheet: Arc<dyn SheetWriter>,
    fields: FieldNames,
}

impl EditService {
    pub fn new(sheet: Arc<dyn SheetWriter>, fields: FieldNames) -> Self {
        Self { sheet, fields }
    }

    /// Appends a company in header order. Fields naming unknown headers are
    /// rejected rather than dropped.
    pub fn add_company(
        &self,
        headers: &HeaderList,
        company: NewCompany,
    ) -> Result<Record, PortError> {
        if headers.is_empty() {
            return Err(PortError::InvalidInput(
                "the sheet has no header row to append under".to_string(),
            ));
        }
        let name = company
            .fields
            .get(&self.fields.name)
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        if name.is_empty() {
            return Err(PortError::InvalidInput(format!(
                "\"{}\" is required",
                self.fields.name
            )));
        }
        for header in company.fields.keys() {
            resolve(header, headers)?;
        }

        let draft = Record::new(RowId(0), company.fields);
        let row = serialize(&draft, headers);
        let row_id = self.sheet.append_row(&row)?;
        log::info!("appended {name:?} at row {row_id}");

        Ok(Record::new(row_id, draft.values().clone()))
    }

    /// Writes one cell and returns its address.
    pub fn update_cell(&self, headers: &HeaderList, edit: &CellEdit) -> Result<String, PortError> {
        let column_idx = resolve(&edit.column, headers)?;
        let address = cell_address(self.sheet.sheet_name(), column_idx, edit.row);
        self.sheet.write_cell(&address, &edit.value)?;
        log::info!("updated {address}");
        Ok(address)
    }
}
