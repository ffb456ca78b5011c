use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::column::parse_cell_address;
use crate::domain::entities::record::RowId;
use crate::domain::mapper::is_blank_row;
use crate::infra::import::csv::{parse_csv_text, write_csv_text};
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::{SheetSource, SheetWriter};

/// A sheet tab kept in a local CSV file, addressed exactly like the
/// remote one (header in row 1, letter columns).
pub struct CsvFileSheet {
    path: PathBuf,
    sheet_name: String,
}

impl CsvFileSheet {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read csv: {}", self.path.display()))?;
        Ok(parse_csv_text(&text))
    }

    fn store(&self, rows: &[Vec<String>]) -> Result<()> {
        let text = write_csv_text(rows)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("failed to write csv: {}", self.path.display()))
    }
}

fn external(err: anyhow::Error) -> PortError {
    PortError::External(format!("{err:#}"))
}

impl SheetSource for CsvFileSheet {
    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>, PortError> {
        self.load().map_err(external)
    }
}

impl SheetWriter for CsvFileSheet {
    fn write_cell(&self, address: &str, value: &str) -> Result<(), PortError> {
        let cell = parse_cell_address(address)
            .ok_or_else(|| PortError::InvalidInput(format!("invalid cell address {address:?}")))?;
        if cell.sheet_name != self.sheet_name {
            return Err(PortError::InvalidInput(format!(
                "Could not find sheet named \"{}\".",
                cell.sheet_name
            )));
        }

        let mut rows = self.load().map_err(external)?;
        let row_idx = cell.row.0 as usize - 1;
        if rows.len() <= row_idx {
            rows.resize_with(row_idx + 1, Vec::new);
        }
        let row = &mut rows[row_idx];
        if row.len() <= cell.column {
            row.resize(cell.column + 1, String::new());
        }
        row[cell.column] = value.to_string();

        self.store(&rows).map_err(external)
    }

    fn append_row(&self, row: &[String]) -> Result<RowId, PortError> {
        let mut rows = self.load().map_err(external)?;
        while rows.last().is_some_and(|last| is_blank_row(last)) {
            rows.pop();
        }
        rows.push(row.to_vec());
        self.store(&rows).map_err(external)?;
        Ok(RowId(rows.len() as u32))
    }
}
