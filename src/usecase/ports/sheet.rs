use crate::domain::entities::record::RowId;
use crate::usecase::ports::error::PortError;

/// Read side of a spreadsheet tab.
pub trait SheetSource: Send + Sync {
    fn sheet_name(&self) -> &str;

    /// The whole tab, header row first. Never cached.
    fn read_rows(&self) -> Result<Vec<Vec<String>>, PortError>;
}

/// Write side. Each call is one request; nothing is batched.
pub trait SheetWriter: SheetSource {
    fn write_cell(&self, address: &str, value: &str) -> Result<(), PortError>;

    /// Appends after the last row of the table and returns the row it landed on.
    fn append_row(&self, row: &[String]) -> Result<RowId, PortError>;
}
