//! Column-name resolution and A1 cell addressing.

use std::fmt;

use crate::domain::entities::record::{HeaderList, RowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNotFound(pub String);

impl fmt::Display for ColumnNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column \"{}\" not found.", self.0)
    }
}

impl std::error::Error for ColumnNotFound {}

pub fn resolve(column_name: &str, headers: &HeaderList) -> Result<usize, ColumnNotFound> {
    headers
        .position(column_name)
        .ok_or_else(|| ColumnNotFound(column_name.to_string()))
}

/// Bijective base-26: 0 -> A, 25 -> Z, 26 -> AA, 701 -> ZZ, 702 -> AAA.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inverse of [`column_letter`]. `None` for anything that is not all ASCII
/// letters.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let mut n = 0usize;
    for b in letters.bytes() {
        let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    Some(n - 1)
}

pub fn cell_address(sheet_name: &str, column_index: usize, row: RowId) -> String {
    format!("{sheet_name}!{}{row}", column_letter(column_index))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub sheet_name: String,
    pub column: usize,
    pub row: RowId,
}

/// Parses `Sheet!B7` (sheet names may be single-quoted).
pub fn parse_cell_address(address: &str) -> Option<CellRef> {
    let (sheet, cell) = address.rsplit_once('!')?;
    let sheet_name = unquote_sheet(sheet);
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    let column = column_index(letters)?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(CellRef {
        sheet_name,
        column,
        row: RowId(row),
    })
}

/// Row number from an append response range such as `'Company List'!A82:K82`.
pub fn row_from_updated_range(range: &str) -> Option<RowId> {
    let cells = range.rsplit_once('!').map(|(_, cells)| cells).unwrap_or(range);
    let first = cells.split(':').next()?;
    let digits: String = first.chars().skip_while(|c| !c.is_ascii_digit()).collect();
    let row: u32 = digits.parse().ok()?;
    (row > 0).then_some(RowId(row))
}

fn unquote_sheet(sheet: &str) -> String {
    sheet
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .map(|inner| inner.replace("''", "'"))
        .unwrap_or_else(|| sheet.to_string())
}
