//! Conversion between raw sheet rows and header-keyed records.

use std::collections::BTreeMap;

use crate::domain::entities::record::{HeaderList, Record, RowId, SheetSnapshot};

/// Parses a full sheet range whose first row is the header row.
///
/// Blank rows are skipped, as are rows whose `name_column` cell is empty.
/// Skipping never renumbers: the k-th data row is always sheet row `k + 2`.
/// A `name_column` missing from the headers filters nothing; callers that
/// need the name column check for it with [`crate::domain::column::resolve`].
pub fn parse(raw_rows: &[Vec<String>], name_column: &str) -> SheetSnapshot {
    let Some((header_row, data_rows)) = raw_rows.split_first() else {
        return SheetSnapshot::default();
    };

    let headers = HeaderList::new(header_row);
    let name_idx = headers.position(name_column);

    let records = data_rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !is_blank_row(row))
        .filter(|(_, row)| name_idx.map_or(true, |idx| !cell(row, idx).trim().is_empty()))
        .map(|(index, row)| build_record(&headers, RowId::from_data_index(index), row))
        .collect();

    SheetSnapshot { headers, records }
}

pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|value| value.trim().is_empty())
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn build_record(headers: &HeaderList, row_id: RowId, row: &[String]) -> Record {
    let values = headers
        .named_columns()
        .map(|(idx, header)| (header.to_string(), cell(row, idx).to_string()))
        .collect::<BTreeMap<_, _>>();
    Record::new(row_id, values)
}

/// Row array in header order, for appends. Blank headers and headers the
/// record lacks become empty cells.
pub fn serialize(record: &Record, headers: &HeaderList) -> Vec<String> {
    headers
        .names()
        .iter()
        .map(|header| {
            if header.is_empty() {
                String::new()
            } else {
                record.get(header).to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect()
    }

    #[test]
    fn parse_skips_blank_rows_and_numbers_from_two() {
        let raw = rows(&[
            &["Company Name", "Ecosystem Category"],
            &["Acme", "Infra"],
            &["", ""],
        ]);

        let snapshot = parse(&raw, "Company Name");

        assert_eq!(snapshot.records.len(), 1);
        let acme = &snapshot.records[0];
        assert_eq!(acme.row(), RowId(2));
        assert_eq!(acme.get("Company Name"), "Acme");
        assert_eq!(acme.get("Ecosystem Category"), "Infra");
    }

    #[test]
    fn parse_keeps_row_numbers_after_skipped_rows() {
        let raw = rows(&[
            &["Company Name", "HQ"],
            &["Acme", "Austin"],
            &[],
            &["", "Nowhere"],
            &["Globex", "Boston"],
        ]);

        let snapshot = parse(&raw, "Company Name");

        let ids: Vec<RowId> = snapshot.records.iter().map(Record::row).collect();
        assert_eq!(ids, vec![RowId(2), RowId(5)]);
    }

    #[test]
    fn parse_fills_short_rows_with_empty_strings() {
        let raw = rows(&[&["Company Name", "HQ", "Revenue"], &["Acme"]]);

        let snapshot = parse(&raw, "Company Name");

        let acme = &snapshot.records[0];
        assert_eq!(acme.values().len(), 3);
        assert_eq!(acme.get("Revenue"), "");
    }

    #[test]
    fn parse_never_substitutes_another_column_for_the_name() {
        let raw = rows(&[&["Name", "HQ"], &["", "Austin"], &["Acme", "Boston"]]);

        let snapshot = parse(&raw, "Company Name");

        let ids: Vec<RowId> = snapshot.records.iter().map(Record::row).collect();
        assert_eq!(ids, vec![RowId(2), RowId(3)]);
        assert_eq!(snapshot.records[0].get("Company Name"), "");
    }

    #[test]
    fn parse_header_only_sheet_yields_no_records() {
        let raw = rows(&[&["Company Name"]]);
        let snapshot = parse(&raw, "Company Name");
        assert_eq!(snapshot.headers.names().len(), 1);
        assert!(snapshot.records.is_empty());

        assert_eq!(parse(&[], "Company Name"), SheetSnapshot::default());
    }

    #[test]
    fn serialize_reproduces_parsed_row() {
        let raw = rows(&[
            &["Company Name", "", "Funding/Investors"],
            &["Acme", "", "Seed"],
        ]);
        let snapshot = parse(&raw, "Company Name");

        let row = serialize(&snapshot.records[0], &snapshot.headers);

        assert_eq!(row, raw[1]);
    }
}
