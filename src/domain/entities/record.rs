use std::collections::BTreeMap;
use std::fmt;

/// Sheet row 1 holds the headers, so the first data row is row 2.
pub const FIRST_DATA_ROW: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub u32);

impl RowId {
    pub fn from_data_index(index: usize) -> Self {
        RowId(index as u32 + FIRST_DATA_ROW)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered column names of the sheet. Position is the column index used for
/// write-back, so the order must match the live sheet exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    names: Vec<String>,
}

impl HeaderList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact, case-sensitive, first occurrence. Blank header cells are never
    /// addressable.
    pub fn position(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.names.iter().position(|candidate| candidate == name)
    }

    /// Non-blank headers with their column index, first occurrence only.
    pub fn named_columns(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .filter(move |(idx, name)| !name.is_empty() && self.position(name) == Some(*idx))
            .map(|(idx, name)| (idx, name.as_str()))
    }
}

/// One company row keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    row: RowId,
    values: BTreeMap<String, String>,
}

impl Record {
    pub fn new(row: RowId, values: BTreeMap<String, String>) -> Self {
        Self { row, values }
    }

    pub fn row(&self) -> RowId {
        self.row
    }

    pub fn get(&self, header: &str) -> &str {
        self.values.get(header).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

/// Header names of the columns the dashboard gives meaning to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub name: String,
    pub category: String,
    pub revenue: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "Company Name".to_string(),
            category: "Ecosystem Category".to_string(),
            revenue: "Est. Annual Revenue".to_string(),
        }
    }
}

/// Typed read-only view over a [`Record`].
#[derive(Debug, Clone, Copy)]
pub struct Company<'a> {
    record: &'a Record,
    fields: &'a FieldNames,
}

impl<'a> Company<'a> {
    pub fn new(record: &'a Record, fields: &'a FieldNames) -> Self {
        Self { record, fields }
    }

    pub fn row(&self) -> RowId {
        self.record.row()
    }

    pub fn name(&self) -> &'a str {
        self.record.get(&self.fields.name)
    }

    pub fn category(&self) -> &'a str {
        self.record.get(&self.fields.category)
    }

    pub fn revenue(&self) -> &'a str {
        self.record.get(&self.fields.revenue)
    }

}

/// Headers plus parsed records from a single fresh read of the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSnapshot {
    pub headers: HeaderList,
    pub records: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_list_trims_and_keeps_blank_cells() {
        let headers = HeaderList::new([" Company Name ", "", "Category"]);

        assert_eq!(headers.names(), ["Company Name", "", "Category"]);
        assert_eq!(headers.position("Category"), Some(2));
        assert_eq!(headers.position(""), None);
    }

    #[test]
    fn named_columns_skips_blank_and_duplicate_headers() {
        let headers = HeaderList::new(["A", "", "B", "A"]);

        let named: Vec<_> = headers.named_columns().collect();

        assert_eq!(named, vec![(0, "A"), (2, "B")]);
    }

    #[test]
    fn company_reads_configured_fields() {
        let fields = FieldNames {
            name: "Name".to_string(),
            category: "Sector".to_string(),
            revenue: "Revenue".to_string(),
        };
        let record = Record::new(
            RowId(7),
            [
                ("Name".to_string(), "Acme".to_string()),
                ("Sector".to_string(), "Payments".to_string()),
            ]
            .into_iter()
            .collect(),
        );

        let company = Company::new(&record, &fields);

        assert_eq!(company.row(), RowId(7));
        assert_eq!(company.name(), "Acme");
        assert_eq!(company.category(), "Payments");
        assert_eq!(company.revenue(), "");
    }

    #[test]
    fn record_get_defaults_to_empty_string() {
        let record = Record::new(RowId(2), BTreeMap::new());
        assert_eq!(record.get("Company Name"), "");
    }

    #[test]
    fn row_id_offsets_data_index_by_two() {
        assert_eq!(RowId::from_data_index(0), RowId(2));
        assert_eq!(RowId::from_data_index(41), RowId(43));
    }
}
