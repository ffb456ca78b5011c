use std::collections::BTreeMap;

use crate::domain::entities::record::RowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub row: RowId,
    pub column: String,
    pub value: String,
}

/// Field values for a company that has not been appended yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCompany {
    pub fields: BTreeMap<String, String>,
}

impl NewCompany {
    /// Builds from `Header=Value` pairs. The first `=` splits; values may
    /// contain further `=` signs.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = BTreeMap::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let Some((header, value)) = assignment.split_once('=') else {
                return Err(format!("expected Header=Value, got {assignment:?}"));
            };
            let header = header.trim();
            if header.is_empty() {
                return Err(format!("empty header in {assignment:?}"));
            }
            fields.insert(header.to_string(), value.trim().to_string());
        }
        Ok(Self { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_assignments_splits_on_first_equals() {
        let company = NewCompany::from_assignments(["Company Name=Acme", "Notes=a=b"])
            .expect("assignments should parse");

        assert_eq!(company.fields.get("Company Name").map(String::as_str), Some("Acme"));
        assert_eq!(company.fields.get("Notes").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn from_assignments_rejects_missing_separator() {
        assert!(NewCompany::from_assignments(["Acme"]).is_err());
        assert!(NewCompany::from_assignments(["=Acme"]).is_err());
    }
}
