use std::cmp::Ordering;

use crate::domain::entities::dataset::{RecordQuery, SortDirection, SortSpec};
use crate::domain::entities::record::Record;

/// Case-insensitive substring match over every cell. An empty term keeps all.
pub fn filter_records(records: &[Record], term: &str) -> Vec<Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            record
                .values()
                .values()
                .any(|value| value.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Stable sort on one column.
pub fn sort_records(records: &mut [Record], spec: &SortSpec) {
    records.sort_by(|a, b| {
        let ordering = compare_cells(a.get(&spec.column), b.get(&spec.column));
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn apply_query(records: &[Record], query: &RecordQuery) -> Vec<Record> {
    let mut selected = filter_records(records, &query.global_search);
    if let Some(spec) = &query.sort {
        sort_records(&mut selected, spec);
    }
    selected
}



/// Total order over mixed columns: every number sorts before every text
/// cell, numbers compare numerically and text case-insensitively.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_numeric_value(a), parse_numeric_value(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// `$1,250`, `12M`, `500+` and plain numbers. Blank is not a number.
pub fn parse_numeric_value(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '+' | 'M' | 'm') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
