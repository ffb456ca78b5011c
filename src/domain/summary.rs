use std::collections::{BTreeMap, HashMap};

use crate::domain::entities::record::{Company, FieldNames, Record};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Counts per category value, most frequent first. Ties keep the order in
/// which the categories were first seen.
pub fn aggregate_by_category(records: &[Record], category_header: &str) -> Vec<(String, usize)> {
    count_categories(records.iter().map(|record| record.get(category_header)))
}

fn count_categories<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for value in values {
        let raw = value.trim();
        let category = if raw.is_empty() { UNCATEGORIZED } else { raw };
        match slots.get(category) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                slots.insert(category.to_string(), order.len());
                order.push((category.to_string(), 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// Counts records per bucket. Every bucket in `all` is present in the result,
/// including those with a zero count.
pub fn aggregate_by_bucket<B, F>(
    records: &[Record],
    value_header: &str,
    all: &[B],
    bucket_fn: F,
) -> BTreeMap<B, usize>
where
    B: Ord + Copy,
    F: Fn(&str) -> B,
{
    count_buckets(records.iter().map(|record| record.get(value_header)), all, bucket_fn)
}

fn count_buckets<'a, I, B, F>(values: I, all: &[B], bucket_fn: F) -> BTreeMap<B, usize>
where
    I: IntoIterator<Item = &'a str>,
    B: Ord + Copy,
    F: Fn(&str) -> B,
{
    let mut counts: BTreeMap<B, usize> = all.iter().map(|bucket| (*bucket, 0)).collect();
    for value in values {
        *counts.entry(bucket_fn(value)).or_insert(0) += 1;
    }
    counts
}

/// Buckets worth showing: zero counts are dropped, order is kept.
pub fn visible_buckets<B: Copy>(counts: &BTreeMap<B, usize>) -> Vec<(B, usize)> {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(bucket, count)| (*bucket, *count))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RevenueBucket {
    Under5M,
    From5To10M,
    From10To19M,
    From20To49M,
    Over50M,
    Unknown,
}

impl RevenueBucket {
    pub const ALL: [RevenueBucket; 6] = [
        RevenueBucket::Under5M,
        RevenueBucket::From5To10M,
        RevenueBucket::From10To19M,
        RevenueBucket::From20To49M,
        RevenueBucket::Over50M,
        RevenueBucket::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RevenueBucket::Under5M => "< $5M",
            RevenueBucket::From5To10M => "$5M - $10M",
            RevenueBucket::From10To19M => "$10M - $19M",
            RevenueBucket::From20To49M => "$20M - $49M",
            RevenueBucket::Over50M => "> $50M",
            RevenueBucket::Unknown => "Unknown",
        }
    }

    /// Classifies the raw revenue strings used in the sheet. Anything else,
    /// blanks included, is `Unknown`.
    pub fn classify(raw: &str) -> Self {
        match raw.trim() {
            "< $5M" => RevenueBucket::Under5M,
            "$5M-$9M" => RevenueBucket::From5To10M,
            "$10M-$19M" => RevenueBucket::From10To19M,
            "$20M-$49M" => RevenueBucket::From20To49M,
            ">$50M" => RevenueBucket::Over50M,
            _ => RevenueBucket::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: usize,
    pub by_category: Vec<(String, usize)>,
    pub by_revenue: BTreeMap<RevenueBucket, usize>,
}

pub fn summarize(records: &[Record], fields: &FieldNames) -> DashboardSummary {
    let companies: Vec<Company<'_>> = records
        .iter()
        .map(|record| Company::new(record, fields))
        .collect();
    DashboardSummary {
        total: companies.len(),
        by_category: count_categories(companies.iter().map(Company::category)),
        by_revenue: count_buckets(
            companies.iter().map(Company::revenue),
            &RevenueBucket::ALL,
            RevenueBucket::classify,
        ),
    }
}
