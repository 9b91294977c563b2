// src/extractors/returns.rs
//! Trailing returns, category average and category rank per period.

use std::collections::HashMap;

use crate::document::{Document, Query};
use crate::record::{PeriodReturns, CANONICAL_PERIODS, NA};
use crate::utils::error::ExtractError;

const RANK_LABEL: &str = "Rank with in category";
const CATEGORY_LABEL: &str = "Category average";
const FUND_RETURNS_LABEL: &str = "Fund returns";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    FundReturn,
    CategoryAvg,
    Rank,
}

/// Row label to bucket. The fund's own row is sometimes labelled with the
/// fund name instead of "Fund returns".
fn classify(label: &str, fund_name: &str) -> Option<Bucket> {
    let label = label.trim();
    if label.eq_ignore_ascii_case(FUND_RETURNS_LABEL)
        || (fund_name != NA && label.eq_ignore_ascii_case(fund_name.trim()))
    {
        Some(Bucket::FundReturn)
    } else if label.eq_ignore_ascii_case(CATEGORY_LABEL) {
        Some(Bucket::CategoryAvg)
    } else if label.eq_ignore_ascii_case(RANK_LABEL) {
        Some(Bucket::Rank)
    } else {
        None
    }
}

/// Canonical label for a header cell, ignoring case and padding.
fn canonical_period(label: &str) -> Option<&'static str> {
    let label = label.trim();
    CANONICAL_PERIODS.iter().copied().find(|p| p.eq_ignore_ascii_case(label))
}

/// Values keyed by canonical period; other periods never get in.
#[derive(Debug, Default)]
struct PeriodTable {
    values: HashMap<&'static str, PeriodReturns>,
}

impl PeriodTable {
    fn record(&mut self, period: &'static str, bucket: Bucket, value: String) {
        let entry = self.values.entry(period).or_default();
        match bucket {
            Bucket::FundReturn => entry.fund_return = value,
            Bucket::CategoryAvg => entry.category_avg = value,
            Bucket::Rank => entry.rank = value,
        }
    }

    /// One entry per canonical period; gaps stay `NA`.
    fn into_canonical(mut self) -> [PeriodReturns; 4] {
        CANONICAL_PERIODS.map(|period| self.values.remove(period).unwrap_or_default())
    }
}

pub fn extract_returns(doc: &Document, fund_name: &str) -> Result<[PeriodReturns; 4], ExtractError> {
    let returns_table = Query::tag("table")?.containing_any(&[RANK_LABEL, CATEGORY_LABEL]);
    let Some(table) = doc.find_first(&returns_table) else {
        return Ok(Default::default());
    };

    let rows = table.rows();
    let (header, data_rows) = rows.split_first().ok_or_else(|| ExtractError::Malformed {
        group: "returns",
        detail: "returns table has no rows".to_string(),
    })?;

    // first column is the unlabelled row-label column
    let periods: Vec<Option<&'static str>> =
        header.cells().iter().skip(1).map(|c| canonical_period(&c.text())).collect();

    let mut table_values = PeriodTable::default();
    for row in data_rows {
        let cells = row.cells();
        let Some((label, values)) = cells.split_first() else { continue };
        let Some(bucket) = classify(&label.text(), fund_name) else { continue };
        for (period, cell) in periods.iter().zip(values) {
            if let Some(period) = *period {
                table_values.record(period, bucket, cell.text());
            }
        }
    }
    Ok(table_values.into_canonical())
}
