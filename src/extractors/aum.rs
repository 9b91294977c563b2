// src/extractors/aum.rs
//! Fund size (AUM). The figure shows up either in a peer comparison table,
//! where the row has to be matched against this fund's name, or as loose
//! labelled text somewhere else on the page.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{Document, Element, Query};
use crate::record::NA;
use crate::utils::error::ExtractError;
use crate::utils::text::{contains_ci, has_digit, names_overlap};

const FUND_SIZE_LABEL: &str = "fund size";

// Optional currency, digits with thousands separators and decimals, then "Cr".
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[₹$]?\s*(\d[\d,]*(?:\.\d+)?)\s*cr")
        .expect("Failed to compile AMOUNT_RE")
});

/// One way of locating the fund size. Strategies are tried in order.
pub trait AumStrategy {
    fn name(&self) -> &'static str;
    fn extract(&self, doc: &Document, fund_name: &str) -> Result<Option<String>, ExtractError>;
}

/// Comparison-table lookup: the row whose label overlaps the fund name,
/// read at the "Fund Size" column.
pub struct TableStrategy;

impl AumStrategy for TableStrategy {
    fn name(&self) -> &'static str { "table" }

    fn extract(&self, doc: &Document, fund_name: &str) -> Result<Option<String>, ExtractError> {
        if fund_name == NA {
            return Ok(None);
        }
        let Some(table) = doc.find_first(&Query::tag("table")?.containing_ci(FUND_SIZE_LABEL)) else {
            return Ok(None);
        };

        let rows = table.rows();
        let Some((header_idx, column)) = locate_size_column(&rows) else {
            tracing::debug!("Fund size table has no '{}' header column", FUND_SIZE_LABEL);
            return Ok(None);
        };

        for row in &rows[header_idx + 1..] {
            let cells = row.cells();
            let Some(label) = cells.first() else { continue };
            if !names_overlap(&label.text(), fund_name) {
                continue;
            }
            if let Some(cell) = cells.get(column) {
                let value = cell.text();
                if has_digit(&value) {
                    return Ok(Some(value));
                }
                tracing::debug!("Matched fund size row but cell '{}' has no digits", value);
            }
        }
        Ok(None)
    }
}

/// First row with a cell mentioning the label, and that cell's index.
fn locate_size_column(rows: &[Element<'_>]) -> Option<(usize, usize)> {
    rows.iter().enumerate().find_map(|(row_idx, row)| {
        row.cells()
            .iter()
            .position(|cell| contains_ci(&cell.text(), FUND_SIZE_LABEL))
            .map(|col| (row_idx, col))
    })
}

/// Free-text scan: elements labelled "fund size", then their parent, searched
/// for an amount in crores. Returns the bare number text.
pub struct TextScanStrategy;

impl AumStrategy for TextScanStrategy {
    fn name(&self) -> &'static str { "text-scan" }

    fn extract(&self, doc: &Document, _fund_name: &str) -> Result<Option<String>, ExtractError> {
        let labelled = Query::new(None, "")?.owning_ci(FUND_SIZE_LABEL);
        for el in doc.find_all(&labelled) {
            let mut candidates = vec![el.text(), el.inner_html()];
            if let Some(parent) = el.parent() {
                candidates.push(parent.text());
                candidates.push(parent.inner_html());
            }
            for candidate in &candidates {
                if let Some(caps) = AMOUNT_RE.captures(candidate) {
                    let amount = caps[1].trim().to_string();
                    tracing::debug!("Fund size '{}' found near <{}>", amount, el.tag());
                    return Ok(Some(amount));
                }
            }
        }
        Ok(None)
    }
}

pub fn default_strategies() -> Vec<Box<dyn AumStrategy>> {
    vec![Box::new(TableStrategy), Box::new(TextScanStrategy)]
}

/// Runs the strategies in order; the first hit wins, otherwise `NA`.
pub fn extract_aum(doc: &Document, fund_name: &str) -> Result<String, ExtractError> {
    for strategy in default_strategies() {
        if let Some(value) = strategy.extract(doc, fund_name)? {
            tracing::debug!("AUM resolved by {} strategy", strategy.name());
            return Ok(value);
        }
    }
    Ok(NA.to_string())
}
