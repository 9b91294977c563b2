// src/extractors/ratios.rs
use crate::document::{Cell, Document, Query};
use crate::record::Ratios;
use crate::utils::error::ExtractError;

const PE_LABEL: &str = "P/E Ratio";
const PB_LABEL: &str = "P/B Ratio";

/// Valuation ratios (P/E, P/B) and risk statistics (Alpha, Beta, Sharpe,
/// Sortino). Each field defaults to `NA` on its own.
pub fn extract_ratios(doc: &Document) -> Result<Ratios, ExtractError> {
    let mut ratios = Ratios::default();

    if let Some(table) = doc.find_first(&Query::tag("table")?.containing(PE_LABEL)) {
        for row in table.rows() {
            let cells = row.cells();
            if cells.len() < 2 {
                continue;
            }
            let label = cells[0].text();
            if label.contains(PE_LABEL) {
                ratios.pe = cells[1].text();
            } else if label.contains(PB_LABEL) {
                ratios.pb = cells[1].text();
            }
        }
    }

    let risk = Query::tag("table")?.containing("Alpha").containing("Beta");
    if let Some(table) = doc.find_first(&risk) {
        for row in table.rows() {
            let Some((label, value)) = label_value_pair(&row.cells()) else { continue };
            let slot = if label.contains("Alpha") {
                &mut ratios.alpha
            } else if label.contains("Beta") {
                &mut ratios.beta
            } else if label.contains("Sharpe") {
                &mut ratios.sharpe
            } else if label.contains("Sortino") {
                &mut ratios.sortino
            } else {
                continue;
            };
            *slot = value;
        }
    }

    Ok(ratios)
}

/// A row's header cell and the data cell after it. Prefers a `th`, falling
/// back to the first cell. `None` when the next cell is another header.
fn label_value_pair(cells: &[Cell<'_>]) -> Option<(String, String)> {
    let label_idx = cells.iter().position(|c| c.is_header).unwrap_or(0);
    let value = cells.get(label_idx + 1).filter(|c| !c.is_header)?;
    Some((cells[label_idx].text(), value.text()))
}
