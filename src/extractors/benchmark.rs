// src/extractors/benchmark.rs
use crate::document::{Document, Query};
use crate::record::NA;
use crate::utils::error::ExtractError;

const BENCHMARK_LABEL: &str = "Fund benchmark";

/// Value cell paired with the "Fund benchmark" header cell. The value has to
/// be a data cell; a row of headers carries no value.
pub fn extract_benchmark(doc: &Document) -> Result<String, ExtractError> {
    for table in doc.find_all(&Query::tag("table")?.containing(BENCHMARK_LABEL)) {
        for row in table.rows() {
            let cells = row.cells();
            let Some(label_idx) = cells
                .iter()
                .position(|c| c.is_header && c.text().contains(BENCHMARK_LABEL))
                .or_else(|| cells.first().filter(|c| c.text().contains(BENCHMARK_LABEL)).map(|_| 0))
            else {
                continue;
            };
            match cells.get(label_idx + 1) {
                Some(value) if !value.is_header => return Ok(value.text()),
                _ => continue,
            }
        }
    }
    Ok(NA.to_string())
}
