// src/extractors/managers.rs
use crate::config::SelectorConfig;
use crate::document::{Document, Query};
use crate::utils::error::ExtractError;

const UNKNOWN: &str = "Unknown";

/// Manager roster flattened to `"name (tenure), name (tenure)"` in document
/// order. No cards gives an empty string.
pub fn extract_managers(doc: &Document, selectors: &SelectorConfig) -> Result<String, ExtractError> {
    let card = Query::new(Some("div"), &selectors.manager_card)?;
    let name = Query::new(Some("div"), &selectors.manager_name)?;
    let tenure = Query::new(Some("div"), &selectors.manager_tenure)?;

    let entries: Vec<String> = doc
        .find_all(&card)
        .into_iter()
        .map(|card| {
            let read = |q: &Query| {
                card.find_first(q)
                    .map(|el| el.text().trim().to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string())
            };
            format!("{} ({})", read(&name), read(&tenure))
        })
        .collect();

    Ok(entries.join(", "))
}
