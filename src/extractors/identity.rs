// src/extractors/identity.rs
use crate::config::SelectorConfig;
use crate::document::{Document, Query};
use crate::record::NA;
use crate::utils::error::ExtractError;

/// Fund name: the live-rendered heading text if the bounded wait produced
/// one, otherwise the static `h1` carrying the same class, otherwise `NA`.
pub fn extract_fund_name(
    doc: &Document,
    live_name: Option<&str>,
    selectors: &SelectorConfig,
) -> Result<String, ExtractError> {
    if let Some(name) = live_name.map(str::trim).filter(|n| !n.is_empty()) {
        tracing::debug!("Fund name from live element: '{}'", name);
        return Ok(name.to_string());
    }

    let heading = Query::new(Some("h1"), &selectors.scheme_name)?;
    let name = doc
        .find_first(&heading)
        .map(|el| el.text().trim().to_string())
        .filter(|n| !n.is_empty());

    match name {
        Some(name) => {
            tracing::debug!("Fund name from static heading: '{}'", name);
            Ok(name)
        }
        None => Ok(NA.to_string()),
    }
}

/// Fund type is the second category pill; the first is the asset tier.
pub fn extract_fund_type(doc: &Document, selectors: &SelectorConfig) -> Result<String, ExtractError> {
    let pills = doc.find_all(&Query::new(Some("div"), &selectors.type_pills)?);
    Ok(pills
        .get(1)
        .map(|el| el.text().trim().to_string())
        .unwrap_or_else(|| NA.to_string()))
}
