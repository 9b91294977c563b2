// src/extractors/expense.rs
use crate::config::SelectorConfig;
use crate::document::{Document, Query};
use crate::record::NA;
use crate::utils::error::ExtractError;

const EXPENSE_LABEL: &str = "Expense Ratio";
const EXIT_LOAD_LABEL: &str = "Exit load";
const GST_NOTE: &str = "Inclusive of GST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseAndLoad {
    pub expense_ratio: String,
    pub exit_load: String,
}

/// Scans the heading blocks. The expense ratio and the exit load are looked
/// up independently, so different blocks may supply each.
pub fn extract_expense_and_load(
    doc: &Document,
    selectors: &SelectorConfig,
) -> Result<ExpenseAndLoad, ExtractError> {
    let blocks = doc.find_all(&Query::new(None, &selectors.heading_block)?);
    let exit_heading = Query::tag("h3")?.containing(EXIT_LOAD_LABEL);

    let mut expense_ratio = None;
    let mut exit_load = None;

    for block in &blocks {
        if expense_ratio.is_none() {
            let text = block.text();
            if text.contains(EXPENSE_LABEL) {
                if let Some((_, value)) = text.split_once(':') {
                    expense_ratio = Some(value.replace(GST_NOTE, "").trim().to_string());
                }
            }
        }

        if exit_load.is_none() {
            exit_load = block
                .find_first(&exit_heading)
                .and_then(|heading| heading.next_siblings().find(|el| el.tag() == "p"))
                .map(|p| p.text().trim().to_string());
        }
    }

    Ok(ExpenseAndLoad {
        expense_ratio: expense_ratio.unwrap_or_else(|| NA.to_string()),
        exit_load: exit_load.unwrap_or_else(|| NA.to_string()),
    })
}
