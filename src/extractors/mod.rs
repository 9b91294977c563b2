// src/extractors/mod.rs
pub mod aum;
pub mod benchmark;
pub mod expense;
pub mod identity;
pub mod managers;
pub mod ratios;
pub mod returns;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::browser::RenderedPage;
use crate::config::SelectorConfig;
use crate::document::Document;
use crate::record::{FundRecord, Ratios, NA};
use crate::utils::error::ExtractError;

pub use expense::ExpenseAndLoad;

/// Runs every field extractor over one page, in a fixed order, and merges the
/// results into a single record.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    selectors: SelectorConfig,
}

impl RecordAssembler {
    pub fn new(selectors: SelectorConfig) -> Result<Self, ExtractError> {
        selectors.validate()?;
        Ok(Self { selectors })
    }

    /// Fails only when the page has no fund identity, or when parsing or
    /// assembly itself panics; every other miss degrades to the field's
    /// default.
    pub fn assemble(&self, page: &RenderedPage) -> Result<FundRecord, ExtractError> {
        guard_item(&page.url, || self.assemble_fields(page))
    }

    fn assemble_fields(&self, page: &RenderedPage) -> Result<FundRecord, ExtractError> {
        let doc = Document::parse(&page.html);
        let url = page.url.as_str();
        let sel = &self.selectors;
        let mut record = FundRecord::empty(url);

        record.fund_name = isolated(url, "fund name", NA.to_string(), || {
            identity::extract_fund_name(&doc, page.live_name.as_deref(), sel)
        });
        if record.fund_name == NA {
            return Err(ExtractError::MissingIdentity(url.to_string()));
        }
        let fund_name = record.fund_name.as_str();

        record.fund_type = isolated(url, "fund type", NA.to_string(), || {
            identity::extract_fund_type(&doc, sel)
        });
        record.aum = isolated(url, "aum", NA.to_string(), || aum::extract_aum(&doc, fund_name));

        let expense = isolated(
            url,
            "expense",
            ExpenseAndLoad { expense_ratio: NA.to_string(), exit_load: NA.to_string() },
            || expense::extract_expense_and_load(&doc, sel),
        );
        record.expense_ratio = expense.expense_ratio;
        record.exit_load = expense.exit_load;

        record.benchmark = isolated(url, "benchmark", NA.to_string(), || benchmark::extract_benchmark(&doc));
        record.periods = isolated(url, "returns", Default::default(), || {
            returns::extract_returns(&doc, fund_name)
        });
        record.ratios = isolated(url, "ratios", Ratios::default(), || ratios::extract_ratios(&doc));
        record.fund_managers = isolated(url, "managers", String::new(), || {
            managers::extract_managers(&doc, sel)
        });

        tracing::debug!("Assembled record for '{}' ({})", record.fund_name, url);
        Ok(record)
    }
}

/// Fault boundary around one field group: an error or a panic inside it is
/// logged and replaced by `default`.
fn isolated<T, F>(url: &str, group: &str, default: T, extract: F) -> T
where
    F: FnOnce() -> Result<T, ExtractError>,
{
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::warn!("Extractor '{}' failed on {}: {}", group, url, e);
            default
        }
        Err(payload) => {
            tracing::warn!("Extractor '{}' panicked on {}: {}", group, url, panic_message(payload.as_ref()));
            default
        }
    }
}

/// Item boundary: a panic anywhere in `extract` fails this item only.
fn guard_item<T, F>(url: &str, extract: F) -> Result<T, ExtractError>
where
    F: FnOnce() -> Result<T, ExtractError>,
{
    panic::catch_unwind(AssertUnwindSafe(extract)).unwrap_or_else(|payload| {
        Err(ExtractError::Panicked { url: url.to_string(), message: panic_message(payload.as_ref()) })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
