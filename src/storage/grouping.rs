// src/storage/grouping.rs
use std::collections::BTreeMap;

use crate::record::{FundRecord, NA};

pub const FALLBACK_GROUP: &str = "Others";
/// Workbook limit on sheet name length, in characters.
pub const SHEET_NAME_LIMIT: usize = 31;

const INVALID_SHEET_CHARS: [char; 7] = ['/', '\\', '?', '*', '[', ']', ':'];

/// Sheet name for a fund type: blank/`NA` types go to "Others", the name is
/// cut to the sheet limit and characters a workbook rejects become `-`.
pub fn sheet_name(fund_type: &str) -> String {
    let fund_type = fund_type.trim();
    let group = if fund_type.is_empty() || fund_type == NA { FALLBACK_GROUP } else { fund_type };
    group
        .chars()
        .take(SHEET_NAME_LIMIT)
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Records grouped by sheet name. Workbooks compare sheet names ignoring
/// case, so types that collapse to the same name in any case share a group
/// shown under the first-seen spelling; insertion order is kept within a group.
pub fn group_by_fund_type(records: Vec<FundRecord>) -> BTreeMap<String, Vec<FundRecord>> {
    let mut groups: BTreeMap<String, (String, Vec<FundRecord>)> = BTreeMap::new();
    for record in records {
        let name = sheet_name(&record.fund_type);
        groups
            .entry(name.to_lowercase())
            .or_insert_with(|| (name, Vec::new()))
            .1
            .push(record);
    }
    groups.into_values().collect()
}
