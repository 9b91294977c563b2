// src/record.rs
//! The fixed-schema fund profile produced once per page.

use serde::Serialize;

/// Placeholder for "looked for, not found".
pub const NA: &str = "NA";

/// Periods always emitted, whatever the returns table lists.
pub const CANONICAL_PERIODS: [&str; 4] = ["1Y", "3Y", "5Y", "All"];

/// Returns-table values for one canonical period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodReturns {
    pub fund_return: String,
    pub category_avg: String,
    pub rank: String,
}

impl Default for PeriodReturns {
    fn default() -> Self {
        Self { fund_return: NA.to_string(), category_avg: NA.to_string(), rank: NA.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ratios {
    pub pe: String,
    pub pb: String,
    pub alpha: String,
    pub beta: String,
    pub sharpe: String,
    pub sortino: String,
}

impl Default for Ratios {
    fn default() -> Self {
        Self {
            pe: NA.to_string(),
            pb: NA.to_string(),
            alpha: NA.to_string(),
            beta: NA.to_string(),
            sharpe: NA.to_string(),
            sortino: NA.to_string(),
        }
    }
}

/// One fund's complete profile. Every field is always populated; misses are
/// `NA`, except `fund_managers` whose empty roster is `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundRecord {
    pub fund_name: String,
    pub fund_type: String,
    pub aum: String,
    pub expense_ratio: String,
    pub exit_load: String,
    pub benchmark: String,
    /// Indexed like `CANONICAL_PERIODS`.
    pub periods: [PeriodReturns; 4],
    pub ratios: Ratios,
    pub fund_managers: String,
    pub url: String,
}

impl FundRecord {
    /// An all-`NA` record for `url`.
    pub fn empty(url: &str) -> Self {
        Self {
            fund_name: NA.to_string(),
            fund_type: NA.to_string(),
            aum: NA.to_string(),
            expense_ratio: NA.to_string(),
            exit_load: NA.to_string(),
            benchmark: NA.to_string(),
            periods: Default::default(),
            ratios: Ratios::default(),
            fund_managers: String::new(),
            url: url.to_string(),
        }
    }

    pub fn value(&self, column: Column) -> &str {
        match column {
            Column::FundName => &self.fund_name,
            Column::FundType => &self.fund_type,
            Column::Aum => &self.aum,
            Column::FundReturn(i) => &self.periods[i].fund_return,
            Column::CategoryAvg(i) => &self.periods[i].category_avg,
            Column::Rank(i) => &self.periods[i].rank,
            Column::PeRatio => &self.ratios.pe,
            Column::PbRatio => &self.ratios.pb,
            Column::Alpha => &self.ratios.alpha,
            Column::Beta => &self.ratios.beta,
            Column::Sharpe => &self.ratios.sharpe,
            Column::Sortino => &self.ratios.sortino,
            Column::ExpenseRatio => &self.expense_ratio,
            Column::ExitLoad => &self.exit_load,
            Column::Benchmark => &self.benchmark,
            Column::FundManagers => &self.fund_managers,
            Column::Url => &self.url,
        }
    }

    /// Cell values in `COLUMNS` order.
    pub fn row(&self) -> Vec<&str> {
        COLUMNS.iter().map(|c| self.value(*c)).collect()
    }
}

/// A column of the exported table. Period columns carry their index into
/// `CANONICAL_PERIODS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    FundName,
    FundType,
    Aum,
    FundReturn(usize),
    CategoryAvg(usize),
    Rank(usize),
    PeRatio,
    PbRatio,
    Alpha,
    Beta,
    Sharpe,
    Sortino,
    ExpenseRatio,
    ExitLoad,
    Benchmark,
    FundManagers,
    Url,
}

/// Export order.
pub const COLUMNS: [Column; 26] = [
    Column::FundName,
    Column::FundType,
    Column::Aum,
    Column::FundReturn(0),
    Column::CategoryAvg(0),
    Column::Rank(0),
    Column::FundReturn(1),
    Column::CategoryAvg(1),
    Column::Rank(1),
    Column::FundReturn(2),
    Column::CategoryAvg(2),
    Column::Rank(2),
    Column::FundReturn(3),
    Column::CategoryAvg(3),
    Column::Rank(3),
    Column::PeRatio,
    Column::PbRatio,
    Column::Alpha,
    Column::Beta,
    Column::Sharpe,
    Column::Sortino,
    Column::ExpenseRatio,
    Column::ExitLoad,
    Column::Benchmark,
    Column::FundManagers,
    Column::Url,
];

impl Column {
    pub fn header(&self) -> String {
        match self {
            Column::FundName => "Fund Name".to_string(),
            Column::FundType => "Fund Type".to_string(),
            Column::Aum => "AUM".to_string(),
            Column::FundReturn(i) => format!("{} Fund Return", CANONICAL_PERIODS[*i]),
            Column::CategoryAvg(i) => format!("{} Category Avg", CANONICAL_PERIODS[*i]),
            Column::Rank(i) => format!("{} Rank", CANONICAL_PERIODS[*i]),
            Column::PeRatio => "P/E Ratio".to_string(),
            Column::PbRatio => "P/B Ratio".to_string(),
            Column::Alpha => "Alpha".to_string(),
            Column::Beta => "Beta".to_string(),
            Column::Sharpe => "Sharpe".to_string(),
            Column::Sortino => "Sortino".to_string(),
            Column::ExpenseRatio => "Expense Ratio".to_string(),
            Column::ExitLoad => "Exit Load".to_string(),
            Column::Benchmark => "Benchmark".to_string(),
            Column::FundManagers => "Fund Managers".to_string(),
            Column::Url => "URL".to_string(),
        }
    }
}

pub fn headers() -> Vec<String> {
    COLUMNS.iter().map(Column::header).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_fully_populated() {
        let record = FundRecord::empty("https://example.com/f");
        for column in COLUMNS {
            let value = record.value(column);
            match column {
                Column::FundManagers => assert_eq!(value, ""),
                Column::Url => assert_eq!(value, "https://example.com/f"),
                _ => assert_eq!(value, NA, "column {}", column.header()),
            }
        }
    }

    #[test]
    fn headers_follow_export_order() {
        let headers = headers();
        assert_eq!(headers.len(), COLUMNS.len());
        assert_eq!(&headers[..4], ["Fund Name", "Fund Type", "AUM", "1Y Fund Return"]);
        assert_eq!(headers[14], "All Rank");
        assert_eq!(headers.last().map(String::as_str), Some("URL"));
    }
}
