// src/storage/mod.rs
pub mod grouping;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use crate::pipeline::FailedItem;
use crate::record::{headers, FundRecord};
use crate::utils::error::StorageError;

pub use grouping::group_by_fund_type;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?; // Use map_err for cleaner conversion
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn debug_dir(&self) -> PathBuf {
        self.base_dir.join("debug")
    }

    /// Writes one sheet per group into a single workbook, header row first,
    /// columns in export order.
    pub fn save_workbook(
        &self,
        groups: &BTreeMap<String, Vec<FundRecord>>,
        timestamp: &str,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("mutual_funds_details_{}.xlsx", timestamp));
        let header_format = Format::new().set_bold();
        let headers = headers();

        let mut workbook = Workbook::new();
        for (name, records) in groups {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;

            for (col, header) in headers.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
            }
            for (row, record) in records.iter().enumerate() {
                for (col, value) in record.row().into_iter().enumerate() {
                    worksheet.write_string(row as u32 + 1, col as u16, value)?;
                }
            }
            tracing::debug!("Sheet '{}': {} rows", name, records.len());
        }
        workbook.save(&file_path)?;

        tracing::info!("Saved workbook to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the failed URLs with their reasons in JSON format
    pub fn save_failures(&self, failures: &[FailedItem], timestamp: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("failed_urls_{}.json", timestamp));

        let report = serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "count": failures.len(),
            "failures": failures,
        });

        let report_str = serde_json::to_string_pretty(&report)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, report_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved failure report to {}", file_path.display());

        Ok(file_path)
    }
}

/// `dd-mm-YYYY_HH-MM-SS` in local time, shared by every artifact of one run.
pub fn run_timestamp() -> String {
    chrono::Local::now().format("%d-%m-%Y_%H-%M-%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fund_extractor_{}_{}", tag, std::process::id()))
    }

    #[test]
    fn creates_base_dir() {
        let dir = scratch_dir("base");
        let storage = StorageManager::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.debug_dir(), dir.join("debug"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn writes_workbook_with_a_sheet_per_group() {
        let dir = scratch_dir("xlsx");
        let storage = StorageManager::new(&dir).unwrap();
        let mut a = FundRecord::empty("https://example.com/a");
        a.fund_name = "Fund A".to_string();
        a.fund_type = "Large Cap".to_string();
        let mut b = FundRecord::empty("https://example.com/b");
        b.fund_name = "Fund B".to_string();

        let groups = group_by_fund_type(vec![a, b]);
        let path = storage.save_workbook(&groups, "01-01-2026_00-00-00").unwrap();

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("mutual_funds_details_01-01-2026_00-00-00.xlsx"));
        let bytes = fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn case_variant_types_still_produce_a_workbook() {
        let dir = scratch_dir("xlsx_case");
        let storage = StorageManager::new(&dir).unwrap();
        let mut a = FundRecord::empty("https://example.com/a");
        a.fund_name = "Fund A".to_string();
        a.fund_type = "Large Cap".to_string();
        let mut b = FundRecord::empty("https://example.com/b");
        b.fund_name = "Fund B".to_string();
        b.fund_type = "Large cap".to_string();

        let groups = group_by_fund_type(vec![a, b]);
        assert_eq!(groups.len(), 1);
        let path = storage.save_workbook(&groups, "02-01-2026_00-00-00").unwrap();
        assert!(path.is_file());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn writes_failure_report() {
        let dir = scratch_dir("failures");
        let storage = StorageManager::new(&dir).unwrap();
        let failures = vec![FailedItem::new("https://example.com/x", "HTTP error 404")];
        let path = storage.save_failures(&failures, "ts").unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["failures"][0]["url"], "https://example.com/x");
        assert_eq!(parsed["failures"][0]["reason"], "HTTP error 404");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn timestamp_shape() {
        let ts = run_timestamp();
        assert_eq!(ts.len(), "dd-mm-YYYY_HH-MM-SS".len());
        assert_eq!(&ts[2..3], "-");
        assert_eq!(&ts[10..11], "_");
    }
}
