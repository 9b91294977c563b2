// src/config.rs
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::Query;
use crate::utils::error::{AppError, ExtractError};

/// Class names the page layout is keyed on. Any subset can be overridden
/// from a JSON file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub scheme_name: String,
    pub type_pills: String,
    pub heading_block: String,
    pub manager_card: String,
    pub manager_name: String,
    pub manager_tenure: String,
    pub listing_link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            scheme_name: "mfh239SchemeName".to_string(),
            type_pills: "mfh239PillsContainer".to_string(),
            heading_block: "mf320Heading".to_string(),
            manager_card: "fm982CardText".to_string(),
            manager_name: "fm982PersonName".to_string(),
            manager_tenure: "contentSecondary".to_string(),
            listing_link: "pos-rel f22Link".to_string(),
        }
    }
}

impl SelectorConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid selector file {}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::info!("Loaded selector overrides from {}", path.display());
        Ok(config)
    }

    /// Compiles every class list once so a bad override fails at startup
    /// rather than degrading each page to `NA`.
    pub fn validate(&self) -> Result<(), ExtractError> {
        for classes in [
            &self.scheme_name,
            &self.type_pills,
            &self.heading_block,
            &self.manager_card,
            &self.manager_name,
            &self.manager_tenure,
            &self.listing_link,
        ] {
            Query::new(None, classes)?;
        }
        Ok(())
    }
}

/// Knobs for the scraping pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub workers: usize,
    pub identity_timeout: Duration,
    pub settle_interval: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub selectors: SelectorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            identity_timeout: Duration::from_secs(10),
            settle_interval: Duration::from_millis(1000),
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(1500),
            selectors: SelectorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config: SelectorConfig = serde_json::from_str(r#"{"manager_card": "cardX"}"#).unwrap();
        assert_eq!(config.manager_card, "cardX");
        assert_eq!(config.scheme_name, "mfh239SchemeName");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_class_fails_validation() {
        let config = SelectorConfig { heading_block: "9lives".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
    }
}
