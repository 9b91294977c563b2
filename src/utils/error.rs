// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Could not start page session: {0}")]
    SessionStart(String),

    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Upstream rate limit likely exceeded for {0}")]
    RateLimited(String),

    #[error("No page is open in this session")]
    NoPage,

    #[error("Element probe failed: {0}")]
    Probe(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("Malformed structure in {group}: {detail}")]
    Malformed { group: &'static str, detail: String },

    #[error("Fund name not found on {0}")]
    MissingIdentity(String),

    #[error("Extraction panicked on {url}: {message}")]
    Panicked { url: String, message: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Page rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
