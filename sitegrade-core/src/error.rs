use sitegrade_scanner::ScanError;
use thiserror::Error;

/// Failure of a single analyzer on a single page.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("unexpected page structure: {0}")]
    Structure(String),

    #[error("analyzer panicked: {0}")]
    Panicked(String),

    #[error("no analyzer registered for {0}")]
    Missing(String),
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("No valid URLs to audit")]
    NoValidUrls,

    #[error("All {0} page(s) failed to load")]
    AllPagesFailed(usize),

    #[error("Invalid audit request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure while rendering a finished report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV rendering failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
