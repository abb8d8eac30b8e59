pub mod aggregate;
pub mod analyzers;
pub mod audit;
pub mod classify;
pub mod error;
pub mod model;
pub mod report;
pub mod request;
pub mod router;
pub mod scoring;

pub use analyzers::{Analyzer, AnalyzerRegistry, PageView};
pub use audit::{AuditConfig, ProgressCallback, SmartAudit};
pub use error::{AnalyzeError, AuditError, ReportError};
pub use model::{
    AuditMapping, AuditProgress, AuditReport, Category, CategoryResult, Check, CheckStatus, Grade,
    PageType, Priority, Recommendation,
};
pub use request::AuditRequest;
