pub mod error;
pub mod fetcher;
pub mod page;
pub mod pagespeed;

pub use error::ScanError;
pub use fetcher::{PageFetcher, PageSource};
pub use page::PageData;
pub use pagespeed::{CoreWebVitals, PageSpeedClient, PageSpeedReport, Strategy};
