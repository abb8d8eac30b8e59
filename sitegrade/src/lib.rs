// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    base_url_of, expand_output_path, load_request, load_urls_from_file, load_urls_from_source,
    parse_url_line, report_format,
};
