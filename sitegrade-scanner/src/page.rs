use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fetched page. Created once by the fetcher and shared read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    /// Final URL after redirects.
    pub url: String,
    pub html: String,
    /// Response headers with lowercased keys.
    pub headers: HashMap<String, String>,
    /// Response time in milliseconds.
    pub response_time: u64,
    pub status_code: u16,
    pub content_length: usize,
    pub is_https: bool,
}

impl PageData {
    pub fn new(url: String, html: String) -> Self {
        let is_https = url.starts_with("https://");
        let content_length = html.len();
        Self {
            url,
            html,
            headers: HashMap::new(),
            response_time: 0,
            status_code: 200,
            content_length,
            is_https,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_response_time(mut self, millis: u64) -> Self {
        self.response_time = millis;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
