use crate::classify::normalize_url;
use crate::error::{AuditError, Result};
use crate::model::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Inbound audit payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    pub base_url: String,
    #[serde(default)]
    pub selected_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_data: Option<CrawlData>,
    /// Caller-chosen pages per category, keyed by category key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_selections: Option<HashMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlData {
    #[serde(default)]
    pub pages: Vec<CrawlPage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_groups: Option<UrlGroups>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlPage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_link_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_navigation: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlGroups {
    #[serde(default)]
    pub core: Vec<String>,
    #[serde(default)]
    pub blog: Vec<String>,
    #[serde(default)]
    pub product: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

impl AuditRequest {
    pub fn new(base_url: impl Into<String>, selected_urls: Vec<String>) -> Self {
        Self {
            base_url: base_url.into(),
            selected_urls,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let request: AuditRequest = serde_json::from_str(json)?;
        if request.base_url.trim().is_empty() {
            return Err(AuditError::InvalidRequest("baseUrl is required".to_string()));
        }
        Ok(request)
    }

    /// Normalized, deduplicated URLs in input order. Invalid entries are dropped.
    pub fn normalized_urls(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut urls = Vec::with_capacity(self.selected_urls.len());
        for raw in &self.selected_urls {
            match normalize_url(raw) {
                Some(url) => {
                    if seen.insert(url.clone()) {
                        urls.push(url);
                    }
                }
                None => warn!("Skipping invalid URL '{}'", raw),
            }
        }
        urls
    }

    /// Section overrides with typed keys and normalized URLs.
    pub fn overrides(&self) -> HashMap<Category, Vec<String>> {
        let mut overrides = HashMap::new();
        let Some(selections) = &self.section_selections else {
            return overrides;
        };
        for (key, urls) in selections {
            let Some(category) = Category::from_key(key) else {
                warn!("Ignoring section selection for unknown category '{}'", key);
                continue;
            };
            let urls: Vec<String> = urls.iter().filter_map(|u| normalize_url(u)).collect();
            overrides.insert(category, urls);
        }
        overrides
    }

    /// Title recorded by the crawler for a normalized URL.
    pub fn title_for(&self, url: &str) -> Option<String> {
        self.crawl_data.as_ref().and_then(|data| {
            data.pages
                .iter()
                .find(|p| normalize_url(&p.url).as_deref() == Some(url))
                .and_then(|p| p.title.clone())
        })
    }
}
