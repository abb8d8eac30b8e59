//! Per-category analyzers.
//!
//! Every analyzer is a stateless rule table over one parsed page. Checks are
//! declared once as a [`CheckSpec`], which also fixes how the check merges
//! across pages.

pub mod content;
pub mod eeat;
pub mod links;
pub mod local_seo;
pub mod performance;
pub mod seo;
pub mod social;
pub mod technical_seo;
pub mod technology;
pub mod usability;

use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, Check, CheckStatus, MergePolicy, PageType};
use scraper::{ElementRef, Html, Selector};
use sitegrade_scanner::PageData;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use url::Url;

/// A fetched page parsed once and shared by every analyzer that runs on it.
pub struct PageView<'a> {
    pub data: &'a PageData,
    pub document: Html,
    pub page_type: PageType,
    /// URL the audit asked for, before redirects.
    pub requested_url: &'a str,
}

impl<'a> PageView<'a> {
    pub fn new(data: &'a PageData, page_type: PageType, requested_url: &'a str) -> Self {
        Self {
            data,
            document: Html::parse_document(&data.html),
            page_type,
            requested_url,
        }
    }

    pub fn html(&self) -> &str {
        &self.data.html
    }

    pub fn count(&self, css: &str) -> usize {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).count(),
            Err(_) => 0,
        }
    }

    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn first_attr(&self, css: &str, attr: &str) -> Option<String> {
        self.select(css)
            .into_iter()
            .find_map(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
    }

    pub fn first_text(&self, css: &str) -> Option<String> {
        self.select(css)
            .into_iter()
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }

    pub fn meta_content(&self, name: &str) -> Option<String> {
        self.first_attr(&format!(r#"meta[name="{}"]"#, name), "content")
            .filter(|c| !c.is_empty())
    }

    pub fn hrefs(&self) -> Vec<String> {
        self.select("a[href]")
            .into_iter()
            .filter_map(|el| el.value().attr("href").map(|h| h.trim().to_string()))
            .collect()
    }

    /// Text a reader would see: body text without script, style or template content.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        for node in self.document.tree.nodes() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|a| {
                a.value().as_element().is_some_and(|e| {
                    matches!(e.name(), "script" | "style" | "noscript" | "template" | "head")
                })
            });
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
        out
    }

    pub fn word_count(&self) -> usize {
        self.visible_text().split_whitespace().count()
    }

    pub fn host(&self) -> Option<String> {
        Url::parse(&self.data.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
    }

    /// Resolves `href` against the page URL; `None` for non-navigational links.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let lower = href.to_ascii_lowercase();
        if href.is_empty()
            || href.starts_with('#')
            || lower.starts_with("javascript:")
            || lower.starts_with("mailto:")
            || lower.starts_with("tel:")
        {
            return None;
        }
        Url::parse(&self.data.url).ok()?.join(href).ok()
    }

    pub fn is_internal(&self, href: &str) -> bool {
        match (self.resolve(href), self.host()) {
            (Some(url), Some(host)) => url
                .host_str()
                .is_some_and(|h| h.eq_ignore_ascii_case(&host)),
            _ => false,
        }
    }
}

/// Static declaration of a check.
#[derive(Debug, Clone, Copy)]
pub struct CheckSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub weight: u32,
    pub merge: MergePolicy,
}

impl CheckSpec {
    pub const fn worst_wins(id: &'static str, name: &'static str, weight: u32) -> Self {
        Self {
            id,
            name,
            weight,
            merge: MergePolicy::WorstWins,
        }
    }

    pub const fn best_wins(id: &'static str, name: &'static str, weight: u32) -> Self {
        Self {
            id,
            name,
            weight,
            merge: MergePolicy::BestWins,
        }
    }

    pub fn check(&self, status: CheckStatus, score: u8, message: impl Into<String>) -> Check {
        Check::new(self.id, self.name, status, score, self.weight, message)
            .with_merge_policy(self.merge)
    }
}

pub trait Analyzer: Send + Sync {
    fn category(&self) -> Category;

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError>;
}

/// Runs `analyzer`, turning an error or a panic into a degraded result.
pub fn analyze_guarded(analyzer: &dyn Analyzer, page: &PageView<'_>) -> (CategoryResult, Option<AnalyzeError>) {
    let outcome = catch_unwind(AssertUnwindSafe(|| analyzer.analyze(page)));
    let err = match outcome {
        Ok(Ok(result)) => return (result, None),
        Ok(Err(err)) => err,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            AnalyzeError::Panicked(reason)
        }
    };
    (CategoryResult::degraded(&err), Some(err))
}

/// Category → analyzer lookup.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: HashMap<Category, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// All ten built-in analyzers.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(local_seo::LocalSeoAnalyzer));
        registry.register(Arc::new(seo::SeoAnalyzer));
        registry.register(Arc::new(links::LinksAnalyzer));
        registry.register(Arc::new(usability::UsabilityAnalyzer));
        registry.register(Arc::new(performance::PerformanceAnalyzer));
        registry.register(Arc::new(social::SocialAnalyzer));
        registry.register(Arc::new(technology::TechnologyAnalyzer));
        registry.register(Arc::new(technical_seo::TechnicalSeoAnalyzer));
        registry.register(Arc::new(content::ContentAnalyzer));
        registry.register(Arc::new(eeat::EeatAnalyzer));
        registry
    }

    /// Registers an analyzer, replacing any existing one for its category.
    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) -> &mut Self {
        self.analyzers.insert(analyzer.category(), analyzer);
        self
    }

    pub fn get(&self, category: Category) -> Option<&Arc<dyn Analyzer>> {
        self.analyzers.get(&category)
    }

    /// Runs the analyzer for `category`; a missing analyzer degrades like a failing one.
    pub fn run(&self, category: Category, page: &PageView<'_>) -> (CategoryResult, Option<AnalyzeError>) {
        match self.get(category) {
            Some(analyzer) => analyze_guarded(analyzer.as_ref(), page),
            None => {
                let err = AnalyzeError::Missing(category.to_string());
                (CategoryResult::degraded(&err), Some(err))
            }
        }
    }
}

/// Integer percentage, 100 when `total` is zero.
pub(crate) fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((part as f64 / total as f64) * 100.0).round() as u8
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
