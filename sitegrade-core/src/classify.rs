//! URL normalization and page-type classification.
//!
//! Classification is pure string work: crawl hints are consulted first,
//! then an ordered list of path patterns where the first match wins.

use crate::model::PageType;
use crate::request::UrlGroups;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static PATH_RULES: LazyLock<Vec<(Regex, PageType)>> = LazyLock::new(|| {
    [
        (r"/(contact|kontakt|contacto|contato)", PageType::Contact),
        (r"/(about|about-us|who-we-are|our-story|team)", PageType::About),
        (r"/(privacy|terms|disclaimer|cookie-policy|legal)", PageType::Legal),
        (r"/(category|categories|collection)", PageType::Category),
        (r"/(tag|tags|topic|topics)", PageType::Tag),
        (r"/(archive|archives|date|year|month)", PageType::Archive),
        (r"/(products?|shop|store|item|buy)", PageType::Product),
        (r"/(services?|solutions?|offerings?)", PageType::Service),
        (r"/(blog|news|articles?|posts?|journal|insights)", PageType::Blog),
    ]
    .into_iter()
    .map(|(pattern, page_type)| {
        (
            Regex::new(pattern).expect("page type pattern must compile"),
            page_type,
        )
    })
    .collect()
});

/// Canonical form used for dedup and every URL comparison in a run.
///
/// Strips a single trailing slash from the path and lowercases the whole
/// URL. The root path stays `/`. Returns `None` for anything that is not
/// an absolute http(s) URL.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(&path[..path.len() - 1]);
    }

    Some(url.to_string().to_lowercase())
}

/// Lowercased path component of a URL, `/` when empty.
pub fn url_path(url: &str) -> String {
    Url::parse(url)
        .map(|u| {
            let path = u.path().to_lowercase();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|_| "/".to_string())
}

/// Normalized crawl buckets.
#[derive(Debug, Clone, Default)]
pub struct CrawlHints {
    core: HashSet<String>,
    blog: HashSet<String>,
    product: HashSet<String>,
    category: HashSet<String>,
}

impl CrawlHints {
    pub fn from_groups(groups: &UrlGroups) -> Self {
        let bucket = |urls: &[String]| -> HashSet<String> {
            urls.iter().filter_map(|u| normalize_url(u)).collect()
        };
        Self {
            core: bucket(&groups.core),
            blog: bucket(&groups.blog),
            product: bucket(&groups.product),
            category: bucket(&groups.category),
        }
    }

    fn bucket_type(&self, url: &str, path: &str) -> Option<PageType> {
        if self.core.contains(url) {
            if path == "/" {
                return Some(PageType::Home);
            }
            if path.contains("contact") {
                return Some(PageType::Contact);
            }
            if path.contains("about") {
                return Some(PageType::About);
            }
        }
        if self.blog.contains(url) {
            return Some(PageType::Blog);
        }
        if self.product.contains(url) {
            return Some(PageType::Product);
        }
        if self.category.contains(url) {
            return Some(PageType::Category);
        }
        None
    }
}

/// Classifies a normalized URL.
pub fn classify(url: &str, hints: Option<&CrawlHints>) -> PageType {
    let path = url_path(url);

    if let Some(hints) = hints
        && let Some(page_type) = hints.bucket_type(url, &path)
    {
        return page_type;
    }

    if path == "/" {
        return PageType::Home;
    }

    for (pattern, page_type) in PATH_RULES.iter() {
        if !pattern.is_match(&path) {
            continue;
        }
        if *page_type == PageType::Blog && is_blog_listing(&path) {
            return PageType::Archive;
        }
        return *page_type;
    }

    PageType::Other
}

fn is_blog_listing(path: &str) -> bool {
    path == "/blog" || path == "/blog/" || path.contains("/blog/page/")
}
