//! Crawlability and indexing hygiene of a single page.

use super::{Analyzer, CheckSpec, PageView};
use crate::classify::normalize_url;
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, Check, CheckStatus};
use serde_json::json;
use url::Url;

const INDEXING: CheckSpec = CheckSpec::worst_wins("indexing-status", "Indexing Status", 20);
const CANONICAL: CheckSpec = CheckSpec::worst_wins("canonical-tag", "Canonical Tag", 12);
const HTTPS_SECURITY: CheckSpec = CheckSpec::worst_wins("https-security", "HTTPS Security", 12);
const SITEMAP: CheckSpec = CheckSpec::best_wins("sitemap-reference", "Sitemap Reference", 5);
const SPEED_HINTS: CheckSpec =
    CheckSpec::worst_wins("page-speed-indicators", "Page Speed Indicators", 8);
const REDIRECTS: CheckSpec = CheckSpec::worst_wins("redirect-issues", "Redirect Issues", 8);
const URL_STRUCTURE: CheckSpec = CheckSpec::worst_wins("url-structure", "URL Structure", 6);

const MAX_URL_LENGTH: usize = 75;
const MAX_PATH_DEPTH: usize = 4;

pub struct TechnicalSeoAnalyzer;

fn indexing(page: &PageView<'_>) -> Check {
    let meta_robots = page.meta_content("robots").unwrap_or_default().to_ascii_lowercase();
    let header_robots = page
        .data
        .header("x-robots-tag")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let value = json!({ "metaRobots": meta_robots, "xRobotsTag": header_robots });

    if meta_robots.contains("noindex") || header_robots.contains("noindex") {
        INDEXING
            .check(CheckStatus::Fail, 0, "Page is blocked from indexing (noindex)")
            .with_value(value)
            .with_recommendation("Remove the noindex directive if this page should rank")
    } else if meta_robots.contains("nofollow") || header_robots.contains("nofollow") {
        INDEXING
            .check(CheckStatus::Warning, 70, "Page is indexable but links are nofollow")
            .with_value(value)
            .with_recommendation("Drop nofollow so search engines can follow internal links")
    } else {
        INDEXING
            .check(CheckStatus::Pass, 100, "Page is indexable")
            .with_value(value)
    }
}

fn canonical(page: &PageView<'_>) -> Check {
    let Some(href) = page
        .first_attr(r#"link[rel="canonical"]"#, "href")
        .filter(|h| !h.is_empty())
    else {
        return CANONICAL
            .check(CheckStatus::Warning, 50, "No canonical tag found")
            .with_recommendation("Add a self-referencing canonical tag");
    };

    let target = page.resolve(&href).map(|u| u.to_string());
    let self_referencing = match (&target, normalize_url(&page.data.url)) {
        (Some(t), Some(own)) => normalize_url(t).as_deref() == Some(own.as_str()),
        _ => false,
    };
    if self_referencing {
        CANONICAL
            .check(CheckStatus::Pass, 100, "Canonical tag is self-referencing")
            .with_value(json!({ "canonical": href }))
    } else {
        CANONICAL
            .check(
                CheckStatus::Warning,
                60,
                format!("Canonical points to a different URL: {}", href),
            )
            .with_value(json!({ "canonical": href }))
            .with_recommendation("Confirm the canonical target is the preferred version of this page")
    }
}

fn https_security(page: &PageView<'_>) -> Check {
    let hsts = page.data.header("strict-transport-security").is_some();
    let value = json!({ "https": page.data.is_https, "hsts": hsts });
    match (page.data.is_https, hsts) {
        (true, true) => HTTPS_SECURITY
            .check(CheckStatus::Pass, 100, "HTTPS with HSTS enabled")
            .with_value(value),
        (true, false) => HTTPS_SECURITY
            .check(CheckStatus::Warning, 80, "HTTPS enabled without HSTS")
            .with_value(value)
            .with_recommendation("Send a Strict-Transport-Security header"),
        _ => HTTPS_SECURITY
            .check(CheckStatus::Fail, 0, "Page is served over plain HTTP")
            .with_value(value)
            .with_recommendation("Serve every page over HTTPS and redirect HTTP traffic"),
    }
}

fn sitemap(page: &PageView<'_>) -> Check {
    let referenced = page.count(r#"link[rel="sitemap"]"#) > 0
        || page
            .hrefs()
            .iter()
            .any(|h| h.to_ascii_lowercase().contains("sitemap"));
    if referenced {
        SITEMAP.check(CheckStatus::Pass, 100, "Sitemap referenced from the page")
    } else {
        SITEMAP
            .check(CheckStatus::Info, 60, "No sitemap reference found on this page")
            .with_recommendation("Reference your XML sitemap and submit it to search engines")
    }
}

fn speed_hints(page: &PageView<'_>) -> Check {
    let blocking_scripts = page
        .select("head script[src]")
        .into_iter()
        .filter(|s| {
            let el = s.value();
            el.attr("async").is_none()
                && el.attr("defer").is_none()
                && el.attr("type") != Some("module")
        })
        .count();
    let stylesheets = page.count(r#"head link[rel="stylesheet"]"#);
    let blocking = blocking_scripts + stylesheets;
    let value = json!({ "blockingScripts": blocking_scripts, "stylesheets": stylesheets });
    let message = format!("{} render-blocking resources in <head>", blocking);

    match blocking {
        0..=3 => SPEED_HINTS
            .check(CheckStatus::Pass, 100, message)
            .with_value(value),
        4..=8 => SPEED_HINTS
            .check(CheckStatus::Warning, 60, message)
            .with_value(value)
            .with_recommendation("Defer non-critical scripts and combine stylesheets"),
        _ => SPEED_HINTS
            .check(CheckStatus::Fail, 30, message)
            .with_value(value)
            .with_recommendation("Cut render-blocking scripts and stylesheets in <head>"),
    }
}

fn redirects(page: &PageView<'_>) -> Check {
    let requested = normalize_url(page.requested_url);
    let landed = normalize_url(&page.data.url);
    let value = json!({ "requested": page.requested_url, "final": page.data.url });

    if requested == landed {
        return REDIRECTS
            .check(CheckStatus::Pass, 100, "No redirect")
            .with_value(value);
    }
    let downgraded = page.requested_url.starts_with("https://") && page.data.url.starts_with("http://");
    if downgraded {
        REDIRECTS
            .check(CheckStatus::Fail, 0, "Redirects from HTTPS to HTTP")
            .with_value(value)
            .with_recommendation("Stop redirecting secure URLs to insecure ones")
    } else {
        REDIRECTS
            .check(
                CheckStatus::Warning,
                70,
                format!("Redirected to {}", page.data.url),
            )
            .with_value(value)
            .with_recommendation("Link directly to the final URL to avoid redirect hops")
    }
}

fn url_structure(page: &PageView<'_>) -> Check {
    let Ok(url) = Url::parse(&page.data.url) else {
        return URL_STRUCTURE.check(CheckStatus::Warning, 50, "URL could not be parsed");
    };
    let path = url.path();
    let depth = path.split('/').filter(|s| !s.is_empty()).count();

    let mut issues = Vec::new();
    if page.data.url.len() > MAX_URL_LENGTH {
        issues.push("too long");
    }
    if path.contains('_') {
        issues.push("underscores");
    }
    if path.chars().any(|c| c.is_ascii_uppercase()) {
        issues.push("uppercase characters");
    }
    if url.query().is_some() {
        issues.push("query parameters");
    }
    if depth > MAX_PATH_DEPTH {
        issues.push("deeply nested");
    }

    let value = json!({ "length": page.data.url.len(), "depth": depth, "issues": issues });
    if issues.is_empty() {
        URL_STRUCTURE
            .check(CheckStatus::Pass, 100, "Clean, readable URL")
            .with_value(value)
    } else {
        let score = 100u8.saturating_sub(20 * issues.len() as u8);
        URL_STRUCTURE
            .check(
                CheckStatus::Warning,
                score,
                format!("URL issues: {}", issues.join(", ")),
            )
            .with_value(value)
            .with_recommendation("Use short, lowercase, hyphenated URLs without parameters")
    }
}

impl Analyzer for TechnicalSeoAnalyzer {
    fn category(&self) -> Category {
        Category::TechnicalSeo
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let checks = vec![
            indexing(page),
            canonical(page),
            https_security(page),
            sitemap(page),
            speed_hints(page),
            redirects(page),
            url_structure(page),
        ];
        Ok(CategoryResult::from_checks(checks, "Technical SEO analysis complete"))
    }
}
