// Tests for the smart audit orchestrator

use async_trait::async_trait;
use sitegrade_core::analyzers::{Analyzer, AnalyzerRegistry, PageView};
use sitegrade_core::audit::{AuditConfig, SmartAudit};
use sitegrade_core::error::{AnalyzeError, AuditError};
use sitegrade_core::model::{
    AuditProgress, Category, CategoryResult, CheckStatus, PageType,
};
use sitegrade_core::request::AuditRequest;
use sitegrade_core::scoring::overall_score;
use sitegrade_scanner::{PageData, PageFetcher, PageSource, PageSpeedClient, ScanError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME: &str = "https://acme.test/";
const CONTACT: &str = "https://acme.test/contact";
const BLOG: &str = "https://acme.test/blog/post-1";

const HOME_HTML: &str = r#"<!DOCTYPE html>
<html lang="en"><head>
<title>Acme Plumbing - Springfield's Trusted Plumbers</title>
<meta name="description" content="Acme Plumbing">
<meta name="viewport" content="width=device-width, initial-scale=1">
</head><body>
<h1>Acme Plumbing</h1>
<a href="/contact">Contact</a> <a href="/blog/post-1">Blog</a>
<a href="tel:+15551234567">Call</a>
<p>123 Main Street, Springfield, IL 62704</p>
</body></html>"#;

const CONTACT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en"><head><title>Contact Acme</title></head><body>
<h1>Contact us</h1>
<form><label for=email>Email</label><input id=email type=email></form>
<iframe src="https://www.google.com/maps/embed?pb=acme"></iframe>
</body></html>"#;

const BLOG_HTML: &str = r#"<!DOCTYPE html>
<html lang="en"><head><title>Fixing a leaky faucet</title>
<meta name="author" content="Jane Doe"></head><body>
<h1>Fixing a leaky faucet</h1><h2>Tools</h2>
<p>Turn off the water first. Then remove the handle.</p>
</body></html>"#;

/// In-memory site that records how often each URL is fetched.
#[derive(Default)]
struct StubSite {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StubSite {
    fn acme() -> Self {
        let mut site = Self::default();
        site.pages.insert(HOME.to_string(), HOME_HTML.to_string());
        site.pages.insert(CONTACT.to_string(), CONTACT_HTML.to_string());
        site.pages.insert(BLOG.to_string(), BLOG_HTML.to_string());
        site
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl PageSource for StubSite {
    async fn fetch(&self, url: &str) -> Result<PageData, ScanError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if self.failing.contains(url) {
            return Err(ScanError::Timeout(url.to_string()));
        }
        match self.pages.get(url) {
            Some(html) => Ok(PageData::new(url.to_string(), html.clone()).with_response_time(120)),
            None => Err(ScanError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Lets the test inspect the stub after the audit has taken it by value.
struct Shared(Arc<StubSite>);

#[async_trait]
impl PageSource for Shared {
    async fn fetch(&self, url: &str) -> Result<PageData, ScanError> {
        self.0.fetch(url).await
    }
}

fn acme_request() -> AuditRequest {
    AuditRequest::new(
        "https://acme.test",
        vec![HOME.to_string(), CONTACT.to_string(), BLOG.to_string()],
    )
}

fn seeded() -> AuditConfig {
    AuditConfig::default().with_seed(Some(7))
}

struct Exploding;

impl Analyzer for Exploding {
    fn category(&self) -> Category {
        Category::Seo
    }

    fn analyze(&self, _page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        panic!("selector engine exploded");
    }
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[tokio::test]
async fn test_acme_audit_end_to_end() {
    let audit = SmartAudit::new(StubSite::acme()).with_config(seeded());
    let report = audit.run(&acme_request()).await.unwrap();

    assert_eq!(report.base_url, "https://acme.test");
    assert_eq!(report.pages_analyzed, 3);
    assert_eq!(report.pages_failed, 0);
    assert_eq!(report.categories.len(), 10);

    let types: Vec<PageType> = report
        .page_classifications
        .iter()
        .map(|p| p.page_type)
        .collect();
    assert_eq!(types, [PageType::Home, PageType::Contact, PageType::Blog]);

    for category in Category::ALL {
        let result = &report.categories[&category];
        assert!(result.score <= 100);
        assert!(!result.source_pages.is_empty(), "{} has no pages", category);
    }

    let local = &report.categories[&Category::LocalSeo];
    assert_eq!(local.source_pages, [HOME, CONTACT]);
    // Phone lives on the homepage and the map on the contact page.
    assert_eq!(local.check("phone-number").unwrap().status, CheckStatus::Pass);
    assert_eq!(local.check("google-map").unwrap().status, CheckStatus::Pass);

    assert_eq!(report.categories[&Category::Content].source_pages, [BLOG]);

    let (score, grade) = overall_score(&report.categories);
    assert_eq!(report.overall_score, score);
    assert_eq!(report.overall_grade, grade);
    assert!(!report.audit_id.is_empty());
}

#[tokio::test]
async fn test_each_url_is_fetched_once() {
    let site = Arc::new(StubSite::acme());
    let audit = SmartAudit::new(Shared(site.clone())).with_config(seeded());
    let request = AuditRequest::new(
        "https://acme.test",
        vec![
            "https://acme.test".to_string(),
            HOME.to_string(),
            "https://ACME.test/contact/".to_string(),
            CONTACT.to_string(),
        ],
    );

    let report = audit.run(&request).await.unwrap();

    assert_eq!(report.pages_analyzed, 2);
    assert_eq!(site.fetch_count(HOME), 1);
    assert_eq!(site.fetch_count(CONTACT), 1);
    assert_eq!(site.total_fetches(), 2);
}

#[tokio::test]
async fn test_same_seed_gives_same_mapping() {
    let first = SmartAudit::new(StubSite::acme())
        .with_config(seeded())
        .run(&acme_request())
        .await
        .unwrap();
    let second = SmartAudit::new(StubSite::acme())
        .with_config(seeded())
        .run(&acme_request())
        .await
        .unwrap();
    assert_eq!(first.audit_mapping, second.audit_mapping);
    assert_ne!(first.audit_id, second.audit_id);
}

// ============================================================================
// Failure Handling Tests
// ============================================================================

#[tokio::test]
async fn test_partial_failure_still_reports() {
    let audit = SmartAudit::new(StubSite::acme().failing(BLOG)).with_config(seeded());
    let report = audit.run(&acme_request()).await.unwrap();

    assert_eq!(report.pages_analyzed, 2);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.categories.len(), 10);

    // Content was routed to the failed blog post, so the homepage stands in.
    let content = &report.categories[&Category::Content];
    assert_eq!(content.source_pages, [HOME]);
    assert!(content.check("word-count").is_some());
}

#[tokio::test]
async fn test_all_pages_failed() {
    let site = StubSite::acme()
        .failing(HOME)
        .failing(CONTACT)
        .failing(BLOG);
    let err = SmartAudit::new(site)
        .run(&acme_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::AllPagesFailed(3)));
}

#[tokio::test]
async fn test_no_valid_urls() {
    let request = AuditRequest::new(
        "https://acme.test",
        vec!["not a url".to_string(), "ftp://acme.test/file".to_string()],
    );
    let site = Arc::new(StubSite::acme());
    let err = SmartAudit::new(Shared(site.clone()))
        .run(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::NoValidUrls));
    assert_eq!(site.total_fetches(), 0);
}

#[tokio::test]
async fn test_panicking_analyzer_is_contained() {
    let mut registry = AnalyzerRegistry::standard();
    registry.register(Arc::new(Exploding));
    let audit = SmartAudit::new(StubSite::acme())
        .with_registry(registry)
        .with_config(seeded());

    let report = audit.run(&acme_request()).await.unwrap();

    let seo = &report.categories[&Category::Seo];
    assert_eq!(seo.score, 25);
    assert!(seo.checks.is_empty());
    // Other categories are unaffected.
    assert!(report.categories[&Category::LocalSeo].check("address").is_some());
}

// ============================================================================
// Fallback Tests
// ============================================================================

#[tokio::test]
async fn test_eeat_falls_back_to_homepage() {
    // No about or blog page: E-E-A-T is routed to the homepage, whose type
    // does not run that analyzer, so aggregation analyzes it on demand.
    let request = AuditRequest::new(
        "https://acme.test",
        vec![HOME.to_string(), CONTACT.to_string()],
    );
    let report = SmartAudit::new(StubSite::acme())
        .with_config(seeded())
        .run(&request)
        .await
        .unwrap();

    let eeat = &report.categories[&Category::Eeat];
    assert_eq!(eeat.source_pages, [HOME]);
    assert!(eeat.check("author-info").is_some());
    assert_eq!(report.audit_mapping.pages(Category::Eeat), [HOME]);
}

// ============================================================================
// Progress Tests
// ============================================================================

#[tokio::test]
async fn test_progress_is_monotonic_and_completes() {
    let events: Arc<Mutex<Vec<AuditProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let audit = SmartAudit::new(StubSite::acme())
        .with_config(seeded().with_concurrency(2))
        .with_progress_callback(Arc::new(move |p: AuditProgress| sink.lock().unwrap().push(p)));

    audit.run(&acme_request()).await.unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.first().unwrap().progress, 0);
    assert_eq!(events.last().unwrap().progress, 100);
    assert_eq!(events.last().unwrap().label, "Audit complete!");
    assert!(events.windows(2).all(|w| w[0].progress <= w[1].progress));

    let analyzing = events
        .iter()
        .filter(|e| e.label.starts_with("Analyzing: "))
        .count();
    assert_eq!(analyzing, 3);
    assert!(events.iter().all(|e| e.progress <= 100));
}

#[tokio::test]
async fn test_progress_band_set_directly_stays_in_range() {
    let events: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let mut config = seeded();
    config.progress_band = 200;
    let audit = SmartAudit::new(StubSite::acme())
        .with_config(config)
        .with_progress_callback(Arc::new(move |p: AuditProgress| {
            sink.lock().unwrap().push(p.progress)
        }));

    audit.run(&acme_request()).await.unwrap();

    let events = events.lock().unwrap();
    assert!(events.iter().all(|p| *p <= 100));
    assert!(events.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(events.last(), Some(&100));
}

// ============================================================================
// Single Page Tests
// ============================================================================

#[tokio::test]
async fn test_run_single_uses_every_analyzer() {
    let report = SmartAudit::new(StubSite::acme())
        .run_single("https://acme.test/contact/")
        .await
        .unwrap();

    assert_eq!(report.pages_analyzed, 1);
    assert_eq!(report.base_url, CONTACT);
    assert_eq!(report.categories.len(), 10);
    for (category, result) in &report.categories {
        assert_eq!(result.source_pages, [CONTACT], "{}", category);
        assert!(!result.checks.is_empty(), "{}", category);
    }
}

#[tokio::test]
async fn test_run_single_rejects_invalid_url() {
    let err = SmartAudit::new(StubSite::acme())
        .run_single("mailto:someone@acme.test")
        .await
        .unwrap_err();
    assert!(matches!(err, AuditError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_run_single_propagates_fetch_error() {
    let err = SmartAudit::new(StubSite::acme())
        .run_single("https://acme.test/missing")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuditError::Scan(ScanError::HttpStatus { status: 404, .. })
    ));
}

// ============================================================================
// HTTP Tests
// ============================================================================

#[tokio::test]
async fn test_audit_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOME_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONTACT_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let base = server.uri();
    let request = AuditRequest::new(
        base.clone(),
        vec![
            format!("{}/", base),
            format!("{}/contact", base),
            format!("{}/broken", base),
        ],
    );
    let fetcher = PageFetcher::with_timeout(Duration::from_secs(5)).unwrap();
    let report = SmartAudit::new(fetcher)
        .with_config(seeded())
        .run(&request)
        .await
        .unwrap();

    assert_eq!(report.pages_analyzed, 2);
    assert_eq!(report.pages_failed, 1);
    // Plain HTTP is flagged.
    let performance = &report.categories[&Category::Performance];
    assert_eq!(performance.check("https").unwrap().status, CheckStatus::Fail);
}

#[tokio::test]
async fn test_pagespeed_enriches_performance_pages() {
    let server = MockServer::start().await;
    let lighthouse = serde_json::json!({
        "lighthouseResult": {
            "categories": { "performance": { "score": 0.95 } },
            "audits": {
                "largest-contentful-paint": { "numericValue": 1200.0 },
                "cumulative-layout-shift": { "numericValue": 0.02 },
                "total-blocking-time": { "numericValue": 80.0 }
            }
        }
    });
    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .and(query_param("url", HOME))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse))
        .expect(1)
        .mount(&server)
        .await;

    let client = PageSpeedClient::new("test-key")
        .unwrap()
        .with_endpoint(format!("{}/runPagespeed", server.uri()));
    let report = SmartAudit::new(StubSite::acme())
        .with_config(seeded())
        .with_pagespeed(client)
        .run(&acme_request())
        .await
        .unwrap();

    let performance = &report.categories[&Category::Performance];
    assert_eq!(performance.source_pages, [HOME]);
    let lab = performance.check("pagespeed-score").unwrap();
    assert_eq!(lab.status, CheckStatus::Pass);
    assert_eq!(lab.score, 95);
    assert_eq!(
        performance.check("largest-contentful-paint").unwrap().status,
        CheckStatus::Pass
    );
}

#[tokio::test]
async fn test_pagespeed_failure_is_informational() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PageSpeedClient::new("test-key")
        .unwrap()
        .with_endpoint(format!("{}/runPagespeed", server.uri()));
    let report = SmartAudit::new(StubSite::acme())
        .with_config(seeded())
        .with_pagespeed(client)
        .run(&acme_request())
        .await
        .unwrap();

    let performance = &report.categories[&Category::Performance];
    let marker = performance.check("pagespeed-unavailable").unwrap();
    assert_eq!(marker.status, CheckStatus::Info);
    assert_eq!(marker.weight, 0);
    assert!(performance.check("response-time").is_some());
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_builders_clamp_values() {
    let config = AuditConfig::default()
        .with_concurrency(0)
        .with_progress_band(99)
        .with_pagespeed_key(Some("   ".to_string()));
    assert_eq!(config.concurrency, 1);
    assert_eq!(config.progress_band, 85);
    assert!(config.pagespeed_key.is_none());
}
