//! Smart multi-page audit orchestration.
//!
//! An audit classifies the requested URLs and routes each category to the
//! pages that represent it. Every page is fetched once with bounded
//! concurrency and runs the analyzers its page type triggers. The per-page
//! results of the routed pages are then merged into one report.

use crate::aggregate::{PageResults, aggregate};
use crate::analyzers::performance::{pagespeed_checks, pagespeed_unavailable};
use crate::analyzers::{AnalyzerRegistry, PageView};
use crate::classify::{CrawlHints, classify, normalize_url};
use crate::error::{AuditError, Result};
use crate::model::{
    AuditMapping, AuditProgress, AuditReport, Category, CategoryResult, PageClassification,
    PageType,
};
use crate::request::AuditRequest;
use crate::router::{route, sections_for};
use crate::scoring::{generate_recommendations, overall_score};
use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sitegrade_scanner::fetcher::DEFAULT_FETCH_TIMEOUT;
use sitegrade_scanner::pagespeed::DEFAULT_PAGESPEED_TIMEOUT;
use sitegrade_scanner::{PageData, PageFetcher, PageSource, PageSpeedClient, ScanError, Strategy};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Callback for reporting audit progress
pub type ProgressCallback = Arc<dyn Fn(AuditProgress) + Send + Sync>;

/// Options for configuring an audit
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Pages fetched and analyzed at the same time.
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    pub pagespeed_timeout: Duration,
    /// PageSpeed Insights enrichment runs only when a key is set.
    pub pagespeed_key: Option<String>,
    pub pagespeed_strategy: Strategy,
    /// Upper bound of the progress range covered by page analysis.
    pub progress_band: u8,
    /// Seed for the router's page sampling.
    pub seed: Option<u64>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            pagespeed_timeout: DEFAULT_PAGESPEED_TIMEOUT,
            pagespeed_key: None,
            pagespeed_strategy: Strategy::Mobile,
            progress_band: 80,
            seed: None,
        }
    }
}

impl AuditConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_pagespeed_timeout(mut self, timeout: Duration) -> Self {
        self.pagespeed_timeout = timeout;
        self
    }

    pub fn with_pagespeed_key(mut self, key: Option<String>) -> Self {
        self.pagespeed_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_pagespeed_strategy(mut self, strategy: Strategy) -> Self {
        self.pagespeed_strategy = strategy;
        self
    }

    pub fn with_progress_band(mut self, band: u8) -> Self {
        self.progress_band = band.min(85);
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Outcome of one page, handed from a worker future to the collector.
enum PageOutcome {
    Analyzed {
        data: PageData,
        results: BTreeMap<Category, CategoryResult>,
    },
    Failed(ScanError),
}

/// Multi-page SEO audit over any [`PageSource`].
pub struct SmartAudit<S = PageFetcher> {
    source: S,
    registry: AnalyzerRegistry,
    config: AuditConfig,
    pagespeed: Option<PageSpeedClient>,
    progress_callback: Option<ProgressCallback>,
}

impl SmartAudit<PageFetcher> {
    /// HTTP-backed audit built from `config`, including the PageSpeed client
    /// when a key is configured.
    pub fn from_config(config: AuditConfig) -> Result<Self> {
        let fetcher = PageFetcher::with_timeout(config.fetch_timeout)?;
        let pagespeed = match &config.pagespeed_key {
            Some(key) => Some(
                PageSpeedClient::with_timeout(key.clone(), config.pagespeed_timeout)?
                    .with_strategy(config.pagespeed_strategy),
            ),
            None => None,
        };
        let mut audit = SmartAudit::new(fetcher).with_config(config);
        audit.pagespeed = pagespeed;
        Ok(audit)
    }
}

impl<S: PageSource> SmartAudit<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            registry: AnalyzerRegistry::standard(),
            config: AuditConfig::default(),
            pagespeed: None,
            progress_callback: None,
        }
    }

    pub fn with_registry(mut self, registry: AnalyzerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: AuditConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_pagespeed(mut self, client: PageSpeedClient) -> Self {
        self.pagespeed = Some(client);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    fn emit(&self, progress: u8, label: impl Into<String>, total: usize, analyzed: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback(AuditProgress {
                progress,
                label: label.into(),
                pages_total: total,
                pages_analyzed: analyzed,
            });
        }
    }

    /// Runs a smart audit. Sampling is seeded from the config when a seed is set.
    pub async fn run(&self, request: &AuditRequest) -> Result<AuditReport> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(request, &mut rng).await
    }

    pub async fn run_with_rng<R: Rng + Send + ?Sized>(
        &self,
        request: &AuditRequest,
        rng: &mut R,
    ) -> Result<AuditReport> {
        let started = Instant::now();
        self.emit(0, "Starting smart audit...", 0, 0);

        let urls = request.normalized_urls();
        if urls.is_empty() {
            return Err(AuditError::NoValidUrls);
        }

        let hints = request
            .crawl_data
            .as_ref()
            .and_then(|data| data.url_groups.as_ref())
            .map(CrawlHints::from_groups);
        let classifications: Vec<PageClassification> = urls
            .iter()
            .map(|url| PageClassification {
                url: url.clone(),
                page_type: classify(url, hints.as_ref()),
                title: request.title_for(url),
            })
            .collect();
        for page in &classifications {
            debug!("Classified {} as {}", page.url, page.page_type);
        }
        info!("Classified {} page(s)", classifications.len());

        let mapping = route(&classifications, &request.overrides(), rng);

        // Every page is fetched once and runs the analyzers its type triggers.
        let targets: Vec<(&PageClassification, &[Category])> = classifications
            .iter()
            .map(|page| (page, sections_for(page.page_type)))
            .collect();
        let total = targets.len();
        info!("Analyzing {} page(s)", total);

        let (results, fetched, failed) = self.analyze_pages(&targets, &mapping).await;
        let analyzed = fetched.len();
        if analyzed == 0 {
            return Err(AuditError::AllPagesFailed(total));
        }

        self.emit(85, "Aggregating results...", total, analyzed);
        let categories = self.aggregate_all(&mapping, &results, &classifications, &fetched);

        self.emit(95, "Generating recommendations...", total, analyzed);
        let recommendations = generate_recommendations(&categories);
        let (score, grade) = overall_score(&categories);

        self.emit(100, "Audit complete!", total, analyzed);
        info!(
            "Audit complete: score {} ({}), {} analyzed, {} failed",
            score, grade, analyzed, failed
        );

        Ok(AuditReport {
            audit_id: uuid::Uuid::new_v4().to_string(),
            base_url: request.base_url.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            duration_ms: started.elapsed().as_millis() as u64,
            overall_score: score,
            overall_grade: grade,
            categories,
            recommendations,
            page_classifications: classifications,
            pages_analyzed: analyzed,
            pages_failed: failed,
            audit_mapping: mapping,
        })
    }

    /// Audits one page with every analyzer.
    pub async fn run_single(&self, url: &str) -> Result<AuditReport> {
        let started = Instant::now();
        self.emit(0, "Starting page audit...", 1, 0);

        let url = normalize_url(url)
            .ok_or_else(|| AuditError::InvalidRequest(format!("invalid URL '{}'", url)))?;
        let page_type = classify(&url, None);
        let classifications = vec![PageClassification {
            url: url.clone(),
            page_type,
            title: None,
        }];

        let mut mapping = AuditMapping::new();
        for category in Category::ALL {
            mapping.insert(category, vec![url.clone()]);
        }

        self.emit(10, format!("Analyzing: {}", url), 1, 0);
        let data = self.source.fetch(&url).await?;
        let mut per_page = analyze_page(&self.registry, &data, page_type, &url, &Category::ALL);
        self.enrich_performance(&data, &mut per_page).await;

        let mut results = PageResults::new();
        results.insert(url.clone(), per_page);
        let mut fetched = HashMap::new();
        fetched.insert(url.clone(), data);

        self.emit(85, "Aggregating results...", 1, 1);
        let categories = self.aggregate_all(&mapping, &results, &classifications, &fetched);
        let recommendations = generate_recommendations(&categories);
        let (score, grade) = overall_score(&categories);
        self.emit(100, "Audit complete!", 1, 1);

        Ok(AuditReport {
            audit_id: uuid::Uuid::new_v4().to_string(),
            base_url: url,
            generated_at: chrono::Utc::now().to_rfc3339(),
            duration_ms: started.elapsed().as_millis() as u64,
            overall_score: score,
            overall_grade: grade,
            categories,
            recommendations,
            page_classifications: classifications,
            pages_analyzed: 1,
            pages_failed: 0,
            audit_mapping: mapping,
        })
    }

    /// Fetches and analyzes every target. Returns per-page results, the fetched
    /// pages and the number of failed fetches.
    async fn analyze_pages(
        &self,
        targets: &[(&PageClassification, &[Category])],
        mapping: &AuditMapping,
    ) -> (PageResults, HashMap<String, PageData>, usize) {
        let total = targets.len();
        let band = self.config.progress_band.min(85) as f64;

        let mut outcomes = stream::iter(targets.iter())
            .map(|(page, categories)| async move {
                let outcome = match self.source.fetch(&page.url).await {
                    Ok(data) => {
                        let mut results = analyze_page(
                            &self.registry,
                            &data,
                            page.page_type,
                            &page.url,
                            categories,
                        );
                        if mapping.contains(Category::Performance, &page.url) {
                            self.enrich_performance(&data, &mut results).await;
                        }
                        PageOutcome::Analyzed { data, results }
                    }
                    Err(err) => PageOutcome::Failed(err),
                };
                (page.url.clone(), outcome)
            })
            .buffer_unordered(self.config.concurrency.max(1));

        // Single collector: owns the result maps and the counters.
        let mut results = PageResults::new();
        let mut fetched = HashMap::new();
        let mut failed = 0usize;
        while let Some((url, outcome)) = outcomes.next().await {
            match outcome {
                PageOutcome::Analyzed { data, results: per_page } => {
                    debug!("Analyzed {} ({} categories)", url, per_page.len());
                    results.insert(url.clone(), per_page);
                    fetched.insert(url.clone(), data);
                }
                PageOutcome::Failed(err) => {
                    warn!("Failed to analyze {}: {}", url, err);
                    failed += 1;
                }
            }
            let done = fetched.len() + failed;
            let progress = ((done as f64 / total as f64) * band).round() as u8;
            self.emit(progress, format!("Analyzing: {}", url), total, fetched.len());
        }

        (results, fetched, failed)
    }

    async fn enrich_performance(
        &self,
        data: &PageData,
        results: &mut BTreeMap<Category, CategoryResult>,
    ) {
        let Some(ref client) = self.pagespeed else {
            return;
        };
        let Some(result) = results.get_mut(&Category::Performance) else {
            return;
        };
        match client.analyze(&data.url).await {
            Ok(report) => result.checks.extend(pagespeed_checks(&report)),
            Err(err) => {
                warn!("PageSpeed Insights failed for {}: {}", data.url, err);
                result.checks.push(pagespeed_unavailable(&err));
            }
        }
        result.rescore();
    }

    fn aggregate_all(
        &self,
        mapping: &AuditMapping,
        results: &PageResults,
        classifications: &[PageClassification],
        fetched: &HashMap<String, PageData>,
    ) -> BTreeMap<Category, CategoryResult> {
        let fallback_page = classifications
            .iter()
            .find(|p| p.page_type == PageType::Home && fetched.contains_key(&p.url))
            .or_else(|| classifications.iter().find(|p| fetched.contains_key(&p.url)));

        Category::ALL
            .into_iter()
            .map(|category| {
                let result = aggregate(category, mapping.pages(category), results, || {
                    let page = fallback_page?;
                    let data = fetched.get(&page.url)?;
                    let view = PageView::new(data, page.page_type, &page.url);
                    let (result, _) = self.registry.run(category, &view);
                    Some((page.url.clone(), result))
                });
                (category, result)
            })
            .collect()
    }
}

/// Parses `data` once and runs the analyzers for `categories` on it.
fn analyze_page(
    registry: &AnalyzerRegistry,
    data: &PageData,
    page_type: PageType,
    requested_url: &str,
    categories: &[Category],
) -> BTreeMap<Category, CategoryResult> {
    let view = PageView::new(data, page_type, requested_url);
    categories
        .iter()
        .map(|category| {
            let (result, err) = registry.run(*category, &view);
            if let Some(err) = err {
                warn!("{} analyzer failed on {}: {}", category, requested_url, err);
            }
            (*category, result)
        })
        .collect()
}
