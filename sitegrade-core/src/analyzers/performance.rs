use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, Check, CheckStatus};
use serde_json::json;
use sitegrade_scanner::PageSpeedReport;

const RESPONSE_TIME: CheckSpec = CheckSpec::worst_wins("response-time", "Response Time", 20);
const PAGE_SIZE: CheckSpec = CheckSpec::worst_wins("page-size", "Page Size", 20);
const HTTPS: CheckSpec = CheckSpec::worst_wins("https", "HTTPS", 15);
const COMPRESSION: CheckSpec = CheckSpec::worst_wins("compression", "Compression", 10);

const LAB_SCORE: CheckSpec = CheckSpec::worst_wins("pagespeed-score", "PageSpeed Score", 15);
const LCP: CheckSpec = CheckSpec::worst_wins("largest-contentful-paint", "Largest Contentful Paint", 10);
const CLS: CheckSpec = CheckSpec::worst_wins("cumulative-layout-shift", "Cumulative Layout Shift", 10);
const TBT: CheckSpec = CheckSpec::worst_wins("total-blocking-time", "Total Blocking Time", 8);
const LAB_UNAVAILABLE: CheckSpec =
    CheckSpec::worst_wins("pagespeed-unavailable", "PageSpeed Insights", 0);

pub struct PerformanceAnalyzer;

impl Analyzer for PerformanceAnalyzer {
    fn category(&self) -> Category {
        Category::Performance
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let data = page.data;
        let mut checks = Vec::with_capacity(4);

        let ms = data.response_time;
        let status = match ms {
            0..=499 => CheckStatus::Pass,
            500..=1499 => CheckStatus::Warning,
            _ => CheckStatus::Fail,
        };
        let score = match ms {
            0..=199 => 100,
            200..=499 => 85,
            500..=999 => 60,
            1000..=1999 => 40,
            _ => 20,
        };
        checks.push(
            RESPONSE_TIME
                .check(status, score, format!("Server responded in {}ms", ms))
                .with_value(json!({ "responseTimeMs": ms }))
                .recommend_if(
                    ms >= 1000,
                    "Improve server response time with caching or a faster host",
                ),
        );

        let size = if data.content_length > 0 {
            data.content_length
        } else {
            data.html.len()
        };
        let mb = size as f64 / (1024.0 * 1024.0);
        let status = if mb < 1.0 {
            CheckStatus::Pass
        } else if mb < 2.0 {
            CheckStatus::Warning
        } else {
            CheckStatus::Fail
        };
        let score = if mb < 0.5 {
            100
        } else if mb < 1.0 {
            85
        } else if mb < 2.0 {
            50
        } else {
            10
        };
        checks.push(
            PAGE_SIZE
                .check(status, score, format!("Page size: {:.2} MB", mb))
                .with_value(json!({ "bytes": size }))
                .recommend_if(mb >= 1.0, "Reduce page weight by compressing images and assets"),
        );

        checks.push(if data.is_https {
            HTTPS.check(CheckStatus::Pass, 100, "Site served over HTTPS")
        } else {
            HTTPS
                .check(CheckStatus::Fail, 0, "Site is not served over HTTPS")
                .with_recommendation("Enable HTTPS with a valid SSL certificate")
        });

        // The HTTP client may decode bodies transparently and drop content-encoding,
        // so a Vary on accept-encoding counts as evidence too.
        let encoding = data.header("content-encoding").unwrap_or_default().to_ascii_lowercase();
        let vary = data.header("vary").unwrap_or_default().to_ascii_lowercase();
        let compressed = encoding.contains("gzip")
            || encoding.contains("br")
            || encoding.contains("deflate")
            || vary.contains("accept-encoding");
        checks.push(
            COMPRESSION
                .check(
                    if compressed { CheckStatus::Pass } else { CheckStatus::Warning },
                    if compressed { 100 } else { 50 },
                    if compressed {
                        "Response compression enabled"
                    } else {
                        "No compression detected"
                    },
                )
                .with_value(json!({ "contentEncoding": encoding, "vary": vary }))
                .recommend_if(!compressed, "Enable gzip or brotli compression"),
        );

        Ok(CategoryResult::from_checks(checks, "Performance analysis complete"))
    }
}

/// Grades a lab metric against its "good" and "needs improvement" thresholds.
fn vitals_check(def: CheckSpec, value: f64, good: f64, poor: f64, shown: String, advice: &str) -> Check {
    let (status, score) = if value <= good {
        (CheckStatus::Pass, 100)
    } else if value <= poor {
        (CheckStatus::Warning, 60)
    } else {
        (CheckStatus::Fail, 20)
    };
    def.check(status, score, shown)
        .with_value(json!({ "value": value }))
        .recommend_if(status != CheckStatus::Pass, advice)
}

/// Lab checks derived from a PageSpeed Insights run.
pub fn pagespeed_checks(report: &PageSpeedReport) -> Vec<Check> {
    let vitals = &report.core_web_vitals;
    let status = match report.score {
        90..=100 => CheckStatus::Pass,
        50..=89 => CheckStatus::Warning,
        _ => CheckStatus::Fail,
    };
    let top_opportunity = report.opportunities.first().map(|o| o.title.clone());

    vec![
        LAB_SCORE
            .check(
                status,
                report.score,
                format!(
                    "PageSpeed {} score: {}/100",
                    report.strategy.as_str(),
                    report.score
                ),
            )
            .with_value(json!({
                "strategy": report.strategy,
                "opportunities": report.opportunities,
            }))
            .recommend_if(
                status != CheckStatus::Pass,
                top_opportunity.unwrap_or_else(|| "Address the PageSpeed Insights opportunities".to_string()),
            ),
        vitals_check(
            LCP,
            vitals.lcp,
            2500.0,
            4000.0,
            format!("LCP {:.1}s", vitals.lcp / 1000.0),
            "Speed up the largest above-the-fold element (optimize hero images, preload key resources)",
        ),
        vitals_check(
            CLS,
            vitals.cls,
            0.1,
            0.25,
            format!("CLS {:.3}", vitals.cls),
            "Reserve space for images, ads and embeds to avoid layout shifts",
        ),
        vitals_check(
            TBT,
            vitals.tbt,
            200.0,
            600.0,
            format!("TBT {:.0}ms", vitals.tbt),
            "Reduce main-thread work by splitting and deferring JavaScript",
        ),
    ]
}

/// Informational marker for a page whose PageSpeed run failed. Carries no weight.
pub fn pagespeed_unavailable(reason: impl std::fmt::Display) -> Check {
    LAB_UNAVAILABLE.check(
        CheckStatus::Info,
        0,
        format!("PageSpeed Insights unavailable: {}", reason),
    )
}
