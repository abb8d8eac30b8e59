use crate::error::{Result, ScanError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

pub const PAGESPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";
pub const DEFAULT_PAGESPEED_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_OPPORTUNITIES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

/// Lab metrics in milliseconds, except `cls` which is unitless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreWebVitals {
    pub lcp: f64,
    pub fid: f64,
    pub cls: f64,
    pub fcp: f64,
    pub ttfb: f64,
    pub si: f64,
    pub tbt: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedReport {
    pub url: String,
    pub strategy: Strategy,
    /// Lighthouse performance score scaled to 0-100.
    pub score: u8,
    pub core_web_vitals: CoreWebVitals,
    pub opportunities: Vec<Opportunity>,
}

// Only the parts of the Lighthouse payload we read.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    lighthouse_result: Option<LighthouseResult>,
}

#[derive(Deserialize)]
struct LighthouseResult {
    #[serde(default)]
    categories: BTreeMap<String, LighthouseCategory>,
    #[serde(default)]
    audits: BTreeMap<String, LighthouseAudit>,
}

#[derive(Deserialize)]
struct LighthouseCategory {
    score: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LighthouseAudit {
    #[serde(default)]
    title: String,
    score: Option<f64>,
    numeric_value: Option<f64>,
    details: Option<AuditDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditDetails {
    #[serde(rename = "type")]
    kind: Option<String>,
    overall_savings_ms: Option<f64>,
}

/// Client for the Google PageSpeed Insights v5 API.
#[derive(Debug, Clone)]
pub struct PageSpeedClient {
    client: Client,
    api_key: String,
    endpoint: String,
    strategy: Strategy,
}

impl PageSpeedClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_PAGESPEED_TIMEOUT)
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: PAGESPEED_ENDPOINT.to_string(),
            strategy: Strategy::default(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub async fn analyze(&self, url: &str) -> Result<PageSpeedReport> {
        info!("Running PageSpeed Insights ({}) for {}", self.strategy.as_str(), url);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("url", url),
                ("key", self.api_key.as_str()),
                ("strategy", self.strategy.as_str()),
                ("category", "performance"),
            ])
            .send()
            .await
            .map_err(|e| ScanError::from_request(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let payload: ApiResponse = response
            .json()
            .await
            .map_err(|e| ScanError::PageSpeedPayload(e.to_string()))?;
        let lighthouse = payload
            .lighthouse_result
            .ok_or_else(|| ScanError::PageSpeedPayload("missing lighthouseResult".to_string()))?;

        let report = self.build_report(url, lighthouse);
        debug!("PageSpeed score for {}: {}", url, report.score);
        Ok(report)
    }

    fn build_report(&self, url: &str, lighthouse: LighthouseResult) -> PageSpeedReport {
        let metric = |id: &str| {
            lighthouse
                .audits
                .get(id)
                .and_then(|a| a.numeric_value)
                .unwrap_or(0.0)
        };

        let core_web_vitals = CoreWebVitals {
            lcp: metric("largest-contentful-paint"),
            fid: metric("max-potential-fid"),
            cls: metric("cumulative-layout-shift"),
            fcp: metric("first-contentful-paint"),
            ttfb: metric("server-response-time"),
            si: metric("speed-index"),
            tbt: metric("total-blocking-time"),
        };

        let opportunities = lighthouse
            .audits
            .iter()
            .filter_map(|(id, audit)| {
                let details = audit.details.as_ref()?;
                let score = audit.score?;
                (details.kind.as_deref() == Some("opportunity") && score < 1.0).then(|| {
                    Opportunity {
                        id: id.clone(),
                        title: audit.title.clone(),
                        score,
                        savings_ms: details.overall_savings_ms.map(|ms| ms.round() as u64),
                    }
                })
            })
            .take(MAX_OPPORTUNITIES)
            .collect();

        let score = lighthouse
            .categories
            .get("performance")
            .and_then(|c| c.score)
            .map(|s| (s * 100.0).round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);

        PageSpeedReport {
            url: url.to_string(),
            strategy: self.strategy,
            score,
            core_web_vitals,
            opportunities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn lighthouse_body() -> serde_json::Value {
        serde_json::json!({
            "lighthouseResult": {
                "categories": { "performance": { "score": 0.87 } },
                "audits": {
                    "largest-contentful-paint": { "title": "LCP", "score": 0.8, "numericValue": 2100.5 },
                    "cumulative-layout-shift": { "title": "CLS", "score": 1, "numericValue": 0.04 },
                    "total-blocking-time": { "title": "TBT", "score": 0.9, "numericValue": 150.0 },
                    "render-blocking-resources": {
                        "title": "Eliminate render-blocking resources",
                        "score": 0.4,
                        "details": { "type": "opportunity", "overallSavingsMs": 420.7 }
                    },
                    "uses-text-compression": {
                        "title": "Enable text compression",
                        "score": 1,
                        "details": { "type": "opportunity", "overallSavingsMs": 0 }
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_analyze_parses_lighthouse_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/runPagespeed"))
            .and(query_param("url", "https://acme.test/"))
            .and(query_param("key", "secret"))
            .and(query_param("strategy", "mobile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_body()))
            .mount(&mock_server)
            .await;

        let client = PageSpeedClient::new("secret")
            .unwrap()
            .with_endpoint(format!("{}/runPagespeed", mock_server.uri()));
        let report = client.analyze("https://acme.test/").await.unwrap();

        assert_eq!(report.score, 87);
        assert_eq!(report.strategy, Strategy::Mobile);
        assert_eq!(report.core_web_vitals.lcp, 2100.5);
        assert_eq!(report.core_web_vitals.cls, 0.04);
        assert_eq!(report.core_web_vitals.fcp, 0.0);
        assert_eq!(report.opportunities.len(), 1);
        assert_eq!(report.opportunities[0].id, "render-blocking-resources");
        assert_eq!(report.opportunities[0].savings_ms, Some(421));
    }

    #[tokio::test]
    async fn test_analyze_reports_api_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/runPagespeed"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = PageSpeedClient::new("secret")
            .unwrap()
            .with_endpoint(format!("{}/runPagespeed", mock_server.uri()));
        let err = client.analyze("https://acme.test/").await.unwrap_err();

        assert!(matches!(err, ScanError::HttpStatus { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_lighthouse_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/runPagespeed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let client = PageSpeedClient::new("secret")
            .unwrap()
            .with_endpoint(format!("{}/runPagespeed", mock_server.uri()))
            .with_strategy(Strategy::Desktop);
        let err = client.analyze("https://acme.test/").await.unwrap_err();

        assert!(matches!(err, ScanError::PageSpeedPayload(_)));
    }
}
