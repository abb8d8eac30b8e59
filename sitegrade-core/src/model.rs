use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of page types a URL can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Home,
    Contact,
    About,
    Blog,
    Product,
    Service,
    Category,
    Tag,
    Archive,
    Legal,
    Other,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::Contact => "contact",
            PageType::About => "about",
            PageType::Blog => "blog",
            PageType::Product => "product",
            PageType::Service => "service",
            PageType::Category => "category",
            PageType::Tag => "tag",
            PageType::Archive => "archive",
            PageType::Legal => "legal",
            PageType::Other => "other",
        }
    }

    /// Listing pages: category, tag and archive.
    pub fn is_listing(&self) -> bool {
        matches!(self, PageType::Category | PageType::Tag | PageType::Archive)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit categories, declared in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    LocalSeo,
    Seo,
    Links,
    Usability,
    Performance,
    Social,
    Technology,
    TechnicalSeo,
    Content,
    Eeat,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::LocalSeo,
        Category::Seo,
        Category::Links,
        Category::Usability,
        Category::Performance,
        Category::Social,
        Category::Technology,
        Category::TechnicalSeo,
        Category::Content,
        Category::Eeat,
    ];

    /// Key used in JSON payloads and reports.
    pub fn key(&self) -> &'static str {
        match self {
            Category::LocalSeo => "localSeo",
            Category::Seo => "seo",
            Category::Links => "links",
            Category::Usability => "usability",
            Category::Performance => "performance",
            Category::Social => "social",
            Category::Technology => "technology",
            Category::TechnicalSeo => "technicalSeo",
            Category::Content => "content",
            Category::Eeat => "eeat",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::LocalSeo => "Local SEO",
            Category::Seo => "On-Page SEO",
            Category::Links => "Links",
            Category::Usability => "Usability",
            Category::Performance => "Performance",
            Category::Social => "Social",
            Category::Technology => "Technology",
            Category::TechnicalSeo => "Technical SEO",
            Category::Content => "Content Quality",
            Category::Eeat => "E-E-A-T",
        }
    }

    /// Weight of this category in the overall score.
    pub fn weight(&self) -> u32 {
        match self {
            Category::LocalSeo => 25,
            Category::Seo => 15,
            Category::Links => 10,
            Category::Usability => 10,
            Category::Performance => 10,
            Category::Social => 5,
            Category::Technology => 5,
            Category::TechnicalSeo => 8,
            Category::Content => 6,
            Category::Eeat => 6,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
    Info,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Warning => "warning",
            CheckStatus::Fail => "fail",
            CheckStatus::Info => "info",
        }
    }

    /// Rank used by worst-wins merging. Higher is worse; info ranks lowest.
    pub(crate) fn severity(&self) -> u8 {
        match self {
            CheckStatus::Info => 0,
            CheckStatus::Pass => 1,
            CheckStatus::Warning => 2,
            CheckStatus::Fail => 3,
        }
    }

    /// Rank used by best-wins merging. Higher is better.
    pub(crate) fn merit(&self) -> u8 {
        match self {
            CheckStatus::Fail => 0,
            CheckStatus::Info => 1,
            CheckStatus::Warning => 2,
            CheckStatus::Pass => 3,
        }
    }
}

/// How a check combines across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergePolicy {
    /// Page-level finding: any failing page fails the merged check.
    #[default]
    WorstWins,
    /// Site-wide feature: one passing page is enough.
    BestWins,
}

/// One page's contribution to a merged check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFinding {
    pub url: String,
    pub path: String,
    pub status: CheckStatus,
    pub score: u8,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub id: String,
    pub name: String,
    pub status: CheckStatus,
    pub score: u8,
    pub weight: u32,
    #[serde(default)]
    pub value: serde_json::Value,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub merge_policy: MergePolicy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_pages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub page_findings: Vec<PageFinding>,
}

impl Check {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: CheckStatus,
        score: u8,
        weight: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            score: score.min(100),
            weight,
            value: serde_json::Value::Null,
            message: message.into(),
            recommendation: None,
            merge_policy: MergePolicy::WorstWins,
            source_pages: Vec::new(),
            page_findings: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = value;
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn recommend_if(self, condition: bool, recommendation: impl Into<String>) -> Self {
        if condition {
            self.with_recommendation(recommendation)
        } else {
            self
        }
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// True when the check carries a non-empty recommendation.
    pub fn has_recommendation(&self) -> bool {
        self.recommendation
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            50..=59 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score assigned to a (page, category) whose analyzer crashed.
pub const DEGRADED_SCORE: u8 = 25;
/// Score used when a category has no page at all to draw from.
pub const UNAVAILABLE_SCORE: u8 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    pub score: u8,
    pub grade: Grade,
    pub message: String,
    pub checks: Vec<Check>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_pages: Vec<String>,
}

impl CategoryResult {
    /// Builds a single-page result; the score is the weighted mean of the checks.
    pub fn from_checks(checks: Vec<Check>, message: impl Into<String>) -> Self {
        let score = weighted_score(&checks);
        Self {
            score,
            grade: Grade::from_score(score),
            message: message.into(),
            checks,
            source_pages: Vec::new(),
        }
    }

    pub fn with_score(score: u8, message: impl Into<String>, checks: Vec<Check>) -> Self {
        let score = score.min(100);
        Self {
            score,
            grade: Grade::from_score(score),
            message: message.into(),
            checks,
            source_pages: Vec::new(),
        }
    }

    /// Placeholder for an analyzer that failed on one page.
    pub fn degraded(reason: impl fmt::Display) -> Self {
        Self::with_score(
            DEGRADED_SCORE,
            format!("Analysis failed for this page: {}", reason),
            Vec::new(),
        )
    }

    pub fn unavailable() -> Self {
        Self::with_score(
            UNAVAILABLE_SCORE,
            "No pages analyzed for this section",
            Vec::new(),
        )
    }

    /// Re-derives score and grade after checks were appended.
    pub fn rescore(&mut self) {
        self.score = weighted_score(&self.checks);
        self.grade = Grade::from_score(self.score);
    }

    pub fn check(&self, id: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.id == id)
    }
}

/// Weighted mean of check scores; 100 when no check carries weight.
pub fn weighted_score(checks: &[Check]) -> u8 {
    let total_weight: u32 = checks.iter().map(|c| c.weight).sum();
    if total_weight == 0 {
        return 100;
    }
    let weighted: u32 = checks.iter().map(|c| c.score as u32 * c.weight).sum();
    (weighted as f64 / total_weight as f64).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub check_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_pages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageClassification {
    pub url: String,
    #[serde(rename = "type")]
    pub page_type: PageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Which page URLs feed which category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditMapping(BTreeMap<Category, Vec<String>>);

impl AuditMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, urls: Vec<String>) {
        self.0.insert(category, urls);
    }

    pub fn pages(&self, category: Category) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, category: Category, url: &str) -> bool {
        self.pages(category).iter().any(|u| u == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &Vec<String>)> {
        self.0.iter()
    }
}

/// Progress checkpoint emitted while an audit runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditProgress {
    pub progress: u8,
    pub label: String,
    pub pages_total: usize,
    pub pages_analyzed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub audit_id: String,
    pub base_url: String,
    pub generated_at: String,
    pub duration_ms: u64,
    pub overall_score: u8,
    pub overall_grade: Grade,
    #[serde(flatten)]
    pub categories: BTreeMap<Category, CategoryResult>,
    pub recommendations: Vec<Recommendation>,
    pub page_classifications: Vec<PageClassification>,
    pub pages_analyzed: usize,
    pub pages_failed: usize,
    pub audit_mapping: AuditMapping,
}

impl AuditReport {
    pub fn category(&self, category: Category) -> Option<&CategoryResult> {
        self.categories.get(&category)
    }
}
