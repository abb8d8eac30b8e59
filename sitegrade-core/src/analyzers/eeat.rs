use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const AUTHOR: CheckSpec = CheckSpec::worst_wins("author-info", "Author Information", 15);
const TRUST: CheckSpec = CheckSpec::worst_wins("trust-signals", "Trust Signals", 15);
const ABOUT_LINK: CheckSpec = CheckSpec::worst_wins("about-link", "About Page Link", 10);
const CONTACT: CheckSpec = CheckSpec::best_wins("contact-info", "Contact Information", 15);

static BYLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[Bb]y|[Ww]ritten by|[Aa]uthor:)\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+")
        .expect("byline pattern must compile")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern must compile")
});

const TRUST_TERMS: [&str; 8] = [
    "privacy",
    "terms",
    "testimonial",
    "review",
    "certified",
    "accredited",
    "award",
    "guarantee",
];

/// Experience, expertise, authority and trust signals.
pub struct EeatAnalyzer;

impl EeatAnalyzer {
    fn has_author(page: &PageView<'_>) -> bool {
        page.meta_content("author").is_some()
            || page.count(r#"[rel="author"], [itemprop="author"], .author, .byline"#) > 0
            || page.html().contains(r#""author""#)
            || BYLINE_RE.is_match(&page.visible_text())
    }

    fn trust_signals(page: &PageView<'_>) -> Vec<&'static str> {
        let text = page.visible_text().to_lowercase();
        let hrefs = page.hrefs().join(" ").to_lowercase();
        TRUST_TERMS
            .into_iter()
            .filter(|term| text.contains(term) || hrefs.contains(term))
            .collect()
    }
}

impl Analyzer for EeatAnalyzer {
    fn category(&self) -> Category {
        Category::Eeat
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let mut checks = Vec::with_capacity(4);

        let has_author = Self::has_author(page);
        checks.push(
            AUTHOR
                .check(
                    if has_author { CheckStatus::Pass } else { CheckStatus::Warning },
                    if has_author { 100 } else { 40 },
                    if has_author {
                        "Author information found"
                    } else {
                        "No author information found"
                    },
                )
                .recommend_if(
                    !has_author,
                    "Add author bylines with credentials to demonstrate expertise",
                ),
        );

        let signals = Self::trust_signals(page);
        let trusted = !signals.is_empty();
        checks.push(
            TRUST
                .check(
                    if trusted { CheckStatus::Pass } else { CheckStatus::Warning },
                    if trusted { 100 } else { 50 },
                    if trusted {
                        format!("Trust signals found: {}", signals.join(", "))
                    } else {
                        "No trust signals found".to_string()
                    },
                )
                .with_value(json!({ "signals": signals }))
                .recommend_if(
                    !trusted,
                    "Add trust signals such as testimonials, reviews and a privacy policy",
                ),
        );

        let has_about = page
            .hrefs()
            .iter()
            .any(|h| h.to_ascii_lowercase().contains("about"));
        checks.push(
            ABOUT_LINK
                .check(
                    if has_about { CheckStatus::Pass } else { CheckStatus::Warning },
                    if has_about { 100 } else { 50 },
                    if has_about {
                        "Link to an about page found"
                    } else {
                        "No link to an about page"
                    },
                )
                .recommend_if(!has_about, "Link to an About page describing who runs the site"),
        );

        let has_contact = page.count(r#"a[href^="tel:"], a[href^="mailto:"]"#) > 0
            || page
                .hrefs()
                .iter()
                .any(|h| h.to_ascii_lowercase().contains("contact"))
            || EMAIL_RE.is_match(&page.visible_text());
        checks.push(
            CONTACT
                .check(
                    if has_contact { CheckStatus::Pass } else { CheckStatus::Warning },
                    if has_contact { 100 } else { 40 },
                    if has_contact {
                        "Contact information available"
                    } else {
                        "No contact information found"
                    },
                )
                .recommend_if(!has_contact, "Make contact details easy to find"),
        );

        Ok(CategoryResult::from_checks(checks, "E-E-A-T analysis complete"))
    }
}
