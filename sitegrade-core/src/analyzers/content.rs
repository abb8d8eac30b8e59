use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus, PageType};
use serde_json::json;

const WORD_COUNT: CheckSpec = CheckSpec::worst_wins("word-count", "Content Length", 15);
const HEADINGS: CheckSpec = CheckSpec::worst_wins("heading-structure", "Heading Structure", 10);
const CONTEXT_LINKS: CheckSpec =
    CheckSpec::worst_wins("contextual-internal-links", "Contextual Internal Links", 10);

/// Below this many words a page is not expected to carry contextual links.
const LINK_CHECK_MIN_WORDS: usize = 500;

/// Content depth and structure. Listing pages skip the depth checks and
/// terminal pages (about, contact) get relaxed heading rules.
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    fn heading_check(page: &PageView<'_>) -> crate::model::Check {
        let counts: Vec<usize> = (1..=4).map(|level| page.count(&format!("h{}", level))).collect();
        let (h1, h2, h3, h4) = (counts[0], counts[1], counts[2], counts[3]);
        let terminal = matches!(page.page_type, PageType::About | PageType::Contact);

        let skipped = if h1 > 0 && h2 == 0 && (h3 > 0 || h4 > 0) {
            Some("Skipped heading level: H1 to H3/H4 without H2")
        } else if h1 > 0 && h2 > 0 && h3 == 0 && h4 > 0 {
            Some("Skipped heading level: H2 to H4 without H3")
        } else {
            None
        };

        let value = json!({
            "h1Count": h1, "h2Count": h2, "h3Count": h3, "h4Count": h4,
            "skippedLevels": skipped.is_some(), "isTerminalPage": terminal,
        });

        if h1 == 0 {
            return HEADINGS
                .check(CheckStatus::Fail, 0, "No H1 tag found")
                .with_value(value)
                .with_recommendation("Add exactly one H1 tag per page");
        }

        match skipped {
            Some(message) if terminal => HEADINGS
                .check(CheckStatus::Warning, 70, message)
                .with_value(value)
                .with_recommendation(
                    "Consider fixing skipped heading levels for better accessibility",
                ),
            Some(message) => HEADINGS
                .check(CheckStatus::Fail, 30, message)
                .with_value(value)
                .with_recommendation(
                    "Fix skipped heading levels - keep a proper hierarchy (H1 -> H2 -> H3 -> H4)",
                ),
            None => HEADINGS
                .check(
                    CheckStatus::Pass,
                    100,
                    format!("Found {} H1, {} H2, {} H3, {} H4 tags", h1, h2, h3, h4),
                )
                .with_value(value),
        }
    }

    fn contextual_link_count(page: &PageView<'_>) -> usize {
        let scoped = page.select("main a[href], article a[href]");
        let anchors = if scoped.is_empty() {
            page.select("a[href]")
        } else {
            scoped
        };
        anchors
            .into_iter()
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| page.is_internal(href))
            .count()
    }
}

impl Analyzer for ContentAnalyzer {
    fn category(&self) -> Category {
        Category::Content
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let mut checks = Vec::with_capacity(3);
        let words = page.word_count();

        if !page.page_type.is_listing() {
            let (status, score) = match words {
                1000.. => (CheckStatus::Pass, 100),
                300..=999 => (CheckStatus::Pass, 80),
                100..=299 => (CheckStatus::Warning, 50),
                _ => (CheckStatus::Fail, 20),
            };
            checks.push(
                WORD_COUNT
                    .check(status, score, format!("Page contains {} words", words))
                    .with_value(json!({ "wordCount": words }))
                    .recommend_if(
                        words < 300,
                        "Add more content (aim for 300+ words for informational pages)",
                    ),
            );
            checks.push(Self::heading_check(page));
        }

        let links = Self::contextual_link_count(page);
        let exempt = matches!(
            page.page_type,
            PageType::Home | PageType::About | PageType::Contact
        );
        let required = words > LINK_CHECK_MIN_WORDS && !exempt;
        let (status, score) = if !required {
            (CheckStatus::Pass, 100)
        } else {
            match links {
                5.. => (CheckStatus::Pass, 100),
                3..=4 => (CheckStatus::Pass, 80),
                1..=2 => (CheckStatus::Warning, 50),
                _ => (CheckStatus::Fail, 20),
            }
        };
        let message = if required {
            format!("Found {} contextual internal links", links)
        } else if page.page_type == PageType::Home {
            format!(
                "Found {} internal links (homepage relies on navigation, no minimum required)",
                links
            )
        } else {
            format!(
                "Found {} contextual internal links (no minimum required for this page)",
                links
            )
        };
        checks.push(
            CONTEXT_LINKS
                .check(status, score, message)
                .with_value(json!({ "count": links, "wordCount": words }))
                .recommend_if(
                    required && links < 3,
                    "Add more contextual internal links within your content",
                ),
        );

        Ok(CategoryResult::from_checks(checks, "Content analysis complete"))
    }
}
