use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus};
use serde_json::json;

const INTERNAL: CheckSpec = CheckSpec::worst_wins("internal-links", "Internal Links", 15);
const EXTERNAL: CheckSpec = CheckSpec::worst_wins("external-links", "External Links", 10);
const EMPTY: CheckSpec = CheckSpec::worst_wins("empty-links", "Empty Links", 10);

/// Link profile of a single page.
pub struct LinksAnalyzer;

impl Analyzer for LinksAnalyzer {
    fn category(&self) -> Category {
        Category::Links
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let host = page.host();
        let mut internal = 0usize;
        let mut external = 0usize;
        for href in page.hrefs() {
            let Some(url) = page.resolve(&href) else {
                continue;
            };
            if !matches!(url.scheme(), "http" | "https") {
                continue;
            }
            match (url.host_str(), host.as_deref()) {
                (Some(h), Some(own)) if h.eq_ignore_ascii_case(own) => internal += 1,
                _ => external += 1,
            }
        }

        // Anchors without a target or pointing at "#" lead nowhere.
        let empty = page
            .select("a")
            .into_iter()
            .filter(|a| {
                a.value()
                    .attr("href")
                    .is_none_or(|h| h.trim().is_empty() || h.trim() == "#")
            })
            .count();

        let mut checks = Vec::with_capacity(3);

        let status = match internal {
            5.. => CheckStatus::Pass,
            2..=4 => CheckStatus::Warning,
            _ => CheckStatus::Fail,
        };
        let score = match internal {
            10.. => 100,
            5..=9 => 80,
            2..=4 => 50,
            _ => 20,
        };
        checks.push(
            INTERNAL
                .check(status, score, format!("Found {} internal links", internal))
                .with_value(json!({ "count": internal }))
                .recommend_if(internal < 5, "Add more internal links to related pages"),
        );

        let status = match external {
            0 => CheckStatus::Info,
            1..=50 => CheckStatus::Pass,
            _ => CheckStatus::Warning,
        };
        checks.push(
            EXTERNAL
                .check(
                    status,
                    if external >= 1 { 80 } else { 60 },
                    format!("Found {} external links", external),
                )
                .with_value(json!({ "count": external })),
        );

        let empty_score = 100usize.saturating_sub(empty * 20) as u8;
        checks.push(if empty == 0 {
            EMPTY
                .check(CheckStatus::Pass, 100, "No empty links found")
                .with_value(json!({ "count": 0 }))
        } else {
            EMPTY
                .check(
                    CheckStatus::Warning,
                    empty_score,
                    format!("Found {} empty or placeholder links", empty),
                )
                .with_value(json!({ "count": empty }))
                .with_recommendation("Fix or remove links with empty or '#' targets")
        });

        Ok(CategoryResult::from_checks(checks, "Links analysis complete"))
    }
}
