use super::{Analyzer, CheckSpec, PageView, percentage, truncate};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus};
use serde_json::json;

const TITLE: CheckSpec = CheckSpec::worst_wins("title-tag", "Title Tag", 15);
const META_DESCRIPTION: CheckSpec = CheckSpec::worst_wins("meta-description", "Meta Description", 12);
const H1: CheckSpec = CheckSpec::worst_wins("h1-tag", "H1 Tag", 10);
const CANONICAL: CheckSpec = CheckSpec::worst_wins("canonical-url", "Canonical URL", 8);
const IMAGE_ALT: CheckSpec =
    CheckSpec::worst_wins("content-image-accessibility", "Content Image Accessibility", 8);

/// On-page SEO: title, description, headings, canonical and image alt text.
pub struct SeoAnalyzer;

impl Analyzer for SeoAnalyzer {
    fn category(&self) -> Category {
        Category::Seo
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let mut checks = Vec::with_capacity(5);

        let title = page.first_text("title").unwrap_or_default();
        let title_len = title.chars().count();
        let title_ok = (30..=60).contains(&title_len);
        let (status, score) = match title_len {
            0 => (CheckStatus::Fail, 0),
            _ if title_ok => (CheckStatus::Pass, 100),
            _ => (CheckStatus::Warning, 50),
        };
        checks.push(
            TITLE
                .check(
                    status,
                    score,
                    if title_len > 0 {
                        format!(
                            "Title tag found ({} chars): \"{}\"",
                            title_len,
                            truncate(&title, 50)
                        )
                    } else {
                        "No title tag found".to_string()
                    },
                )
                .with_value(json!({ "title": title, "length": title_len }))
                .recommend_if(title_len == 0, "Add a descriptive title tag (30-60 characters)")
                .recommend_if(
                    title_len > 0 && !title_ok,
                    "Optimize title length to 30-60 characters",
                ),
        );

        let description = page.meta_content("description").unwrap_or_default();
        let desc_len = description.chars().count();
        let (status, score) = match desc_len {
            0 => (CheckStatus::Fail, 0),
            120..=160 => (CheckStatus::Pass, 100),
            _ => (CheckStatus::Warning, 50),
        };
        checks.push(
            META_DESCRIPTION
                .check(
                    status,
                    score,
                    if desc_len > 0 {
                        format!("Meta description found ({} chars)", desc_len)
                    } else {
                        "No meta description found".to_string()
                    },
                )
                .with_value(json!({ "description": description, "length": desc_len }))
                .recommend_if(
                    desc_len == 0,
                    "Add a compelling meta description (120-160 characters)",
                )
                .recommend_if(
                    desc_len > 0 && !(120..=160).contains(&desc_len),
                    "Adjust the meta description to 120-160 characters",
                ),
        );

        let h1_count = page.count("h1");
        let (status, score, message) = match h1_count {
            0 => (CheckStatus::Fail, 0, "No H1 tag found".to_string()),
            1 => (CheckStatus::Pass, 100, "Single H1 tag found".to_string()),
            n => (
                CheckStatus::Warning,
                70,
                format!("Multiple H1 tags found ({})", n),
            ),
        };
        checks.push(
            H1.check(status, score, message)
                .with_value(json!({ "count": h1_count }))
                .recommend_if(h1_count == 0, "Add exactly one H1 tag per page")
                .recommend_if(h1_count > 1, "Use only one H1 tag per page"),
        );

        let canonical = page.first_attr(r#"link[rel="canonical"]"#, "href");
        checks.push(match &canonical {
            Some(href) if !href.is_empty() => CANONICAL
                .check(CheckStatus::Pass, 100, format!("Canonical URL set: {}", href))
                .with_value(json!({ "canonical": href })),
            _ => CANONICAL
                .check(CheckStatus::Warning, 50, "No canonical URL defined")
                .with_value(json!({ "canonical": null }))
                .with_recommendation(
                    "Add a canonical URL to prevent duplicate content issues",
                ),
        });

        let images = page.select("img");
        let with_alt = images
            .iter()
            .filter(|img| {
                img.value()
                    .attr("alt")
                    .is_some_and(|alt| !alt.trim().is_empty())
            })
            .count();
        let alt_pct = percentage(with_alt, images.len());
        let status = match alt_pct {
            90..=100 => CheckStatus::Pass,
            50..=89 => CheckStatus::Warning,
            _ => CheckStatus::Fail,
        };
        checks.push(
            IMAGE_ALT
                .check(
                    status,
                    alt_pct,
                    format!(
                        "{}/{} content images have alt tags ({}%)",
                        with_alt,
                        images.len(),
                        alt_pct
                    ),
                )
                .with_value(json!({ "total": images.len(), "withAlt": with_alt, "percentage": alt_pct }))
                .recommend_if(
                    alt_pct < 90,
                    "Add descriptive alt text to content images for accessibility and SEO",
                ),
        );

        Ok(CategoryResult::from_checks(
            checks,
            "On-Page SEO analysis complete",
        ))
    }
}
