use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus};
use serde_json::json;

const MOBILE: CheckSpec = CheckSpec::worst_wins("mobile-friendly", "Mobile Friendly", 20);
const FAVICON: CheckSpec = CheckSpec::worst_wins("favicon", "Favicon", 5);
const FORM_LABELS: CheckSpec = CheckSpec::worst_wins("form-labels", "Form Labels", 8);
const READABILITY: CheckSpec = CheckSpec::worst_wins("readability", "Readability", 10);

const MIN_WORDS_FOR_READABILITY: usize = 50;

pub struct UsabilityAnalyzer;

impl UsabilityAnalyzer {
    /// Average words per sentence over the visible text, with the word count.
    fn sentence_stats(page: &PageView<'_>) -> (usize, f64) {
        let text = page.visible_text();
        let words = text.split_whitespace().count();
        let sentences = text
            .split(['.', '!', '?'])
            .filter(|s| s.split_whitespace().next().is_some())
            .count()
            .max(1);
        (words, words as f64 / sentences as f64)
    }
}

impl Analyzer for UsabilityAnalyzer {
    fn category(&self) -> Category {
        Category::Usability
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let mut checks = Vec::with_capacity(4);

        let responsive = page
            .meta_content("viewport")
            .is_some_and(|v| v.to_ascii_lowercase().contains("width=device-width"));
        checks.push(if responsive {
            MOBILE.check(CheckStatus::Pass, 100, "Responsive viewport configured")
        } else {
            MOBILE
                .check(CheckStatus::Fail, 20, "Page is not configured for mobile devices")
                .with_recommendation("Set <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")
        });

        let has_favicon = page
            .select("link[rel]")
            .into_iter()
            .any(|l| l.value().attr("rel").is_some_and(|r| r.to_ascii_lowercase().contains("icon")));
        checks.push(if has_favicon {
            FAVICON.check(CheckStatus::Pass, 100, "Favicon found")
        } else {
            FAVICON
                .check(CheckStatus::Warning, 60, "No favicon link found")
                .with_recommendation("Add a favicon for brand recognition in browser tabs")
        });

        let inputs = page.count(
            r#"input:not([type="hidden"]):not([type="submit"]):not([type="button"]), select, textarea"#,
        );
        let labels = page.count("label");
        let labelled = inputs == 0 || labels as f64 >= inputs as f64 * 0.8;
        checks.push(
            FORM_LABELS
                .check(
                    if labelled { CheckStatus::Pass } else { CheckStatus::Warning },
                    if labelled { 100 } else { 50 },
                    if inputs == 0 {
                        "No form fields on this page".to_string()
                    } else {
                        format!("{} labels for {} form fields", labels, inputs)
                    },
                )
                .with_value(json!({ "inputs": inputs, "labels": labels }))
                .recommend_if(!labelled, "Add <label> elements to all form fields"),
        );

        let (words, avg) = Self::sentence_stats(page);
        let value = json!({ "words": words, "avgSentenceLength": (avg * 10.0).round() / 10.0 });
        checks.push(if words < MIN_WORDS_FOR_READABILITY {
            READABILITY
                .check(CheckStatus::Info, 100, "Not enough text to assess readability")
                .with_value(value)
        } else if avg <= 20.0 {
            READABILITY
                .check(
                    CheckStatus::Pass,
                    100,
                    format!("Average sentence length {:.1} words", avg),
                )
                .with_value(value)
        } else {
            READABILITY
                .check(
                    CheckStatus::Warning,
                    if avg <= 25.0 { 70 } else { 50 },
                    format!("Long sentences: {:.1} words on average", avg),
                )
                .with_value(value)
                .with_recommendation("Shorten sentences to improve readability")
        });

        Ok(CategoryResult::from_checks(checks, "Usability analysis complete"))
    }
}
