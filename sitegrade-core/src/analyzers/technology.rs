use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const VIEWPORT: CheckSpec = CheckSpec::worst_wins("viewport", "Viewport Meta Tag", 15);
const DOCTYPE: CheckSpec = CheckSpec::worst_wins("doctype", "HTML5 Doctype", 20);
const LANG: CheckSpec = CheckSpec::worst_wins("lang-attribute", "Language Attribute", 8);
const STRUCTURED_DATA: CheckSpec = CheckSpec::worst_wins("structured-data", "Structured Data", 15);

static DOCTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype\s+html").expect("doctype pattern must compile"));

pub struct TechnologyAnalyzer;

impl Analyzer for TechnologyAnalyzer {
    fn category(&self) -> Category {
        Category::Technology
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let viewport = page.meta_content("viewport");
        let has_doctype = DOCTYPE_RE.is_match(page.html());
        let lang = page.first_attr("html", "lang").filter(|l| !l.is_empty());
        let has_structured = page.count(r#"script[type="application/ld+json"], [itemtype]"#) > 0;

        let checks = vec![
            match &viewport {
                Some(content) => VIEWPORT
                    .check(CheckStatus::Pass, 100, "Viewport meta tag present")
                    .with_value(json!({ "content": content })),
                None => VIEWPORT
                    .check(CheckStatus::Fail, 0, "Missing viewport meta tag")
                    .with_recommendation("Add a viewport meta tag for mobile rendering"),
            },
            if has_doctype {
                DOCTYPE.check(CheckStatus::Pass, 100, "HTML5 doctype declared")
            } else {
                DOCTYPE
                    .check(CheckStatus::Fail, 0, "No HTML5 doctype declaration")
                    .with_recommendation("Declare <!DOCTYPE html> at the top of the document")
            },
            match &lang {
                Some(code) => LANG
                    .check(CheckStatus::Pass, 100, format!("Language declared: {}", code))
                    .with_value(json!({ "lang": code })),
                None => LANG
                    .check(CheckStatus::Warning, 60, "No lang attribute on <html>")
                    .with_recommendation("Add a lang attribute to the <html> element"),
            },
            if has_structured {
                STRUCTURED_DATA.check(CheckStatus::Pass, 100, "Structured data found")
            } else {
                STRUCTURED_DATA
                    .check(CheckStatus::Warning, 40, "No structured data found")
                    .with_recommendation("Add JSON-LD structured data (schema.org)")
            },
        ];

        Ok(CategoryResult::from_checks(checks, "Technology analysis complete"))
    }
}
