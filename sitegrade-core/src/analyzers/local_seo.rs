use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

// Business details live in headers and footers, so one page having them is enough.
const PHONE: CheckSpec = CheckSpec::best_wins("phone-number", "Phone Number", 15);
const ADDRESS: CheckSpec = CheckSpec::best_wins("address", "Business Address", 15);
const LOCAL_SCHEMA: CheckSpec = CheckSpec::best_wins("local-schema", "Local Business Schema", 20);
const GOOGLE_MAP: CheckSpec = CheckSpec::best_wins("google-map", "Google Map", 10);

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("phone pattern must compile")
});
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(19|20)\d{2}[-/.]\d{2}[-/.]\d{2}").expect("date pattern must compile")
});
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d+\s+[\w\s]+(?:street|st|avenue|ave|road|rd|boulevard|blvd|drive|dr|lane|ln|way|court|ct|place|pl)[\s,]+[\w\s]+,?\s*(?:[A-Z]{2})?\s*\d{5}(?:-\d{4})?",
    )
    .expect("address pattern must compile")
});
static MAP_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)class=["'][^"']*map[^"']*["']|id=["'][^"']*map[^"']*["']|aria-label=["'][^"']*map[^"']*["']"#)
        .expect("map marker pattern must compile")
});

const MAP_EMBED_MARKERS: [&str; 7] = [
    "google.com/maps",
    "maps.google.com",
    "maps.googleapis.com",
    "data-maps-api",
    "maps/embed",
    "maps?q=",
    "maps/place/",
];

pub struct LocalSeoAnalyzer;

impl LocalSeoAnalyzer {
    fn find_phone(page: &PageView<'_>) -> Option<String> {
        if let Some(tel) = page
            .select(r#"a[href^="tel:"]"#)
            .into_iter()
            .find_map(|a| a.value().attr("href"))
        {
            let number = tel.trim_start_matches("tel:").trim();
            if !number.is_empty() {
                return Some(number.to_string());
            }
        }

        let text = page.visible_text();
        PHONE_RE
            .find_iter(&text)
            .map(|m| m.as_str().trim())
            .find(|candidate| !DATE_RE.is_match(candidate))
            .map(str::to_string)
    }

    fn has_local_schema(page: &PageView<'_>) -> bool {
        let in_json_ld = page
            .select(r#"script[type="application/ld+json"]"#)
            .into_iter()
            .any(|s| {
                let body = s.text().collect::<String>();
                body.contains("LocalBusiness") || body.contains("Organization")
            });
        let in_microdata = page.select("[itemtype]").into_iter().any(|el| {
            el.value()
                .attr("itemtype")
                .is_some_and(|t| t.contains("LocalBusiness") || t.contains("Organization"))
        });
        in_json_ld || in_microdata
    }
}

impl Analyzer for LocalSeoAnalyzer {
    fn category(&self) -> Category {
        Category::LocalSeo
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let mut checks = Vec::with_capacity(4);

        let phone = Self::find_phone(page);
        checks.push(match &phone {
            Some(number) => PHONE
                .check(CheckStatus::Pass, 100, format!("Phone number found: {}", number))
                .with_value(json!({ "phone": number })),
            None => PHONE
                .check(CheckStatus::Warning, 30, "No phone number detected")
                .with_value(json!({ "phone": null }))
                .with_recommendation("Add a visible phone number for local SEO"),
        });

        let has_address = ADDRESS_RE.is_match(&page.visible_text());
        checks.push(
            ADDRESS
                .check(
                    if has_address { CheckStatus::Pass } else { CheckStatus::Warning },
                    if has_address { 100 } else { 40 },
                    if has_address {
                        "Street address detected"
                    } else {
                        "No street address found"
                    },
                )
                .with_value(json!({ "hasAddress": has_address }))
                .recommend_if(
                    !has_address,
                    "Show a full street address and add LocalBusiness schema with address data",
                ),
        );

        let has_schema = Self::has_local_schema(page);
        checks.push(
            LOCAL_SCHEMA
                .check(
                    if has_schema { CheckStatus::Pass } else { CheckStatus::Fail },
                    if has_schema { 100 } else { 0 },
                    if has_schema {
                        "LocalBusiness or Organization schema found"
                    } else {
                        "No local business schema markup"
                    },
                )
                .with_value(json!({ "hasSchema": has_schema }))
                .recommend_if(!has_schema, "Add LocalBusiness schema markup for rich results"),
        );

        let html = page.html();
        let has_embed = MAP_EMBED_MARKERS.iter().any(|m| html.contains(m));
        let has_marker = !has_embed && MAP_MARKER_RE.is_match(html);
        let (status, score, message) = if has_embed {
            (CheckStatus::Pass, 100, "Google Maps embed detected")
        } else if has_marker {
            (CheckStatus::Warning, 70, "Map element detected but not verified")
        } else {
            (CheckStatus::Info, 50, "No Google Maps embed found")
        };
        checks.push(
            GOOGLE_MAP
                .check(status, score, message)
                .with_value(json!({ "hasMapIframe": has_embed, "hasMapMarker": has_marker }))
                .recommend_if(has_marker, "Map element detected - verify it displays correctly")
                .recommend_if(
                    !has_embed && !has_marker,
                    "Consider adding a Google Maps embed for local visitors",
                ),
        );

        Ok(CategoryResult::from_checks(checks, "Local SEO analysis complete"))
    }
}
