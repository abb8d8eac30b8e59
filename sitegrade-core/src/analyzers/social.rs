use super::{Analyzer, CheckSpec, PageView};
use crate::error::AnalyzeError;
use crate::model::{Category, CategoryResult, CheckStatus};
use serde_json::json;

const OPEN_GRAPH: CheckSpec = CheckSpec::worst_wins("open-graph", "Open Graph Tags", 20);
const TWITTER_CARD: CheckSpec = CheckSpec::worst_wins("twitter-card", "Twitter Card", 15);
const SOCIAL_LINKS: CheckSpec = CheckSpec::best_wins("social-links", "Social Media Links", 10);

const PLATFORMS: [(&str, &str); 7] = [
    ("facebook", "facebook.com"),
    ("twitter", "twitter.com"),
    ("x", "x.com"),
    ("instagram", "instagram.com"),
    ("linkedin", "linkedin.com"),
    ("youtube", "youtube.com"),
    ("tiktok", "tiktok.com"),
];

pub struct SocialAnalyzer;

impl SocialAnalyzer {
    fn og(page: &PageView<'_>, property: &str) -> Option<String> {
        page.first_attr(&format!(r#"meta[property="og:{}"]"#, property), "content")
            .filter(|c| !c.is_empty())
    }

    fn linked_platforms(page: &PageView<'_>) -> Vec<&'static str> {
        let hosts: Vec<String> = page
            .hrefs()
            .iter()
            .filter_map(|h| page.resolve(h))
            .filter_map(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
            .collect();
        PLATFORMS
            .into_iter()
            .filter(|(_, domain)| {
                hosts
                    .iter()
                    .any(|h| h == domain || h.ends_with(&format!(".{}", domain)))
            })
            .map(|(name, _)| name)
            .collect()
    }
}

impl Analyzer for SocialAnalyzer {
    fn category(&self) -> Category {
        Category::Social
    }

    fn analyze(&self, page: &PageView<'_>) -> Result<CategoryResult, AnalyzeError> {
        let mut checks = Vec::with_capacity(3);

        let og_title = Self::og(page, "title");
        let og_description = Self::og(page, "description");
        let og_image = Self::og(page, "image");
        let present = [&og_title, &og_description, &og_image]
            .iter()
            .filter(|v| v.is_some())
            .count();
        let status = match present {
            3 => CheckStatus::Pass,
            0 => CheckStatus::Fail,
            _ => CheckStatus::Warning,
        };
        checks.push(
            OPEN_GRAPH
                .check(
                    status,
                    ((present as f64 / 3.0) * 100.0).round() as u8,
                    format!("{}/3 essential Open Graph tags present", present),
                )
                .with_value(json!({
                    "title": og_title,
                    "description": og_description,
                    "image": og_image,
                }))
                .recommend_if(
                    present < 3,
                    "Add og:title, og:description and og:image tags for better social sharing",
                ),
        );

        let card = page.meta_content("twitter:card");
        let twitter_title = page.meta_content("twitter:title");
        let (status, score, message) = match (&card, &twitter_title) {
            (Some(_), Some(_)) => (CheckStatus::Pass, 100, "Twitter Card configured"),
            (Some(_), None) => (CheckStatus::Pass, 70, "Twitter Card present without a title"),
            _ => (CheckStatus::Warning, 30, "No Twitter Card tags found"),
        };
        checks.push(
            TWITTER_CARD
                .check(status, score, message)
                .with_value(json!({ "card": card, "title": twitter_title }))
                .recommend_if(card.is_none(), "Add Twitter Card meta tags"),
        );

        let platforms = Self::linked_platforms(page);
        let n = platforms.len();
        let status = match n {
            0 => CheckStatus::Info,
            1..=2 => CheckStatus::Warning,
            _ => CheckStatus::Pass,
        };
        checks.push(
            SOCIAL_LINKS
                .check(
                    status,
                    (n * 25).min(100) as u8,
                    if n > 0 {
                        format!("Links to {} social platform(s): {}", n, platforms.join(", "))
                    } else {
                        "No social media profile links found".to_string()
                    },
                )
                .with_value(json!({ "platforms": platforms }))
                .recommend_if(n < 2, "Link to your social media profiles"),
        );

        Ok(CategoryResult::from_checks(checks, "Social analysis complete"))
    }
}
