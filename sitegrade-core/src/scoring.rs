use crate::model::{Category, CategoryResult, CheckStatus, Grade, Priority, Recommendation};
use std::collections::BTreeMap;

/// Turns failing and warning checks into prioritized recommendations.
///
/// Categories are visited in report order and ids are handed out before the
/// priority sort, which is stable, so equal priorities keep that order.
pub fn generate_recommendations(
    categories: &BTreeMap<Category, CategoryResult>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for category in Category::ALL {
        let Some(result) = categories.get(&category) else {
            continue;
        };
        for check in &result.checks {
            if !matches!(check.status, CheckStatus::Fail | CheckStatus::Warning)
                || !check.has_recommendation()
            {
                continue;
            }
            let priority = if check.status == CheckStatus::Fail {
                Priority::High
            } else if check.score < 50 {
                Priority::Medium
            } else {
                Priority::Low
            };
            let source_pages = if check.source_pages.is_empty() {
                result.source_pages.clone()
            } else {
                check.source_pages.clone()
            };
            recommendations.push(Recommendation {
                id: format!("rec_{}", recommendations.len()),
                title: check.recommendation.clone().unwrap_or_default(),
                description: check.message.clone(),
                category,
                priority,
                check_id: check.id.clone(),
                source_pages,
            });
        }
    }

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

/// Weighted overall score over the categories present.
pub fn overall_score(categories: &BTreeMap<Category, CategoryResult>) -> (u8, Grade) {
    let (weighted, total) = categories
        .iter()
        .fold((0u32, 0u32), |(weighted, total), (category, result)| {
            (
                weighted + result.score as u32 * category.weight(),
                total + category.weight(),
            )
        });
    let score = if total == 0 {
        0
    } else {
        (weighted as f64 / total as f64).round() as u8
    };
    (score, Grade::from_score(score))
}
