//! Folds per-page category results into one site-level result.

use crate::classify::url_path;
use crate::model::{
    Category, CategoryResult, Check, CheckStatus, Grade, MergePolicy, PageFinding,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Category results of every analyzed page, keyed by page URL.
pub type PageResults = HashMap<String, BTreeMap<Category, CategoryResult>>;

/// Merges the results of `pages` for `category`.
///
/// When none of the mapped pages produced a result, `fallback` is asked to
/// analyze a substitute page and the result is attributed to it alone. With
/// no fallback either, the category is reported as unavailable.
pub fn aggregate<F>(
    category: Category,
    pages: &[String],
    results: &PageResults,
    fallback: F,
) -> CategoryResult
where
    F: FnOnce() -> Option<(String, CategoryResult)>,
{
    let contributing: Vec<(&str, &CategoryResult)> = pages
        .iter()
        .filter_map(|url| {
            results
                .get(url)
                .and_then(|per_page| per_page.get(&category))
                .map(|result| (url.as_str(), result))
        })
        .collect();

    if contributing.is_empty() {
        return match fallback() {
            Some((url, result)) => {
                warn!(
                    "{}: no mapped page produced a result, falling back to {}",
                    category, url
                );
                merge_pages(&[(url.as_str(), &result)])
            }
            None => {
                warn!("{}: no page available, reporting as unavailable", category);
                CategoryResult::unavailable()
            }
        };
    }

    debug!("{}: merging {} page result(s)", category, contributing.len());
    merge_pages(&contributing)
}

fn merge_pages(pages: &[(&str, &CategoryResult)]) -> CategoryResult {
    let score = mean(pages.iter().map(|(_, r)| r.score));

    // Group checks by id, keeping first-seen order.
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<(&str, &Check)>> = HashMap::new();
    for &(url, result) in pages {
        for check in &result.checks {
            let entry = grouped.entry(check.id.as_str()).or_insert_with(|| {
                order.push(check.id.as_str());
                Vec::new()
            });
            entry.push((url, check));
        }
    }

    let checks = order
        .into_iter()
        .filter_map(|id| grouped.get(id).map(|group| merge_check(group)))
        .collect();

    let count = pages.len();
    CategoryResult {
        score,
        grade: Grade::from_score(score),
        message: format!(
            "Based on {} page{}",
            count,
            if count == 1 { "" } else { "s" }
        ),
        checks,
        source_pages: pages.iter().map(|(url, _)| url.to_string()).collect(),
    }
}

/// Merges one check across pages according to its merge policy.
fn merge_check(group: &[(&str, &Check)]) -> Check {
    let (_, first) = group[0];

    let (status, representative, score) = match first.merge_policy {
        MergePolicy::WorstWins => {
            let status = worst_status(group.iter().map(|(_, c)| c.status));
            let representative = group
                .iter()
                .find(|(_, c)| c.status == status)
                .map_or(first, |(_, c)| *c);
            (status, representative, mean(group.iter().map(|(_, c)| c.score)))
        }
        MergePolicy::BestWins => {
            // max_by_key keeps the last maximum, so scan in reverse to keep the first.
            let representative = group
                .iter()
                .rev()
                .max_by_key(|(_, c)| c.status.merit())
                .map_or(first, |(_, c)| *c);
            let score = group.iter().map(|(_, c)| c.score).max().unwrap_or(0);
            (representative.status, representative, score)
        }
    };

    Check {
        id: first.id.clone(),
        name: first.name.clone(),
        status,
        score,
        weight: first.weight,
        value: representative.value.clone(),
        message: representative.message.clone(),
        recommendation: representative.recommendation.clone(),
        merge_policy: first.merge_policy,
        source_pages: group.iter().map(|(url, _)| url.to_string()).collect(),
        page_findings: group
            .iter()
            .map(|(url, check)| PageFinding {
                url: url.to_string(),
                path: url_path(url),
                status: check.status,
                score: check.score,
                message: check.message.clone(),
            })
            .collect(),
    }
}

/// fail > warning > pass; a check that was informational everywhere stays info.
fn worst_status(statuses: impl Iterator<Item = CheckStatus>) -> CheckStatus {
    statuses
        .max_by_key(|s| s.severity())
        .unwrap_or(CheckStatus::Info)
}

fn mean(scores: impl Iterator<Item = u8>) -> u8 {
    let (sum, n) = scores.fold((0u32, 0u32), |(sum, n), s| (sum + s as u32, n + 1));
    if n == 0 {
        0
    } else {
        (sum as f64 / n as f64).round() as u8
    }
}
