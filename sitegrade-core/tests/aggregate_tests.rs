// Tests for cross-page aggregation

use sitegrade_core::aggregate::{PageResults, aggregate};
use sitegrade_core::model::{
    Category, CategoryResult, Check, CheckStatus, Grade, MergePolicy,
};
use std::collections::BTreeMap;

const HOME: &str = "https://acme.test/";
const CONTACT: &str = "https://acme.test/contact";
const BLOG: &str = "https://acme.test/blog/post-1";

fn check(id: &str, status: CheckStatus, score: u8) -> Check {
    Check::new(id, id, status, score, 10, format!("{} {}", id, status.as_str()))
}

fn result(score: u8, checks: Vec<Check>) -> CategoryResult {
    CategoryResult::with_score(score, "analysis complete", checks)
}

fn results(entries: Vec<(&str, Category, CategoryResult)>) -> PageResults {
    let mut map = PageResults::new();
    for (url, category, result) in entries {
        map.entry(url.to_string())
            .or_insert_with(BTreeMap::new)
            .insert(category, result);
    }
    map
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}

fn no_fallback() -> Option<(String, CategoryResult)> {
    None
}

// ============================================================================
// Score Tests
// ============================================================================

#[test]
fn test_category_score_is_mean_of_pages() {
    let page_results = results(vec![
        (HOME, Category::Seo, result(80, vec![])),
        (CONTACT, Category::Seo, result(60, vec![])),
        (BLOG, Category::Seo, result(100, vec![])),
    ]);
    let merged = aggregate(
        Category::Seo,
        &urls(&[HOME, CONTACT, BLOG]),
        &page_results,
        no_fallback,
    );
    assert_eq!(merged.score, 80);
    assert_eq!(merged.grade, Grade::A);
    assert_eq!(merged.source_pages, urls(&[HOME, CONTACT, BLOG]));
    assert_eq!(merged.message, "Based on 3 pages");
}

#[test]
fn test_score_stays_within_page_bounds() {
    let page_results = results(vec![
        (HOME, Category::Links, result(41, vec![])),
        (CONTACT, Category::Links, result(42, vec![])),
    ]);
    let merged = aggregate(
        Category::Links,
        &urls(&[HOME, CONTACT]),
        &page_results,
        no_fallback,
    );
    assert!(merged.score >= 41 && merged.score <= 42);
}

#[test]
fn test_unmapped_pages_are_ignored() {
    let page_results = results(vec![
        (HOME, Category::Seo, result(90, vec![])),
        (CONTACT, Category::Seo, result(10, vec![])),
    ]);
    let merged = aggregate(Category::Seo, &urls(&[HOME]), &page_results, no_fallback);
    assert_eq!(merged.score, 90);
    assert_eq!(merged.source_pages, urls(&[HOME]));
    assert_eq!(merged.message, "Based on 1 page");
}

// ============================================================================
// Merge Policy Tests
// ============================================================================

#[test]
fn test_worst_wins_fail_beats_pass() {
    let page_results = results(vec![
        (HOME, Category::Seo, result(100, vec![check("title-tag", CheckStatus::Pass, 100)])),
        (CONTACT, Category::Seo, result(0, vec![check("title-tag", CheckStatus::Fail, 0)])),
    ]);
    let merged = aggregate(
        Category::Seo,
        &urls(&[HOME, CONTACT]),
        &page_results,
        no_fallback,
    );
    let title = merged.check("title-tag").unwrap();
    assert_eq!(title.status, CheckStatus::Fail);
    assert_eq!(title.score, 50);
    assert_eq!(title.message, "title-tag fail");
    assert_eq!(title.source_pages, urls(&[HOME, CONTACT]));
    assert_eq!(title.page_findings.len(), 2);
    assert_eq!(title.page_findings[1].path, "/contact");
}

#[test]
fn test_worst_wins_warning_beats_pass() {
    let page_results = results(vec![
        (HOME, Category::Seo, result(100, vec![check("h1-tag", CheckStatus::Pass, 100)])),
        (BLOG, Category::Seo, result(70, vec![check("h1-tag", CheckStatus::Warning, 70)])),
    ]);
    let merged = aggregate(Category::Seo, &urls(&[HOME, BLOG]), &page_results, no_fallback);
    assert_eq!(merged.check("h1-tag").unwrap().status, CheckStatus::Warning);
}

#[test]
fn test_worst_wins_all_info_stays_info() {
    let page_results = results(vec![
        (HOME, Category::Links, result(60, vec![check("external-links", CheckStatus::Info, 60)])),
        (BLOG, Category::Links, result(60, vec![check("external-links", CheckStatus::Info, 60)])),
    ]);
    let merged = aggregate(Category::Links, &urls(&[HOME, BLOG]), &page_results, no_fallback);
    assert_eq!(
        merged.check("external-links").unwrap().status,
        CheckStatus::Info
    );
}

#[test]
fn test_worst_wins_keeps_recommendation_of_worst_page() {
    let page_results = results(vec![
        (HOME, Category::Seo, result(100, vec![check("canonical-url", CheckStatus::Pass, 100)])),
        (
            BLOG,
            Category::Seo,
            result(
                50,
                vec![check("canonical-url", CheckStatus::Warning, 50)
                    .with_recommendation("Add a canonical URL")],
            ),
        ),
    ]);
    let merged = aggregate(Category::Seo, &urls(&[HOME, BLOG]), &page_results, no_fallback);
    assert_eq!(
        merged.check("canonical-url").unwrap().recommendation.as_deref(),
        Some("Add a canonical URL")
    );
}

#[test]
fn test_best_wins_google_map_pass_on_any_page() {
    let map = |status, score| {
        check("google-map", status, score).with_merge_policy(MergePolicy::BestWins)
    };
    let page_results = results(vec![
        (HOME, Category::LocalSeo, result(100, vec![map(CheckStatus::Pass, 100)])),
        (CONTACT, Category::LocalSeo, result(50, vec![map(CheckStatus::Info, 50)])),
    ]);
    let merged = aggregate(
        Category::LocalSeo,
        &urls(&[HOME, CONTACT]),
        &page_results,
        no_fallback,
    );
    let google_map = merged.check("google-map").unwrap();
    assert_eq!(google_map.status, CheckStatus::Pass);
    assert_eq!(google_map.score, 100);
    assert_eq!(google_map.message, "google-map pass");
    assert_eq!(google_map.page_findings.len(), 2);
}

#[test]
fn test_best_wins_prefers_warning_over_info_over_fail() {
    let social = |status, score| {
        check("social-links", status, score).with_merge_policy(MergePolicy::BestWins)
    };
    let page_results = results(vec![
        (HOME, Category::Social, result(0, vec![social(CheckStatus::Fail, 0)])),
        (BLOG, Category::Social, result(50, vec![social(CheckStatus::Info, 50)])),
        (CONTACT, Category::Social, result(25, vec![social(CheckStatus::Warning, 25)])),
    ]);
    let merged = aggregate(
        Category::Social,
        &urls(&[HOME, BLOG, CONTACT]),
        &page_results,
        no_fallback,
    );
    let links = merged.check("social-links").unwrap();
    assert_eq!(links.status, CheckStatus::Warning);
    // Score is the best score seen, not the representative's.
    assert_eq!(links.score, 50);
}

#[test]
fn test_checks_keep_first_seen_order() {
    let page_results = results(vec![
        (
            HOME,
            Category::Seo,
            result(100, vec![check("b", CheckStatus::Pass, 100), check("a", CheckStatus::Pass, 100)]),
        ),
        (
            BLOG,
            Category::Seo,
            result(100, vec![check("c", CheckStatus::Pass, 100), check("a", CheckStatus::Pass, 100)]),
        ),
    ]);
    let merged = aggregate(Category::Seo, &urls(&[HOME, BLOG]), &page_results, no_fallback);
    let ids: Vec<&str> = merged.checks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
}

// ============================================================================
// Fallback Tests
// ============================================================================

#[test]
fn test_fallback_when_no_mapped_page_has_result() {
    // The blog page was routed but its type never ran this analyzer.
    let page_results = results(vec![(BLOG, Category::Content, result(90, vec![]))]);
    let merged = aggregate(Category::LocalSeo, &urls(&[BLOG]), &page_results, || {
        Some((HOME.to_string(), result(70, vec![check("address", CheckStatus::Warning, 40)])))
    });
    assert_eq!(merged.source_pages, urls(&[HOME]));
    assert_eq!(merged.score, 70);
    assert_eq!(merged.check("address").unwrap().source_pages, urls(&[HOME]));
}

#[test]
fn test_fallback_not_used_when_results_exist() {
    let page_results = results(vec![(HOME, Category::Seo, result(90, vec![]))]);
    let merged = aggregate(Category::Seo, &urls(&[HOME]), &page_results, || {
        panic!("fallback must not run")
    });
    assert_eq!(merged.score, 90);
}

#[test]
fn test_unavailable_without_fallback() {
    let merged = aggregate(Category::Eeat, &urls(&[BLOG]), &PageResults::new(), no_fallback);
    assert_eq!(merged.score, 50);
    assert_eq!(merged.grade, Grade::D);
    assert!(merged.checks.is_empty());
}
