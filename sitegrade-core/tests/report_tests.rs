// Tests for report rendering

use sitegrade_core::model::{
    AuditMapping, AuditReport, Category, CategoryResult, Check, CheckStatus, Grade,
    PageClassification, PageType, Priority, Recommendation,
};
use sitegrade_core::report::{
    ReportFormat, generate_csv_report, generate_json_report, generate_markdown_report,
    generate_text_report, render, save_report, wrap_text,
};
use std::collections::BTreeMap;

fn sample_report() -> AuditReport {
    let mut categories = BTreeMap::new();
    for category in Category::ALL {
        categories.insert(
            category,
            CategoryResult::with_score(80, "Based on 1 page", vec![]),
        );
    }
    categories.insert(
        Category::Seo,
        CategoryResult::from_checks(
            vec![
                Check::new("title-tag", "Title Tag", CheckStatus::Fail, 0, 15, "No title tag found")
                    .with_recommendation("Add a descriptive title tag"),
                Check::new("h1-tag", "H1 Tag", CheckStatus::Pass, 100, 10, "Single H1 | ok"),
            ],
            "Based on 1 page",
        ),
    );

    let mut mapping = AuditMapping::new();
    mapping.insert(Category::Seo, vec!["https://acme.test/".to_string()]);

    AuditReport {
        audit_id: "00000000-0000-4000-8000-000000000000".to_string(),
        base_url: "https://acme.test".to_string(),
        generated_at: "2026-01-01T00:00:00+00:00".to_string(),
        duration_ms: 1234,
        overall_score: 74,
        overall_grade: Grade::B,
        categories,
        recommendations: vec![Recommendation {
            id: "rec_0".to_string(),
            title: "Add a descriptive title tag".to_string(),
            description: "No title tag found, \"really\"".to_string(),
            category: Category::Seo,
            priority: Priority::High,
            check_id: "title-tag".to_string(),
            source_pages: vec!["https://acme.test/".to_string()],
        }],
        page_classifications: vec![PageClassification {
            url: "https://acme.test/".to_string(),
            page_type: PageType::Home,
            title: Some("Acme".to_string()),
        }],
        pages_analyzed: 1,
        pages_failed: 0,
        audit_mapping: mapping,
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str_text() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
}

#[test]
fn test_report_format_from_str_json() {
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_markdown_and_md() {
    assert!(matches!(
        ReportFormat::from_str("markdown"),
        Some(ReportFormat::Markdown)
    ));
    assert!(matches!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown)));
}

#[test]
fn test_report_format_from_str_csv() {
    assert!(matches!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("pdf").is_none());
    assert!(ReportFormat::from_str("html").is_none());
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[test]
fn test_text_report_contains_summary() {
    let text = generate_text_report(&sample_report());
    assert!(text.contains("SITEGRADE SEO AUDIT REPORT"));
    assert!(text.contains("74/100  (grade B)"));
    assert!(text.contains("On-Page SEO"));
    assert!(text.contains("[HIGH] Add a descriptive title tag"));
    assert!(text.contains("End of Report"));
}

#[test]
fn test_text_report_lists_page_sections() {
    let text = generate_text_report(&sample_report());
    assert!(text.contains("[home    ] https://acme.test/"));
    assert!(text.contains("sections: seo"));
}

#[test]
fn test_json_report_round_trips_audit() {
    let json = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["metadata"]["generator"], "Sitegrade");
    assert_eq!(value["audit"]["overallScore"], 74);
    assert_eq!(value["audit"]["overallGrade"], "B");
    // Categories are flattened into the report under their keys.
    assert_eq!(value["audit"]["seo"]["checks"][0]["id"], "title-tag");
    assert_eq!(value["audit"]["technicalSeo"]["score"], 80);
    assert_eq!(value["audit"]["pageClassifications"][0]["type"], "home");
    assert_eq!(value["audit"]["recommendations"][0]["priority"], "HIGH");
    assert_eq!(value["audit"]["auditMapping"]["seo"][0], "https://acme.test/");
}

#[test]
fn test_markdown_report_has_tables() {
    let md = generate_markdown_report(&sample_report());
    assert!(md.starts_with("# SEO Audit: https://acme.test"));
    assert!(md.contains("| Category | Score | Grade | Pages |"));
    assert!(md.contains("- **HIGH** Add a descriptive title tag"));
    // Pipes inside messages are escaped.
    assert!(md.contains("Single H1 \\| ok"));
}

#[test]
fn test_csv_report_escapes_fields() {
    let csv = generate_csv_report(&sample_report()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,priority,category,check_id,title,description,pages")
    );
    assert_eq!(
        lines.next(),
        Some("rec_0,HIGH,seo,title-tag,Add a descriptive title tag,\"No title tag found, \"\"really\"\"\",https://acme.test/")
    );
    assert!(lines.next().is_none());
}

#[test]
fn test_csv_report_quotes_carriage_returns() {
    let mut report = sample_report();
    report.recommendations[0].description = "line one\rline two".to_string();

    let csv = generate_csv_report(&report).unwrap();

    assert!(csv.contains(",\"line one\rline two\","));
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn test_render_dispatches_on_format() {
    let report = sample_report();
    let csv = render(&report, ReportFormat::Csv).unwrap();
    assert!(csv.starts_with("id,priority"));
    let text = render(&report, ReportFormat::Text).unwrap();
    assert!(text.contains("SITEGRADE"));
}

// ============================================================================
// Helper Tests
// ============================================================================

#[test]
fn test_wrap_text_respects_width() {
    let wrapped = wrap_text(
        "one two three four five six seven eight nine ten eleven twelve",
        20,
        "  ",
    );
    for line in wrapped.lines() {
        assert!(line.len() <= 20, "line too long: {:?}", line);
        assert!(line.starts_with("  "));
    }
    assert!(wrapped.lines().count() > 1);
}

#[test]
fn test_wrap_text_empty() {
    assert_eq!(wrap_text("", 80, "  "), "");
}

#[test]
fn test_save_report_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.txt");
    save_report("hello report", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello report");
}
