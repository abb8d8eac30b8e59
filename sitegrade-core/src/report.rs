// Report rendering for finished audits

use crate::error::ReportError;
use crate::model::{AuditReport, Category, CheckStatus};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const THIN_RULE: &str = "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Csv => "csv",
        }
    }
}

/// Renders `report` in the requested format.
pub fn render(report: &AuditReport, format: ReportFormat) -> Result<String, ReportError> {
    Ok(match format {
        ReportFormat::Text => generate_text_report(report),
        ReportFormat::Json => generate_json_report(report)?,
        ReportFormat::Markdown => generate_markdown_report(report),
        ReportFormat::Csv => generate_csv_report(report)?,
    })
}

fn banner(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push_str(title);
    report.push('\n');
    report.push_str(RULE);
    report.push('\n');
}

fn status_marker(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "✓",
        CheckStatus::Warning => "⚠",
        CheckStatus::Fail => "✗",
        CheckStatus::Info => "ℹ",
    }
}

pub fn generate_text_report(data: &AuditReport) -> String {
    let mut report = String::new();

    // Header
    report.push_str(RULE);
    report.push_str("                          SITEGRADE SEO AUDIT REPORT\n");
    report.push_str(RULE);
    report.push('\n');

    report.push_str(&format!("Audit ID:     {}\n", data.audit_id));
    report.push_str(&format!("Site:         {}\n", data.base_url));
    report.push_str(&format!("Generated:    {}\n", data.generated_at));
    report.push_str(&format!("Duration:     {} ms\n", data.duration_ms));
    report.push_str(&format!(
        "Pages:        {} analyzed, {} failed\n\n",
        data.pages_analyzed, data.pages_failed
    ));

    banner(&mut report, "OVERALL SCORE");
    report.push_str(&format!(
        "  {}/100  (grade {})\n\n",
        data.overall_score, data.overall_grade
    ));
    for (category, result) in &data.categories {
        report.push_str(&format!(
            "  {:<18} {:>3}  {:<2}  {}\n",
            category.display_name(),
            result.score,
            result.grade.as_str(),
            result.message
        ));
    }
    report.push('\n');

    if !data.page_classifications.is_empty() {
        banner(&mut report, "PAGES");
        for page in &data.page_classifications {
            let sections: Vec<&str> = data
                .audit_mapping
                .iter()
                .filter(|(_, urls)| urls.iter().any(|u| u == &page.url))
                .map(|(category, _)| category.key())
                .collect();
            report.push_str(&format!("  [{:<8}] {}\n", page.page_type.as_str(), page.url));
            if !sections.is_empty() {
                report.push_str(&format!("             sections: {}\n", sections.join(", ")));
            }
        }
        report.push('\n');
    }

    banner(&mut report, "CATEGORY DETAILS");
    for (category, result) in &data.categories {
        report.push_str(&format!(
            "{} - {}/100 ({})\n",
            category.display_name(),
            result.score,
            result.grade
        ));
        if !result.source_pages.is_empty() {
            report.push_str(&format!("Pages: {}\n", result.source_pages.join(", ")));
        }
        report.push('\n');
        for check in &result.checks {
            report.push_str(&format!(
                "  {} {:<32} {:>3}  {}\n",
                status_marker(check.status),
                check.name,
                check.score,
                check.message
            ));
        }
        report.push('\n');
        report.push_str(THIN_RULE);
        report.push('\n');
    }

    if !data.recommendations.is_empty() {
        banner(&mut report, "RECOMMENDATIONS");
        for (idx, rec) in data.recommendations.iter().enumerate() {
            report.push_str(&format!(
                "[{}] [{}] {}\n",
                idx + 1,
                rec.priority.as_str(),
                rec.title
            ));
            report.push_str(&format!("Category:     {}\n", rec.category.display_name()));
            report.push_str(&format!("Check:        {}\n", rec.check_id));
            report.push_str(&wrap_text(&rec.description, 80, "  "));
            if !rec.source_pages.is_empty() {
                report.push_str(&format!("  Affects: {}\n", rec.source_pages.join(", ")));
            }
            report.push('\n');
        }
    }

    // Footer
    report.push_str(RULE);
    report.push_str("                                End of Report\n");
    report.push_str(RULE);
    report.push_str("\nGenerated by Sitegrade - multi-page SEO auditing\n\n");

    report
}

pub fn generate_json_report(data: &AuditReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "metadata": {
            "generator": "Sitegrade",
            "version": env!("CARGO_PKG_VERSION"),
            "rendered_at": chrono::Utc::now().to_rfc3339(),
            "format": "json",
        },
        "audit": data,
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(data: &AuditReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# SEO Audit: {}\n\n", data.base_url));
    md.push_str(&format!(
        "**Overall score:** {}/100 (**{}**)  \n",
        data.overall_score, data.overall_grade
    ));
    md.push_str(&format!(
        "**Pages:** {} analyzed, {} failed  \n",
        data.pages_analyzed, data.pages_failed
    ));
    md.push_str(&format!("**Generated:** {}  \n", data.generated_at));
    md.push_str(&format!("**Audit ID:** `{}`\n\n", data.audit_id));

    md.push_str("## Scores\n\n");
    md.push_str("| Category | Score | Grade | Pages |\n");
    md.push_str("|---|---:|:---:|---:|\n");
    for (category, result) in &data.categories {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            category.display_name(),
            result.score,
            result.grade,
            result.source_pages.len()
        ));
    }
    md.push('\n');

    if !data.recommendations.is_empty() {
        md.push_str("## Recommendations\n\n");
        for rec in &data.recommendations {
            md.push_str(&format!(
                "- **{}** {} _({})_: {}\n",
                rec.priority.as_str(),
                rec.title,
                rec.category.display_name(),
                rec.description
            ));
        }
        md.push('\n');
    }

    md.push_str("## Details\n\n");
    for (category, result) in &data.categories {
        md.push_str(&format!("### {} ({})\n\n", category.display_name(), result.score));
        if result.checks.is_empty() {
            md.push_str(&format!("_{}_\n\n", result.message));
            continue;
        }
        md.push_str("| Check | Status | Score | Message |\n");
        md.push_str("|---|---|---:|---|\n");
        for check in &result.checks {
            md.push_str(&format!(
                "| {} | {} {} | {} | {} |\n",
                check.name,
                status_marker(check.status),
                check.status.as_str(),
                check.score,
                check.message.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}

/// One row per recommendation.
pub fn generate_csv_report(data: &AuditReport) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "priority",
        "category",
        "check_id",
        "title",
        "description",
        "pages",
    ])?;

    for rec in &data.recommendations {
        writer.write_record([
            rec.id.as_str(),
            rec.priority.as_str(),
            rec.category.key(),
            rec.check_id.as_str(),
            rec.title.as_str(),
            rec.description.as_str(),
            rec.source_pages.join(" ").as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Category scores as `(key, score, grade)` rows, in report order.
pub fn score_table(data: &AuditReport) -> Vec<(Category, u8, String)> {
    data.categories
        .iter()
        .map(|(category, result)| (*category, result.score, result.grade.to_string()))
        .collect()
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();
    let limit = width.saturating_sub(indent.len());

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > limit {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
