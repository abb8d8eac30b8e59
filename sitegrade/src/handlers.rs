use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use sitegrade_core::model::{AuditProgress, AuditReport, Priority};
use sitegrade_core::report::{ReportFormat, render, save_report, score_table};
use sitegrade_core::{AuditConfig, AuditRequest, SmartAudit};
use sitegrade_scanner::Strategy;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::{ParseError, Url};

// Helper functions for the audit handlers

/// Load URLs from explicit arguments and/or a file, arguments first
pub fn load_urls_from_source(urls: &[Url], urls_file: Option<&Path>) -> Result<Vec<String>> {
    let mut loaded: Vec<String> = urls.iter().map(|u| u.as_str().to_string()).collect();
    if let Some(path) = urls_file {
        loaded.extend(load_urls_from_file(path)?);
    }
    if loaded.is_empty() {
        bail!("Either --urls or --urls-file must be provided");
    }
    Ok(loaded)
}

/// Load and parse URLs from a file. Blank lines and `#` comments are skipped.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as a URL, adding https:// when the line has no scheme
pub fn parse_url_line(line: &str) -> Option<String> {
    let (url, text) = match Url::parse(line) {
        Ok(url) => (url, line.to_string()),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let with_scheme = format!("https://{}", line);
            match Url::parse(&with_scheme) {
                Ok(url) if url.host_str().is_some_and(|h| h.contains('.')) => (url, with_scheme),
                _ => {
                    warn!("Skipping invalid URL '{}'", line);
                    return None;
                }
            }
        }
        Err(_) => {
            warn!("Skipping invalid URL '{}'", line);
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        warn!("Skipping non-HTTP URL '{}'", line);
        return None;
    }
    if !url.username().is_empty() || url.password().is_some() {
        warn!("Skipping URL with credentials '{}'", line);
        return None;
    }
    Some(text)
}

/// Scheme, host and port of `url`, without a trailing slash.
pub fn base_url_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Builds the audit request from a JSON payload file, or from a page list.
pub fn load_request(
    payload: Option<&Path>,
    base_url: Option<&Url>,
    urls: Vec<String>,
) -> Result<AuditRequest> {
    if let Some(path) = payload {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload {}", path.display()))?;
        let mut request = AuditRequest::from_json(&json)
            .with_context(|| format!("Invalid audit payload in {}", path.display()))?;
        request.selected_urls.extend(urls);
        return Ok(request);
    }

    let base = match base_url {
        Some(url) => url.as_str().trim_end_matches('/').to_string(),
        None => urls
            .first()
            .and_then(|u| base_url_of(u))
            .context("Cannot determine the base URL; pass --url")?,
    };
    Ok(AuditRequest::new(base, urls))
}

/// Explicit format wins, then the output extension, then text.
pub fn report_format(format: Option<&str>, output: Option<&Path>) -> ReportFormat {
    format
        .and_then(ReportFormat::from_str)
        .or_else(|| {
            output
                .and_then(|p| p.extension())
                .and_then(|ext| ext.to_str())
                .and_then(ReportFormat::from_str)
        })
        .unwrap_or(ReportFormat::Text)
}

pub fn expand_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Audit settings shared by both commands.
fn config_from_args(args: &ArgMatches) -> AuditConfig {
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&30);
    let strategy = match args.get_one::<String>("strategy").map(String::as_str) {
        Some("desktop") => Strategy::Desktop,
        _ => Strategy::Mobile,
    };
    AuditConfig::default()
        .with_fetch_timeout(Duration::from_secs(timeout))
        .with_pagespeed_key(args.get_one::<String>("pagespeed-key").cloned())
        .with_pagespeed_strategy(strategy)
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn on_progress(pb: &ProgressBar) -> sitegrade_core::ProgressCallback {
    let pb = pb.clone();
    Arc::new(move |p: AuditProgress| {
        pb.set_position(p.progress as u64);
        pb.set_message(p.label);
    })
}

fn colored_score(score: u8) -> ColoredString {
    let text = format!("{:>3}", score);
    match score {
        70..=100 => text.green().bold(),
        50..=69 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

pub fn print_summary(report: &AuditReport) {
    println!();
    println!("{}", "═".repeat(60).bright_blue().bold());
    println!(
        "  {} {}  {} {}",
        "Overall:".bright_white().bold(),
        colored_score(report.overall_score),
        "grade".dimmed(),
        report.overall_grade.to_string().bright_white().bold()
    );
    println!(
        "  {} analyzed, {} failed",
        report.pages_analyzed.to_string().cyan(),
        report.pages_failed.to_string().cyan()
    );
    println!("{}", "═".repeat(60).bright_blue().bold());

    for (category, score, grade) in score_table(report) {
        println!(
            "  {:<20} {}  {}",
            category.display_name(),
            colored_score(score),
            grade.dimmed()
        );
    }

    let high = report
        .recommendations
        .iter()
        .filter(|r| r.priority == Priority::High)
        .count();
    println!();
    println!(
        "  {} recommendations ({} high priority)",
        report.recommendations.len().to_string().cyan(),
        high.to_string().red().bold()
    );
    println!();
}

/// Prints the summary, then writes the report to `-o` or to the screen.
fn emit_report(args: &ArgMatches, report: &AuditReport, quiet: bool) -> Result<()> {
    let output = args.get_one::<String>("output").map(|p| expand_output_path(p));
    let format = report_format(
        args.get_one::<String>("format").map(String::as_str),
        output.as_deref(),
    );
    let rendered = render(report, format).context("Failed to render report")?;

    if !quiet {
        print_summary(report);
    }

    match output {
        Some(path) => {
            save_report(&rendered, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{} Report saved to {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

pub async fn handle_page(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let url = args
        .get_one::<Url>("url")
        .context("--url is required")?;

    info!("Auditing single page {}", url);
    let pb = progress_bar(quiet);
    let audit = SmartAudit::from_config(config_from_args(args))?
        .with_progress_callback(on_progress(&pb));

    let result = audit.run_single(url.as_str()).await;
    pb.finish_and_clear();
    let report = result?;

    emit_report(args, &report, quiet)
}

pub async fn handle_audit(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let base_url = args.get_one::<Url>("url");
    let payload = args.get_one::<PathBuf>("payload");
    let listed: Vec<Url> = args
        .get_many::<Url>("urls")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let urls_file = args.get_one::<PathBuf>("urls-file");

    let urls = if payload.is_some() {
        Vec::new()
    } else {
        load_urls_from_source(&listed, urls_file.map(PathBuf::as_path))?
    };
    let request = load_request(payload.map(PathBuf::as_path), base_url, urls)?;

    let config = config_from_args(args)
        .with_concurrency(*args.get_one::<usize>("concurrency").unwrap_or(&4))
        .with_seed(args.get_one::<u64>("seed").copied());

    if !quiet {
        println!(
            "\n{} Auditing {} page(s) of {}",
            "→".blue().bold(),
            request.selected_urls.len().to_string().cyan(),
            request.base_url.bright_white()
        );
        println!("Concurrency: {}", config.concurrency);
        if config.pagespeed_key.is_some() {
            println!("PageSpeed Insights: {}", config.pagespeed_strategy.as_str());
        }
        println!();
    }

    let pb = progress_bar(quiet);
    let audit = SmartAudit::from_config(config)?.with_progress_callback(on_progress(&pb));

    let result = audit.run(&request).await;
    pb.finish_and_clear();
    let report = result?;

    emit_report(args, &report, quiet)
}
