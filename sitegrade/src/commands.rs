use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

/// Flags shared by `page` and `audit`.
fn common_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Page fetch timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("30"),
    )
    .arg(
        arg!(--"pagespeed-key" <KEY>)
            .required(false)
            .help("Google PageSpeed Insights API key. Enables lab metrics for performance pages.")
            .env("PAGESPEED_API_KEY")
            .hide_env_values(true),
    )
    .arg(
        arg!(--"strategy" <STRATEGY>)
            .required(false)
            .help("PageSpeed Insights strategy")
            .value_parser(["mobile", "desktop"])
            .default_value("mobile"),
    )
    .arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Save report to file (default: display to screen)"),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Report format: text, json, markdown, csv (default: from the output extension, else text)")
            .value_parser(["text", "json", "markdown", "md", "csv"]),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitegrade")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitegrade")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Enable debug logging")
                .required(false)
                .global(true)
                .conflicts_with("quiet"),
        )
        .subcommand_required(false)
        .subcommand(common_args(
            command!("page")
                .about("Audit a single page with every analyzer")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The page to audit")
                        .value_parser(clap::value_parser!(Url)),
                ),
        ))
        .subcommand(common_args(
            command!("audit")
                .about(
                    "Smart multi-page audit. Classifies the given pages and routes each \
                category to the pages that represent it.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Base URL of the site (default: origin of the first page)")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-U --"urls" <URL>)
                        .required(false)
                        .help("Pages to audit")
                        .num_args(1..)
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-H --"urls-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of pages to audit")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"payload" <PATH>)
                        .required(false)
                        .help("Path to a JSON audit request (baseUrl, selectedUrls, crawlData, sectionSelections)")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with_all(["urls", "urls-file"]),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM_PAGES>)
                        .required(false)
                        .help("Pages fetched and analyzed at the same time")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--"seed" <SEED>)
                        .required(false)
                        .help("Seed for page sampling, for reproducible routing")
                        .value_parser(clap::value_parser!(u64)),
                ),
        ))
}
