use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("gleaner")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("gleaner")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ...)
                .required(false)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand_required(false)
        .subcommand(crawl_arguments(
            command!("site").about(
                "Crawl the institution website: homepage, departments listing and every \
                department page. Writes one JSON record per line.",
            ),
            "Seed URL (default: https://rvnp.ac.ke/)",
        ))
        .subcommand(crawl_arguments(
            command!("faq").about("Crawl an FAQ page into a single JSON line of question/answer pairs."),
            "Seed URL (default: https://www.hef.co.ke/faqs/)",
        ))
        .subcommand(
            command!("load")
                .about("Load crawled JSONL files into categories and summarize them")
                .arg(
                    arg!(<FILE> ...)
                        .required(true)
                        .help("One or more JSONL files produced by `site` or `faq`"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Summary format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the summary to a file (default: display to screen)"),
                ),
        )
}

fn crawl_arguments(cmd: clap::Command, seed_help: &'static str) -> clap::Command {
    cmd.arg(
        arg!(-u --"url" <URL>)
            .required(false)
            .help(seed_help)
            .value_parser(clap::value_parser!(Url))
            .conflicts_with("seeds-file"),
    )
    .arg(
        arg!(-H --"seeds-file" <PATH>)
            .required(false)
            .help("Path to a newline-delimited file of seed URLs")
            .value_parser(clap::value_parser!(std::path::PathBuf))
            .conflicts_with("url"),
    )
    .arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("JSONL output file (default: stdout)"),
    )
    .arg(
        arg!(-t --"threads" <NUM_WORKERS>)
            .required(false)
            .help("The number of async workers in the worker pool.")
            .value_parser(clap::value_parser!(usize))
            .default_value("4"),
    )
    .arg(
        arg!(--"max-depth" <DEPTH>)
            .required(false)
            .help("Maximum link depth from the seed (seed is depth 0)")
            .value_parser(clap::value_parser!(usize))
            .default_value("3"),
    )
    .arg(
        arg!(--"max-pages" <PAGES>)
            .required(false)
            .help("Maximum number of pages fetched per seed")
            .value_parser(clap::value_parser!(usize))
            .default_value("200"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("10"),
    )
    .arg(
        arg!(-a --"allow-domain" <DOMAIN>)
            .required(false)
            .help("Additional domain the spider may follow links into (repeatable)")
            .action(clap::ArgAction::Append),
    )
}
