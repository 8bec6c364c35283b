use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use gleaner_core::store::DEFAULT_OUTPUT_DIR;
use gleaner_core::{
    AnalysisRequest, CrawlReport, Crawler, Document, FetchConfig, OutputDir, analyze, extract_document, fetch_file,
    fetch_stdin, normalize_url,
};
use owo_colors::OwoColorize;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extract page fragments to CSV and compute keyword statistics
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version)]
#[command(about = "Extract page fragments to CSV and compute keyword statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract fragments from a page and print them as JSON
    Crawl(CrawlArgs),

    /// List persisted CSV files
    List {
        /// Directory holding persisted CSV files
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
        output_dir: PathBuf,
    },

    /// Compute statistics over a persisted CSV file
    Analyze {
        /// Name of a file inside the output directory
        #[arg(value_name = "FILE")]
        file: String,

        /// Comma-separated keywords
        #[arg(short, long, value_name = "KEYWORDS")]
        keywords: String,

        /// Analysis to run
        #[arg(short = 't', long = "type", default_value = "keyword_frequency", value_name = "TYPE")]
        analysis_type: String,

        /// Directory holding persisted CSV files
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
        output_dir: PathBuf,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug)]
struct CrawlArgs {
    /// URL to fetch (with scheme), local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// CSS selector; extracts matching elements instead of the title, heading and paragraphs
    #[arg(short, long, value_name = "SELECTOR")]
    selector: Option<String>,

    /// Write the extracted items to a CSV file
    #[arg(long)]
    persist: bool,

    /// Page URL for local input; resolves relative links and names the CSV file
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Directory holding persisted CSV files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
    output_dir: PathBuf,

    /// Print progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl CrawlArgs {
    fn crawler(&self) -> Crawler {
        let defaults = FetchConfig::default();
        let fetch = FetchConfig {
            timeout: self.timeout,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        };
        Crawler::new(fetch, OutputDir::new(&self.output_dir))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Crawl(args) => crawl(&args).await,
        Command::List { output_dir } => {
            let files = OutputDir::new(output_dir).list_files().context("Failed to list CSV files")?;
            for file in files {
                println!("{}", file);
            }
            Ok(())
        }
        Command::Analyze { file, keywords, analysis_type, output_dir } => {
            let request = AnalysisRequest {
                filename: Some(file),
                analysis_type: Some(analysis_type),
                keywords: Some(keywords),
            };
            let result = analyze(&OutputDir::new(output_dir), &request).context("Analysis failed")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gleaner", &mut io::stdout());
            Ok(())
        }
    }
}

async fn crawl(args: &CrawlArgs) -> anyhow::Result<()> {
    let crawler = args.crawler();
    let selector = args.selector.as_deref();
    let total = if args.persist { 3 } else { 2 };

    if args.verbose {
        echo::print_banner();
        match selector {
            Some(selector) => echo::print_info(&format!("Selector: {}", selector)),
            None => echo::print_info("Heuristic extraction (title, heading, paragraphs)"),
        }
        eprintln!();
    }

    let report = if is_remote(&args.input) {
        if args.verbose {
            echo::print_step(1, total, &format!("Fetching {}", args.input.bright_white().underline()));
        }
        let outcome = if args.persist {
            crawler.extract_and_persist(&args.input, selector).await
        } else {
            crawler.extract_only(&args.input, selector).await
        };
        outcome.with_context(|| format!("Failed to crawl {}", args.input))?
    } else {
        crawl_local(args, &crawler, total)?
    };

    if args.verbose {
        if report.data.is_empty() {
            echo::print_warning(&report.message);
        } else {
            echo::print_success(&report.message);
        }
        echo::print_report(&report);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Inputs with a scheme are fetched; everything else is a local path or `-`.
fn is_remote(input: &str) -> bool {
    input.contains("://")
}

fn crawl_local(args: &CrawlArgs, crawler: &Crawler, total: usize) -> anyhow::Result<CrawlReport> {
    let html = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, total, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else {
        if args.verbose {
            echo::print_step(1, total, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
        echo::print_step(2, total, "Extracting");
    }

    let source = args.source_url.as_deref().map(normalize_url).transpose()?;
    let doc = match &source {
        Some(source) => {
            let base = Url::parse(source).with_context(|| format!("Invalid source URL: {}", source))?;
            Document::parse_with_url(&html, base)
        }
        None => Document::parse(&html),
    };

    if args.verbose
        && let Some(title) = doc.title()
    {
        eprintln!("  {} {}", "Title:".dimmed(), title.trim().bright_white());
    }

    let (data, message) = extract_document(&doc, args.selector.as_deref()).context("Extraction failed")?;

    if !args.persist {
        let row_count = data.len();
        return Ok(CrawlReport { message, data, filepath: None, row_count });
    }

    if args.verbose {
        echo::print_step(3, total, &format!("Writing to {}", crawler.output().path().display()));
    }

    let name_source = match source {
        Some(source) => source,
        None if args.input == "-" => "stdin".to_string(),
        None => Path::new(&args.input)
            .file_name()
            .map_or_else(|| args.input.clone(), |name| name.to_string_lossy().into_owned()),
    };
    crawler.persist_extracted(&name_source, data, message).context("Failed to persist extracted items")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_crawl_defaults() {
        let cli = Cli::try_parse_from(["gleaner", "crawl", "page.html"]).unwrap();
        let Command::Crawl(args) = cli.command else { panic!("expected crawl") };
        assert_eq!(args.timeout, 10);
        assert_eq!(args.output_dir, PathBuf::from("crawled_data"));
        assert!(!args.persist);
        assert!(args.selector.is_none());
        assert_eq!(args.crawler().fetch_config().timeout, 10);
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/page"));
        assert!(is_remote("ftp://example.com"));
        assert!(!is_remote("missing.html"));
        assert!(!is_remote("pages/example.com.html"));
        assert!(!is_remote("-"));
    }

    #[test]
    fn test_analyze_type_default() {
        let cli = Cli::try_parse_from(["gleaner", "analyze", "a.csv", "-k", "rust"]).unwrap();
        let Command::Analyze { analysis_type, .. } = cli.command else { panic!("expected analyze") };
        assert_eq!(analysis_type, "keyword_frequency");
    }
}
