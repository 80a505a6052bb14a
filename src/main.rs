//! novelpub - package scraped web novels as EPUB

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use novelpub::catalog::{Catalog, NovelUpdates};
use novelpub::export::{EpubExporter, Exporter};
use novelpub::io::{LogSink, NullSink};
use novelpub::{Config, NovelRecord, Result};

#[derive(Parser)]
#[command(name = "novelpub")]
#[command(version, about = "Package scraped web novels as EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    novelpub build novel.json                    Write <Title>.epub
    novelpub build novel.json -o out.epub        Write out.epub
    novelpub search \"Lord of the Mysteries\"      Search NovelUpdates
    novelpub enrich novel.json <series-url> -o novel.json

Set NOVELPUB_LOG (e.g. NOVELPUB_LOG=debug) to control log output.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raw-fetch proxy base URL (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    proxy: Option<String>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build an EPUB from a novel record
    Build {
        /// Novel record (JSON)
        #[arg(value_name = "RECORD")]
        record: PathBuf,

        /// Output file (defaults to the title with .epub)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Do not download the cover image
        #[arg(long)]
        no_cover: bool,
    },
    /// Search NovelUpdates by title
    Search {
        #[arg(value_name = "QUERY", required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show what NovelUpdates lists for a series
    Detail {
        /// Series page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Also list other works by the first author
        #[arg(long)]
        works: bool,
    },
    /// Fill a record's metadata from a NovelUpdates series page
    Enrich {
        /// Novel record (JSON)
        #[arg(value_name = "RECORD")]
        record: PathBuf,

        /// Series page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Where to write the updated record (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Filter used when `NOVELPUB_LOG` is unset.
fn default_log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> std::result::Result<(), String> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("NOVELPUB_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_level(quiet, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(ref proxy) = cli.proxy {
        config.proxy_url = proxy.clone();
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match cli.command {
        Command::Build {
            ref record,
            ref output,
            no_cover,
        } => build(&config, record, output.as_deref(), no_cover, cli.quiet),
        Command::Search { ref query } => search(&config, &query.join(" ")),
        Command::Detail { ref url, works } => detail(&config, url, works),
        Command::Enrich {
            ref record,
            ref url,
            ref output,
        } => enrich(&config, record, url, output.as_deref()),
    }
}

fn build(
    config: &Config,
    record: &Path,
    output: Option<&Path>,
    no_cover: bool,
    quiet: bool,
) -> Result<()> {
    let record = NovelRecord::open(record)?;

    let mut epub_config = config.epub_config();
    if no_cover {
        epub_config.fetch_cover = false;
    }

    let progress = |message: &str| eprintln!("{message}");
    let log: &dyn LogSink = if quiet { &NullSink } else { &progress };

    let package = EpubExporter::new(config.fetcher())
        .with_config(epub_config)
        .export(&record, log)?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(package.suggested_file_name()));
    let mut file = BufWriter::new(File::create(&path)?);
    package.write_to(&mut file)?;

    if !quiet {
        println!(
            "Wrote {} ({} chapters, {} bytes)",
            path.display(),
            record.chapters.len(),
            package.bytes().len()
        );
    }
    Ok(())
}

fn search(config: &Config, query: &str) -> Result<()> {
    let catalog = NovelUpdates::new(config.fetcher());
    let results = catalog.search(query)?;

    if results.is_empty() {
        println!("No results found on NovelUpdates.");
        return Ok(());
    }
    for series in results {
        println!("{}", series.title);
        println!("  {}", series.url);
        if !series.genres.is_empty() {
            println!("  {}", series.genres.join(", "));
        }
    }
    Ok(())
}

fn detail(config: &Config, url: &str, works: bool) -> Result<()> {
    let catalog = NovelUpdates::new(config.fetcher());
    let detail = catalog.series_detail(url)?;

    println!("Title: {}", detail.title);
    let fields = [
        ("Type", detail.series_type.as_deref()),
        ("Year", detail.year.as_deref()),
        ("Status in COO", detail.original_status.as_deref()),
        ("Original Publisher", detail.original_publisher.as_deref()),
        ("English Publisher", detail.english_publisher.as_deref()),
        ("Language", detail.language.as_deref()),
        ("Cover", detail.cover.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    if !detail.authors.is_empty() {
        let names: Vec<_> = detail.authors.iter().map(|a| a.text.as_str()).collect();
        println!("Authors: {}", names.join(", "));
    }
    if !detail.genres.is_empty() {
        println!("Genres: {}", detail.genres.join(", "));
    }
    if !detail.associated_names.is_empty() {
        println!("Associated Names: {}", detail.associated_names.join(", "));
    }
    if !detail.description.is_empty() {
        println!("Description:\n{}", detail.description);
    }
    if !detail.related.is_empty() {
        println!("Related:");
        for link in &detail.related {
            println!("  {} <{}>", link.text, link.url);
        }
    }

    if works {
        match detail.first_author_url() {
            Some(author_url) => {
                let works = catalog.author_works(author_url)?;
                println!("Other Works by Author:");
                if works.is_empty() {
                    println!("  (none)");
                }
                for work in works {
                    println!("  {} <{}>", work.title, work.url);
                    if !work.description.is_empty() {
                        println!("    {}", work.description);
                    }
                }
            }
            None => println!("No author listed."),
        }
    }
    Ok(())
}

fn enrich(config: &Config, record_path: &Path, url: &str, output: Option<&Path>) -> Result<()> {
    let mut record = NovelRecord::open(record_path)?;
    let catalog = NovelUpdates::new(config.fetcher());
    catalog.series_detail(url)?.autofill(&mut record.metadata);

    let json = serde_json::to_string_pretty(&record)?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        assert_eq!(default_log_level(false, false), "info");
        assert_eq!(default_log_level(false, true), "debug");
        assert_eq!(default_log_level(true, false), "warn");
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["novelpub", "search", "moon", "road", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(matches!(cli.command, Command::Search { ref query } if query == &["moon", "road"]));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["novelpub", "-q", "-v", "search", "x"]).is_err());
    }
}
