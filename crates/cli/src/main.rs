//! jobscrape command-line entry point.
//!
//! Loads layered configuration, applies command-line overrides, and runs one
//! pipeline. Logging goes to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jobscrape_core::AppConfig;
use jobscrape_core::config::{SinkKind, Strategy};
use tracing_subscriber::EnvFilter;

mod pipeline;

#[derive(Debug, Parser)]
#[command(name = "jobscrape", version, about = "Cached job-listing scraper and news topic collector")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Page through the listing endpoint (through the cache) and persist records.
    Jobs {
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        #[arg(long, value_enum)]
        sink: Option<SinkArg>,
        /// First page index.
        #[arg(long)]
        start: Option<u32>,
    },
    /// Re-extract every cached page and persist records, without network.
    Rebuild {
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        #[arg(long, value_enum)]
        sink: Option<SinkArg>,
    },
    /// Collect topic tags from articles linked on the news index page.
    Topics {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the dates and e-mail addresses found in a text file, as JSON.
    Scan { file: PathBuf },
    /// Print the outer HTML of the single element matching a CSS selector.
    Select { file: PathBuf, selector: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Structural,
    Pattern,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Structural => Strategy::Structural,
            StrategyArg::Pattern => Strategy::Pattern,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SinkArg {
    Json,
    Sqlite,
}

impl From<SinkArg> for SinkKind {
    fn from(arg: SinkArg) -> Self {
        match arg {
            SinkArg::Json => SinkKind::Json,
            SinkArg::Sqlite => SinkKind::Sqlite,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn apply_overrides(config: &mut AppConfig, command: &Command) {
    match command {
        Command::Jobs { strategy, sink, start } => {
            if let Some(s) = strategy {
                config.strategy = (*s).into();
            }
            if let Some(s) = sink {
                config.sink = (*s).into();
            }
            if let Some(start) = start {
                config.start_page = *start;
            }
        }
        Command::Rebuild { strategy, sink } => {
            if let Some(s) = strategy {
                config.strategy = (*s).into();
            }
            if let Some(s) = sink {
                config.sink = (*s).into();
            }
        }
        Command::Topics { limit, out } => {
            if let Some(limit) = limit {
                config.news_limit = *limit;
            }
            if let Some(out) = out {
                config.topics_path = out.clone();
            }
        }
        Command::Scan { .. } | Command::Select { .. } => {}
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    match &cli.command {
        Command::Scan { file } => return pipeline::run_scan(file).await,
        Command::Select { file, selector } => return pipeline::run_select(file, selector).await,
        _ => {}
    }

    let mut config = AppConfig::load().context("loading configuration")?;
    apply_overrides(&mut config, &cli.command);
    config.validate().context("validating configuration")?;

    match cli.command {
        Command::Jobs { .. } => pipeline::run_jobs(&config).await?,
        Command::Rebuild { .. } => pipeline::run_rebuild(&config).await?,
        Command::Topics { .. } => pipeline::run_topics(&config).await?,
        Command::Scan { .. } | Command::Select { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_jobs_overrides() {
        let cli = Cli::parse_from(["jobscrape", "jobs", "--strategy", "pattern", "--sink", "sqlite", "--start", "3"]);
        let mut config = AppConfig::default();

        apply_overrides(&mut config, &cli.command);

        assert_eq!(config.strategy, Strategy::Pattern);
        assert_eq!(config.sink, SinkKind::Sqlite);
        assert_eq!(config.start_page, 3);
    }

    #[test]
    fn test_cli_parses_topics() {
        let cli = Cli::parse_from(["jobscrape", "--json", "topics", "--limit", "5", "--out", "t.json"]);
        let mut config = AppConfig::default();

        apply_overrides(&mut config, &cli.command);

        assert!(cli.json);
        assert_eq!(config.news_limit, 5);
        assert_eq!(config.topics_path, PathBuf::from("t.json"));
    }

    #[test]
    fn test_cli_parses_select() {
        let cli = Cli::parse_from(["jobscrape", "select", "page.html", "input#text-input-what"]);
        assert!(matches!(
            cli.command,
            Command::Select { ref file, ref selector } if file == &PathBuf::from("page.html") && selector == "input#text-input-what"
        ));
    }

    #[test]
    fn test_rebuild_without_flags_keeps_config() {
        let cli = Cli::parse_from(["jobscrape", "rebuild"]);
        let mut config = AppConfig::default();

        apply_overrides(&mut config, &cli.command);

        assert_eq!(config.strategy, Strategy::Structural);
        assert_eq!(config.sink, SinkKind::Json);
    }
}
