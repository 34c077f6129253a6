//! Command-line front-end: loads a grid configuration, pulls pages from an
//! HTTP endpoint and prints the rows as a table.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use sortgrid_lib::config::GridConfig;
use sortgrid_lib::error::{FetchError, GridError};
use sortgrid_lib::source::{HttpSource, HttpSourceConfig};
use sortgrid_lib::sort::Direction;
use sortgrid_lib::{FetchOutcome, GridController};

#[derive(Parser)]
#[command(name = "sortgrid")]
#[command(about = "Fetch, sort and page through a JSON endpoint", long_about = None)]
#[command(version)]
struct Cli {
    /// Grid configuration (columns, page size, initial sort) as JSON
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Endpoint returning a JSON array of rows
    #[arg(short, long)]
    url: String,

    /// Sort column, optionally with a direction: `price` or `price:desc`
    #[arg(short, long)]
    sort: Option<String>,

    /// Number of pages to load
    #[arg(short, long, default_value_t = 1)]
    pages: usize,

    /// Extra query parameter sent with every request (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[arg(long, default_value = "sortgrid.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", raw)),
    }
}

fn parse_sort(raw: &str) -> Result<(&str, Option<Direction>), GridError> {
    match raw.split_once(':') {
        Some((column, direction)) => Ok((column, Some(direction.parse()?))),
        None => Ok((raw, None)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let log_file = File::create(&cli.log_file)?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)?;

    let config = GridConfig::from_json(&std::fs::read_to_string(&cli.config)?)?;
    let (registry, options) = config.into_parts()?;
    let source = HttpSource::new(
        HttpSourceConfig::new(&cli.url).with_timeout(Duration::from_secs(cli.timeout)),
    )?;
    info!("Loading {} ({} columns)", source.base_url(), registry.len());

    let grid = GridController::new(registry, options.with_source(source))?;
    if cli.params.is_empty() {
        grid.load().await?;
    } else {
        grid.set_params(cli.params).await?;
    }

    if let Some(sort) = &cli.sort {
        match parse_sort(sort)? {
            (column, Some(direction)) => grid.sort_by(column, direction).await?,
            (column, None) => grid.request_sort(column).await?,
        };
    }

    for _ in 1..cli.pages {
        if grid.on_scroll_proximity(true).await? == FetchOutcome::EndReached {
            break;
        }
    }

    print_table(&grid);
    Ok(())
}

fn print_table(grid: &GridController) {
    let titles: Vec<&str> = grid.registry().columns().map(|c| c.title.as_str()).collect();
    println!("{}", titles.join("\t"));
    for cells in grid.render_rows() {
        println!("{}", cells.join("\t"));
    }

    let sort = match grid.sort_state().as_pair() {
        Some((column, direction)) => format!("{} {}", column, direction),
        None => "unsorted".to_string(),
    };
    let status = if grid.end_reached() { ", end of data" } else { "" };
    println!("-- {} rows, {}{}", grid.len(), sort, status);
}
