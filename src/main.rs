mod app;
mod cache;
mod chart;
mod config;
mod document;
mod raindrop;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::{App, ChartOutcome};

#[derive(Parser, Debug)]
#[command(name = "raindrop-blocks")]
#[command(about = "Fetch Raindrop.io bookmarks for raindrop blocks in your notes")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/raindrop-blocks/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Don't cache responses
  #[arg(long)]
  no_cache: bool,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch a `raindrop` block read from FILE or stdin
  Block {
    file: Option<PathBuf>,
    /// Override the block's page
    #[arg(long)]
    page: Option<u32>,
    /// Override the block's search term
    #[arg(long)]
    search: Option<String>,
  },
  /// Run a search for a `raindrop-search` block read from FILE or stdin
  Search {
    file: Option<PathBuf>,
    #[arg(short, long)]
    query: String,
    #[arg(long, default_value_t = 0)]
    page: u32,
  },
  /// Fetch the target of an inline link, e.g. raindrop:collection/123
  Link { href: String },
  /// Fetch every block and inline link of a markdown document
  Document { file: Option<PathBuf> },
  /// Fetch all bookmarks across every collection
  All,
  /// Print a tag-frequency chart block for all bookmarks
  TagsChart,
}

/// Keeps the log writer alive until exit.
fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  match log_file {
    Some(path) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eyre!("Failed to open log file {}: {}", path.display(), e))?;
      let (writer, guard) = tracing_appender::non_blocking(file);
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
      Ok(Some(guard))
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
      Ok(None)
    }
  }
}

fn read_input(file: Option<&Path>) -> Result<String> {
  match file {
    Some(path) => std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e)),
    None => {
      let mut input = String::new();
      std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| eyre!("Failed to read stdin: {}", e))?;
      Ok(input)
    }
  }
}

fn print_json(value: &impl Serialize) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_logging(args.log_file.as_deref())?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if args.no_cache {
    config.cache.enabled = false;
  }

  let app = App::new(config)?;

  match args.command {
    Command::Block { file, page, search } => {
      let source = read_input(file.as_deref())?;
      print_json(&app.block(&source, page, search).await?)?;
    }
    Command::Search { file, query, page } => {
      let source = read_input(file.as_deref())?;
      print_json(&app.search(&source, &query, page).await?)?;
    }
    Command::Link { href } => print_json(&app.link(&href).await?)?,
    Command::Document { file } => {
      let markdown = read_input(file.as_deref())?;
      print_json(&app.document(&markdown).await)?;
    }
    Command::All => print_json(&app.all().await?)?,
    Command::TagsChart => match app.tags_chart().await? {
      ChartOutcome::NoBookmarks => eprintln!("No bookmarks found."),
      ChartOutcome::NoTags => eprintln!("No tags found in your bookmarks."),
      ChartOutcome::Chart { block, tag_count } => {
        println!("{}", block);
        eprintln!("Chart generated with {} tags!", tag_count);
      }
    },
  }

  Ok(())
}
