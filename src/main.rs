use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dars::api::{ApiClient, ApiError};
use dars::app::textbook_file_name;
use dars::curriculum::{format_content, parse_fragment};
use dars::{App, Config};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dars")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the curriculum navigation tree
    Tree,
    /// Run the lesson content formatter over a file
    Format {
        /// File holding raw lesson content
        path: PathBuf,
        /// Print the rendered blocks instead of the HTML fragment
        #[arg(long)]
        blocks: bool,
    },
    /// Show (and optionally download) the textbook of a subject
    Pdf {
        /// Subject id
        subject_id: i64,
        /// File or directory to save the textbook to
        #[arg(short, long)]
        download: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none())?;

    let config = Config::load()?;

    match cli.command {
        Some(Commands::Tree) => print_tree(&config).await,
        Some(Commands::Format { path, blocks }) => print_formatted(&path, blocks),
        Some(Commands::Pdf { subject_id, download }) => show_pdf(&config, subject_id, download).await,
        None => {
            // Launch TUI
            let mut app = App::new(config)?;
            app.run().await
        }
    }
}

/// Set up tracing; the TUI logs to a file so the alternate screen stays clean
fn init_logging(tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "dars=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if tui {
        let path = Config::log_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {:?}", parent))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        registry
            .with(fmt::layer().with_target(false).with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else {
        registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).init();
    }
    Ok(())
}

fn client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(&config.api_base_url, config.request_timeout()).context("Invalid API base URL")
}

async fn print_tree(config: &Config) -> Result<()> {
    let tree = client(config)?.fetch_navigation().await?;

    for grade in &tree {
        println!("[{}] {}", grade.id, grade.name);
        for subject in &grade.subjects {
            println!("  [{}] {}", subject.id, subject.name);
            for unit in &subject.units {
                println!("    [{}] {}", unit.id, unit.name);
                for lesson in &unit.lessons {
                    let marker = if lesson.has_content() { "" } else { " (no content)" };
                    println!("      [{}] {}{}", lesson.id, lesson.title, marker);
                }
            }
        }
    }
    Ok(())
}

fn print_formatted(path: &Path, blocks: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let html = format_content(Some(&raw));

    if !blocks {
        println!("{html}");
        return Ok(());
    }
    for block in parse_fragment(&html) {
        println!("{:?}", block);
    }
    Ok(())
}

async fn show_pdf(config: &Config, subject_id: i64, download: Option<PathBuf>) -> Result<()> {
    let client = client(config)?;
    let doc = match client.fetch_pdf(subject_id).await {
        Ok(doc) => doc,
        Err(ApiError::NotFound(_)) => {
            println!("Subject {subject_id} has no textbook");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", doc.title);
    println!("{}", doc.url);

    if let Some(dest) = download {
        let dest = if dest.is_dir() { dest.join(textbook_file_name(&doc)) } else { dest };
        let bytes = client.download_pdf(&doc, &dest).await?;
        println!("Saved {} bytes to {}", bytes, dest.display());
    }
    Ok(())
}
