//! osutool - compile and extract osu! beatmap packages

mod console;

use anyhow::{Context, Result};
use clap::Parser;
use console::ConsoleSink;
use osutool::{Event, EventKind, EventSink, Mode, RunConfig};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "osutool")]
#[command(version)]
#[command(about = "Compile beatmap folders into .osz packages, or extract .osz packages into folders")]
struct Cli {
    /// compile or extract (any word starting with c or e); prompts when missing
    mode: Option<String>,

    /// Folder to process (defaults to the folder containing the executable)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Only look at each folder's own files, not the folder osutool was started from
    #[arg(long)]
    ignore_cwd: bool,

    /// Exit immediately instead of waiting for Enter
    #[arg(long)]
    no_wait: bool,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only initialize logging if verbose or RUST_LOG is set
    if cli.verbose || std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(if cli.verbose {
                    "osutool=debug".parse()?
                } else {
                    "osutool=warn".parse()?
                }),
            )
            .init();
    }

    let mut sink = ConsoleSink::new(cli.json);
    if !cli.json {
        println!();
    }

    let (mode, token) = match cli.mode.as_deref().and_then(|t| Mode::from_token(t).map(|m| (m, t))) {
        Some((mode, token)) => (mode, token.to_string()),
        None => {
            sink.emit(Event::notice("Mode is not set.", Vec::new()));
            prompt_mode()?
        }
    };
    sink.emit(Event::new(EventKind::Running, "Mode is set to [].", vec![token]));

    let root = match cli.root {
        Some(root) => root,
        None => executable_dir()?,
    };
    let extra_listing = if cli.ignore_cwd {
        Vec::new()
    } else {
        let listing = std::env::current_dir()
            .context("Failed to read the current directory")
            .and_then(|cwd| list_dir(&cwd));
        listing_or_report(listing, &mut sink)
    };

    let mut config = RunConfig::new(root, mode).with_extra_listing(extra_listing);
    config.validate()?;
    config.root = std::fs::canonicalize(&config.root)
        .with_context(|| format!("Failed to resolve {}", config.root.display()))?;

    sink.emit(Event::running(format!(
        "Working directory: {}",
        config.root.display()
    )));

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let report = tokio::task::spawn_blocking(move || osutool::run(&config, &mut sink, &cancel))
        .await
        .context("Run task panicked")?;

    tracing::debug!("{:?}", report);

    if !cli.no_wait {
        // The run-time handler swallows Ctrl+C; let it end the wait instead
        tokio::spawn(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(0);
            }
        });

        print!("\n\tFinished! Press Enter to exit.");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
    }

    Ok(())
}

/// Ask until the answer starts with c or e
fn prompt_mode() -> Result<(Mode, String)> {
    let stdin = io::stdin();
    loop {
        print!(
            "{}",
            console::render_prompt("Set mode to []ompile or []xtract. > ", &["c", "e"])
        );
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            anyhow::bail!("No mode given (stdin closed)");
        }

        let token = line.trim();
        if let Some(mode) = Mode::from_token(token) {
            return Ok((mode, token.to_string()));
        }
    }
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("Executable has no parent directory")
}

fn list_dir(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        names.push(entry?.file_name().to_string_lossy().to_string());
    }
    Ok(names)
}

/// An unreadable invocation directory is reported, not fatal
fn listing_or_report(listing: Result<Vec<String>>, sink: &mut dyn EventSink) -> Vec<String> {
    match listing {
        Ok(names) => names,
        Err(e) => {
            sink.emit(Event::error(format!("{:#}", e), Vec::new()));
            Vec::new()
        }
    }
}
