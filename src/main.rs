// SPDX-License-Identifier: GPL-3.0-only

use barcodetoweb::constants::APP_ID;
use barcodetoweb::errors::AppResult;
use barcodetoweb::storage::{ConfigStore, FileConfigStore};
use barcodetoweb::terminal::{self, TerminalOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

mod cli;

#[derive(Parser)]
#[command(name = "barcodetoweb")]
#[command(about = "Scan QR codes and hand matching payloads to a configured web page")]
#[command(version = barcodetoweb::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Directory holding the stored configuration (default: ~/.config/barcodetoweb)
    #[arg(long, global = true, env = "BARCODETOWEB_STORE_DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scanner in the terminal (default)
    Terminal {
        /// Camera to use, by path or name (from 'barcodetoweb list')
        #[arg(short, long, env = "BARCODETOWEB_CAMERA")]
        camera: Option<String>,
    },

    /// List available cameras
    List,

    /// Show the stored activity configuration
    Config,

    /// Scan QR codes in an image file
    Scan {
        /// Image to decode
        image: PathBuf,

        /// Activity index to match against (from 'barcodetoweb config')
        #[arg(short, long)]
        activity: Option<usize>,

        /// Print what would happen without storing or opening anything
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Terminal { camera: None });
    init_logging(matches!(command, Commands::Terminal { .. }));

    let store = open_store(cli.store_dir)?;

    match command {
        Commands::Terminal { camera } => terminal::run(TerminalOptions { camera, store }),
        Commands::List => cli::list_cameras(),
        Commands::Config => cli::show_config(store.as_ref()),
        Commands::Scan {
            image,
            activity,
            dry_run,
        } => cli::scan_image(&image, activity, dry_run, store.as_ref()),
    }
}

fn open_store(store_dir: Option<PathBuf>) -> AppResult<Arc<dyn ConfigStore>> {
    let store = match store_dir {
        Some(dir) => FileConfigStore::new(dir),
        None => FileConfigStore::default_location()?,
    };
    Ok(Arc::new(store))
}

/// Initialize logging
///
/// Set RUST_LOG to control the level (e.g. RUST_LOG=barcodetoweb=debug).
/// The terminal front-end owns the screen, so its logs go to a file in the
/// state directory instead of stderr.
fn init_logging(to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if !to_file {
        builder.with_writer(std::io::stderr).init();
        return;
    }

    match open_log_file() {
        Some(file) => builder.with_writer(Mutex::new(file)).with_ansi(false).init(),
        None => builder.with_writer(std::io::sink).init(),
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::state_dir().or_else(dirs::cache_dir)?.join(APP_ID);
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(format!("{}.log", APP_ID)))
        .ok()
}
