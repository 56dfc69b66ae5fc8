use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use directories::ProjectDirs;
use musiman_lib::{Catalog, FileRecord, ScanConfig};
use musiman_util::{ByteSize, CanonicalizedPathBuf};
use slog::{debug, Logger};
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;

/// Catalog music files by their content
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the catalog database, defaults to the user data directory
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    /// Log more, may be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recursively scan a directory for music files
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        directory: CanonicalizedPathBuf,
        /// Minimum file size to include in the scan (e.g. 1KB, 1MB, 1MiB)
        #[arg(short, long, default_value = "0B")]
        min_size: ByteSize,
        /// Path to ignore during the scan, relative to the directory. Can be given multiple times
        #[arg(short, long)]
        ignore: Vec<PathBuf>,
    },
    /// Print every cataloged file
    List {
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let logger = build_logger(args.verbose)?;

    let db_path = match args.db_path {
        Some(db_path) => db_path,
        None => default_db_path()?,
    };
    debug!(logger, "opening catalog"; "path" => db_path.display());
    let catalog = Catalog::new(&db_path)
        .with_context(|| format!("failed to open catalog {}", db_path.display()))?
        .with_logger(logger);

    match args.command {
        Command::Scan {
            directory,
            min_size,
            ignore,
        } => {
            let config = ScanConfig::default()
                .with_min_size(min_size.into())
                .with_ignore_paths(ignore);
            let summary = catalog.add_directory(directory.as_path(), &config)?;
            println!(
                "{directory}: {} added, {} already cataloged, {} rejected, {} unreadable",
                summary.added, summary.duplicates, summary.rejected, summary.unreadable
            );
        }
        Command::List { json } => {
            for file in catalog.files()? {
                if json {
                    println!("{}", serde_json::to_string(&file)?);
                } else {
                    println!("{}", tab_separated(&file));
                }
            }
        }
    }

    Ok(())
}

fn build_logger(verbose: u8) -> Result<Logger> {
    let level = match verbose {
        0 => Severity::Warning,
        1 => Severity::Info,
        2 => Severity::Debug,
        _ => Severity::Trace,
    };
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(level).destination(Destination::Stderr);
    Ok(builder.build()?)
}

fn default_db_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "musiman")
        .ok_or_else(|| anyhow!("no home directory to keep the catalog in, pass --db-path"))?;
    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    Ok(data_dir.join("musiman.db"))
}

fn tab_separated(file: &FileRecord) -> String {
    let hash: String = file.hash.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}\t{}\t{}\t{}\t{}",
        file.path.display(),
        file.media_type,
        file.size,
        file.modified.to_rfc3339(),
        hash
    )
}
