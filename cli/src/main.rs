//! HighwayHash CLI
//!
//! File hashing and checksum verification with keyed hashes.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check_mode, hash_files, parse_key, Algorithm};
use std::path::PathBuf;

// =============================================================================
// CLI DEFINITION
// =============================================================================

#[derive(Parser)]
#[command(name = "hwyhash")]
#[command(about = "Fast keyed hashing with HighwayHash (SIMD-dispatched)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Files to hash (if no subcommand)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Hashing algorithm to use
    #[arg(short, long, value_enum, global = true, default_value_t = Algorithm::Highway64)]
    algo: Algorithm,

    /// 256-bit key as 64 hex chars, little-endian lanes (SipHash variants use
    /// the first 32 hex chars). Defaults to the all-zero key.
    #[arg(short, long, global = true, value_name = "HEX")]
    key: Option<String>,

    /// Print the dispatched hardware backend and exit
    #[arg(long)]
    backend: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify checksums from file (like sha256sum -c)
    Check {
        #[arg(value_name = "FILE")]
        checksum_file: PathBuf,
    },
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.backend {
        println!("{}", highwayhash::active_backend());
        return Ok(());
    }

    let key = parse_key(cli.key.as_deref())?;

    match &cli.command {
        Some(Commands::Check { checksum_file }) => check_mode(checksum_file, cli.algo, &key)?,
        None => {
            if cli.files.is_empty() {
                eprintln!("Error: No files specified");
                eprintln!("Usage: hwyhash [FILE]... or hwyhash --help");
                std::process::exit(1);
            }

            hash_files(&cli.files, cli.algo, &key)?;
        }
    }

    Ok(())
}
