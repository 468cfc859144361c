use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

mod vtt;
use vtt::{check as vtt_check, cues as vtt_cues, info as vtt_info, read_vtt_as_vec};

/// vttstream command line tools
#[derive(Parser)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show summary info for a WebVTT file (accepts .vtt or .vtt.gz; use '-' for stdin)
    Info {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List every cue the parser emits
    Cues {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Feed the parser this many bytes at a time
        #[arg(long = "chunk-size", default_value_t = 4096)]
        chunk_size: usize,
    },
    /// Parse the file and report whether it is accepted
    Check {
        /// Input file to read (use '-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Feed the parser this many bytes at a time
        #[arg(long = "chunk-size", default_value_t = 4096)]
        chunk_size: usize,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { file } => {
            let bytes = read_vtt_as_vec(&file)?;
            vtt_info(&file, bytes)?;
        }
        Commands::Cues { file, chunk_size } => {
            let bytes = read_vtt_as_vec(&file)?;
            vtt_cues(&file, bytes, chunk_size)?;
        }
        Commands::Check { file, chunk_size } => {
            let bytes = read_vtt_as_vec(&file)?;
            vtt_check(&file, bytes, chunk_size)?;
        }
    }

    Ok(())
}
