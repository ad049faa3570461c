//! `docchat` command line entry point.

mod commands;

use clap::{Parser, Subcommand};
use dc_protocol::framing::Framing;
use std::path::PathBuf;

/// Streaming document chat toolkit
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a .docchat directory with the default config and prompts
    Init {
        /// Overwrite an existing .docchat directory
        #[arg(long)]
        force: bool,

        /// Only write config.toml and keep the built-in prompts
        #[arg(long)]
        minimal: bool,

        /// Project directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },

    /// Split a finalized message into answer and source documents
    Parse {
        /// Message file; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Framing the message was written with (sentinel or ndjson)
        #[arg(long, default_value_t = Framing::Sentinel)]
        framing: Framing,
    },

    /// Replay a callback script through the answer stream and print the output
    Replay {
        /// JSON-lines file of callback events
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output framing (sentinel or ndjson)
        #[arg(long, default_value_t = Framing::Sentinel)]
        framing: Framing,

        /// Chunks buffered before the replay waits for stdout
        #[arg(long, default_value_t = dc_core::stream::DEFAULT_STREAM_CAPACITY)]
        capacity: usize,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Project directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
}

/// Log to stderr so stdout only carries command output.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("dc_core={level},dc_cli={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Init {
            force,
            minimal,
            dir,
        } => commands::init(dir, force, minimal).await,
        Command::Parse { file, framing } => commands::parse(file.as_deref(), framing),
        Command::Replay {
            script,
            framing,
            capacity,
        } => commands::replay(&script, framing, capacity).await,
        Command::Config { dir } => commands::config(&dir).await,
    }
}
