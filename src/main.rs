// src/main.rs
use std::path::PathBuf;
use std::process::exit;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, error};

use stagehand::app::{App, Command, RunCommand};
use stagehand::config::{self, Config};

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "A staged build-task orchestrator")]
struct Args {
    #[command(subcommand)]
    command: Option<Cli>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Cli {
    /// Run a named sequence or a single task
    Run {
        #[arg(help = "Sequence or task name")]
        name: Option<String>,

        #[arg(long, help = "Load the sequence from a JSON file")]
        sequence_file: Option<PathBuf>,

        #[arg(short, long, help = "Write the JSON run report to this path")]
        output: Option<PathBuf>,

        #[arg(long, help = "Maximum concurrent tasks per stage")]
        max_concurrent: Option<usize>,
    },

    /// List registered tasks
    Tasks,

    /// List configured sequences
    Sequences,

    /// Initialize config
    Init {
        #[arg(short, long, help = "Force overwrite existing configuration")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Parse command line arguments
    let args = Args::parse();

    if args.verbose {
        info!("Verbose mode enabled");
    }

    let command = match args.command {
        Some(Cli::Init { force }) => {
            let path = config::init_config(force)?;
            println!("Configuration initialized at {}", path.display());
            return Ok(());
        }
        Some(Cli::Run { name, sequence_file, output, max_concurrent }) => {
            Command::Run(RunCommand {
                name,
                sequence_file,
                output,
                max_concurrent,
            })
        }
        Some(Cli::Tasks) => Command::Tasks,
        Some(Cli::Sequences) => Command::Sequences,
        None => {
            println!("No command specified. Use --help for available commands.");
            Args::parse_from(["stagehand", "--help"]);
            return Ok(());
        }
    };

    // Load configuration
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            exit(1);
        }
    };

    // Create the application
    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            exit(1);
        }
    };

    if let Err(e) = app.run_command(&command).await {
        error!("Command execution failed: {}", e);
        exit(1);
    }

    Ok(())
}
