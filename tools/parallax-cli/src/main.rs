//! Parallax CLI: replay pointer sessions offline and check option files.
//!
//! Usage:
//!   parallax simulate <SCRIPT>   Replay an event script and print layer output
//!   parallax validate <OPTIONS>  Show how an options file is interpreted
//!   parallax config              Show (or write) the application config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::simulate::{LayerArg, SimulateArgs};

#[derive(Parser)]
#[command(
    name = "parallax",
    about = "Pointer-driven parallax layer engine",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay an event script through a coordinator
    Simulate {
        /// Path to the JSONL event script
        script: PathBuf,

        /// Options file (JSON); defaults are used when omitted
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// Layer to bind, as `ID` or `ID=JSON_OVERRIDES` (repeatable)
        #[arg(short, long = "layer", value_parser = LayerArg::parse, default_value = "layer")]
        layers: Vec<LayerArg>,

        /// Insert ticks at the configured frame duration between events
        #[arg(long)]
        auto_tick: bool,

        /// Ticks to keep running after the script while layers are still moving
        #[arg(long, default_value = "200")]
        settle_ticks: usize,

        /// Print one JSON object per rendered frame
        #[arg(long)]
        json: bool,
    },

    /// Show how an options file is interpreted
    Validate {
        /// Path to the options file (JSON)
        path: PathBuf,
    },

    /// Show the application config
    Config {
        /// Write the effective config to its standard location
        #[arg(long)]
        write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = parallax_common::config::AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    parallax_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Simulate {
            script,
            options,
            layers,
            auto_tick,
            settle_ticks,
            json,
        } => commands::simulate::run(
            SimulateArgs {
                script,
                options,
                layers,
                auto_tick,
                settle_ticks,
                json,
            },
            &config.simulation,
        ),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
