//! Ember CLI - headless driver for the Ember particle engine

mod commands;
mod preset;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{init, run, validate};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Run particle presets headlessly and inspect the results", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a preset file filled with default settings
    Init {
        /// Output path
        #[arg(default_value = "ember.toml")]
        path: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Simulate a preset for a number of frames
    Run {
        /// Path to preset file (defaults apply when omitted)
        preset: Option<String>,

        /// Number of frames to step
        #[arg(long)]
        frames: Option<u32>,

        /// Fixed timestep in seconds
        #[arg(long)]
        dt: Option<f32>,

        /// Random seed
        #[arg(long)]
        seed: Option<u32>,

        /// Use the rayon dispatch path
        #[arg(long)]
        parallel: bool,

        /// Particles to burst before the first frame
        #[arg(long)]
        burst: Option<u32>,

        /// Print a progress line every N frames (0 disables)
        #[arg(long, default_value = "0")]
        every: u32,

        /// Write the final render-attribute buffer to this JSON file
        #[arg(long)]
        dump: Option<String>,
    },

    /// Check a preset for errors and values the engine will clamp
    Validate {
        /// Path to preset file
        preset: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, force } => init::run(&path, force),
        Commands::Run {
            preset,
            frames,
            dt,
            seed,
            parallel,
            burst,
            every,
            dump,
        } => run::run(run::RunArgs {
            preset,
            frames,
            dt,
            seed,
            parallel,
            burst,
            every,
            dump,
        }),
        Commands::Validate { preset, format } => validate::run(&preset, &format),
    }
}
