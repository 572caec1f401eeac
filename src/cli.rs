// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments and the global output flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slipway")]
#[command(about = "Build a service from source, publish its image and deploy it to a cluster")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new slipway.yml configuration file
    Init {
        /// Source repository, optionally suffixed with @<revision>
        #[arg(long)]
        source: Option<String>,

        /// Image reference to build and publish
        #[arg(long)]
        image: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Check the configuration without contacting anything
    Validate {
        /// Configuration file (discovered in the current directory by default)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show the stage calls a run would make, in order
    Plan {
        /// Configuration file (discovered in the current directory by default)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Fetch, build, push and deploy
    Run {
        /// Configuration file (discovered in the current directory by default)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
