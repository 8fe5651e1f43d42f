use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "basalt", version, about = "Transform YAML resource declarations into Terraform for AWS Bedrock agent stacks")]
pub struct Cli {
    /// Path to basalt.toml (defaults to <path>/basalt.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover and list all declared resources under a directory
    Scan {
        /// Directory containing YAML resource declarations
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Check declared resources for dangling references and naming issues
    Validate {
        /// Directory containing YAML resource declarations
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Generate a Terraform root module from declared resources
    Generate {
        /// Directory containing YAML resource declarations
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output directory for the generated main.tf
        #[arg(long, default_value = "terraform")]
        out: PathBuf,
    },
}
