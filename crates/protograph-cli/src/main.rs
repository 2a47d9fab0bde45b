//! protograph CLI
//!
//! Loads a generation request (or a bare descriptor set) from JSON, builds the
//! linked schema graph and reports on it:
//! - `inspect`: outline every file with resolved references
//! - `comments`: show the location and comments of one declaration
//! - `outline`: run the built-in outline plugin and emit a response JSON

use anyhow::Result;
use clap::{Parser, Subcommand};
use protograph::{BuildOptions, DuplicateNamePolicy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod inspect;
mod outline;
mod request;

#[derive(Parser)]
#[command(name = "protograph")]
#[command(
    author,
    version,
    about = "protograph: linked protobuf schema graphs for code generators"
)]
struct Cli {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Let a later declaration replace an earlier one with the same full name.
    #[arg(long, global = true)]
    allow_duplicate_names: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an outline of every file in the request.
    Inspect {
        /// Request JSON (`CodeGeneratorRequest` or `FileDescriptorSet`).
        request: PathBuf,
        /// Files to generate (replaces the request's own list).
        #[arg(long = "generate")]
        generate: Vec<String>,
    },

    /// Print the location path and comments of a message or enum.
    Comments {
        /// Request JSON (`CodeGeneratorRequest` or `FileDescriptorSet`).
        request: PathBuf,
        /// Fully-qualified name, e.g. `acme.v1.Payment`.
        full_name: String,
    },

    /// Run the outline generator and write the response JSON.
    Outline {
        /// Request JSON (`CodeGeneratorRequest` or `FileDescriptorSet`).
        request: PathBuf,
        /// Output response JSON (default: stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Files to generate (replaces the request's own list).
        #[arg(long = "generate")]
        generate: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = BuildOptions {
        duplicate_names: if cli.allow_duplicate_names {
            DuplicateNamePolicy::Overwrite
        } else {
            DuplicateNamePolicy::Reject
        },
    };

    match cli.command {
        Commands::Inspect { request, generate } => {
            inspect::cmd_inspect(&request, &generate, options)
        }
        Commands::Comments { request, full_name } => {
            inspect::cmd_comments(&request, &full_name, options)
        }
        Commands::Outline {
            request,
            out,
            generate,
        } => outline::cmd_outline(&request, out.as_ref(), &generate, options),
    }
}
