//! VocalShop CLI - Offline tools for the voice assistant.
//!
//! # Usage
//!
//! ```bash
//! # Parse an utterance into intent and slots
//! vs-cli parse "chemise bleue taille M a moins de 60 euros"
//!
//! # Run the relaxation search against a catalog file
//! vs-cli search "baskets noires a moins de 100 euros" -c catalog.json
//!
//! # Dry-run an add-to-cart decision
//! vs-cli add "ajoute la chemise bleue en M" -c catalog.json
//!
//! # Validate a catalog feed before pointing the widget at it
//! vs-cli catalog validate -c catalog.json
//! ```
//!
//! Without `-c`, commands run against the embedded demo catalog, which is
//! handy for reproducing widget behavior without a server.

#![cfg_attr(not(test), forbid(unsafe_code))]
// A CLI talks to its user on stdout.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vs-cli")]
#[command(author, version, about = "VocalShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an utterance into intent and slots
    Parse {
        /// The utterance, as the recognizer would transcribe it
        utterance: String,

        /// Print the raw JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Run the relaxation search for an utterance
    Search {
        /// The utterance, as the recognizer would transcribe it
        utterance: String,

        /// Catalog file (embedded demo catalog if omitted)
        #[arg(short, long)]
        catalog: Option<std::path::PathBuf>,
    },
    /// Dry-run an add-to-cart decision for an utterance
    Add {
        /// The utterance, as the recognizer would transcribe it
        utterance: String,

        /// Catalog file (embedded demo catalog if omitted)
        #[arg(short, long)]
        catalog: Option<std::path::PathBuf>,
    },
    /// Catalog feed tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Validate a catalog file against the feed schema
    Validate {
        /// Catalog file
        #[arg(short, long)]
        catalog: std::path::PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Parse { utterance, json } => commands::query::parse(&utterance, json)?,
        Commands::Search { utterance, catalog } => {
            commands::query::search(&utterance, catalog.as_deref())?;
        }
        Commands::Add { utterance, catalog } => {
            commands::query::add(&utterance, catalog.as_deref())?;
        }
        Commands::Catalog { action } => match action {
            CatalogAction::Validate { catalog } => commands::catalog::validate(&catalog)?,
        },
    }
    Ok(())
}
