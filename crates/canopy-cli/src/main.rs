//! Canopy CLI - browse data-model catalogs from the terminal
//!
//! This is the main entry point for users interacting with Canopy without
//! the desktop viewer. It provides commands for listing federations and
//! models, printing a model's hierarchy, searching it, and exporting it.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(author = "Canopy Contributors")]
#[command(version)]
#[command(about = "Browse data-model catalogs across research federations", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Catalog backend base URL
    #[arg(
        long,
        global = true,
        env = "CANOPY_BACKEND_URL",
        default_value = "http://localhost:8080"
    )]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List federations and their data models
    Federations,

    /// List data models, grouped by study design
    Models {
        /// Only models belonging to this federation code
        #[arg(long)]
        federation: Option<String>,

        /// Only released models
        #[arg(long)]
        released: bool,
    },

    /// Print a model's hierarchy as a tree
    Show {
        /// A local JSON file, a model UUID, or a code/label query
        target: String,

        /// With a query target, pick the highest matching version
        #[arg(long)]
        latest: bool,

        /// Maximum depth to print
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Search a model's variables or groups by name
    Search {
        /// A local JSON file, a model UUID, or a code/label query
        target: String,

        /// Substring to look for
        query: String,

        /// Search groups instead of variables
        #[arg(long)]
        groups: bool,

        /// Only variables of this declared type
        #[arg(long = "type")]
        var_type: Option<String>,
    },

    /// Export a model document as pretty JSON
    Export {
        /// Model UUID
        uuid: Uuid,

        /// Output file
        #[arg(short, long, default_value = "data-model.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Federations => commands::federations(&cli.url).await,
        Commands::Models {
            federation,
            released,
        } => commands::models(&cli.url, federation.as_deref(), released).await,
        Commands::Show {
            target,
            latest,
            depth,
        } => commands::show(&cli.url, &target, latest, depth).await,
        Commands::Search {
            target,
            query,
            groups,
            var_type,
        } => commands::search(&cli.url, &target, &query, groups, var_type.as_deref()).await,
        Commands::Export { uuid, output } => commands::export(&cli.url, uuid, &output).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
