//! Command-line front end for the newsdesk store.
//!
//! Reads `NEWSDESK_*` settings (optionally from `.env`), opens the database
//! and prints every result as JSON on stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "newsdesk")]
#[command(about = "Manage news items, topics and their links", long_about = None)]
struct Cli {
    /// Database file; overrides NEWSDESK_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Topic operations
    Topic(commands::topic::TopicArgs),
    /// News operations
    News(commands::news::NewsArgs),
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let result = commands::Runtime::start(cli.db).and_then(|runtime| match cli.command {
        Commands::Topic(args) => commands::topic::execute(&runtime, args),
        Commands::News(args) => commands::news::execute(&runtime, args),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
