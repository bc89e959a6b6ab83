use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Collaborative task-card editor CLI.
/// Storage defaults to ~/.taskcard/card.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "card", version, about = "Collaborative task-card editor")]
pub struct Cli {
    /// Path to the card JSON file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
