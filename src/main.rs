//! # card - Collaborative Task-Card Editor
//!
//! A structured, editable task card synchronized through a last-write-wins
//! field store, with a CLI standing in for the host application.
//!
//! ## Key Features
//!
//! - **Scalar Fields**: title, description, four workflow dates, and a
//!   closed-set status badge with a safe default
//! - **Repeated Sections**: contacts, resources, and a checklist, each built
//!   on append-only slot indices with logical (non-purging) deletion
//! - **Replication Model**: every edit is a replicated write resolved
//!   last-write-wins per key, with an explicit broadcast hub for multi-client
//!   use
//! - **Deterministic Rendering**: the card view is a pure projection of the
//!   store, re-derivable at any time
//!
//! ## Quick Start
//!
//! ```bash
//! # Print the card
//! card show
//!
//! # Name the project and set a date
//! card edit --title "Onboarding flow" --start 2024-03-04
//!
//! # Work the sections
//! card contact add
//! card contact set 1 --name "Ada" --email ada@example.com
//! card item add
//! card item toggle 1
//!
//! # Update the badge
//! card status approved
//! ```
//!
//! Data is stored locally in `~/.taskcard/card.json`; pass `--db` to work on
//! a different card file.

use std::path::PathBuf;

use clap::Parser;

pub mod action;
pub mod card;
pub mod cli;
pub mod cmd;
pub mod fields;
pub mod store;
pub mod sync;
pub mod view;

use cli::Cli;
use cmd::Commands;
use store::CardStore;

fn main() {
    let cli = Cli::parse();

    // Completions need no card file.
    if let Commands::Completions { shell } = &cli.command {
        cmd::cmd_completions(*shell);
        return;
    }

    // Determine the card file to use.
    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let card_dir = PathBuf::from(home).join(".taskcard");
        if let Err(e) = std::fs::create_dir_all(&card_dir) {
            eprintln!("Failed to create card directory {}: {}", card_dir.display(), e);
            std::process::exit(1);
        }
        card_dir.join("card.json")
    });

    let mut store = CardStore::load(&db_path);

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::Show => cmd::cmd_show(&store),

        Commands::Edit { title, desc, start, validate, approved, handoff } =>
            cmd::cmd_edit(&mut store, &db_path, title, desc, start, validate, approved, handoff),

        Commands::Status { status } => cmd::cmd_status(&mut store, &db_path, status),

        Commands::Contact { action } => cmd::cmd_contact(&mut store, &db_path, action),

        Commands::Resource { action } => cmd::cmd_resource(&mut store, &db_path, action),

        Commands::Item { action } => cmd::cmd_item(&mut store, &db_path, action),
    }
}
