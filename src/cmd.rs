//! Command implementations for the CLI interface.
//!
//! Each handler stands in for the host application: it translates a
//! subcommand into card [`Action`]s, runs them through the reducer against
//! the loaded store, and saves the result. The handlers never mutate the
//! store directly — everything goes through `action::dispatch`.

use std::path::Path;

use chrono::Utc;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::action::{dispatch, Action};
use crate::card::Card;
use crate::cli::Cli;
use crate::fields::{ScalarField, Section, StatusKey};
use crate::store::{CardStore, WriteOp};
use crate::view;

#[derive(Subcommand)]
pub enum Commands {
    /// Print the card as a plain-text table.
    Show,

    /// Edit top-level card fields.
    Edit {
        /// Project name shown in the card header.
        #[arg(long)]
        title: Option<String>,
        /// Task description.
        #[arg(long)]
        desc: Option<String>,
        /// Start date.
        #[arg(long)]
        start: Option<String>,
        /// Hand-in-for-validation date.
        #[arg(long)]
        validate: Option<String>,
        /// Approval date.
        #[arg(long)]
        approved: Option<String>,
        /// Handoff date.
        #[arg(long)]
        handoff: Option<String>,
    },

    /// Set the status badge.
    Status {
        /// Status code: wip | ready-to-validate | approved | blocked | archived | handoff.
        #[arg(value_enum)]
        status: StatusKey,
    },

    /// Manage contact rows.
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },

    /// Manage resource rows.
    Resource {
        #[command(subcommand)]
        action: ResourceAction,
    },

    /// Manage checklist rows.
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ContactAction {
    /// Append a new contact row.
    Add,
    /// Remove a contact row by slot index.
    Remove {
        /// Slot index as shown by `show` (slot 0 is permanent).
        slot: usize,
    },
    /// Edit a contact row's fields.
    Set {
        /// Slot index.
        slot: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ResourceAction {
    /// Append a new resource row.
    Add,
    /// Remove a resource row by slot index. Removing the last visible row
    /// clears it instead of leaving the section empty.
    Remove {
        /// Slot index.
        slot: usize,
    },
    /// Edit a resource row's fields.
    Set {
        /// Slot index.
        slot: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ItemAction {
    /// Append a new checklist row.
    Add,
    /// Remove a checklist row by slot index.
    Remove {
        /// Slot index (slot 0 is permanent).
        slot: usize,
    },
    /// Flip a checklist row's checkbox.
    Toggle {
        /// Slot index.
        slot: usize,
    },
    /// Edit a checklist row's fields.
    Set {
        /// Slot index.
        slot: usize,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
}

/// Dispatch a batch of actions and save when anything changed.
/// Returns the number of actions that actually produced writes.
fn commit(store: &mut CardStore, path: &Path, actions: &[Action]) -> usize {
    let now = Utc::now();
    let mut applied = 0;
    for action in actions {
        if !dispatch(store, action, now).is_empty() {
            applied += 1;
        }
    }
    if applied > 0 {
        if let Err(e) = store.save(path) {
            eprintln!("Failed to save card: {e}");
        }
    }
    applied
}

/// Collect `SetField` actions for the attributes that were provided.
fn field_edits(
    section: Section,
    slot: usize,
    values: &[(&str, &Option<String>)],
) -> Vec<Action> {
    values
        .iter()
        .filter_map(|(attribute, value)| {
            value.as_ref().map(|v| Action::SetField {
                section,
                index: slot,
                attribute: (*attribute).to_string(),
                value: v.clone(),
            })
        })
        .collect()
}

/// True when the slot exists in the section; prints a notice otherwise.
/// The state model tolerates any index, but the CLI only edits real rows.
fn check_slot(store: &CardStore, section: Section, slot: usize, noun: &str) -> bool {
    if slot < Card::new(store).slot_count(section) {
        true
    } else {
        println!("No {noun} slot {slot}.");
        false
    }
}

/// Print the rendered card.
pub fn cmd_show(store: &CardStore) {
    view::print_card(&view::project(store));
}

/// Apply edits to the top-level scalar fields.
pub fn cmd_edit(
    store: &mut CardStore,
    path: &Path,
    title: Option<String>,
    desc: Option<String>,
    start: Option<String>,
    validate: Option<String>,
    approved: Option<String>,
    handoff: Option<String>,
) {
    let edits: Vec<Action> = [
        (ScalarField::ProjectName, title),
        (ScalarField::TaskDescription, desc),
        (ScalarField::DateStart, start),
        (ScalarField::DateValidate, validate),
        (ScalarField::DateApproved, approved),
        (ScalarField::DateHandoff, handoff),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|value| Action::SetScalar { field, value }))
    .collect();

    if edits.is_empty() {
        println!("Nothing to edit.");
        return;
    }
    let applied = commit(store, path, &edits);
    println!("Updated {applied} field(s).");
}

/// Set the status badge.
pub fn cmd_status(store: &mut CardStore, path: &Path, status: StatusKey) {
    commit(store, path, &[Action::SetStatus { key: status.as_key().to_string() }]);
    println!("Status set to {}.", status.as_key());
}

/// Handle the contact subcommands.
pub fn cmd_contact(store: &mut CardStore, path: &Path, action: ContactAction) {
    match action {
        ContactAction::Add => {
            commit(store, path, &[Action::AddSlot { section: Section::Contacts }]);
            let slot = Card::new(store).slot_count(Section::Contacts) - 1;
            println!("Added contact slot {slot}.");
        }
        ContactAction::Remove { slot } => {
            if !check_slot(store, Section::Contacts, slot, "contact") {
                return;
            }
            let applied =
                commit(store, path, &[Action::HideSlot { section: Section::Contacts, index: slot }]);
            if applied == 0 {
                println!("Contact slot 0 can't be removed.");
            } else {
                println!("Removed contact slot {slot}.");
            }
        }
        ContactAction::Set { slot, name, role, email } => {
            if !check_slot(store, Section::Contacts, slot, "contact") {
                return;
            }
            let edits = field_edits(
                Section::Contacts,
                slot,
                &[("name", &name), ("role", &role), ("email", &email)],
            );
            if edits.is_empty() {
                println!("Nothing to edit.");
                return;
            }
            commit(store, path, &edits);
            println!("Updated contact slot {slot}.");
        }
    }
}

/// Handle the resource subcommands.
pub fn cmd_resource(store: &mut CardStore, path: &Path, action: ResourceAction) {
    match action {
        ResourceAction::Add => {
            commit(store, path, &[Action::AddSlot { section: Section::Resources }]);
            let slot = Card::new(store).slot_count(Section::Resources) - 1;
            println!("Added resource slot {slot}.");
        }
        ResourceAction::Remove { slot } => {
            if !check_slot(store, Section::Resources, slot, "resource") {
                return;
            }
            let ops = dispatch(
                store,
                &Action::HideSlot { section: Section::Resources, index: slot },
                Utc::now(),
            );
            if ops.is_empty() {
                return;
            }
            if let Err(e) = store.save(path) {
                eprintln!("Failed to save card: {e}");
            }
            // The collapse path replaces the visibility list wholesale.
            let collapsed = ops.iter().any(|op| matches!(op, WriteOp::ListReplace { .. }));
            if collapsed {
                println!("Cleared the last resource row.");
            } else {
                println!("Removed resource slot {slot}.");
            }
        }
        ResourceAction::Set { slot, name, url } => {
            if !check_slot(store, Section::Resources, slot, "resource") {
                return;
            }
            let edits = field_edits(Section::Resources, slot, &[("name", &name), ("url", &url)]);
            if edits.is_empty() {
                println!("Nothing to edit.");
                return;
            }
            commit(store, path, &edits);
            println!("Updated resource slot {slot}.");
        }
    }
}

/// Handle the checklist subcommands.
pub fn cmd_item(store: &mut CardStore, path: &Path, action: ItemAction) {
    match action {
        ItemAction::Add => {
            commit(store, path, &[Action::AddSlot { section: Section::Checklist }]);
            let slot = Card::new(store).slot_count(Section::Checklist) - 1;
            println!("Added checklist slot {slot}.");
        }
        ItemAction::Remove { slot } => {
            if !check_slot(store, Section::Checklist, slot, "checklist") {
                return;
            }
            let applied =
                commit(store, path, &[Action::HideSlot { section: Section::Checklist, index: slot }]);
            if applied == 0 {
                println!("Checklist slot 0 can't be removed.");
            } else {
                println!("Removed checklist slot {slot}.");
            }
        }
        ItemAction::Toggle { slot } => {
            if !check_slot(store, Section::Checklist, slot, "checklist") {
                return;
            }
            commit(store, path, &[Action::ToggleChecked { index: slot }]);
            let state = if Card::new(store).is_checked(slot) { "checked" } else { "unchecked" };
            println!("Checklist slot {slot} is now {state}.");
        }
        ItemAction::Set { slot, label, note } => {
            if !check_slot(store, Section::Checklist, slot, "checklist") {
                return;
            }
            let edits = field_edits(Section::Checklist, slot, &[("label", &label), ("note", &note)]);
            if edits.is_empty() {
                println!("Nothing to edit.");
                return;
            }
            commit(store, path, &edits);
            println!("Updated checklist slot {slot}.");
        }
    }
}

/// Emit completion definitions for the given shell.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_persists_applied_actions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        let mut store = CardStore::load(&path);

        let applied = commit(
            &mut store,
            &path,
            &[
                Action::SetScalar { field: ScalarField::ProjectName, value: "Atlas".into() },
                Action::AddSlot { section: Section::Contacts },
            ],
        );
        assert_eq!(applied, 2);

        let reloaded = CardStore::load(&path);
        let card = Card::new(&reloaded);
        assert_eq!(card.scalar(ScalarField::ProjectName), "Atlas");
        assert_eq!(card.slot_count(Section::Contacts), 2);
    }

    #[test]
    fn commit_skips_save_when_nothing_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        let mut store = CardStore::load(&path);

        let applied = commit(
            &mut store,
            &path,
            &[Action::HideSlot { section: Section::Contacts, index: 0 }],
        );
        assert_eq!(applied, 0);
        assert!(!path.exists());
    }

    #[test]
    fn field_edits_keeps_only_provided_attributes() {
        let edits = field_edits(
            Section::Contacts,
            1,
            &[("name", &Some("Ada".to_string())), ("role", &None), ("email", &None)],
        );
        assert_eq!(
            edits,
            vec![Action::SetField {
                section: Section::Contacts,
                index: 1,
                attribute: "name".into(),
                value: "Ada".into(),
            }]
        );
    }
}
