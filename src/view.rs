//! Render projection: the row structure the visual renderer consumes.
//!
//! [`project`] derives a [`CardView`] purely from the current store — same
//! state in, structurally identical view out. Hidden slots are filtered
//! before numbering, so a row's displayed ordinal is its 1-based position in
//! the visible list, not its slot index, and renumbers when earlier rows are
//! hidden. The actual box layout, gradients and fonts live in the host's
//! rendering engine; this module only shapes the data (and prints it as a
//! plain table for the CLI).

use chrono::DateTime;

use crate::card::Card;
use crate::fields::{Badge, ScalarField, StatusKey, Section};
use crate::store::CardStore;

/// One visible contact row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub slot: usize,
    pub ordinal: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub removable: bool,
}

/// One visible resource row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRow {
    pub slot: usize,
    pub ordinal: String,
    pub name: String,
    pub url: String,
    pub removable: bool,
}

/// One visible checklist row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistRow {
    pub slot: usize,
    pub ordinal: String,
    pub label: String,
    pub note: String,
    pub checked: bool,
    pub removable: bool,
}

/// Fully derived view of one card, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub description: String,
    pub status: StatusKey,
    pub badge: Badge,
    pub dates: Vec<(ScalarField, String)>,
    pub last_updated: String,
    pub author_photo: Option<String>,
    pub contacts: Vec<ContactRow>,
    pub resources: Vec<ResourceRow>,
    pub checklist: Vec<ChecklistRow>,
}

/// 1-based, zero-padded (2 digits) ordinal for a visible-list position.
fn ordinal(position: usize) -> String {
    format!("{:02}", position + 1)
}

/// Format the stored ISO-8601 timestamp for display, "dd/mm/yyyy, HH:MMh".
/// Unparsable or missing timestamps display as "-".
pub fn format_last_updated(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(t) => t.format("%d/%m/%Y, %H:%Mh").to_string(),
        Err(_) => "-".to_string(),
    }
}

/// Project the current state into its view. Pure; safe to re-invoke on every
/// state change.
pub fn project(store: &CardStore) -> CardView {
    let card = Card::new(store);

    let contacts = visible_slots(&card, Section::Contacts)
        .map(|(position, slot)| ContactRow {
            slot,
            ordinal: ordinal(position),
            name: card.field(Section::Contacts, slot, "name").to_string(),
            role: card.field(Section::Contacts, slot, "role").to_string(),
            email: card.field(Section::Contacts, slot, "email").to_string(),
            removable: slot > 0,
        })
        .collect();

    let resource_visible = card.visible_count(Section::Resources);
    let resources = visible_slots(&card, Section::Resources)
        .map(|(position, slot)| {
            let name = card.field(Section::Resources, slot, "name").to_string();
            let url = card.field(Section::Resources, slot, "url").to_string();
            // Slot 0 only offers its remove control when removing it would
            // actually do something: clear content, or drop one of several
            // visible rows.
            let removable = slot > 0
                || !name.trim().is_empty()
                || !url.trim().is_empty()
                || resource_visible > 1;
            ResourceRow { slot, ordinal: ordinal(position), name, url, removable }
        })
        .collect();

    let checklist = visible_slots(&card, Section::Checklist)
        .map(|(position, slot)| ChecklistRow {
            slot,
            ordinal: ordinal(position),
            label: card.field(Section::Checklist, slot, "label").to_string(),
            note: card.field(Section::Checklist, slot, "note").to_string(),
            checked: card.is_checked(slot),
            removable: slot > 0,
        })
        .collect();

    let status = card.status();
    CardView {
        title: card.scalar(ScalarField::ProjectName).to_string(),
        description: card.scalar(ScalarField::TaskDescription).to_string(),
        status,
        badge: status.badge(),
        dates: [
            ScalarField::DateStart,
            ScalarField::DateValidate,
            ScalarField::DateApproved,
            ScalarField::DateHandoff,
        ]
        .into_iter()
        .map(|f| (f, card.scalar(f).to_string()))
        .collect(),
        last_updated: format_last_updated(card.last_updated()),
        author_photo: card.author_photo().map(str::to_string),
        contacts,
        resources,
        checklist,
    }
}

/// Visible slots of a section as `(visible position, slot index)` pairs.
fn visible_slots<'a>(
    card: &Card<'a>,
    section: Section,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    card.visibility(section)
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v)
        .map(|(slot, _)| slot)
        .enumerate()
}

/// Display an empty value as "-".
fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

/// Print a card view as a plain-text table.
pub fn print_card(view: &CardView) {
    println!("{}", or_dash(&view.title));
    println!("Status: {}   Last updated: {}", view.badge.label, view.last_updated);
    println!();
    println!("Description: {}", or_dash(&view.description));
    println!();
    println!("Dates");
    for (field, value) in &view.dates {
        println!("  {:<12} {}", format!("{}:", field.label()), or_dash(value));
    }
    println!();
    println!("Contacts");
    for row in &view.contacts {
        println!(
            "  {}  {:<20} {:<16} {}",
            row.ordinal,
            or_dash(&row.name),
            or_dash(&row.role),
            or_dash(&row.email)
        );
    }
    println!();
    println!("Resources");
    for row in &view.resources {
        println!("  {}  {:<20} {}", row.ordinal, or_dash(&row.name), or_dash(&row.url));
    }
    println!();
    println!("Checklist");
    for row in &view.checklist {
        let mark = if row.checked { "x" } else { " " };
        let note = if row.note.is_empty() { String::new() } else { format!("  ({})", row.note) };
        println!("  {}  [{}] {}{}", row.ordinal, mark, or_dash(&row.label), note);
    }
}
