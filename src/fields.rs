//! Enumerations and schema types for the task card.
//!
//! This module defines the closed status-code set, the top-level scalar
//! fields, and the three repeated sections together with the store keys and
//! attribute names they are synchronized under.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Workflow status badge shown on the card footer.
///
/// The set is closed: unknown or missing codes resolve to [`StatusKey::Wip`],
/// the default, rather than failing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKey {
    #[serde(alias = "WIP")]
    Wip,
    #[serde(alias = "READY TO VALIDATE")]
    ReadyToValidate,
    #[serde(alias = "APPROVED")]
    Approved,
    #[serde(alias = "BLOCKED")]
    Blocked,
    #[serde(alias = "ARCHIVED")]
    Archived,
    #[serde(alias = "HANDOFF")]
    Handoff,
}

/// All status codes in enumeration order; the first entry is the default.
pub const STATUS_KEYS: [StatusKey; 6] = [
    StatusKey::Wip,
    StatusKey::ReadyToValidate,
    StatusKey::Approved,
    StatusKey::Blocked,
    StatusKey::Archived,
    StatusKey::Handoff,
];

/// Badge colour palette for a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub bg: &'static str,
    pub dot: &'static str,
    pub text: &'static str,
    pub label: &'static str,
}

impl StatusKey {
    /// The wire key stored in the field store for this code.
    pub fn as_key(self) -> &'static str {
        match self {
            StatusKey::Wip => "WIP",
            StatusKey::ReadyToValidate => "READY TO VALIDATE",
            StatusKey::Approved => "APPROVED",
            StatusKey::Blocked => "BLOCKED",
            StatusKey::Archived => "ARCHIVED",
            StatusKey::Handoff => "HANDOFF",
        }
    }

    /// Parse a wire key, returning `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<StatusKey> {
        STATUS_KEYS.iter().copied().find(|k| k.as_key() == s)
    }

    /// Resolve a possibly-missing or unknown wire key to an effective code.
    /// Unknown and absent values fall back to the default code.
    pub fn resolve(s: Option<&str>) -> StatusKey {
        s.and_then(StatusKey::parse).unwrap_or_default()
    }

    /// Badge colours for this code.
    pub fn badge(self) -> Badge {
        match self {
            StatusKey::Wip => Badge { bg: "#F5D000", dot: "#111111", text: "#111111", label: "WIP" },
            StatusKey::ReadyToValidate => Badge { bg: "#E1BEE7", dot: "#283593", text: "#283593", label: "READY TO VALIDATE" },
            StatusKey::Approved => Badge { bg: "#4CAF50", dot: "#FFFFFF", text: "#FFFFFF", label: "APPROVED" },
            StatusKey::Blocked => Badge { bg: "#E53935", dot: "#FFFFFF", text: "#FFFFFF", label: "BLOCKED" },
            StatusKey::Archived => Badge { bg: "#E0E0E0", dot: "#616161", text: "#616161", label: "ARCHIVED" },
            StatusKey::Handoff => Badge { bg: "#B2DFDB", dot: "#00695C", text: "#00695C", label: "HANDOFF" },
        }
    }
}

impl Default for StatusKey {
    fn default() -> Self {
        STATUS_KEYS[0]
    }
}

/// Top-level editable string fields of the card.
///
/// Empty string means "unset" and renders as a placeholder; there is no
/// separate null state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarField {
    ProjectName,
    TaskDescription,
    DateStart,
    DateValidate,
    DateApproved,
    DateHandoff,
}

impl ScalarField {
    /// The field-store key this scalar is synchronized under.
    pub fn key(self) -> &'static str {
        match self {
            ScalarField::ProjectName => "projectName",
            ScalarField::TaskDescription => "taskDescription",
            ScalarField::DateStart => "dateStart",
            ScalarField::DateValidate => "dateValidate",
            ScalarField::DateApproved => "dateApproved",
            ScalarField::DateHandoff => "dateHandoff",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            ScalarField::ProjectName => "Project",
            ScalarField::TaskDescription => "Description",
            ScalarField::DateStart => "Start",
            ScalarField::DateValidate => "To validate",
            ScalarField::DateApproved => "Approved",
            ScalarField::DateHandoff => "Handoff",
        }
    }
}

/// The three repeated sections of the card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Contacts,
    Resources,
    Checklist,
}

impl Section {
    /// Store key of this section's visibility list.
    pub fn visibility_key(self) -> &'static str {
        match self {
            Section::Contacts => "contactsVisible",
            Section::Resources => "resourcesVisible",
            Section::Checklist => "tasksVisible",
        }
    }

    /// Store key of this section's sparse field map.
    pub fn fields_key(self) -> &'static str {
        match self {
            Section::Contacts => "contactFields",
            Section::Resources => "resourceFields",
            Section::Checklist => "taskFields",
        }
    }

    /// Attribute names valid for this section's slots.
    pub fn attributes(self) -> &'static [&'static str] {
        match self {
            Section::Contacts => &["name", "role", "email"],
            Section::Resources => &["name", "url"],
            Section::Checklist => &["label", "note"],
        }
    }

    /// Whether slot 0 is unconditionally protected from hiding.
    ///
    /// Contacts and checklist always present their first row; resources
    /// handle slot 0 through the last-visible-row collapse rule instead.
    pub fn protects_first_slot(self) -> bool {
        matches!(self, Section::Contacts | Section::Checklist)
    }
}

/// Store key of the checklist's parallel checked-state list.
pub const TASK_CHECKED_KEY: &str = "taskChecked";

/// Store key of the status badge scalar.
pub const STATUS_KEY: &str = "statusBadge";

/// Store key of the last-updated timestamp scalar.
pub const LAST_UPDATED_KEY: &str = "lastUpdated";

/// Store key of the one-shot author photo URL.
pub const USER_PHOTO_KEY: &str = "currentUserPhoto";
