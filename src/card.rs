//! Typed read bindings over a card's synced store.
//!
//! [`Card`] is a borrow of a [`CardStore`] exposing every field with its
//! documented default: scalars read as empty strings, the status badge
//! resolves unknown codes to the default code, and checked state beyond the
//! end of the checked list reads as `false`. All reads are total.

use crate::fields::{
    ScalarField, Section, StatusKey, LAST_UPDATED_KEY, STATUS_KEY, TASK_CHECKED_KEY,
    USER_PHOTO_KEY,
};
use crate::store::CardStore;

/// Read view of one card.
#[derive(Debug, Clone, Copy)]
pub struct Card<'a> {
    store: &'a CardStore,
}

impl<'a> Card<'a> {
    /// Bind a read view to a store.
    pub fn new(store: &'a CardStore) -> Self {
        Card { store }
    }

    /// Current value of a top-level scalar field; empty string when unset.
    pub fn scalar(&self, field: ScalarField) -> &'a str {
        self.store.text(field.key()).unwrap_or("")
    }

    /// Effective status code, with unknown or missing codes falling back to
    /// the default.
    pub fn status(&self) -> StatusKey {
        StatusKey::resolve(self.store.text(STATUS_KEY))
    }

    /// The raw last-updated timestamp (ISO-8601), empty if never written.
    pub fn last_updated(&self) -> &'a str {
        self.store.text(LAST_UPDATED_KEY).unwrap_or("")
    }

    /// Author photo URL captured at card construction, if the host had one.
    pub fn author_photo(&self) -> Option<&'a str> {
        self.store.text(USER_PHOTO_KEY)
    }

    /// A section's visibility list. Index = stable slot id.
    pub fn visibility(&self, section: Section) -> &'a [bool] {
        self.store.list(section.visibility_key())
    }

    /// Number of slots ever created in a section.
    pub fn slot_count(&self, section: Section) -> usize {
        self.visibility(section).len()
    }

    /// Whether a slot is currently visible; out-of-range slots are not.
    pub fn is_visible(&self, section: Section, index: usize) -> bool {
        self.visibility(section).get(index).copied().unwrap_or(false)
    }

    /// Number of currently visible slots in a section.
    pub fn visible_count(&self, section: Section) -> usize {
        self.visibility(section).iter().filter(|v| **v).count()
    }

    /// A slot attribute's value; empty string when the field was never set.
    pub fn field(&self, section: Section, index: usize, attribute: &str) -> &'a str {
        self.store
            .map_get(section.fields_key(), &format!("{index}_{attribute}"))
            .unwrap_or("")
    }

    /// The checklist checked list. May be shorter than the checklist's
    /// visibility list.
    pub fn checked(&self) -> &'a [bool] {
        self.store.list(TASK_CHECKED_KEY)
    }

    /// Checked state of a checklist slot; indices beyond the checked list
    /// read as `false`.
    pub fn is_checked(&self, index: usize) -> bool {
        self.checked().get(index).copied().unwrap_or(false)
    }
}
