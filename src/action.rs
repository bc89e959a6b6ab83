//! Mutation engine: card actions and the reducer that applies them.
//!
//! Every user interaction is expressed as one [`Action`] and routed through
//! [`apply`], a pure function from current state + action to the list of
//! replicated writes it produces. All actions are total: guarded or
//! out-of-range requests produce no writes instead of failing. The reducer
//! is also the single place that couples mutations to the `lastUpdated`
//! refresh — every action that produces writes appends one, no-ops do not.

use chrono::{DateTime, Utc};

use crate::card::Card;
use crate::fields::{
    ScalarField, Section, StatusKey, LAST_UPDATED_KEY, STATUS_KEY, TASK_CHECKED_KEY,
};
use crate::store::{iso_timestamp, CardStore, Value, WriteOp};

/// One user-initiated mutation of the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Commit a new value for a top-level scalar field.
    SetScalar { field: ScalarField, value: String },
    /// Select a status code. Unknown codes are stored as the default code.
    SetStatus { key: String },
    /// Append a fresh visible slot to a section.
    AddSlot { section: Section },
    /// Logically delete a slot. Slot 0 of contacts/checklist is guarded;
    /// hiding the last visible resource row collapses to one empty row.
    HideSlot { section: Section, index: usize },
    /// Write one slot attribute. Free-form text, no validation.
    SetField { section: Section, index: usize, attribute: String, value: String },
    /// Flip a checklist slot's checked state, extending the checked list as
    /// needed to hold it.
    ToggleChecked { index: usize },
}

/// Compute the writes an action produces against the given state.
///
/// Pure: the store is only read. The caller applies the returned ops to its
/// replica and hands them to the replication layer.
pub fn apply(store: &CardStore, action: &Action, now: DateTime<Utc>) -> Vec<WriteOp> {
    let card = Card::new(store);
    let mut ops = match action {
        Action::SetScalar { field, value } => vec![WriteOp::Set {
            key: field.key().to_string(),
            value: Value::Text(value.clone()),
        }],
        Action::SetStatus { key } => {
            let resolved = StatusKey::resolve(Some(key));
            vec![WriteOp::Set {
                key: STATUS_KEY.to_string(),
                value: Value::Text(resolved.as_key().to_string()),
            }]
        }
        Action::AddSlot { section } => {
            let mut ops = vec![WriteOp::ListPush {
                list: section.visibility_key().to_string(),
                value: true,
            }];
            // Only the checklist's own add extends the checked list (I5).
            if *section == Section::Checklist {
                ops.push(WriteOp::ListPush { list: TASK_CHECKED_KEY.to_string(), value: false });
            }
            ops
        }
        Action::HideSlot { section, index } => hide_slot(&card, *section, *index),
        Action::SetField { section, index, attribute, value } => vec![WriteOp::MapSet {
            map: section.fields_key().to_string(),
            key: format!("{index}_{attribute}"),
            value: value.clone(),
        }],
        Action::ToggleChecked { index } => {
            let mut checked = card.checked().to_vec();
            if *index >= checked.len() {
                checked.resize(index + 1, false);
            }
            checked[*index] = !checked[*index];
            vec![WriteOp::ListReplace { list: TASK_CHECKED_KEY.to_string(), values: checked }]
        }
    };
    if !ops.is_empty() {
        ops.push(refresh_last_updated(&card, now));
    }
    ops
}

/// Compute and locally apply an action in one step, returning the writes for
/// the replication layer.
pub fn dispatch(store: &mut CardStore, action: &Action, now: DateTime<Utc>) -> Vec<WriteOp> {
    let ops = apply(store, action, now);
    store.apply_all(&ops);
    ops
}

/// Hide one slot, honouring the guards and the resources collapse rule.
fn hide_slot(card: &Card, section: Section, index: usize) -> Vec<WriteOp> {
    let visibility = card.visibility(section);
    if index >= visibility.len() {
        return Vec::new();
    }
    if section.protects_first_slot() && index == 0 {
        return Vec::new();
    }
    if section == Section::Resources {
        // Collapse check runs before the flip is committed: count the rows
        // that would remain visible with this slot hidden.
        let remaining = visibility
            .iter()
            .enumerate()
            .filter(|&(i, &v)| v && i != index)
            .count();
        if remaining == 0 {
            // "Delete last" means "clear": wipe slot 0's fields and reset to
            // a single visible empty row, never zero rows.
            let map = section.fields_key().to_string();
            return vec![
                WriteOp::MapDelete { map: map.clone(), key: "0_name".to_string() },
                WriteOp::MapDelete { map, key: "0_url".to_string() },
                WriteOp::ListReplace {
                    list: section.visibility_key().to_string(),
                    values: vec![true],
                },
            ];
        }
    }
    vec![WriteOp::ListSet {
        list: section.visibility_key().to_string(),
        index,
        value: false,
    }]
}

/// The shared side effect: write `now` under `lastUpdated`, clamped so the
/// stored timestamp never moves backwards even if the wall clock does.
fn refresh_last_updated(card: &Card, now: DateTime<Utc>) -> WriteOp {
    let now_iso = iso_timestamp(now);
    let current = card.last_updated();
    let value = if now_iso.as_str() >= current { now_iso } else { current.to_string() };
    WriteOp::Set { key: LAST_UPDATED_KEY.to_string(), value: Value::Text(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn t(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(secs as i64)
    }

    fn fresh() -> CardStore {
        CardStore::new_card(t(0), None)
    }

    #[test]
    fn scenario_two_added_contacts_then_hide_middle() {
        let mut store = fresh();
        dispatch(&mut store, &Action::AddSlot { section: Section::Contacts }, t(1));
        dispatch(&mut store, &Action::AddSlot { section: Section::Contacts }, t(2));
        assert_eq!(Card::new(&store).visibility(Section::Contacts), &[true, true, true]);

        dispatch(&mut store, &Action::HideSlot { section: Section::Contacts, index: 1 }, t(3));
        let card = Card::new(&store);
        assert_eq!(card.visibility(Section::Contacts), &[true, false, true]);
        assert_eq!(card.visible_count(Section::Contacts), 2);
    }

    #[test]
    fn contact_slot_zero_hide_is_a_guarded_noop() {
        let mut store = fresh();
        let before = Card::new(&store).last_updated().to_string();
        let ops = dispatch(&mut store, &Action::HideSlot { section: Section::Contacts, index: 0 }, t(5));
        assert!(ops.is_empty());
        let card = Card::new(&store);
        assert_eq!(card.visibility(Section::Contacts), &[true]);
        // No mutation happened, so the timestamp was not refreshed.
        assert_eq!(card.last_updated(), before);
    }

    #[test]
    fn checklist_slot_zero_is_guarded_too() {
        let mut store = fresh();
        dispatch(&mut store, &Action::AddSlot { section: Section::Checklist }, t(1));
        let ops = dispatch(&mut store, &Action::HideSlot { section: Section::Checklist, index: 0 }, t(2));
        assert!(ops.is_empty());
        dispatch(&mut store, &Action::HideSlot { section: Section::Checklist, index: 1 }, t(3));
        assert_eq!(Card::new(&store).visibility(Section::Checklist), &[true, false]);
    }

    #[test]
    fn out_of_range_hide_is_a_noop() {
        let mut store = fresh();
        let ops = dispatch(&mut store, &Action::HideSlot { section: Section::Resources, index: 9 }, t(1));
        assert!(ops.is_empty());
        assert_eq!(Card::new(&store).visibility(Section::Resources), &[true]);
    }

    #[test]
    fn scenario_hiding_last_visible_resource_clears_instead() {
        let mut store = fresh();
        dispatch(
            &mut store,
            &Action::SetField {
                section: Section::Resources,
                index: 0,
                attribute: "name".into(),
                value: "Brief".into(),
            },
            t(1),
        );
        dispatch(
            &mut store,
            &Action::SetField {
                section: Section::Resources,
                index: 0,
                attribute: "url".into(),
                value: "https://example.com/brief".into(),
            },
            t(2),
        );
        dispatch(&mut store, &Action::HideSlot { section: Section::Resources, index: 0 }, t(3));
        let card = Card::new(&store);
        assert_eq!(card.visibility(Section::Resources), &[true]);
        assert_eq!(card.field(Section::Resources, 0, "name"), "");
        assert_eq!(card.field(Section::Resources, 0, "url"), "");
    }

    #[test]
    fn hiding_one_of_several_resources_preserves_its_fields() {
        let mut store = fresh();
        dispatch(&mut store, &Action::AddSlot { section: Section::Resources }, t(1));
        dispatch(
            &mut store,
            &Action::SetField {
                section: Section::Resources,
                index: 0,
                attribute: "name".into(),
                value: "Design doc".into(),
            },
            t(2),
        );
        // Two visible rows: hiding slot 0 is a plain flip, no purge.
        dispatch(&mut store, &Action::HideSlot { section: Section::Resources, index: 0 }, t(3));
        let card = Card::new(&store);
        assert_eq!(card.visibility(Section::Resources), &[false, true]);
        assert_eq!(card.field(Section::Resources, 0, "name"), "Design doc");
    }

    #[test]
    fn resource_collapse_counts_hidden_trailing_slots() {
        // visibility = [true, false]; hiding slot 0 leaves zero visible rows,
        // so the count-based collapse rule fires even though two slots exist.
        let mut store = fresh();
        dispatch(&mut store, &Action::AddSlot { section: Section::Resources }, t(1));
        dispatch(&mut store, &Action::HideSlot { section: Section::Resources, index: 1 }, t(2));
        assert_eq!(Card::new(&store).visibility(Section::Resources), &[true, false]);

        dispatch(&mut store, &Action::HideSlot { section: Section::Resources, index: 0 }, t(3));
        assert_eq!(Card::new(&store).visibility(Section::Resources), &[true]);
    }

    #[test]
    fn scenario_checklist_adds_and_toggle() {
        let mut store = fresh();
        for i in 1..=3 {
            dispatch(&mut store, &Action::AddSlot { section: Section::Checklist }, t(i));
        }
        let card = Card::new(&store);
        assert_eq!(card.visibility(Section::Checklist).len(), 4);
        assert_eq!(card.checked(), &[false, false, false, false]);

        dispatch(&mut store, &Action::ToggleChecked { index: 2 }, t(4));
        assert_eq!(Card::new(&store).checked(), &[false, false, true, false]);
    }

    #[test]
    fn adding_contacts_never_extends_checked() {
        let mut store = fresh();
        dispatch(&mut store, &Action::AddSlot { section: Section::Contacts }, t(1));
        dispatch(&mut store, &Action::AddSlot { section: Section::Resources }, t(2));
        assert_eq!(Card::new(&store).checked().len(), 1);
    }

    #[test]
    fn toggle_beyond_checked_length_extends_and_sets() {
        let mut store = fresh();
        // A freshly added slot lags the checked list until toggled.
        for i in 1..=5 {
            dispatch(&mut store, &Action::AddSlot { section: Section::Checklist }, t(i));
        }
        let mut short = store.clone();
        short.lists.insert(TASK_CHECKED_KEY.to_string(), vec![false]);
        assert!(!Card::new(&short).is_checked(4));

        dispatch(&mut short, &Action::ToggleChecked { index: 4 }, t(6));
        assert_eq!(Card::new(&short).checked(), &[false, false, false, false, true]);
    }

    #[test]
    fn invalid_status_is_stored_as_default() {
        let mut store = fresh();
        dispatch(&mut store, &Action::SetStatus { key: "SHIPPED".into() }, t(1));
        assert_eq!(Card::new(&store).status(), StatusKey::Wip);
        assert_eq!(store.text(STATUS_KEY), Some("WIP"));

        dispatch(&mut store, &Action::SetStatus { key: "HANDOFF".into() }, t(2));
        assert_eq!(Card::new(&store).status(), StatusKey::Handoff);
    }

    #[test]
    fn every_mutation_refreshes_the_timestamp() {
        let mut store = fresh();
        let actions = [
            Action::SetScalar { field: ScalarField::ProjectName, value: "Onboarding".into() },
            Action::SetStatus { key: "BLOCKED".into() },
            Action::AddSlot { section: Section::Resources },
            Action::SetField {
                section: Section::Contacts,
                index: 0,
                attribute: "name".into(),
                value: "Ada".into(),
            },
            Action::ToggleChecked { index: 0 },
            Action::HideSlot { section: Section::Resources, index: 1 },
        ];
        for (i, action) in actions.iter().enumerate() {
            let now = t(10 + i as u32);
            dispatch(&mut store, action, now);
            assert_eq!(Card::new(&store).last_updated(), iso_timestamp(now));
        }
    }

    #[test]
    fn timestamp_never_moves_backwards() {
        let mut store = fresh();
        dispatch(
            &mut store,
            &Action::SetScalar { field: ScalarField::DateStart, value: "2024-03-04".into() },
            t(100),
        );
        let high = Card::new(&store).last_updated().to_string();
        // Wall clock stepped back; the stored timestamp holds its ground.
        dispatch(
            &mut store,
            &Action::SetScalar { field: ScalarField::DateStart, value: "2024-03-05".into() },
            t(50),
        );
        assert_eq!(Card::new(&store).last_updated(), high);
    }

    proptest! {
        // Slot indices are permanent: the visibility list of a non-collapsing
        // section only ever grows, and existing prefixes keep their meaning.
        #[test]
        fn contact_slots_are_append_only(steps in proptest::collection::vec((0u8..2, 0usize..8), 0..40)) {
            let mut store = fresh();
            let mut prev = Card::new(&store).visibility(Section::Contacts).to_vec();
            for (i, (kind, index)) in steps.into_iter().enumerate() {
                let action = if kind == 0 {
                    Action::AddSlot { section: Section::Contacts }
                } else {
                    Action::HideSlot { section: Section::Contacts, index }
                };
                dispatch(&mut store, &action, t(i as u32));
                let cur = Card::new(&store).visibility(Section::Contacts).to_vec();
                prop_assert!(cur.len() >= prev.len());
                // An existing slot can only stay put or flip to hidden.
                for (p, c) in prev.iter().zip(cur.iter()) {
                    prop_assert!(*p || !*c);
                }
                prev = cur;
            }
        }

        // lastUpdated is monotone under arbitrary action and clock orderings.
        #[test]
        fn last_updated_is_monotone(steps in proptest::collection::vec((0u8..4, 0usize..6, 0u32..1000), 0..40)) {
            let mut store = fresh();
            let mut prev = Card::new(&store).last_updated().to_string();
            for (kind, index, secs) in steps {
                let action = match kind {
                    0 => Action::AddSlot { section: Section::Checklist },
                    1 => Action::ToggleChecked { index },
                    2 => Action::SetStatus { key: "APPROVED".into() },
                    _ => Action::HideSlot { section: Section::Resources, index },
                };
                dispatch(&mut store, &action, t(secs));
                let cur = Card::new(&store).last_updated().to_string();
                prop_assert!(cur >= prev);
                prev = cur;
            }
        }
    }
}
