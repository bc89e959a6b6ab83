//! Synchronized field store: the replicated state of one card.
//!
//! A [`CardStore`] holds the three replication primitives the card is built
//! on: a key → primitive-value map for scalars, named sparse field maps for
//! the repeated sections, and named boolean lists for visibility and checked
//! state. Every change is expressed as a [`WriteOp`] and applied in arrival
//! order; the last write to a key or list slot wins, with no merge.
//!
//! The store also knows how to persist itself as a JSON file (atomic write
//! via temp + rename, lenient load that degrades to a fresh card).

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{Section, LAST_UPDATED_KEY, TASK_CHECKED_KEY, USER_PHOTO_KEY};

/// Primitive value replicated under a single key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Flag(bool),
}

impl Value {
    /// The string content, if this value is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Flag(_) => None,
        }
    }
}

/// One replicated write: the unit of ordering at the replication layer.
///
/// Concurrent writes to different keys never conflict; concurrent writes to
/// the same key (or the same list slot) are resolved by whichever op arrives
/// later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Set a scalar entry.
    Set { key: String, value: Value },
    /// Remove a scalar entry.
    Delete { key: String },
    /// Set one `{index}_{attribute}` field in a named section map.
    MapSet { map: String, key: String, value: String },
    /// Remove one field from a named section map.
    MapDelete { map: String, key: String },
    /// Append one element to a named boolean list.
    ListPush { list: String, value: bool },
    /// Update a single slot of a named boolean list.
    ListSet { list: String, index: usize, value: bool },
    /// Replace a named boolean list wholesale.
    ListReplace { list: String, values: Vec<bool> },
}

/// Replicated state of a single card instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStore {
    /// Scalar entries (title, dates, status badge, timestamp, ...).
    #[serde(default)]
    pub entries: BTreeMap<String, Value>,
    /// Sparse per-section field maps, keyed `{index}_{attribute}`.
    #[serde(default)]
    pub maps: BTreeMap<String, BTreeMap<String, String>>,
    /// Boolean lists: per-section visibility plus the checklist checked state.
    #[serde(default)]
    pub lists: BTreeMap<String, Vec<bool>>,
}

/// Format an instant as the ISO-8601 string stored under `lastUpdated`.
///
/// Fixed-width UTC RFC 3339 with milliseconds, so stored timestamps compare
/// correctly as plain strings.
pub fn iso_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl CardStore {
    /// Construct a card with its documented defaults: one visible slot per
    /// section, one unchecked checklist entry, and the construction-time
    /// timestamp. The author photo is read once from the host at this point
    /// and never refreshed.
    pub fn new_card(now: DateTime<Utc>, author_photo: Option<&str>) -> Self {
        let mut store = CardStore::default();
        for section in [Section::Contacts, Section::Resources, Section::Checklist] {
            store.lists.insert(section.visibility_key().to_string(), vec![true]);
        }
        store.lists.insert(TASK_CHECKED_KEY.to_string(), vec![false]);
        store
            .entries
            .insert(LAST_UPDATED_KEY.to_string(), Value::Text(iso_timestamp(now)));
        if let Some(url) = author_photo {
            store
                .entries
                .insert(USER_PHOTO_KEY.to_string(), Value::Text(url.to_string()));
        }
        store
    }

    /// Look up a scalar entry as text. Absent or non-text entries read as `None`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_text)
    }

    /// Look up one field in a named section map.
    pub fn map_get(&self, map: &str, key: &str) -> Option<&str> {
        self.maps.get(map).and_then(|m| m.get(key)).map(String::as_str)
    }

    /// A named boolean list; absent lists read as empty.
    pub fn list(&self, name: &str) -> &[bool] {
        self.lists.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply one write in arrival order.
    ///
    /// Total: out-of-range list updates extend the list with `false` up to
    /// the written slot rather than failing.
    pub fn apply(&mut self, op: &WriteOp) {
        match op {
            WriteOp::Set { key, value } => {
                self.entries.insert(key.clone(), value.clone());
            }
            WriteOp::Delete { key } => {
                self.entries.remove(key);
            }
            WriteOp::MapSet { map, key, value } => {
                self.maps
                    .entry(map.clone())
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
            WriteOp::MapDelete { map, key } => {
                if let Some(m) = self.maps.get_mut(map) {
                    m.remove(key);
                }
            }
            WriteOp::ListPush { list, value } => {
                self.lists.entry(list.clone()).or_default().push(*value);
            }
            WriteOp::ListSet { list, index, value } => {
                let l = self.lists.entry(list.clone()).or_default();
                if *index >= l.len() {
                    l.resize(index + 1, false);
                }
                l[*index] = *value;
            }
            WriteOp::ListReplace { list, values } => {
                self.lists.insert(list.clone(), values.clone());
            }
        }
    }

    /// Apply a batch of writes in order.
    pub fn apply_all(&mut self, ops: &[WriteOp]) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Load a card from a JSON file, falling back to a fresh default card if
    /// the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return CardStore::new_card(Utc::now(), None);
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error parsing card file, starting fresh: {e}");
                    CardStore::new_card(Utc::now(), None)
                }
            },
            Err(e) => {
                eprintln!("Error reading card file, starting fresh: {e}");
                CardStore::new_card(Utc::now(), None)
            }
        }
    }

    /// Save the card to a JSON file using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        // Atomic-ish write via temp + rename.
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self).unwrap();
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}
