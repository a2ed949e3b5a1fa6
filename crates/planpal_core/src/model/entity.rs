//! Record capability contract and category membership set.
//!
//! # Responsibility
//! - Describe what the indexed-list engine needs from a record type.
//! - Map each entity type to its storage subdirectory by static type.
//!
//! # Invariants
//! - `Memberships` keeps insertion order and never holds duplicates.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier used by category back-references.
pub type RecordId = Uuid;

/// Entity types known to the storage layout.
///
/// Only `Contact` has a record implementation; the other kinds exist so
/// that their storage directories are still enumerated during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Contact,
    Activity,
    Expense,
}

impl EntityKind {
    /// Every kind in storage enumeration order.
    pub const ALL: [EntityKind; 3] = [Self::Contact, Self::Activity, Self::Expense];

    /// Subdirectory name under the storage root.
    pub fn storage_dir(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::Activity => "activities",
            Self::Expense => "expenses",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_dir())
    }
}

/// Record-level parse/edit failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Description is blank after trim.
    EmptyDescription,
    /// Description has no name segment.
    MissingName,
    /// Segment key is not a known field, or an unkeyed segment is misplaced.
    UnknownField(String),
    /// Known field key with a blank value.
    EmptyField(String),
}

impl RecordError {
    /// Stable error code for logs and replay warnings.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty_description",
            Self::MissingName | Self::UnknownField(_) | Self::EmptyField(_) => "invalid_field",
        }
    }
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::MissingName => write!(f, "a name is required"),
            Self::UnknownField(value) => write!(f, "unknown field: `{value}`"),
            Self::EmptyField(key) => write!(f, "field `{key}` must not be empty"),
        }
    }
}

impl Error for RecordError {}

/// Capability set every list-managed record type provides.
pub trait ListEntity {
    /// Storage bucket for this record type.
    const KIND: EntityKind;

    /// Parses a record from the free-text description of an `add` command.
    fn from_description(description: &str) -> Result<Self, RecordError>
    where
        Self: Sized;

    /// Stable identity, never reused.
    fn id(&self) -> RecordId;

    /// Human-facing form.
    fn display(&self) -> String;

    /// Canonical description that `from_description` accepts again.
    fn storage_description(&self) -> String;

    /// Whether any of `terms` occurs in the display or storage form.
    /// Case-sensitive substring match.
    fn matches(&self, terms: &[&str]) -> bool {
        let display = self.display();
        let stored = self.storage_description();
        terms
            .iter()
            .any(|term| display.contains(term) || stored.contains(term))
    }

    /// Applies a field-update payload in place.
    fn apply_edit(&mut self, fields: &str) -> Result<(), RecordError>;

    fn memberships(&self) -> &Memberships;

    fn memberships_mut(&mut self) -> &mut Memberships;
}

/// Ordered, duplicate-free set of category names a record belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memberships {
    names: Vec<String>,
}

impl Memberships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` unless already present. Returns whether it was added.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Removes `name`. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|existing| existing != name);
        self.names.len() != before
    }

    /// Renames `from` to `to` in place, keeping its position.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.names.iter_mut().find(|existing| existing.as_str() == from) {
            Some(slot) => {
                *slot = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKind, Memberships};

    #[test]
    fn memberships_keep_insertion_order_without_duplicates() {
        let mut set = Memberships::new();
        assert!(set.insert("friend"));
        assert!(set.insert("family"));
        assert!(!set.insert("friend"));
        assert_eq!(set.as_slice(), ["friend".to_string(), "family".to_string()]);

        assert!(set.remove("friend"));
        assert!(!set.remove("friend"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn rename_keeps_position() {
        let mut set = Memberships::new();
        set.insert("a");
        set.insert("b");
        assert!(set.rename("a", "c"));
        assert_eq!(set.as_slice(), ["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn storage_dirs_follow_enumeration_order() {
        let dirs: Vec<_> = EntityKind::ALL.iter().map(|kind| kind.storage_dir()).collect();
        assert_eq!(dirs, ["contacts", "activities", "expenses"]);
    }
}
