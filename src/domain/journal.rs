//! Journal aggregate root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a journal (uppercase UUIDv4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalId(String);

impl JournalId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        JournalId(Uuid::new_v4().to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JournalId {
    fn from(value: String) -> Self {
        JournalId(value)
    }
}

impl From<&str> for JournalId {
    fn from(value: &str) -> Self {
        JournalId(value.to_string())
    }
}

impl fmt::Display for JournalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, optionally colored collection of entries.
///
/// Entries are not held here: the store keeps the journal -> entries
/// ownership index and answers `Store::journal_entries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    id: JournalId,
    title: String,
    color_hex: Option<String>,
    created_at: DateTime<Utc>,
}

impl Journal {
    /// Create a journal with a fresh id and the current timestamp
    pub fn new(title: impl Into<String>, color_hex: Option<String>) -> Self {
        Journal {
            id: JournalId::generate(),
            title: title.into(),
            color_hex,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &JournalId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn color_hex(&self) -> Option<&str> {
        self.color_hex.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_color_hex(&mut self, color_hex: Option<String>) {
        self.color_hex = color_hex;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_journal_defaults() {
        let before = Utc::now();
        let journal = Journal::new("Travel", Some("007AFF".to_string()));
        let after = Utc::now();

        assert_eq!(journal.title(), "Travel");
        assert_eq!(journal.color_hex(), Some("007AFF"));
        assert!(journal.created_at() >= before && journal.created_at() <= after);
    }

    #[test]
    fn test_ids_are_unique_uppercase_uuids() {
        let a = Journal::new("A", None);
        let b = Journal::new("B", None);
        assert_ne!(a.id(), b.id());

        let id = a.id().as_str();
        assert_eq!(id.len(), 36);
        assert_eq!(id, id.to_uppercase());
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_mutation_keeps_identity() {
        let mut journal = Journal::new("Old", None);
        let id = journal.id().clone();
        let created = journal.created_at();

        journal.set_title("New");
        journal.set_color_hex(Some("FF0000".to_string()));
        journal.set_color_hex(None);

        assert_eq!(journal.title(), "New");
        assert_eq!(journal.color_hex(), None);
        assert_eq!(journal.id(), &id);
        assert_eq!(journal.created_at(), created);
    }

    #[test]
    fn test_empty_title_allowed_at_model_level() {
        let journal = Journal::new("", None);
        assert_eq!(journal.title(), "");
    }
}
