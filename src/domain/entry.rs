//! Journal entries

use crate::domain::{Journal, JournalId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of an entry (uppercase UUIDv4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        EntryId(Uuid::new_v4().to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        EntryId(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single record in a journal.
///
/// `id`, `created_at` and the owning journal are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: EntryId,
    journal_id: JournalId,
    title: String,
    body: String,
    image_data: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
}

impl Entry {
    /// Create an entry owned by `journal`.
    ///
    /// Title and body are not validated; empty strings are fine here.
    pub fn new(
        journal: &Journal,
        title: impl Into<String>,
        body: impl Into<String>,
        image_data: Option<Vec<u8>>,
    ) -> Self {
        Entry {
            id: EntryId::generate(),
            journal_id: journal.id().clone(),
            title: title.into(),
            body: body.into(),
            image_data,
            created_at: Utc::now(),
        }
    }

    /// Rebuild an entry from persisted fields
    pub(crate) fn restore(
        id: EntryId,
        journal_id: JournalId,
        title: String,
        body: String,
        image_data: Option<Vec<u8>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Entry {
            id,
            journal_id,
            title,
            body,
            image_data,
            created_at,
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn journal_id(&self) -> &JournalId {
        &self.journal_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn image_data(&self) -> Option<&[u8]> {
        self.image_data.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Replace the image payload; the previous bytes are dropped
    pub fn set_image_data(&mut self, image_data: Option<Vec<u8>>) {
        self.image_data = image_data;
    }
}
