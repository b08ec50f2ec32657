//! In-memory entity graph with the journal -> entries ownership index

use crate::domain::{Entry, EntryId, Journal, JournalId};
use crate::error::{JotbookError, Result};
use std::collections::{BTreeSet, HashMap};

/// All journals and entries, plus the index of which entries each journal owns.
///
/// Invariant: an entry is in `entries` iff its id is in
/// `ownership[entry.journal_id()]`, and every ownership key is a live journal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    journals: HashMap<JournalId, Journal>,
    entries: HashMap<EntryId, Entry>,
    ownership: HashMap<JournalId, BTreeSet<EntryId>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from loaded records, rejecting duplicates and orphans
    pub fn from_parts(journals: Vec<Journal>, entries: Vec<Entry>) -> Result<Self> {
        let mut snapshot = Snapshot::new();

        for journal in journals {
            if snapshot.journals.contains_key(journal.id()) {
                return Err(JotbookError::Corrupt(format!(
                    "duplicate journal id {}",
                    journal.id()
                )));
            }
            snapshot.insert_journal(journal);
        }

        for entry in entries {
            if snapshot.entries.contains_key(entry.id()) {
                return Err(JotbookError::Corrupt(format!(
                    "duplicate entry id {}",
                    entry.id()
                )));
            }
            if !snapshot.journals.contains_key(entry.journal_id()) {
                return Err(JotbookError::Corrupt(format!(
                    "entry {} references missing journal {}",
                    entry.id(),
                    entry.journal_id()
                )));
            }
            snapshot.insert_entry(entry);
        }

        Ok(snapshot)
    }

    pub fn journal(&self, id: &JournalId) -> Option<&Journal> {
        self.journals.get(id)
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// Journals ordered by creation time, then id
    pub fn journals(&self) -> Vec<&Journal> {
        let mut journals: Vec<&Journal> = self.journals.values().collect();
        journals.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        journals
    }

    /// Every entry, in no particular order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Entries owned by `journal`, ordered by creation time, then id.
    /// `None` if the journal does not exist.
    pub fn journal_entries(&self, journal: &JournalId) -> Option<Vec<&Entry>> {
        let ids = self.ownership.get(journal)?;
        let mut entries: Vec<&Entry> = ids.iter().filter_map(|id| self.entries.get(id)).collect();
        entries.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Some(entries)
    }

    pub fn journal_count(&self) -> usize {
        self.journals.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn insert_journal(&mut self, journal: Journal) {
        self.ownership.entry(journal.id().clone()).or_default();
        self.journals.insert(journal.id().clone(), journal);
    }

    /// Caller guarantees the owning journal exists
    pub(crate) fn insert_entry(&mut self, entry: Entry) {
        self.ownership
            .entry(entry.journal_id().clone())
            .or_default()
            .insert(entry.id().clone());
        self.entries.insert(entry.id().clone(), entry);
    }

    pub(crate) fn journal_mut(&mut self, id: &JournalId) -> Option<&mut Journal> {
        self.journals.get_mut(id)
    }

    pub(crate) fn entry_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        self.entries.get_mut(id)
    }

    pub(crate) fn remove_entry(&mut self, id: &EntryId) -> Option<Entry> {
        let entry = self.entries.remove(id)?;
        if let Some(owned) = self.ownership.get_mut(entry.journal_id()) {
            owned.remove(id);
        }
        Some(entry)
    }

    /// Remove a journal that no longer owns any entries
    pub(crate) fn remove_empty_journal(&mut self, id: &JournalId) -> Option<Journal> {
        if self.ownership.get(id).is_some_and(|owned| !owned.is_empty()) {
            return None;
        }
        self.ownership.remove(id);
        self.journals.remove(id)
    }

    /// Ids of the entries `journal` owns
    pub(crate) fn owned_entry_ids(&self, journal: &JournalId) -> Vec<EntryId> {
        self.ownership
            .get(journal)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Check the ownership invariant in both directions
    pub fn is_consistent(&self) -> bool {
        let forward = self.entries.values().all(|entry| {
            self.ownership
                .get(entry.journal_id())
                .is_some_and(|owned| owned.contains(entry.id()))
        });
        let backward = self.ownership.iter().all(|(journal, owned)| {
            self.journals.contains_key(journal)
                && owned.iter().all(|id| {
                    self.entries
                        .get(id)
                        .is_some_and(|entry| entry.journal_id() == journal)
                })
        });
        let keyed = self.journals.iter().all(|(id, journal)| journal.id() == id)
            && self.entries.iter().all(|(id, entry)| entry.id() == id);
        keyed && forward && backward && self.ownership.len() == self.journals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Snapshot, Journal, Entry) {
        let journal = Journal::new("Travel", None);
        let entry = Entry::new(&journal, "Day 1", "Arrived", None);
        let snapshot =
            Snapshot::from_parts(vec![journal.clone()], vec![entry.clone()]).unwrap();
        (snapshot, journal, entry)
    }

    #[test]
    fn test_from_parts_builds_index() {
        let (snapshot, journal, entry) = sample();

        let owned = snapshot.journal_entries(journal.id()).unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id(), entry.id());
        assert!(snapshot.is_consistent());
    }

    #[test]
    fn test_from_parts_rejects_orphan_entry() {
        let journal = Journal::new("Travel", None);
        let entry = Entry::new(&journal, "Day 1", "Arrived", None);

        let result = Snapshot::from_parts(vec![], vec![entry]);
        match result.unwrap_err() {
            JotbookError::Corrupt(msg) => assert!(msg.contains("missing journal")),
            other => panic!("Expected Corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_parts_rejects_duplicates() {
        let journal = Journal::new("Travel", None);
        let result = Snapshot::from_parts(vec![journal.clone(), journal.clone()], vec![]);
        assert!(matches!(result, Err(JotbookError::Corrupt(_))));

        let entry = Entry::new(&journal, "Day 1", "Arrived", None);
        let result = Snapshot::from_parts(vec![journal], vec![entry.clone(), entry]);
        assert!(matches!(result, Err(JotbookError::Corrupt(_))));
    }

    #[test]
    fn test_remove_entry_updates_index() {
        let (mut snapshot, journal, entry) = sample();

        let removed = snapshot.remove_entry(entry.id()).unwrap();
        assert_eq!(removed.id(), entry.id());
        assert!(snapshot.journal_entries(journal.id()).unwrap().is_empty());
        assert!(snapshot.is_consistent());
    }

    #[test]
    fn test_journal_with_entries_is_not_removed() {
        let (mut snapshot, journal, entry) = sample();

        assert!(snapshot.remove_empty_journal(journal.id()).is_none());
        assert!(snapshot.journal(journal.id()).is_some());

        snapshot.remove_entry(entry.id());
        assert!(snapshot.remove_empty_journal(journal.id()).is_some());
        assert!(snapshot.journal_entries(journal.id()).is_none());
        assert!(snapshot.is_consistent());
    }

    #[test]
    fn test_unknown_journal_has_no_entry_list() {
        let snapshot = Snapshot::new();
        assert!(snapshot.journal_entries(&JournalId::generate()).is_none());
    }

    #[test]
    fn test_record_under_wrong_key_is_inconsistent() {
        let (mut snapshot, journal, entry) = sample();

        *snapshot.entry_mut(entry.id()).unwrap() = Entry::new(&journal, "Swapped", "", None);

        assert!(!snapshot.is_consistent());
    }
}
