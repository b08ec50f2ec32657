//! The store: working snapshot, pending changes, atomic commit and change events

use crate::domain::{Entry, EntryId, Journal, JournalId};
use crate::error::{JotbookError, Result};
use crate::infrastructure::changes::PendingChanges;
use crate::infrastructure::{Backend, ChangeEvent, ChangeKind, EntityRef, MemoryBackend, Snapshot};
use std::sync::mpsc::{self, Receiver, Sender};

/// How to undo one staged mutation
#[derive(Debug)]
enum Undo {
    RemoveJournal(JournalId),
    RestoreJournal(Journal),
    RemoveEntry(EntryId),
    RestoreEntry(Entry),
}

/// Single-writer context over a [`Backend`].
///
/// Mutations are applied to the working snapshot immediately and stay
/// pending until [`Store::commit`] persists them or [`Store::rollback`]
/// discards them. All methods that mutate take `&mut self`; sharing a store
/// across threads means moving calls onto the thread that owns it.
pub struct Store {
    backend: Box<dyn Backend>,
    snapshot: Snapshot,
    pending: PendingChanges,
    undo: Vec<Undo>,
    subscribers: Vec<Sender<ChangeEvent>>,
}

impl Store {
    /// Open a store on `backend`, loading its persisted snapshot
    pub fn open(backend: impl Backend + 'static) -> Result<Self> {
        let mut backend: Box<dyn Backend> = Box::new(backend);
        let snapshot = backend.load()?;
        log::info!(
            "Opened store at {} ({} journals, {} entries)",
            backend.location(),
            snapshot.journal_count(),
            snapshot.entry_count()
        );
        Ok(Self::from_loaded(backend, snapshot))
    }

    /// A disposable store that lives only in memory
    pub fn in_memory() -> Self {
        Self::from_loaded(Box::new(MemoryBackend::new()), Snapshot::new())
    }

    fn from_loaded(backend: Box<dyn Backend>, snapshot: Snapshot) -> Self {
        Store {
            backend,
            snapshot,
            pending: PendingChanges::default(),
            undo: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    // --- Reads ---

    /// The working state, including uncommitted changes
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn journal(&self, id: &JournalId) -> Option<&Journal> {
        self.snapshot.journal(id)
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.snapshot.entry(id)
    }

    pub fn journals(&self) -> Vec<&Journal> {
        self.snapshot.journals()
    }

    pub fn journal_entries(&self, journal: &JournalId) -> Result<Vec<&Entry>> {
        self.snapshot
            .journal_entries(journal)
            .ok_or_else(|| JotbookError::journal_not_found(journal))
    }

    /// Whether there are staged changes not yet committed
    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    // --- Staged writes ---

    pub fn insert_journal(&mut self, journal: Journal) -> Result<()> {
        let id = journal.id().clone();
        if self.snapshot.journal(&id).is_some() {
            return Err(JotbookError::Constraint(format!(
                "journal {} already exists",
                id
            )));
        }

        log::debug!("Staging insert of journal {}", id);
        self.snapshot.insert_journal(journal);
        self.undo.push(Undo::RemoveJournal(id.clone()));
        self.pending
            .record(EntityRef::Journal(id), ChangeKind::Inserted);
        Ok(())
    }

    /// Insert `entry`; its owning journal must already be in the store
    pub fn insert_entry(&mut self, entry: Entry) -> Result<()> {
        let id = entry.id().clone();
        if self.snapshot.journal(entry.journal_id()).is_none() {
            return Err(JotbookError::journal_not_found(entry.journal_id()));
        }
        if self.snapshot.entry(&id).is_some() {
            return Err(JotbookError::Constraint(format!(
                "entry {} already exists",
                id
            )));
        }

        log::debug!("Staging insert of entry {} into {}", id, entry.journal_id());
        self.snapshot.insert_entry(entry);
        self.undo.push(Undo::RemoveEntry(id.clone()));
        self.pending.record(EntityRef::Entry(id), ChangeKind::Inserted);
        Ok(())
    }

    /// Edit a journal in place; the closure must leave its identity alone
    pub fn update_journal<F>(&mut self, id: &JournalId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Journal),
    {
        let journal = self
            .snapshot
            .journal_mut(id)
            .ok_or_else(|| JotbookError::journal_not_found(id))?;

        let before = journal.clone();
        f(journal);
        if journal.id() != before.id() || journal.created_at() != before.created_at() {
            *journal = before;
            return Err(JotbookError::Constraint(format!(
                "id and creation time of journal {} are immutable",
                id
            )));
        }

        log::debug!("Staging update of journal {}", id);
        self.undo.push(Undo::RestoreJournal(before));
        self.pending
            .record(EntityRef::Journal(id.clone()), ChangeKind::Updated);
        Ok(())
    }

    /// Edit an entry in place; changing its id, owner or timestamp is a
    /// `Constraint` error and leaves the entry as it was
    pub fn update_entry<F>(&mut self, id: &EntryId, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entry),
    {
        let entry = self
            .snapshot
            .entry_mut(id)
            .ok_or_else(|| JotbookError::entry_not_found(id))?;

        let before = entry.clone();
        f(entry);
        if entry.id() != before.id()
            || entry.journal_id() != before.journal_id()
            || entry.created_at() != before.created_at()
        {
            *entry = before;
            return Err(JotbookError::Constraint(format!(
                "id, owner and creation time of entry {} are immutable",
                id
            )));
        }

        log::debug!("Staging update of entry {}", id);
        self.undo.push(Undo::RestoreEntry(before));
        self.pending
            .record(EntityRef::Entry(id.clone()), ChangeKind::Updated);
        Ok(())
    }

    /// Remove an entry, returning it
    pub fn delete_entry(&mut self, id: &EntryId) -> Result<Entry> {
        let entry = self
            .snapshot
            .remove_entry(id)
            .ok_or_else(|| JotbookError::entry_not_found(id))?;

        log::debug!("Staging delete of entry {}", id);
        self.undo.push(Undo::RestoreEntry(entry.clone()));
        self.pending
            .record(EntityRef::Entry(id.clone()), ChangeKind::Deleted);
        Ok(entry)
    }

    /// Remove a journal and every entry it owns, returning the removed entry ids
    pub fn delete_journal(&mut self, id: &JournalId) -> Result<Vec<EntryId>> {
        if self.snapshot.journal(id).is_none() {
            return Err(JotbookError::journal_not_found(id));
        }

        let owned = self.snapshot.owned_entry_ids(id);
        for entry_id in &owned {
            self.delete_entry(entry_id)?;
        }

        let journal = self.snapshot.remove_empty_journal(id).ok_or_else(|| {
            JotbookError::Constraint(format!("journal {} still owns entries", id))
        })?;

        log::debug!(
            "Staging delete of journal {} with {} entries",
            id,
            owned.len()
        );
        self.undo.push(Undo::RestoreJournal(journal));
        self.pending
            .record(EntityRef::Journal(id.clone()), ChangeKind::Deleted);
        Ok(owned)
    }

    // --- Transactions ---

    /// Persist all pending changes as one unit.
    ///
    /// On failure the working snapshot keeps the changes and they stay
    /// pending, so a later commit retries them.
    pub fn commit(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            // staged changes that cancelled out leave nothing to persist
            self.undo.clear();
            return Ok(());
        }

        let events = self.pending.events();
        if let Err(e) = self.backend.persist(&self.snapshot, &events) {
            log::error!(
                "Commit of {} changes to {} failed: {}",
                events.len(),
                self.backend.location(),
                e
            );
            return Err(match e {
                JotbookError::Commit(_) => e,
                other => JotbookError::Commit(other.to_string()),
            });
        }

        log::info!(
            "Committed {} changes to {}",
            events.len(),
            self.backend.location()
        );
        self.pending.clear();
        self.undo.clear();
        self.publish(&events);
        Ok(())
    }

    /// Discard all pending changes, restoring the last committed state
    pub fn rollback(&mut self) {
        if self.undo.is_empty() {
            return;
        }

        log::info!("Rolling back {} staged changes", self.undo.len());
        while let Some(step) = self.undo.pop() {
            match step {
                Undo::RemoveJournal(id) => {
                    self.snapshot.remove_empty_journal(&id);
                }
                Undo::RestoreJournal(journal) => match self.snapshot.journal_mut(journal.id()) {
                    Some(current) => *current = journal,
                    None => self.snapshot.insert_journal(journal),
                },
                Undo::RemoveEntry(id) => {
                    self.snapshot.remove_entry(&id);
                }
                Undo::RestoreEntry(entry) => match self.snapshot.entry_mut(entry.id()) {
                    Some(current) => *current = entry,
                    None => self.snapshot.insert_entry(entry),
                },
            }
        }
        self.pending.clear();
    }

    // --- Observation ---

    /// Receive a [`ChangeEvent`] for every entity touched by each successful commit
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, events: &[ChangeEvent]) {
        self.subscribers.retain(|tx| {
            events
                .iter()
                .all(|event| tx.send(event.clone()).is_ok())
        });
    }

    /// Commit anything pending and release the backend.
    ///
    /// If the final commit fails the error is returned and the uncommitted
    /// changes are lost with the store; commit first to handle that case.
    pub fn close(mut self) -> Result<()> {
        let committed = self.commit();
        let closed = self.backend.close();
        log::info!("Closed store at {}", self.backend.location());
        committed.and(closed)
    }
}
