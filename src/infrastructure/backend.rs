//! Persistence backends behind the store

use crate::error::Result;
use crate::infrastructure::{ChangeEvent, Snapshot};

/// Durable home of a [`Snapshot`].
///
/// `persist` must be all-or-nothing: on error, the previously persisted
/// state is what a later `load` returns.
pub trait Backend {
    /// Short human-readable location used in log lines
    fn location(&self) -> String;

    /// Read the last persisted snapshot
    fn load(&mut self) -> Result<Snapshot>;

    /// Durably replace the persisted state with `snapshot`.
    /// `changes` lists what differs from the previous persist.
    fn persist(&mut self, snapshot: &Snapshot, changes: &[ChangeEvent]) -> Result<()>;

    /// Release held resources
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps the last persisted snapshot in memory; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryBackend {
    persisted: Snapshot,
    commits: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        MemoryBackend {
            persisted: snapshot,
            commits: 0,
        }
    }

    /// Number of successful persists
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Backend for MemoryBackend {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load(&mut self) -> Result<Snapshot> {
        Ok(self.persisted.clone())
    }

    fn persist(&mut self, snapshot: &Snapshot, _changes: &[ChangeEvent]) -> Result<()> {
        self.persisted = snapshot.clone();
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entry, Journal};

    #[test]
    fn test_memory_backend_round_trip() {
        let mut backend = MemoryBackend::new();
        assert_eq!(backend.load().unwrap().journal_count(), 0);

        let journal = Journal::new("Travel", None);
        let entry = Entry::new(&journal, "Day 1", "Arrived", Some(vec![1, 2]));
        let snapshot = Snapshot::from_parts(vec![journal], vec![entry]).unwrap();

        backend.persist(&snapshot, &[]).unwrap();

        assert_eq!(backend.commits(), 1);
        assert_eq!(backend.load().unwrap(), snapshot);
        assert_eq!(backend.location(), "memory");
    }

    #[test]
    fn test_with_snapshot_seeds_load() {
        let journal = Journal::new("Seeded", None);
        let snapshot = Snapshot::from_parts(vec![journal.clone()], vec![]).unwrap();

        let mut backend = MemoryBackend::with_snapshot(snapshot);
        let loaded = backend.load().unwrap();
        assert_eq!(loaded.journal(journal.id()).unwrap().title(), "Seeded");
        assert_eq!(backend.commits(), 0);
    }
}
