//! Change events and the per-entity pending change set

use crate::domain::{EntryId, JournalId};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Journal(JournalId),
    Entry(EntryId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// Emitted to subscribers once a commit has been persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub entity: EntityRef,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(entity: EntityRef, kind: ChangeKind) -> Self {
        ChangeEvent { entity, kind }
    }
}

/// Uncommitted changes, merged so each entity appears at most once
#[derive(Debug, Default)]
pub(crate) struct PendingChanges {
    order: Vec<EntityRef>,
    kinds: HashMap<EntityRef, ChangeKind>,
}

impl PendingChanges {
    pub fn record(&mut self, entity: EntityRef, kind: ChangeKind) {
        use ChangeKind::*;

        let merged = match (self.kinds.get(&entity).copied(), kind) {
            (None, kind) => Some(kind),
            (Some(Inserted), Deleted) => None,
            (Some(Inserted), _) => Some(Inserted),
            (Some(Deleted), Inserted) => Some(Updated),
            (Some(_), kind) => Some(kind),
        };

        match merged {
            Some(kind) => {
                if self.kinds.insert(entity.clone(), kind).is_none() {
                    self.order.push(entity);
                }
            }
            None => {
                self.kinds.remove(&entity);
                self.order.retain(|e| e != &entity);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Merged changes in first-touched order
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.order
            .iter()
            .filter_map(|entity| {
                self.kinds
                    .get(entity)
                    .map(|kind| ChangeEvent::new(entity.clone(), *kind))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.kinds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> EntityRef {
        EntityRef::Entry(EntryId::from(id))
    }

    #[test]
    fn test_insert_then_update_stays_insert() {
        let mut pending = PendingChanges::default();
        pending.record(entry("a"), ChangeKind::Inserted);
        pending.record(entry("a"), ChangeKind::Updated);

        assert_eq!(
            pending.events(),
            vec![ChangeEvent::new(entry("a"), ChangeKind::Inserted)]
        );
    }

    #[test]
    fn test_insert_then_delete_cancels_out() {
        let mut pending = PendingChanges::default();
        pending.record(entry("a"), ChangeKind::Inserted);
        pending.record(entry("b"), ChangeKind::Updated);
        pending.record(entry("a"), ChangeKind::Deleted);

        assert_eq!(pending.events().len(), 1);
        assert_eq!(
            pending.events(),
            vec![ChangeEvent::new(entry("b"), ChangeKind::Updated)]
        );
    }

    #[test]
    fn test_update_then_delete_is_delete() {
        let mut pending = PendingChanges::default();
        pending.record(entry("a"), ChangeKind::Updated);
        pending.record(entry("a"), ChangeKind::Deleted);

        assert_eq!(
            pending.events(),
            vec![ChangeEvent::new(entry("a"), ChangeKind::Deleted)]
        );
    }

    #[test]
    fn test_order_is_first_touch() {
        let mut pending = PendingChanges::default();
        let journal = EntityRef::Journal(JournalId::from("j"));
        pending.record(journal.clone(), ChangeKind::Inserted);
        pending.record(entry("a"), ChangeKind::Inserted);
        pending.record(journal.clone(), ChangeKind::Updated);

        let events = pending.events();
        assert_eq!(events[0].entity, journal);
        assert_eq!(events[1].entity, entry("a"));

        pending.clear();
        assert!(pending.is_empty());
    }
}
