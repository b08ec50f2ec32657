//! Journal controller: the single entry point for mutations
//!
//! Every operation stages its change on the store and then commits. A
//! failed commit is logged and returned; the staged change stays pending.

use crate::domain::{Color, Entry, EntryId, ImageQuality, ImageSource, Journal, JournalId};
use crate::error::{JotbookError, Result};
use crate::infrastructure::{Config, FileSystemBackend, Store};
use std::path::Path;

pub struct JournalController {
    store: Store,
    image_quality: ImageQuality,
}

impl JournalController {
    /// Create a controller over an opened store
    pub fn new(store: Store, config: &Config) -> Result<Self> {
        Ok(JournalController {
            store,
            image_quality: config.quality()?,
        })
    }

    /// Controller over a disposable in-memory store with default settings
    pub fn in_memory() -> Self {
        JournalController {
            store: Store::in_memory(),
            image_quality: ImageQuality::DEFAULT,
        }
    }

    /// Open the file-backed store in `root`, using its stored config
    pub fn open(root: &Path) -> Result<Self> {
        let backend = FileSystemBackend::open(root)?;
        let config = backend.config()?;
        let store = Store::open(backend)?;
        Self::new(store, &config)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access for callers that need rollback or subscriptions
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn image_quality(&self) -> ImageQuality {
        self.image_quality
    }

    /// Create an entry in `journal`, encoding `image` if given
    pub fn create_entry(
        &mut self,
        journal: &JournalId,
        title: &str,
        body: &str,
        image: Option<&dyn ImageSource>,
    ) -> Result<EntryId> {
        let owner = self
            .store
            .journal(journal)
            .ok_or_else(|| JotbookError::journal_not_found(journal))?;
        let image_data = self.encode(image)?;

        let entry = Entry::new(owner, title, body, image_data);
        let id = entry.id().clone();
        self.store.insert_entry(entry)?;

        self.commit()?;
        Ok(id)
    }

    /// Replace title and body; replace the image only when one is given.
    /// There is no way to clear an image through this call.
    pub fn update_entry(
        &mut self,
        entry: &EntryId,
        title: &str,
        body: &str,
        image: Option<&dyn ImageSource>,
    ) -> Result<()> {
        if self.store.entry(entry).is_none() {
            return Err(JotbookError::entry_not_found(entry));
        }
        let image_data = self.encode(image)?;

        self.store.update_entry(entry, |e| {
            e.set_title(title);
            e.set_body(body);
            if let Some(bytes) = image_data {
                e.set_image_data(Some(bytes));
            }
        })?;

        self.commit()
    }

    /// Create a journal; the title must not be empty
    pub fn create_journal(&mut self, title: &str, color: Color) -> Result<JournalId> {
        validate_title(title)?;

        let journal = Journal::new(title, Some(color.to_hex()));
        let id = journal.id().clone();
        self.store.insert_journal(journal)?;

        self.commit()?;
        Ok(id)
    }

    /// Rename a journal and set or clear its color
    pub fn update_journal(
        &mut self,
        journal: &JournalId,
        title: &str,
        color: Option<Color>,
    ) -> Result<()> {
        validate_title(title)?;

        self.store.update_journal(journal, |j| {
            j.set_title(title);
            j.set_color_hex(color.map(Color::to_hex));
        })?;

        self.commit()
    }

    pub fn delete_entry(&mut self, entry: &EntryId) -> Result<()> {
        self.store.delete_entry(entry)?;
        self.commit()
    }

    /// Delete a journal together with all of its entries
    pub fn delete_journal(&mut self, journal: &JournalId) -> Result<()> {
        let removed = self.store.delete_journal(journal)?;
        log::debug!(
            "Deleting journal {} cascades to {} entries",
            journal,
            removed.len()
        );
        self.commit()
    }

    /// Commit pending changes and release the store
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    fn encode(&self, image: Option<&dyn ImageSource>) -> Result<Option<Vec<u8>>> {
        image
            .map(|source| {
                source.encode(self.image_quality).map_err(|e| {
                    log::warn!("Image encoding failed: {}", e);
                    match e {
                        JotbookError::ImageEncoding(_) => e,
                        other => JotbookError::ImageEncoding(other.to_string()),
                    }
                })
            })
            .transpose()
    }

    fn commit(&mut self) -> Result<()> {
        self.store.commit()
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(JotbookError::Validation(
            "Journal title must not be empty".to_string(),
        ));
    }
    Ok(())
}
