//! jotbook - Local journal store
//!
//! Journals own entries (title, body, optional photo). All mutations go
//! through [`JournalController`], which stages changes on a [`Store`] and
//! commits them atomically to a memory or file-backed [`Backend`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use application::JournalController;
pub use domain::{
    Color, EncodedImage, Entry, EntryId, ImageQuality, ImageSource, Journal, JournalId,
};
pub use error::{JotbookError, Result};
pub use infrastructure::{
    Backend, ChangeEvent, ChangeKind, Config, EntityRef, FileSystemBackend, MemoryBackend,
    Snapshot, Store,
};
