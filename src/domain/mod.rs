//! Domain layer - Entities and value types

pub mod color;
pub mod entry;
pub mod image;
pub mod journal;

pub use color::Color;
pub use entry::{Entry, EntryId};
pub use image::{EncodedImage, ImageQuality, ImageSource};
pub use journal::{Journal, JournalId};
