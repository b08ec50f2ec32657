//! Infrastructure layer - Persistence, configuration and logging

pub mod backend;
pub mod changes;
pub mod config;
pub mod filesystem;
pub mod logging;
pub mod snapshot;
pub mod store;

pub use backend::{Backend, MemoryBackend};
pub use changes::{ChangeEvent, ChangeKind, EntityRef};
pub use config::Config;
pub use filesystem::FileSystemBackend;
pub use snapshot::Snapshot;
pub use store::Store;
