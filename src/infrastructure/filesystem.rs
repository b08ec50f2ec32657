//! File-backed store: a versioned JSON snapshot plus out-of-line image blobs
//!
//! Layout under the journal root:
//!
//! ```text
//! .jotbook/
//!   config.toml
//!   store.json     journals and entries; images are referenced, not inlined
//!   blobs/         one file per stored image payload
//!   lock           held exclusively while a backend is open
//! ```

use crate::domain::{Entry, EntryId, Journal, JournalId};
use crate::error::{JotbookError, Result};
use crate::infrastructure::config::JOTBOOK_DIR;
use crate::infrastructure::{Backend, ChangeEvent, ChangeKind, Config, EntityRef, Snapshot};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const STORE_FILENAME: &str = "store.json";
const BLOB_DIR: &str = "blobs";
const LOCK_FILENAME: &str = "lock";

// Bump when the store.json layout changes.
// - v1: journals inline, entry images as blob references
const STORE_FORMAT_VERSION: u32 = 1;

/// Pointer from an entry record to its image payload in `blobs/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BlobRef {
    file: String,
    len: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    id: EntryId,
    journal_id: JournalId,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<BlobRef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    version: u32,
    journals: Vec<Journal>,
    entries: Vec<EntryRecord>,
}

/// [`Backend`] persisting under `<root>/.jotbook`
#[derive(Debug)]
pub struct FileSystemBackend {
    root: PathBuf,
    lock: File,
    blobs: HashMap<EntryId, BlobRef>,
}

impl FileSystemBackend {
    /// Create the `.jotbook` layout in `root` and open it
    pub fn initialize(root: &Path, config: &Config) -> Result<Self> {
        if !root.exists() {
            fs::create_dir_all(root)?;
        }

        let jotbook_dir = root.join(JOTBOOK_DIR);
        if jotbook_dir.exists() {
            return Err(JotbookError::Config(format!(
                "Directory already initialized: {}",
                root.display()
            )));
        }

        config.validate()?;
        fs::create_dir(&jotbook_dir)?;
        fs::create_dir(jotbook_dir.join(BLOB_DIR))?;
        config.save_to_dir(root)?;

        let mut backend = Self::open(root)?;
        backend.persist(&Snapshot::new(), &[])?;
        log::info!("Initialized jotbook store at {}", root.display());
        Ok(backend)
    }

    /// Open an initialized root, taking the exclusive writer lock
    pub fn open(root: &Path) -> Result<Self> {
        let jotbook_dir = root.join(JOTBOOK_DIR);
        if !jotbook_dir.is_dir() {
            return Err(JotbookError::NotAJotbookDirectory(root.to_path_buf()));
        }

        let blob_dir = jotbook_dir.join(BLOB_DIR);
        if !blob_dir.exists() {
            fs::create_dir(&blob_dir)?;
        }

        let lock = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(jotbook_dir.join(LOCK_FILENAME))?;

        FileExt::try_lock_exclusive(&lock).map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                JotbookError::StoreLocked(root.to_path_buf())
            } else {
                JotbookError::Io(e)
            }
        })?;

        Ok(FileSystemBackend {
            root: root.to_path_buf(),
            lock,
            blobs: HashMap::new(),
        })
    }

    /// Check if a path contains a .jotbook directory
    pub fn is_initialized(root: &Path) -> bool {
        root.join(JOTBOOK_DIR).is_dir()
    }

    /// Configuration stored alongside the data
    pub fn config(&self) -> Result<Config> {
        Config::load_from_dir(&self.root)
    }

    fn jotbook_dir(&self) -> PathBuf {
        self.root.join(JOTBOOK_DIR)
    }

    fn store_path(&self) -> PathBuf {
        self.jotbook_dir().join(STORE_FILENAME)
    }

    fn blob_path(&self, file: &str) -> PathBuf {
        self.jotbook_dir().join(BLOB_DIR).join(file)
    }

    fn read_blob(&self, entry: &EntryId, blob: &BlobRef) -> Result<Vec<u8>> {
        let bytes = fs::read(self.blob_path(&blob.file)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JotbookError::Corrupt(format!(
                    "image blob {} of entry {} is missing",
                    blob.file, entry
                ))
            } else {
                JotbookError::Io(e)
            }
        })?;

        if bytes.len() != blob.len {
            return Err(JotbookError::Corrupt(format!(
                "image blob {} of entry {} has {} bytes, expected {}",
                blob.file,
                entry,
                bytes.len(),
                blob.len
            )));
        }
        Ok(bytes)
    }

    /// Whether the stored blob already has exactly `bytes`
    fn blob_holds(&self, blob: &BlobRef, bytes: &[u8]) -> bool {
        fs::read(self.blob_path(&blob.file)).is_ok_and(|stored| stored == bytes)
    }

    fn write_blob(&self, entry: &EntryId, bytes: &[u8]) -> Result<BlobRef> {
        let file = format!("{}-{}.bin", entry, Uuid::new_v4().simple());
        let mut out = File::create(self.blob_path(&file))?;
        out.write_all(bytes)?;
        out.sync_all()?;
        Ok(BlobRef {
            file,
            len: bytes.len(),
        })
    }

    /// Write to a temp file in the same directory, then rename into place
    fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(contents)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            JotbookError::Io(e)
        })
    }

    /// Best-effort removal of blob files; failures are only logged
    fn remove_blobs<'a>(&self, files: impl IntoIterator<Item = &'a str>) {
        for file in files {
            if let Err(e) = fs::remove_file(self.blob_path(file)) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to remove image blob {}: {}", file, e);
                }
            }
        }
    }

    /// Delete blob files no record points at, e.g. left by an interrupted persist
    fn sweep_unreferenced_blobs(&self) {
        let referenced: HashSet<&str> = self.blobs.values().map(|b| b.file.as_str()).collect();
        let Ok(dir) = fs::read_dir(self.jotbook_dir().join(BLOB_DIR)) else {
            return;
        };

        let stray: Vec<String> = dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !referenced.contains(name.as_str()))
            .collect();

        if !stray.is_empty() {
            log::warn!("Removing {} unreferenced image blobs", stray.len());
            self.remove_blobs(stray.iter().map(String::as_str));
        }
    }
}

impl Backend for FileSystemBackend {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn load(&mut self) -> Result<Snapshot> {
        let path = self.store_path();
        if !path.exists() {
            self.blobs.clear();
            return Ok(Snapshot::new());
        }

        let json = fs::read_to_string(&path)?;
        let data: StoreFile = serde_json::from_str(&json)?;
        if data.version != STORE_FORMAT_VERSION {
            return Err(JotbookError::Corrupt(format!(
                "unsupported store format version {} (expected {})",
                data.version, STORE_FORMAT_VERSION
            )));
        }

        let mut blobs = HashMap::new();
        let mut entries = Vec::with_capacity(data.entries.len());
        for record in data.entries {
            let image_data = match &record.image {
                Some(blob) => {
                    let bytes = self.read_blob(&record.id, blob)?;
                    blobs.insert(record.id.clone(), blob.clone());
                    Some(bytes)
                }
                None => None,
            };
            entries.push(Entry::restore(
                record.id,
                record.journal_id,
                record.title,
                record.body,
                image_data,
                record.created_at,
            ));
        }

        let snapshot = Snapshot::from_parts(data.journals, entries)?;
        self.blobs = blobs;
        self.sweep_unreferenced_blobs();
        Ok(snapshot)
    }

    fn persist(&mut self, snapshot: &Snapshot, changes: &[ChangeEvent]) -> Result<()> {
        let dirty: HashSet<&EntryId> = changes
            .iter()
            .filter_map(|change| match (&change.entity, change.kind) {
                (EntityRef::Entry(id), ChangeKind::Inserted | ChangeKind::Updated) => Some(id),
                _ => None,
            })
            .collect();

        let mut entries: Vec<&Entry> = snapshot.entries().collect();
        entries.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });

        let mut blobs = HashMap::new();
        let mut written: Vec<String> = Vec::new();
        let mut records = Vec::with_capacity(entries.len());

        for entry in entries {
            let image = match entry.image_data() {
                None => None,
                Some(bytes) => {
                    let reusable = self.blobs.get(entry.id()).filter(|blob| {
                        blob.len == bytes.len()
                            && (!dirty.contains(entry.id()) || self.blob_holds(blob, bytes))
                    });
                    let blob = match reusable {
                        Some(blob) => blob.clone(),
                        None => match self.write_blob(entry.id(), bytes) {
                            Ok(blob) => {
                                written.push(blob.file.clone());
                                blob
                            }
                            Err(e) => {
                                self.remove_blobs(written.iter().map(String::as_str));
                                return Err(e);
                            }
                        },
                    };
                    blobs.insert(entry.id().clone(), blob.clone());
                    Some(blob)
                }
            };

            records.push(EntryRecord {
                id: entry.id().clone(),
                journal_id: entry.journal_id().clone(),
                title: entry.title().to_string(),
                body: entry.body().to_string(),
                created_at: entry.created_at(),
                image,
            });
        }

        let data = StoreFile {
            version: STORE_FORMAT_VERSION,
            journals: snapshot.journals().into_iter().cloned().collect(),
            entries: records,
        };

        let written_result = serde_json::to_vec_pretty(&data)
            .map_err(JotbookError::from)
            .and_then(|json| Self::atomic_write(&self.store_path(), &json));
        if let Err(e) = written_result {
            self.remove_blobs(written.iter().map(String::as_str));
            return Err(e);
        }

        let live: HashSet<&str> = blobs.values().map(|b: &BlobRef| b.file.as_str()).collect();
        let obsolete: Vec<String> = self
            .blobs
            .values()
            .filter(|b| !live.contains(b.file.as_str()))
            .map(|b| b.file.clone())
            .collect();
        self.remove_blobs(obsolete.iter().map(String::as_str));

        self.blobs = blobs;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        FileExt::unlock(&self.lock)?;
        Ok(())
    }
}
