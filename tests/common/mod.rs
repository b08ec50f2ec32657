#![allow(dead_code)]

use jotbook::{Backend, ChangeEvent, Config, FileSystemBackend, JotbookError, MemoryBackend, Snapshot};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// Initialize a journal directory and release it so it can be reopened
pub fn init_store(root: &Path) {
    let mut backend = FileSystemBackend::initialize(root, &Config::new()).unwrap();
    backend.close().unwrap();
}

/// Memory backend whose persists fail while the shared switch is on
pub struct FlakyBackend {
    inner: MemoryBackend,
    failing: Rc<Cell<bool>>,
}

impl FlakyBackend {
    pub fn new() -> (Self, Rc<Cell<bool>>) {
        let failing = Rc::new(Cell::new(false));
        let backend = FlakyBackend {
            inner: MemoryBackend::new(),
            failing: Rc::clone(&failing),
        };
        (backend, failing)
    }
}

impl Backend for FlakyBackend {
    fn location(&self) -> String {
        "flaky".to_string()
    }

    fn load(&mut self) -> jotbook::Result<Snapshot> {
        self.inner.load()
    }

    fn persist(&mut self, snapshot: &Snapshot, changes: &[ChangeEvent]) -> jotbook::Result<()> {
        if self.failing.get() {
            return Err(JotbookError::Io(std::io::Error::other("simulated I/O error")));
        }
        self.inner.persist(snapshot, changes)
    }
}
