use crate::error::{StoreError, StoreResult};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A single persisted document. History, mistake stats and config each get
/// their own handle so tests can swap in [`MemoryStore`].
pub trait DocumentStore {
    /// `Ok(None)` when the document has never been written.
    fn read(&self) -> StoreResult<Option<String>>;
    fn write(&self, contents: &str) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn read(&self) -> StoreResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&self.path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

/// In-memory document. Clones share the same contents, so a test can keep one
/// handle and give the other away.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Rc<RefCell<Option<String>>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Rc::new(RefCell::new(Some(contents.to_string()))),
            fail_writes: false,
        }
    }

    /// Every write fails with a permission error; reads see whatever was seeded.
    pub fn failing() -> Self {
        Self {
            contents: Rc::default(),
            fail_writes: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self) -> StoreResult<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                "memory store is read-only",
            )));
        }
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

/// Reads and decodes a document, falling back to `T::default()` when it is
/// missing, unreadable or malformed.
pub fn load_or_default<T>(store: &dyn DocumentStore, what: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let contents = match store.read() {
        Ok(Some(contents)) => contents,
        Ok(None) => return T::default(),
        Err(e) => {
            log::warn!("unable to read {what}: {e}");
            return T::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("ignoring malformed {what}: {e}");
            T::default()
        }
    }
}

pub fn save_json<T: Serialize>(store: &dyn DocumentStore, value: &T) -> StoreResult<()> {
    let data = serde_json::to_string_pretty(value)?;
    store.write(&data)
}
