//! src/services/storage_service.rs
//!
//! Durable key/value storage for client state, the equivalent of a browser's
//! local storage. `FileStorage` keeps one JSON document per key beneath
//! `base_path/{key}.json` and replaces it atomically (temp file, fsync,
//! rename) so readers never see a half-written entry.

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::debug;
use uuid::Uuid;

const MAX_KEY_LEN: usize = 128;

/// Synchronous string store addressed by key.
pub trait LocalStorage: Send + Sync {
    /// Read the value for `key`, `Ok(None)` if absent.
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value for `key` in one operation.
    fn set_item(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> io::Result<()>;
}

impl<T: LocalStorage + ?Sized> LocalStorage for Arc<T> {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> io::Result<()> {
        (**self).remove_item(key)
    }
}

/// File-backed storage rooted at a directory.
#[derive(Clone, Debug)]
pub struct FileStorage {
    /// Directory holding one `{key}.json` file per entry.
    pub base_path: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at `base_path`. The directory is created lazily
    /// on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Reject keys that could escape `base_path` or produce odd file names.
    fn ensure_key_safe(key: &str) -> io::Result<()> {
        let unsafe_key = key.is_empty()
            || key.len() > MAX_KEY_LEN
            || key.contains("..")
            || key
                .bytes()
                .any(|b| b.is_ascii_control() || b == b'/' || b == b'\\');
        if unsafe_key {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid storage key `{key}`"),
            ));
        }
        Ok(())
    }

    fn entry_path(&self, key: &str) -> io::Result<PathBuf> {
        Self::ensure_key_safe(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.base_path)?;

        let tmp_path = self.base_path.join(format!(".tmp-{}", Uuid::new_v4()));
        let written = File::create(&tmp_path).and_then(|mut file| {
            file.write_all(value.as_bytes())?;
            file.flush()?;
            file.sync_all()
        });
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        if let Err(err) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        debug!("stored entry {}", path.display());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> io::Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed entry {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("memory storage lock poisoned"))
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> io::Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
