//! Directory-backed session store.
//!
//! Each key maps to `<dir>/<key>.session`. Every write goes to its own
//! uniquely named temp file in the same directory which is then renamed over
//! the target, so a reader sees either the old buffer or a complete new one,
//! even while clones of the store write the same key concurrently.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use tempfile::{Builder, NamedTempFile};
use tracekey_core::{SessionStore, StorageError, storage::validate_key};
use zeroize::Zeroizing;

const EXTENSION: &str = "session";
const TEMP_SUFFIX: &str = ".tmp";

/// Session store keeping one file per key in a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: Arc<PathBuf>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        tracing::debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir: Arc::new(dir.to_path_buf()) })
    }

    /// Directory holding the session files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    fn temp_file_for(&self, key: &str) -> io::Result<NamedTempFile> {
        Builder::new()
            .prefix(&format!(".{key}."))
            .suffix(TEMP_SUFFIX)
            .tempfile_in(self.dir.as_path())
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        // A temp file that is never persisted is deleted on drop
        let write = || -> io::Result<()> {
            let mut file = self.temp_file_for(key)?;
            file.write_all(bytes)?;
            file.as_file().sync_all()?;
            file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        };

        if let Err(e) = write() {
            tracing::warn!(key, error = %e, "Failed to write session file");
            return Err(e.into());
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
