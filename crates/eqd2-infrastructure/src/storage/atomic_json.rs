//! Atomic JSON file operations.
//!
//! A thin layer for safe access to a single JSON document on disk:
//! all-or-nothing updates via tmp file + atomic rename, explicit fsync
//! before the rename, and an advisory lock against concurrent writers.

use eqd2_core::error::{Eqd2Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A handle to an atomically-updated JSON file.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new handle.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the JSON file
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: successfully loaded and deserialized
    /// - `Ok(None)`: file doesn't exist or is empty
    /// - `Err`: failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Reads the raw file contents without deserializing.
    ///
    /// Used by callers that want to attempt multiple schema shapes against
    /// the same bytes. Same `Ok(None)` semantics as [`load`](Self::load).
    pub fn load_raw(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(content))
    }

    /// Saves data atomically.
    ///
    /// Serializes to a temporary file in the same directory, fsyncs it, and
    /// renames it over the target, holding an advisory lock throughout.
    pub fn save(&self, data: &T) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let _lock = FileLock::acquire(&self.path)?;

        let json_string = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json_string.as_bytes())?;

        // Ensure data is written to disk before the rename makes it visible
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Removes the file if it exists.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Eqd2Error::io("Path has no parent directory"))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| Eqd2Error::io("Path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// An advisory file lock released on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| Eqd2Error::io(format!("Failed to acquire lock: {}", e)))?;
        }

        // On non-Unix systems there is no advisory locking; acceptable for a
        // single-user desktop store.

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped; removing the
        // lock file is best effort.
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestDoc {
        name: String,
        count: u32,
    }

    #[test]
    fn save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<TestDoc>::new(temp_dir.path().join("doc.json"));

        let doc = TestDoc {
            name: "test".to_string(),
            count: 42,
        };

        file.save(&doc).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<TestDoc>::new(temp_dir.path().join("missing.json"));

        assert!(file.load().unwrap().is_none());
        assert!(file.load_raw().unwrap().is_none());
    }

    #[test]
    fn load_empty_file_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.json");
        std::fs::write(&path, "  \n").unwrap();

        let file = AtomicJsonFile::<TestDoc>::new(path);
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_parent_and_leaves_no_tmp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("doc.json");
        let file = AtomicJsonFile::<TestDoc>::new(path.clone());

        file.save(&TestDoc {
            name: "test".to_string(),
            count: 1,
        })
        .unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join(".doc.json.tmp").exists());
    }

    #[test]
    fn load_garbage_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("garbage.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let file = AtomicJsonFile::<TestDoc>::new(path);
        let err = file.load().unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn delete_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        let file = AtomicJsonFile::<TestDoc>::new(path.clone());

        file.save(&TestDoc {
            name: "x".to_string(),
            count: 0,
        })
        .unwrap();
        assert!(path.exists());

        file.delete().unwrap();
        assert!(!path.exists());

        // Deleting again is a no-op.
        file.delete().unwrap();
    }
}
