//! Durable storage behind the preference store.

use crate::error::{Result, StoreError};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// Read/write access to the durable player-data file.
///
/// Implementations must make `write_all` a full overwrite: after it returns
/// `Ok`, reading yields exactly `contents`.
pub trait DataFile: Send + Sync {
    /// Create the file (empty) if it does not exist yet.
    fn ensure_exists(&self) -> Result<()>;

    /// Read the whole file.
    fn read_to_string(&self) -> Result<String>;

    /// Replace the whole file with `contents`.
    fn write_all(&self, contents: &str) -> Result<()>;

    /// Where the data lives, for log lines and error messages.
    fn location(&self) -> PathBuf;
}

/// A `DataFile` on the local file system.
#[derive(Debug, Clone)]
pub struct FsDataFile {
    path: PathBuf,
}

impl FsDataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataFile for FsDataFile {
    fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map(|_| ())
            .or_else(|e| match e.kind() {
                // Lost a race with another creator; the file exists either way.
                std::io::ErrorKind::AlreadyExists => Ok(()),
                _ => Err(StoreError::io(&self.path, e)),
            })
    }

    fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))
    }

    fn write_all(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        // Atomic save: write to temp file then rename so a crash mid-write
        // never leaves a truncated data file behind
        let temp_path = self.path.with_extension("yml.tmp");
        fs::write(&temp_path, contents).map_err(|e| StoreError::io(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StoreError::io(&self.path, e)
        })
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// An in-memory `DataFile` that counts writes.
///
/// Useful for embedding the store where nothing should touch disk, and for
/// asserting how many times a flush actually wrote.
#[derive(Debug, Default)]
pub struct MemoryDataFile {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    contents: Option<String>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryDataFile {
    /// A file that does not exist yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A file that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                contents: Some(contents.into()),
                ..MemoryState::default()
            }),
        }
    }

    /// Current contents, `None` if the file was never created.
    pub fn contents(&self) -> Option<String> {
        self.state.lock().contents.clone()
    }

    /// Number of successful `write_all` calls.
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }

    /// Make every subsequent `write_all` fail with `PermissionDenied`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }
}

impl DataFile for MemoryDataFile {
    fn ensure_exists(&self) -> Result<()> {
        self.state.lock().contents.get_or_insert_with(String::new);
        Ok(())
    }

    fn read_to_string(&self) -> Result<String> {
        self.state.lock().contents.clone().ok_or_else(|| {
            StoreError::io(
                self.location(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )
        })
    }

    fn write_all(&self, contents: &str) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(StoreError::io(
                self.location(),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        state.contents = Some(contents.to_string());
        state.writes += 1;
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("<memory>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_exists_creates_empty_file_and_parents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("playerdata.yml");
        let file = FsDataFile::new(&path);

        file.ensure_exists().unwrap();
        assert!(path.exists());
        assert_eq!(file.read_to_string().unwrap(), "");
    }

    #[test]
    fn test_ensure_exists_keeps_existing_contents() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("playerdata.yml");
        fs::write(&path, "players: {}\n").unwrap();

        FsDataFile::new(&path).ensure_exists().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "players: {}\n");
    }

    #[test]
    fn test_write_all_overwrites_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("playerdata.yml");
        let file = FsDataFile::new(&path);

        file.write_all("a much longer first version\n").unwrap();
        file.write_all("short\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");
        assert!(!path.with_extension("yml.tmp").exists());
    }

    #[test]
    fn test_memory_file_counts_writes_and_can_fail() {
        let file = MemoryDataFile::new();
        assert!(file.read_to_string().is_err());

        file.ensure_exists().unwrap();
        assert_eq!(file.contents().as_deref(), Some(""));

        file.write_all("x: 1\n").unwrap();
        file.set_fail_writes(true);
        assert!(file.write_all("x: 2\n").is_err());

        assert_eq!(file.write_count(), 1);
        assert_eq!(file.contents().as_deref(), Some("x: 1\n"));
    }
}
