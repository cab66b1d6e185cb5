//! The records file on disk.
//!
//! A records file has one writer at a time. A writer holds `<records>.lock`
//! (created exclusively, removed when the writer is done) for its whole
//! load, mutate and save cycle. Saves stage the new contents in a sibling
//! file and rename it over the old one, so readers never see a torn file.

use chrono::Utc;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::records::{RecordsError, read_records, render_records};
use crate::store::{CaseStore, CaseStoreError};

/// Errors from writing through a `RecordsFile`.
#[derive(Debug, thiserror::Error)]
pub enum RecordsFileError {
    #[error("records lock busy: {}", .0.display())]
    LockBusy(PathBuf),

    #[error("failed to take records lock {}: {message}", .path.display())]
    Lock { path: PathBuf, message: String },

    #[error(transparent)]
    Records(#[from] RecordsError),

    #[error(transparent)]
    Store(#[from] CaseStoreError),
}

/// A records file path plus the single-writer discipline around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsFile {
    path: PathBuf,
}

impl RecordsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Marker held by the current writer.
    pub fn lock_path(&self) -> PathBuf {
        with_suffix(&self.path, ".lock")
    }

    /// Read the file into a fresh store. A missing file is an empty store.
    ///
    /// Reading takes no lock: saves replace the file by rename.
    pub fn load(&self) -> Result<CaseStore, RecordsError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CaseStore::new()),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        let text = decode(&self.path, bytes)?;
        Ok(CaseStore::from_snapshots(read_records(text.as_bytes())?)?)
    }

    /// Replace the file with `store`, as the sole writer.
    pub fn save(&self, store: &CaseStore) -> Result<(), RecordsFileError> {
        let _writer = WriterLock::acquire(self)?;
        self.replace_with(store)?;
        tracing::debug!(path = %self.path.display(), cases = store.len(), "records saved");
        Ok(())
    }

    /// Load, apply `mutate` and save, all under one writer lock.
    ///
    /// When `mutate` fails the file is left as it was.
    pub fn update<T>(
        &self,
        mutate: impl FnOnce(&mut CaseStore) -> Result<T, CaseStoreError>,
    ) -> Result<T, RecordsFileError> {
        let _writer = WriterLock::acquire(self)?;
        let mut store = self.load()?;
        let value = mutate(&mut store)?;
        self.replace_with(&store)?;
        tracing::debug!(path = %self.path.display(), cases = store.len(), "records updated");
        Ok(value)
    }

    /// Only called with the writer lock held, so the staging name is fixed.
    fn replace_with(&self, store: &CaseStore) -> Result<(), RecordsError> {
        let text = render_records(&store.snapshots())?;
        let staged = with_suffix(&self.path, ".saving");

        if let Err(e) = write_synced(&staged, text.as_bytes()) {
            let _ = fs::remove_file(&staged);
            return Err(io_error(&staged, e));
        }
        if let Err(e) = fs::rename(&staged, &self.path) {
            let _ = fs::remove_file(&staged);
            return Err(io_error(&self.path, e));
        }
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)
                .and_then(|dir| dir.sync_all())
                .map_err(|e| io_error(dir, e)),
            _ => Ok(()),
        }
    }
}

struct WriterLock {
    path: PathBuf,
}

impl WriterLock {
    fn acquire(file: &RecordsFile) -> Result<Self, RecordsFileError> {
        let path = file.lock_path();
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| lock_error(&path, e))?;
        }

        let mut marker = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(marker) => marker,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::warn!(lock = %path.display(), "records lock busy");
                return Err(RecordsFileError::LockBusy(path));
            }
            Err(e) => return Err(lock_error(&path, e)),
        };
        // Owner details for whoever finds a stale lock.
        let _ = writeln!(
            marker,
            "pid {} since {}",
            std::process::id(),
            Utc::now().to_rfc3339()
        );
        Ok(Self { path })
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut staged = File::create(path)?;
    staged.write_all(bytes)?;
    staged.sync_all()
}

fn decode(path: &Path, bytes: Vec<u8>) -> Result<String, RecordsError> {
    let text = String::from_utf8(bytes).map_err(|_| {
        RecordsError::Corrupt(format!("{}: not valid UTF-8", path.display()))
    })?;
    if text.contains('\0') {
        return Err(RecordsError::Corrupt(format!(
            "{}: contains NUL bytes",
            path.display()
        )));
    }
    Ok(text)
}

fn io_error(path: &Path, e: io::Error) -> RecordsError {
    RecordsError::Io(format!("{}: {e}", path.display()))
}

fn lock_error(path: &Path, e: io::Error) -> RecordsFileError {
    RecordsFileError::Lock {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct TempDir {
        path: PathBuf,
    }

    impl TempDir {
        fn new(prefix: &str) -> Self {
            let unique = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock should be after unix epoch")
                .as_nanos();
            let path = std::env::temp_dir().join(format!(
                "casebook-file-{prefix}-{}-{unique}",
                std::process::id()
            ));
            fs::create_dir_all(&path).expect("temp dir should be created");
            Self { path }
        }

        fn records(&self) -> RecordsFile {
            RecordsFile::new(self.path.join("case_records.txt"))
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn missing_file_loads_as_empty_store() {
        let tmp = TempDir::new("missing");
        let store = tmp.records().load().expect("missing file is empty");
        assert!(store.is_empty());
    }

    #[test]
    fn update_persists_and_releases_lock() {
        let tmp = TempDir::new("update");
        let file = tmp.records();

        let added = file
            .update(|store| {
                store.add(3, "Contract breach", 2)?;
                store.append_progress(3, Stage::Custom("closed".to_string()))?;
                Ok(store.len())
            })
            .expect("update should succeed");
        assert_eq!(added, 1);
        assert!(!file.lock_path().exists());
        assert!(!with_suffix(file.path(), ".saving").exists());

        let store = file.load().expect("records should load");
        assert_eq!(store.get(3).map(|r| r.description()), Some("Contract breach"));
        assert_eq!(
            store.list_progress(3).expect("case 3"),
            &[Stage::Custom("closed".to_string())]
        );
        assert!(store.undo_log().is_empty());
    }

    #[test]
    fn failed_update_leaves_file_untouched() {
        let tmp = TempDir::new("failed");
        let file = tmp.records();
        file.update(|store| store.add(1, "kept", 1)).expect("seed");
        let before = fs::read_to_string(file.path()).expect("seeded file");

        let err = file
            .update(|store| store.delete(7))
            .expect_err("missing case must error");
        assert!(matches!(
            err,
            RecordsFileError::Store(CaseStoreError::NotFound(7))
        ));
        assert_eq!(fs::read_to_string(file.path()).expect("file"), before);
        assert!(!file.lock_path().exists());
    }

    #[test]
    fn held_lock_blocks_update_and_save() {
        let tmp = TempDir::new("busy");
        let file = tmp.records();
        fs::write(file.lock_path(), "held").expect("lock should be written");

        let err = file
            .update(|store| store.add(1, "x", 1))
            .expect_err("held lock must block update");
        assert!(matches!(err, RecordsFileError::LockBusy(ref path) if *path == file.lock_path()));

        let mut store = CaseStore::new();
        store.add(2, "y", 1).expect("add");
        let err = file.save(&store).expect_err("held lock must block save");
        assert!(err.to_string().contains("records lock busy"));

        assert!(!file.path().exists());
        assert_eq!(
            fs::read_to_string(file.lock_path()).expect("lock kept"),
            "held"
        );
    }

    #[test]
    fn save_replaces_previous_contents() {
        let tmp = TempDir::new("replace");
        let file = tmp.records();

        let mut first = CaseStore::new();
        first.add(1, "first", 1).expect("add");
        file.save(&first).expect("first save");

        let mut second = CaseStore::new();
        second.add(2, "second", 1).expect("add");
        file.save(&second).expect("second save");

        let loaded = file.load().expect("read back");
        assert_eq!(loaded.key_index().in_order(), vec![2]);
    }

    #[test]
    fn unrepresentable_store_is_not_written() {
        let tmp = TempDir::new("multiline");
        let file = tmp.records();
        let mut store = CaseStore::new();
        store.add(4, "line one\nline two", 1).expect("add");

        let err = file.save(&store).expect_err("line break must be rejected");
        assert!(matches!(
            err,
            RecordsFileError::Records(RecordsError::Unrepresentable(_))
        ));
        assert!(!file.path().exists());
        assert!(!with_suffix(file.path(), ".saving").exists());
    }

    #[test]
    fn load_rejects_nul_payload() {
        let tmp = TempDir::new("nul");
        let file = tmp.records();
        fs::write(file.path(), b"Case ID: 1\n\0").expect("fixture should write");

        match file.load() {
            Err(RecordsError::Corrupt(message)) => assert!(message.contains("NUL")),
            other => panic!("expected corrupt records error, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_repeated_ids() {
        let tmp = TempDir::new("repeat");
        let file = tmp.records();
        let block = "Case ID: 1\nDescription: x\nPriority: 1\nProgress:\n(no progress)\n\n";
        fs::write(file.path(), format!("{block}{block}")).expect("fixture should write");

        assert!(matches!(
            file.load(),
            Err(RecordsError::Store(CaseStoreError::IdCollision(1)))
        ));
    }
}
