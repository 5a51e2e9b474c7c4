//! Review store
//!
//! Append-only persistence of [`ReviewRecord`]s. The only mutation besides
//! appending is a one-time amendment of a record's comment.
//!
//! [`CsvReviewStore`] keeps the whole dataset in a single CSV table with the
//! columns `timestamp,rating,comment`. Every mutation is a full
//! read-modify-write of that table, serialized by an in-process mutex plus an
//! exclusive advisory lock on `<table>.lock` so that writers in other
//! processes cannot interleave with it. The rewritten table is staged in a
//! temporary file next to it and renamed into place; on Unix the directory
//! is synced afterwards so the rename itself survives a power loss.
//!
//! Readers never create the lock file. They take a shared lock when it
//! exists and otherwise rely on the rename being atomic.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::review::{Rating, RecordId, ReviewRecord};
use crate::{Error, Result};

/// Storage backend for review records
pub trait ReviewStore: Send + Sync {
    /// Append a new record stamped with the current time
    fn append(&self, rating: Rating, comment: &str) -> Result<RecordId>;

    /// Set the comment of whichever record is physically last
    ///
    /// Returns the id of the amended record.
    fn amend_last_comment(&self, comment: &str) -> Result<RecordId>;

    /// Set the comment of the record at `id`
    fn amend_comment(&self, id: RecordId, comment: &str) -> Result<()>;

    /// All records in append order
    fn load_all(&self) -> Result<Vec<ReviewRecord>>;

    /// Number of stored records
    fn len(&self) -> Result<usize> {
        Ok(self.load_all()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn push_record(records: &mut Vec<ReviewRecord>, rating: Rating, comment: &str) -> RecordId {
    records.push(ReviewRecord::new(rating, comment));
    RecordId(records.len() - 1)
}

/// Set the comment of record `id`. Blank text changes nothing and returns
/// false, so the caller can skip the rewrite.
fn amend_record(records: &mut [ReviewRecord], id: RecordId, comment: &str) -> Result<bool> {
    let record = records.get_mut(id.0).ok_or(Error::UnknownRecord(id))?;
    let comment = comment.trim();
    if comment.is_empty() {
        return Ok(false);
    }
    if record.has_comment() {
        return Err(Error::CommentAlreadySet(id));
    }
    record.comment = comment.to_string();
    Ok(true)
}

fn last_record_id(records: &[ReviewRecord]) -> Result<RecordId> {
    records
        .len()
        .checked_sub(1)
        .map(RecordId)
        .ok_or(Error::EmptyStore)
}

/// Review store backed by a single CSV table
#[derive(Debug)]
pub struct CsvReviewStore {
    path: PathBuf,
    lock_path: PathBuf,
    writer: Mutex<()>,
}

impl CsvReviewStore {
    /// Store over the table at `path`
    ///
    /// Nothing is touched on disk until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_path),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_lock_file(&self) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
    }

    /// Run `op` over the full record list under the writer lock. `op` returns
    /// its result and whether it changed the records; only changed records
    /// are written back. A failing `op` leaves the table untouched.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Vec<ReviewRecord>) -> Result<(T, bool)>,
    ) -> Result<(T, bool)> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        // Released when `lock` is dropped
        let lock = self.open_lock_file()?;
        FileExt::lock_exclusive(&lock)?;
        debug!("Acquired writer lock on {}", self.lock_path.display());

        let mut records = self.read_table()?;
        let (out, changed) = op(&mut records)?;
        if !changed {
            return Ok((out, false));
        }
        if let Err(e) = self.write_table(&records) {
            error!("Failed to write review table {}: {}", self.path.display(), e);
            return Err(e);
        }
        Ok((out, true))
    }

    fn read_table(&self) -> Result<Vec<ReviewRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<ReviewRecord>, csv::Error>>()?;
        debug!("Loaded {} review(s) from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn write_table(&self, records: &[ReviewRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let staged = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::Writer::from_writer(staged.as_file());
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .map_err(|e| Error::StorageIo(e.error))?;

        // Directories cannot be opened as files on Windows
        #[cfg(unix)]
        File::open(dir)?.sync_all()?;
        Ok(())
    }
}

impl ReviewStore for CsvReviewStore {
    fn append(&self, rating: Rating, comment: &str) -> Result<RecordId> {
        let (id, _) = self.mutate(|records| Ok((push_record(records, rating, comment), true)))?;
        info!(record = %id, %rating, "Appended review to {}", self.path.display());
        Ok(id)
    }

    fn amend_last_comment(&self, comment: &str) -> Result<RecordId> {
        let (id, changed) = self.mutate(|records| {
            let id = last_record_id(records)?;
            let changed = amend_record(records, id, comment)?;
            Ok((id, changed))
        })?;
        if changed {
            info!(record = %id, "Amended comment on last review");
        } else {
            debug!(record = %id, "Blank comment, table left as is");
        }
        Ok(id)
    }

    fn amend_comment(&self, id: RecordId, comment: &str) -> Result<()> {
        let ((), changed) = self.mutate(|records| {
            let changed = amend_record(records, id, comment)?;
            Ok(((), changed))
        })?;
        if changed {
            info!(record = %id, "Amended review comment");
        } else {
            debug!(record = %id, "Blank comment, table left as is");
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ReviewRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        // Read-only: a reader must work on a read-only deployment
        let lock = match File::open(&self.lock_path) {
            Ok(lock) => Some(lock),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        if let Some(lock) = &lock {
            FileExt::lock_shared(lock)?;
        }
        self.read_table()
    }
}

/// Volatile review store, for tests and throwaway kiosk runs
#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    records: RwLock<Vec<ReviewRecord>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewStore for MemoryReviewStore {
    fn append(&self, rating: Rating, comment: &str) -> Result<RecordId> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let id = push_record(&mut records, rating, comment);
        debug!(record = %id, %rating, "Appended review (memory)");
        Ok(id)
    }

    fn amend_last_comment(&self, comment: &str) -> Result<RecordId> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let id = last_record_id(&records)?;
        amend_record(&mut records, id, comment)?;
        Ok(id)
    }

    fn amend_comment(&self, id: RecordId, comment: &str) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        amend_record(&mut records, id, comment)?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ReviewRecord>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.read().unwrap_or_else(PoisonError::into_inner).len())
    }
}
