// File: ./src/storage.rs
// Local fallback backend: one JSON array in one file.
use crate::model::{Child, StarEvent};
use chrono::{NaiveDate, Utc};
use fs2::FileExt;
use log::warn;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse-or-empty. A missing file is empty; so is a corrupt one (with a warning).
    pub fn load(&self) -> Vec<StarEvent> {
        match self.read() {
            Ok(events) => events,
            Err(e) => {
                warn!(
                    "event=local_read status=error path={} error={}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Strict read: a file that does not parse is an error, never an empty list.
    fn read(&self) -> io::Result<Vec<StarEvent>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Full overwrite.
    pub fn save(&self, events: &[StarEvent]) -> io::Result<()> {
        self.locked(|| self.write(events))
    }

    /// Fails without writing when the existing file is corrupt.
    pub fn add(&self, child: Child, local_date: NaiveDate) -> io::Result<StarEvent> {
        self.update(|events| {
            let now = Utc::now();
            let event = StarEvent {
                id: next_id(events, now.timestamp_millis()),
                child,
                local_date,
                created_at: now,
            };
            events.push(event.clone());
            event
        })
    }

    /// Removing an id that is not present still rewrites the file and succeeds.
    pub fn remove(&self, id: i64) -> io::Result<()> {
        self.update(|events| events.retain(|e| e.id != id))
    }

    /// Overwrites without reading, so a corrupt file can still be cleared.
    pub fn reset(&self) -> io::Result<()> {
        self.save(&[])
    }

    /// Read-modify-write under the lock. Nothing is written if the read fails.
    fn update<F, T>(&self, change: F) -> io::Result<T>
    where
        F: FnOnce(&mut Vec<StarEvent>) -> T,
    {
        self.locked(|| {
            let mut events = self.read().inspect_err(|e| {
                warn!(
                    "event=local_update status=refused path={} error={}",
                    self.path.display(),
                    e
                );
            })?;
            let out = change(&mut events);
            self.write(&events)?;
            Ok(out)
        })
    }

    /// Runs `work` holding an exclusive lock on a sibling `.lock` file.
    /// Closing the handle releases the lock.
    fn locked<T>(&self, work: impl FnOnce() -> io::Result<T>) -> io::Result<T> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path.with_extension("lock"))?;
        FileExt::lock_exclusive(&lock)?;

        let result = work();
        drop(lock);
        result
    }

    /// New array to a sibling temp file, then rename over the target.
    fn write(&self, events: &[StarEvent]) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(events)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}

/// Millisecond timestamp ids, bumped past the current maximum so two adds in
/// the same millisecond cannot collide within one file.
fn next_id(existing: &[StarEvent], now_millis: i64) -> i64 {
    let max = existing.iter().map(|e| e.id).max().unwrap_or(0);
    now_millis.max(max + 1)
}
