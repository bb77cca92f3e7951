//! Per-fiction record of chapters already saved to disk.
//!
//! One text file per fiction at a fixed name inside the fiction's folder
//! (leading hyphen so it sorts before the chapter files). Each line is the
//! fully-qualified URL of a chapter whose artifact has been written. The log
//! is persisted once per fiction, after its chapter loop finishes; a crash
//! mid-fiction loses that fiction's new entries, and the next update run
//! re-fetches them (artifact writes are idempotent overwrites).

use std::io::Write;
use std::path::Path;

/// Reserved file name for the order log within a fiction folder.
pub const ORDER_FILE_NAME: &str = "-order.txt";

/// How to persist new entries relative to what is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// Create run: discard prior log content.
    Replace,
    /// Update run: keep prior entries, add only the new ones.
    Append,
}

/// In-memory view of a fiction's order log.
#[derive(Debug, Default)]
pub struct OrderLog {
    raw: String,
}

impl OrderLog {
    /// Load the log at `path`. A missing file yields an empty log.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Self { raw }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Exact-line membership test. URLs never contain embedded line
    /// terminators, so a logged URL can never partially match another.
    pub fn contains(&self, chapter_url: &str) -> bool {
        self.raw.lines().any(|line| line == chapter_url)
    }

    /// Logged URLs in file order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.raw.lines()
    }
}

/// Write `new_entries` (one URL per line) to the log at `path`.
///
/// `Replace` truncates; `Append` preserves prior entries without rewriting
/// them. Both create the file if absent.
pub fn persist(path: &Path, new_entries: &[String], mode: PersistMode) -> std::io::Result<()> {
    let mut file = match mode {
        PersistMode::Replace => std::fs::File::create(path)?,
        PersistMode::Append => std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?,
    };
    for entry in new_entries {
        writeln!(file, "{}", entry)?;
    }
    Ok(())
}
