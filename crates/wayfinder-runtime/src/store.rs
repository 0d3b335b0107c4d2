#![forbid(unsafe_code)]

//! Durable completion state.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "last_saved": "2026-10-18T09:30:00Z",
//!   "completed": ["initial-setup"],
//!   "progress": { "initial-setup": 100, "mcp-dashboard": 50 }
//! }
//! ```
//!
//! # Atomic Writes
//!
//! [`FileStore`] writes to a sibling temp file and renames it over the
//! target, so a crash never leaves a half-written record.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// Completed tours plus last known progress per tour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(default)]
    pub completed: BTreeSet<String>,
    #[serde(default)]
    pub progress: BTreeMap<String, u8>,
}

impl CompletionRecord {
    #[must_use]
    pub fn is_completed(&self, tour_id: &str) -> bool {
        self.completed.contains(tour_id)
    }

    #[must_use]
    pub fn last_progress(&self, tour_id: &str) -> u8 {
        self.progress.get(tour_id).copied().unwrap_or(0)
    }

    /// Record a completion. Returns `true` if the record changed.
    pub fn mark_completed(&mut self, tour_id: &str) -> bool {
        let inserted = self.completed.insert(tour_id.to_string());
        let bumped = self.set_progress(tour_id, 100);
        inserted || bumped
    }

    /// Record progress, clamped to 100. Returns `true` if the record changed.
    pub fn set_progress(&mut self, tour_id: &str, percent: u8) -> bool {
        let percent = percent.min(100);
        let prev = self.progress.insert(tour_id.to_string(), percent);
        prev != Some(percent)
    }
}

/// On-disk representation of a [`CompletionRecord`].
#[derive(Debug, Serialize, Deserialize)]
struct CompletionFile {
    version: u32,
    #[serde(default)]
    last_saved: String,
    #[serde(flatten)]
    record: CompletionRecord,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading or saving completion state.
#[derive(Debug)]
pub enum StoreError {
    /// I/O failure reading or writing the file.
    Io(io::Error),
    /// The file is not valid JSON for a completion record.
    Json(serde_json::Error),
    /// The file was written by an incompatible version.
    Version { found: u32, expected: u32 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "failed to parse completion file: {e}"),
            Self::Version { found, expected } => write!(
                f,
                "unsupported completion file version: {found} (expected {expected})"
            ),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Version { .. } => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Key-value persistence for completion state.
pub trait CompletionStore {
    fn load(&self) -> StoreResult<CompletionRecord>;
    fn save(&self, record: &CompletionRecord) -> StoreResult<()>;
}

/// In-memory store. Clones share the same record, which lets a caller keep
/// a handle after moving the store into a sink.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Rc<RefCell<CompletionRecord>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(record: CompletionRecord) -> Self {
        Self {
            record: Rc::new(RefCell::new(record)),
            saves: Rc::new(Cell::new(0)),
        }
    }

    /// Copy of the last saved record.
    #[must_use]
    pub fn snapshot(&self) -> CompletionRecord {
        self.record.borrow().clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl CompletionStore for MemoryStore {
    fn load(&self) -> StoreResult<CompletionRecord> {
        Ok(self.snapshot())
    }

    fn save(&self, record: &CompletionRecord) -> StoreResult<()> {
        *self.record.borrow_mut() = record.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// JSON file store.
///
/// - **Missing file** loads as an empty record (not an error).
/// - **Corrupted file** returns [`StoreError::Json`].
/// - **Version mismatch** returns [`StoreError::Version`].
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompletionStore for FileStore {
    fn load(&self) -> StoreResult<CompletionRecord> {
        if !self.path.exists() {
            return Ok(CompletionRecord::default());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file: CompletionFile = serde_json::from_str(&contents).map_err(StoreError::Json)?;
        if file.version != FORMAT_VERSION {
            return Err(StoreError::Version {
                found: file.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(file.record)
    }

    fn save(&self, record: &CompletionRecord) -> StoreResult<()> {
        let file = CompletionFile {
            version: FORMAT_VERSION,
            last_saved: now_iso8601(),
            record: record.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(StoreError::Json)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Atomic write: temp file then rename
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;

        tracing::debug!(
            target: "wayfinder.runtime",
            path = %self.path.display(),
            completed = record.completed.len(),
            "completion state saved"
        );
        Ok(())
    }
}

/// Current UTC time as ISO 8601.
fn now_iso8601() -> String {
    let since_epoch = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = since_epoch.as_secs();

    let days = secs / 86_400;
    let time_secs = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        time_secs / 3600,
        (time_secs % 3600) / 60,
        time_secs % 60
    )
}

/// Days since the Unix epoch to (year, month, day), after Howard Hinnant.
fn civil_from_days(days_since_epoch: u64) -> (u64, u64, u64) {
    let z = days_since_epoch as i64 + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as u64, m, d)
}
