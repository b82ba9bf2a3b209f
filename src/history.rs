use crate::error::StoreResult;
use crate::session::Mode;
use crate::store::{load_or_default, save_json, DocumentStore, MemoryStore};
use crate::util::mean;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Most recent attempts kept on disk; older ones are dropped first.
pub const MAX_ATTEMPTS: usize = 50;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One finished session as stored in the history document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: String,
    pub mode: Mode,
    pub wpm: u32,
    pub accuracy: u32,
    pub missed: usize,
}

impl AttemptRecord {
    /// Stamps the record with the current local time.
    pub fn now(mode: Mode, wpm: u32, accuracy: u32, missed: usize) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            mode,
            wpm,
            accuracy,
            missed,
        }
    }
}

/// Append-only history of attempts, oldest first.
pub struct AttemptLog {
    store: Box<dyn DocumentStore>,
    records: Vec<AttemptRecord>,
}

impl AttemptLog {
    /// Loads existing history; a missing or malformed document starts empty.
    pub fn open(store: Box<dyn DocumentStore>) -> Self {
        let records = load_or_default(store.as_ref(), "attempt history");
        Self { store, records }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()))
    }

    /// Appends `record`, keeps the newest [`MAX_ATTEMPTS`] and writes them
    /// out. The in-memory log is updated even when the write fails.
    pub fn record_attempt(&mut self, record: AttemptRecord) -> StoreResult<()> {
        self.records.push(record);
        if self.records.len() > MAX_ATTEMPTS {
            let overflow = self.records.len() - MAX_ATTEMPTS;
            self.records.drain(..overflow);
        }

        save_json(self.store.as_ref(), &self.records).inspect_err(|e| {
            log::error!("failed to save attempt history: {e}");
        })
    }

    pub fn load_all(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&AttemptRecord> {
        self.records.last()
    }

    /// Second to last attempt: the baseline for a session whose own record
    /// was just appended.
    pub fn previous(&self) -> Option<&AttemptRecord> {
        self.records.iter().rev().nth(1)
    }

    /// Mean WPM over the newest `n` attempts.
    pub fn average_wpm(&self, n: usize) -> Option<f64> {
        let recent: Vec<f64> = self
            .records
            .iter()
            .rev()
            .take(n)
            .map(|r| r.wpm as f64)
            .collect();
        mean(&recent)
    }
}
