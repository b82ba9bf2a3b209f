use crate::error::StoreResult;
use crate::language::{PracticeSelector, WordBank, WordSelector};
use crate::session::MissedKey;
use crate::store::{load_or_default, save_json, DocumentStore, MemoryStore};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative miss counts keyed by the character that should have been typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedCharacterStats {
    #[serde(default)]
    missed_chars: BTreeMap<char, u64>,
}

impl MissedCharacterStats {
    pub fn from_counts<I: IntoIterator<Item = (char, u64)>>(counts: I) -> Self {
        Self {
            missed_chars: counts.into_iter().collect(),
        }
    }

    pub fn count(&self, c: char) -> u64 {
        self.missed_chars.get(&c).copied().unwrap_or(0)
    }

    /// True when nothing has ever been missed.
    pub fn is_empty(&self) -> bool {
        self.missed_chars.values().all(|&n| n == 0)
    }

    pub fn total(&self) -> u64 {
        self.missed_chars.values().sum()
    }

    pub fn increment(&mut self, c: char) {
        *self.missed_chars.entry(c).or_insert(0) += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.missed_chars.iter().map(|(&c, &n)| (c, n))
    }
}

/// Persisted [`MissedCharacterStats`], flushed on every update.
pub struct MistakeStore {
    store: Box<dyn DocumentStore>,
    stats: MissedCharacterStats,
}

impl MistakeStore {
    /// Loads existing counts; a missing or malformed document starts empty.
    pub fn open(store: Box<dyn DocumentStore>) -> Self {
        let stats = load_or_default(store.as_ref(), "mistake stats");
        Self { store, stats }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()))
    }

    pub fn stats(&self) -> &MissedCharacterStats {
        &self.stats
    }

    /// Counts every miss against its expected character and writes the
    /// result. The in-memory counts are updated even when the write fails.
    pub fn record_misses(&mut self, missed: &[MissedKey]) -> StoreResult<()> {
        if missed.is_empty() {
            return Ok(());
        }

        for miss in missed {
            self.stats.increment(miss.expected);
        }

        save_json(self.store.as_ref(), &self.stats).inspect_err(|e| {
            log::error!("failed to save mistake stats: {e}");
        })
    }

    pub fn weighted_practice_words(&self, bank: &WordBank, count: usize) -> Vec<String> {
        PracticeSelector.select_words(bank, count, &self.stats)
    }

    /// The `n` most missed characters, most frequent first.
    pub fn top_missed(&self, n: usize) -> Vec<(char, u64)> {
        self.stats
            .iter()
            .filter(|&(_, count)| count > 0)
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(n)
            .collect()
    }
}
