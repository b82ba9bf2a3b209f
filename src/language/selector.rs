use super::core::WordBank;
use crate::mistakes::MissedCharacterStats;
use itertools::Itertools;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// How many of the highest scoring words practice mode samples from.
pub const PRACTICE_CANDIDATES: usize = 50;

/// Trait for different word selection strategies
pub trait WordSelector {
    fn select_words(
        &self,
        bank: &WordBank,
        count: usize,
        stats: &MissedCharacterStats,
    ) -> Vec<String>;
}

/// Uniform sample without replacement; returns the whole bank when it is
/// smaller than `count`.
pub struct RandomSelector;

impl WordSelector for RandomSelector {
    fn select_words(
        &self,
        bank: &WordBank,
        count: usize,
        _stats: &MissedCharacterStats,
    ) -> Vec<String> {
        let mut rng = &mut rand::thread_rng();
        bank.words()
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect()
    }
}

/// Biases selection towards words made of characters the user keeps missing.
pub struct PracticeSelector;

impl WordSelector for PracticeSelector {
    fn select_words(
        &self,
        bank: &WordBank,
        count: usize,
        stats: &MissedCharacterStats,
    ) -> Vec<String> {
        if stats.is_empty() {
            return RandomSelector.select_words(bank, count, stats);
        }

        let words = bank.words();

        // sorted_by is stable, so equal scores keep bank order
        let candidates: Vec<usize> = words
            .iter()
            .enumerate()
            .map(|(idx, word)| (idx, word_score(word, stats)))
            .filter(|&(_, score)| score > 0)
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(PRACTICE_CANDIDATES)
            .map(|(idx, _)| idx)
            .collect();

        let mut rng = &mut rand::thread_rng();

        if candidates.len() >= count {
            return candidates
                .choose_multiple(&mut rng, count)
                .map(|&idx| words[idx].clone())
                .collect();
        }

        let taken: HashSet<usize> = candidates.iter().copied().collect();
        let remainder: Vec<usize> = (0..words.len()).filter(|idx| !taken.contains(idx)).collect();

        let mut picked = candidates;
        let missing = count - picked.len();
        picked.extend(remainder.choose_multiple(&mut rng, missing).copied());
        picked.shuffle(&mut rng);

        picked.into_iter().map(|idx| words[idx].clone()).collect()
    }
}

/// Sum of the miss counts of every character in `word`. Repeated characters
/// count once per occurrence.
pub fn word_score(word: &str, stats: &MissedCharacterStats) -> u64 {
    word.chars().map(|c| stats.count(c)).sum()
}
