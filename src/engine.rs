use crate::history::{AttemptLog, AttemptRecord};
use crate::input::Keystroke;
use crate::language::{RandomSelector, WordBank, WordSelector};
use crate::mistakes::{MissedCharacterStats, MistakeStore};
use crate::runtime::{Clock, SystemClock};
use crate::session::{MissedKey, Mode, Phase, SessionConfig, SessionState};
use crate::util::{accuracy, matching_chars, wpm};
use rand::seq::SliceRandom;

/// Words generated for time mode; enough that nobody runs out before the clock does.
pub const TIME_MODE_WORDS: usize = 100;

/// Outcome of [`SessionEngine::stop`]. A failed write leaves the in-memory
/// history and stats intact; the flags let the host show a notice.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishReport {
    pub record: AttemptRecord,
    pub history_saved: bool,
    pub mistakes_saved: bool,
}

impl FinishReport {
    pub fn all_saved(&self) -> bool {
        self.history_saved && self.mistakes_saved
    }
}

/// Drives one typing attempt at a time: target generation, keystroke
/// scoring, live metrics and persistence of the result.
///
/// The engine owns the history and mistake stores for the whole run and
/// reuses itself across attempts via [`SessionEngine::reset`].
pub struct SessionEngine {
    config: SessionConfig,
    state: SessionState,
    bank: WordBank,
    history: AttemptLog,
    mistakes: MistakeStore,
    clock: Box<dyn Clock>,
}

impl SessionEngine {
    pub fn new(
        config: SessionConfig,
        bank: WordBank,
        history: AttemptLog,
        mistakes: MistakeStore,
    ) -> Self {
        Self::with_clock(config, bank, history, mistakes, Box::new(SystemClock))
    }

    pub fn with_clock(
        config: SessionConfig,
        bank: WordBank,
        history: AttemptLog,
        mistakes: MistakeStore,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut engine = Self {
            config,
            state: SessionState::default(),
            bank,
            history,
            mistakes,
            clock,
        };
        engine.reset();
        engine
    }

    /// Replaces the generated target with `text` for the current attempt.
    /// The next [`reset`](Self::reset) generates text from the mode again.
    pub fn with_text(mut self, text: &str) -> Self {
        self.state = SessionState::new(text.chars().collect());
        self
    }

    /// Abandons the current attempt without saving it and generates a new
    /// target for the configured mode.
    pub fn reset(&mut self) {
        let target = generate_target(&self.config, &self.bank, &self.mistakes);
        log::debug!(
            "new {} session with {} target chars",
            self.config.mode,
            target.chars().count()
        );
        self.state = SessionState::new(target.chars().collect());
    }

    /// Applies new settings and starts a fresh attempt with them.
    pub fn reconfigure(&mut self, config: SessionConfig) {
        self.config = config;
        self.reset();
    }

    pub fn start(&mut self) {
        if self.state.phase != Phase::Idle {
            return;
        }
        self.state.started_at = Some(self.clock.now());
        self.state.phase = Phase::Running;
    }

    /// Scores one keystroke. Returns true once the whole target has been
    /// typed in a mode that ends on completion; time mode never does.
    pub fn process_key(&mut self, key: Keystroke) -> bool {
        if self.state.phase == Phase::Finished {
            return false;
        }
        if self.state.phase == Phase::Idle {
            self.start();
        }

        match key {
            Keystroke::Backspace => {
                // misses stay recorded: every mistake counts
                self.state.input.pop();
            }
            Keystroke::Char(typed) => {
                let idx = self.state.input.len();
                if let Some(&expected) = self.state.target.get(idx) {
                    if typed != expected {
                        self.state.missed.push(MissedKey { expected, typed });
                    }
                    self.state.input.push(typed);
                    self.state.total_keystrokes += 1;
                }
            }
        }

        self.compute_metrics();
        self.is_complete()
    }

    /// Recomputes correct chars, WPM and accuracy from the current buffers.
    /// Does nothing before the first keystroke.
    pub fn compute_metrics(&mut self) {
        let Some(started_at) = self.state.started_at else {
            return;
        };

        let elapsed = self
            .clock
            .now()
            .saturating_duration_since(started_at)
            .as_secs_f64();

        let correct = matching_chars(&self.state.target, &self.state.input);
        self.state.correct_chars = correct;
        self.state.wpm = wpm(correct, elapsed);
        self.state.accuracy = accuracy(correct, self.state.input.len());
    }

    /// Seconds since the first keystroke while running, 0 otherwise.
    pub fn elapsed_seconds(&self) -> f64 {
        match (self.state.phase, self.state.started_at) {
            (Phase::Running, Some(started_at)) => self
                .clock
                .now()
                .saturating_duration_since(started_at)
                .as_secs_f64(),
            _ => 0.0,
        }
    }

    /// Countdown for time mode; `None` in the other modes.
    pub fn remaining_seconds(&self) -> Option<f64> {
        match self.config.mode {
            Mode::Time => {
                Some((self.config.duration_secs as f64 - self.elapsed_seconds()).max(0.0))
            }
            _ => None,
        }
    }

    /// True once a running time-mode session has used up its duration. The
    /// host polls this every tick and calls [`stop`](Self::stop).
    pub fn is_deadline_reached(&self) -> bool {
        self.config.mode == Mode::Time
            && self.is_running()
            && self.elapsed_seconds() >= self.config.duration_secs as f64
    }

    pub fn is_complete(&self) -> bool {
        self.config.mode.completes_on_full_input()
            && self.state.input.len() >= self.state.target.len()
    }

    /// Finishes the attempt and saves it. The history write and the mistake
    /// write are attempted independently. Returns `None` if the attempt had
    /// already finished.
    pub fn stop(&mut self) -> Option<FinishReport> {
        if self.state.phase == Phase::Finished {
            return None;
        }
        self.state.phase = Phase::Finished;
        self.compute_metrics();

        let record = AttemptRecord::now(
            self.config.mode,
            self.state.wpm,
            self.state.accuracy,
            self.state.missed.len(),
        );
        log::info!(
            "{} session finished: {} wpm, {}% accuracy, {} missed",
            record.mode,
            record.wpm,
            record.accuracy,
            record.missed
        );

        let history_saved = self.history.record_attempt(record.clone()).is_ok();
        let mistakes_saved = if self.state.missed.is_empty() {
            true
        } else {
            self.mistakes.record_misses(&self.state.missed).is_ok()
        };

        Some(FinishReport {
            record,
            history_saved,
            mistakes_saved,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase == Phase::Finished
    }

    pub fn target(&self) -> &[char] {
        &self.state.target
    }

    pub fn input(&self) -> &[char] {
        &self.state.input
    }

    pub fn target_text(&self) -> String {
        self.state.target.iter().collect()
    }

    pub fn user_input(&self) -> String {
        self.state.input.iter().collect()
    }

    /// The character the next keystroke is scored against.
    pub fn expected_char(&self) -> Option<char> {
        self.state.target.get(self.state.input.len()).copied()
    }

    pub fn missed(&self) -> &[MissedKey] {
        &self.state.missed
    }

    /// Misses grouped by expected character, in order of first occurrence.
    pub fn missed_summary(&self) -> Vec<(char, usize)> {
        let mut summary: Vec<(char, usize)> = Vec::new();
        for miss in &self.state.missed {
            match summary.iter_mut().find(|(c, _)| *c == miss.expected) {
                Some(entry) => entry.1 += 1,
                None => summary.push((miss.expected, 1)),
            }
        }
        summary
    }

    pub fn wpm(&self) -> u32 {
        self.state.wpm
    }

    pub fn accuracy(&self) -> u32 {
        self.state.accuracy
    }

    pub fn correct_chars(&self) -> usize {
        self.state.correct_chars
    }

    pub fn total_keystrokes(&self) -> usize {
        self.state.total_keystrokes
    }

    pub fn history(&self) -> &AttemptLog {
        &self.history
    }

    pub fn mistakes(&self) -> &MistakeStore {
        &self.mistakes
    }

    pub fn missed_stats(&self) -> &MissedCharacterStats {
        self.mistakes.stats()
    }
}

fn generate_target(config: &SessionConfig, bank: &WordBank, mistakes: &MistakeStore) -> String {
    let no_stats = MissedCharacterStats::default();
    match config.mode {
        Mode::Time => RandomSelector
            .select_words(bank, TIME_MODE_WORDS, &no_stats)
            .join(" "),
        Mode::Word => RandomSelector
            .select_words(bank, config.word_count, &no_stats)
            .join(" "),
        Mode::Quote => bank
            .quotes()
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default(),
        Mode::Practice => mistakes
            .weighted_practice_words(bank, config.word_count)
            .join(" "),
    }
}
