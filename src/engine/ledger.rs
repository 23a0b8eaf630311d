use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_ACCURACY: f64 = 80.0;
pub const DEFAULT_MIN_ATTEMPTS: u32 = 5;
pub const DEFAULT_QUIZ_UNLOCK_COUNT: usize = 3;
pub const DEFAULT_FLUENCY_WINDOW: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStat {
    pub character: char,
    pub attempts: u32,
    pub successes: u32,
}

impl CharacterStat {
    fn new(character: char) -> Self {
        Self {
            character,
            attempts: 0,
            successes: 0,
        }
    }

    /// Success rate in percent, `None` until the first attempt.
    pub fn accuracy(&self) -> Option<f64> {
        if self.attempts == 0 {
            return None;
        }
        Some(self.successes as f64 / self.attempts as f64 * 100.0)
    }

    pub fn is_mastered(&self, thresholds: &MasteryThresholds) -> bool {
        self.attempts >= thresholds.min_attempts
            && self
                .accuracy()
                .is_some_and(|acc| acc >= thresholds.min_accuracy)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub character: char,
    pub is_success: bool,
    pub sequence_index: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MasteryThresholds {
    pub min_accuracy: f64,
    pub min_attempts: u32,
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self {
            min_accuracy: DEFAULT_MIN_ACCURACY,
            min_attempts: DEFAULT_MIN_ATTEMPTS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizGate {
    Unlocked,
    Locked { mastered: usize, required: usize },
}

impl QuizGate {
    pub fn is_unlocked(self) -> bool {
        matches!(self, QuizGate::Unlocked)
    }
}

/// Per-character counters plus the chronological attempt history they were
/// built from.
#[derive(Clone, Debug, Default)]
pub struct MasteryLedger {
    stats: BTreeMap<char, CharacterStat>,
    history: Vec<AttemptRecord>,
}

impl MasteryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted history feed in any order.
    pub fn from_history(mut records: Vec<AttemptRecord>) -> Self {
        records.sort_by_key(|r| r.sequence_index);
        let mut ledger = Self::new();
        for record in &records {
            ledger.apply(record.character, record.is_success);
        }
        ledger.history = records;
        ledger
    }

    fn apply(&mut self, character: char, success: bool) {
        let stat = self
            .stats
            .entry(character)
            .or_insert_with(|| CharacterStat::new(character));
        stat.attempts += 1;
        if success {
            stat.successes += 1;
        }
    }

    pub fn report_outcome(&mut self, character: char, success: bool) -> &AttemptRecord {
        self.apply(character, success);
        let sequence_index = self
            .history
            .last()
            .map(|r| r.sequence_index + 1)
            .unwrap_or(0);
        self.history.push(AttemptRecord {
            character,
            is_success: success,
            sequence_index,
        });
        &self.history[self.history.len() - 1]
    }

    /// Stats ordered by character.
    pub fn stats(&self) -> Vec<CharacterStat> {
        self.stats.values().cloned().collect()
    }

    pub fn stat(&self, character: char) -> Option<&CharacterStat> {
        self.stats.get(&character)
    }

    /// Accuracy in percent; characters without attempts report 0.
    pub fn accuracy(&self, character: char) -> f64 {
        self.stat(character)
            .and_then(CharacterStat::accuracy)
            .unwrap_or(0.0)
    }

    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn is_mastered(&self, character: char, thresholds: &MasteryThresholds) -> bool {
        self.stat(character)
            .is_some_and(|s| s.is_mastered(thresholds))
    }

    pub fn mastery_set(&self, thresholds: &MasteryThresholds) -> BTreeSet<char> {
        self.stats
            .values()
            .filter(|s| s.is_mastered(thresholds))
            .map(|s| s.character)
            .collect()
    }

    /// Trailing moving average of the success rate, one value per attempt.
    pub fn fluency_series(&self, window: usize) -> Vec<f64> {
        let window = window.max(1);
        let mut series = Vec::with_capacity(self.history.len());
        for i in 0..self.history.len() {
            let start = (i + 1).saturating_sub(window);
            let slice = &self.history[start..=i];
            let successes = slice.iter().filter(|r| r.is_success).count();
            series.push(100.0 * successes as f64 / slice.len() as f64);
        }
        series
    }

    pub fn quiz_gate(&self, thresholds: &MasteryThresholds, required: usize) -> QuizGate {
        let mastered = self.mastery_set(thresholds).len();
        if mastered >= required {
            QuizGate::Unlocked
        } else {
            QuizGate::Locked { mastered, required }
        }
    }
}
