use crate::engine::ledger::{MasteryLedger, MasteryThresholds};

pub const PROGRESSION_ORDER: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '1', '2', '3', '4', '5', '6', '7', '8', '9', '0',
];

const MIN_CHARACTERS: usize = 4;

/// The growing set of characters available for drilling.
#[derive(Clone, Debug)]
pub struct PracticeSet {
    pub included: Vec<char>,
    pub focused: Option<char>,
}

impl PracticeSet {
    pub fn new() -> Self {
        Self {
            included: PROGRESSION_ORDER[..MIN_CHARACTERS].to_vec(),
            focused: None,
        }
    }

    /// Restore a persisted set. Characters outside the progression are dropped.
    pub fn from_included(included: Vec<char>) -> Self {
        let mut set = Self {
            included: Vec::new(),
            focused: None,
        };
        for ch in included {
            let ch = ch.to_ascii_uppercase();
            if PROGRESSION_ORDER.contains(&ch) && !set.included.contains(&ch) {
                set.included.push(ch);
            }
        }
        set.fill_to_minimum();
        set
    }

    fn next_locked(&self) -> Option<char> {
        PROGRESSION_ORDER
            .iter()
            .copied()
            .find(|ch| !self.included.contains(ch))
    }

    fn fill_to_minimum(&mut self) {
        while self.included.len() < MIN_CHARACTERS {
            match self.next_locked() {
                Some(ch) => self.included.push(ch),
                None => break,
            }
        }
    }

    /// Unlocks the next character once every included one is mastered.
    /// Returns the newly unlocked character, if any.
    pub fn update(
        &mut self,
        ledger: &MasteryLedger,
        thresholds: &MasteryThresholds,
    ) -> Option<char> {
        let all_mastered = self
            .included
            .iter()
            .all(|&ch| ledger.is_mastered(ch, thresholds));

        let unlocked = if all_mastered {
            let next = self.next_locked();
            if let Some(ch) = next {
                self.included.push(ch);
            }
            next
        } else {
            None
        };

        self.fill_to_minimum();

        self.focused = self
            .included
            .iter()
            .filter(|&&ch| !ledger.is_mastered(ch, thresholds))
            .min_by(|&&a, &&b| {
                ledger
                    .accuracy(a)
                    .partial_cmp(&ledger.accuracy(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied();

        unlocked
    }

    pub fn is_unlocked(&self, ch: char) -> bool {
        self.included.contains(&ch)
    }

    pub fn unlocked_count(&self) -> usize {
        self.included.len()
    }

    pub fn total_characters(&self) -> usize {
        PROGRESSION_ORDER.len()
    }

    pub fn progress(&self) -> f64 {
        self.unlocked_count() as f64 / self.total_characters() as f64
    }
}

impl Default for PracticeSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master(ledger: &mut MasteryLedger, chars: &[char]) {
        for &ch in chars {
            for _ in 0..5 {
                ledger.report_outcome(ch, true);
            }
        }
    }

    #[test]
    fn starts_with_first_four() {
        let set = PracticeSet::new();
        assert_eq!(set.included, vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn no_unlock_without_mastery() {
        let mut set = PracticeSet::new();
        let ledger = MasteryLedger::new();
        assert_eq!(set.update(&ledger, &MasteryThresholds::default()), None);
        assert_eq!(set.unlocked_count(), 4);
    }

    #[test]
    fn unlocks_next_when_all_mastered() {
        let mut set = PracticeSet::new();
        let mut ledger = MasteryLedger::new();
        master(&mut ledger, &['A', 'B', 'C', 'D']);
        assert_eq!(set.update(&ledger, &MasteryThresholds::default()), Some('E'));
        assert!(set.is_unlocked('E'));
        assert_eq!(set.focused, Some('E'));
    }

    #[test]
    fn focus_is_weakest_unmastered() {
        let mut set = PracticeSet::new();
        let mut ledger = MasteryLedger::new();
        master(&mut ledger, &['A', 'B']);
        ledger.report_outcome('C', true);
        ledger.report_outcome('D', false);
        set.update(&ledger, &MasteryThresholds::default());
        assert_eq!(set.focused, Some('D'));
    }

    #[test]
    fn from_included_filters_and_fills() {
        let set = PracticeSet::from_included(vec!['a', '?', 'A']);
        assert_eq!(set.included, vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn progress_ratio() {
        let set = PracticeSet::new();
        assert!((set.progress() - 4.0 / 36.0).abs() < 0.001);
    }
}
