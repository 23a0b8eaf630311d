use std::time::{Duration, Instant};

use tracing::debug;

use crate::morse::MorseSymbol;

pub const DEFAULT_THRESHOLD_MS: u64 = 200;

/// Presses shorter than the threshold are dots, everything else a dash.
/// Negative durations (clock skew) count as zero.
pub fn classify(duration_ms: i64, threshold_ms: u64) -> MorseSymbol {
    let duration = duration_ms.max(0) as u64;
    if duration < threshold_ms {
        MorseSymbol::Dot
    } else {
        MorseSymbol::Dash
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    Started,
    /// The key is already down (auto-repeat).
    Ignored,
}

#[derive(Clone, Debug)]
pub struct Keyer {
    threshold_ms: u64,
    pressed_at: Option<Instant>,
}

impl Keyer {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            pressed_at: None,
        }
    }

    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    pub fn set_threshold_ms(&mut self, threshold_ms: u64) {
        self.threshold_ms = threshold_ms;
    }

    pub fn is_down(&self) -> bool {
        self.pressed_at.is_some()
    }

    pub fn held_for(&self, now: Instant) -> Option<Duration> {
        self.pressed_at.map(|at| now.saturating_duration_since(at))
    }

    pub fn press(&mut self, now: Instant) -> KeyPress {
        if self.pressed_at.is_some() {
            return KeyPress::Ignored;
        }
        self.pressed_at = Some(now);
        KeyPress::Started
    }

    /// Completes a press. Returns `None` when no press is in progress.
    pub fn release(&mut self, now: Instant) -> Option<MorseSymbol> {
        let pressed_at = self.pressed_at.take()?;
        let duration_ms = match now.checked_duration_since(pressed_at) {
            Some(d) => d.as_millis() as i64,
            None => -(pressed_at.duration_since(now).as_millis() as i64),
        };
        let symbol = classify(duration_ms, self.threshold_ms);
        debug!(duration_ms, ?symbol, "keyer release");
        Some(symbol)
    }

    /// Drops a press whose release was never seen.
    pub fn abandon(&mut self) {
        if self.pressed_at.take().is_some() {
            debug!("keyer press abandoned");
        }
    }
}

impl Default for Keyer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_MS)
    }
}
