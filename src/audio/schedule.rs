use std::time::Duration;

use crate::morse::{MorseCode, MorseElement};

pub const DEFAULT_UNIT_MS: u64 = 80;
pub const DEFAULT_LEAD_IN_MS: u64 = 100;
pub const DEFAULT_RAMP_MS: u64 = 10;
pub const DEFAULT_FREQUENCY_HZ: f32 = 600.0;
pub const DEFAULT_GAIN: f32 = 0.5;

const WORD_GAP_UNITS: u32 = 7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneTiming {
    /// Duration of one dot.
    pub unit: Duration,
    /// Silence before the first tone.
    pub lead_in: Duration,
    /// Linear fade applied at both ends of every tone.
    pub ramp: Duration,
    pub frequency_hz: f32,
    pub gain: f32,
}

impl Default for ToneTiming {
    fn default() -> Self {
        Self {
            unit: Duration::from_millis(DEFAULT_UNIT_MS),
            lead_in: Duration::from_millis(DEFAULT_LEAD_IN_MS),
            ramp: Duration::from_millis(DEFAULT_RAMP_MS),
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            gain: DEFAULT_GAIN,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledTone {
    /// Start, relative to the moment playback was requested.
    pub offset: Duration,
    pub duration: Duration,
}

impl ScheduledTone {
    pub fn end(&self) -> Duration {
        self.offset + self.duration
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToneSchedule {
    pub tones: Vec<ScheduledTone>,
    /// Time from the request until the last gap has elapsed.
    pub total: Duration,
    pub frequency_hz: f32,
    pub gain: f32,
    pub ramp: Duration,
}

impl ToneSchedule {
    pub fn build(code: &MorseCode, timing: &ToneTiming) -> Self {
        let unit = timing.unit;
        let mut cursor = timing.lead_in;
        let mut tones = Vec::new();

        for element in code.elements() {
            match element {
                MorseElement::Symbol(symbol) => {
                    let duration = unit * symbol.units();
                    tones.push(ScheduledTone {
                        offset: cursor,
                        duration,
                    });
                    cursor += duration + unit;
                }
                MorseElement::LetterGap => cursor += unit,
                MorseElement::WordGap => cursor += unit * WORD_GAP_UNITS,
            }
        }

        Self {
            tones,
            total: cursor,
            frequency_hz: timing.frequency_hz,
            gain: timing.gain,
            ramp: timing.ramp,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tones.is_empty()
    }

    /// Output gain at `t` after the request; zero between tones.
    pub fn gain_at(&self, t: Duration) -> f32 {
        self.tones
            .iter()
            .find(|tone| t >= tone.offset && t < tone.end())
            .map(|tone| envelope(t - tone.offset, tone.duration, self.ramp) * self.gain)
            .unwrap_or(0.0)
    }
}

/// Attack/hold/release shape of a single tone, in `0.0..=1.0`.
///
/// Ramps are shortened to half the tone when the tone is too short to fit
/// both of them.
pub fn envelope(t: Duration, duration: Duration, ramp: Duration) -> f32 {
    if t >= duration {
        return 0.0;
    }
    let ramp = ramp.min(duration / 2);
    if ramp.is_zero() {
        return 1.0;
    }
    let ramp_secs = ramp.as_secs_f32();
    if t < ramp {
        return t.as_secs_f32() / ramp_secs;
    }
    let remaining = duration - t;
    if remaining < ramp {
        return remaining.as_secs_f32() / ramp_secs;
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn dot_dash_offsets() {
        let schedule = ToneSchedule::build(&MorseCode::new(".-"), &ToneTiming::default());
        assert_eq!(
            schedule.tones,
            vec![
                ScheduledTone {
                    offset: ms(100),
                    duration: ms(80)
                },
                ScheduledTone {
                    offset: ms(260),
                    duration: ms(240)
                },
            ]
        );
        // lead-in + dot + gap + dash + gap
        assert_eq!(schedule.total, ms(580));
    }

    #[test]
    fn tones_never_overlap() {
        let schedule =
            ToneSchedule::build(&MorseCode::new("-.-. --.- / ...--"), &ToneTiming::default());
        for pair in schedule.tones.windows(2) {
            assert!(pair[0].end() < pair[1].offset);
        }
    }

    #[test]
    fn word_marker_and_space_consume_silence() {
        let timing = ToneTiming::default();
        let plain = ToneSchedule::build(&MorseCode::new(".."), &timing);
        let spaced = ToneSchedule::build(&MorseCode::new(". ."), &timing);
        let word = ToneSchedule::build(&MorseCode::new("./."), &timing);
        assert_eq!(spaced.tones[1].offset - plain.tones[1].offset, ms(80));
        assert_eq!(word.tones[1].offset - plain.tones[1].offset, ms(560));
        assert_eq!(spaced.tones.len(), 2);
        assert_eq!(word.tones.len(), 2);
    }

    #[test]
    fn empty_code_is_lead_in_only() {
        let schedule = ToneSchedule::build(&MorseCode::new(""), &ToneTiming::default());
        assert!(schedule.is_empty());
        assert_eq!(schedule.total, ms(100));
    }

    #[test]
    fn faster_unit_scales_everything() {
        let timing = ToneTiming {
            unit: ms(40),
            ..ToneTiming::default()
        };
        let schedule = ToneSchedule::build(&MorseCode::new("-"), &timing);
        assert_eq!(schedule.tones[0].duration, ms(120));
        assert_eq!(schedule.total, ms(100 + 120 + 40));
    }

    #[test]
    fn envelope_ramps_at_both_ends() {
        let d = ms(80);
        let r = ms(10);
        assert_eq!(envelope(ms(0), d, r), 0.0);
        assert!((envelope(ms(5), d, r) - 0.5).abs() < 1e-4);
        assert_eq!(envelope(ms(40), d, r), 1.0);
        assert!((envelope(ms(75), d, r) - 0.5).abs() < 1e-4);
        assert_eq!(envelope(ms(80), d, r), 0.0);
    }

    #[test]
    fn envelope_short_tone_shrinks_ramps() {
        let d = ms(10);
        let peak = envelope(ms(5), d, ms(10));
        assert!((peak - 1.0).abs() < 1e-4);
        assert!(envelope(ms(1), d, ms(10)) < 0.3);
    }

    #[test]
    fn gain_is_silent_between_tones() {
        let schedule = ToneSchedule::build(&MorseCode::new(".."), &ToneTiming::default());
        assert_eq!(schedule.gain_at(ms(50)), 0.0);
        assert!((schedule.gain_at(ms(140)) - 0.5).abs() < 1e-4);
        assert_eq!(schedule.gain_at(ms(200)), 0.0);
    }
}
