use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::audio::schedule::{ToneSchedule, ToneTiming};
use crate::morse::MorseCode;

pub const DEFAULT_MAX_KEY_HOLD_MS: u64 = 3000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio playback unavailable: {0}")]
    PlaybackUnavailable(String),
    #[error("audio output is busy")]
    Busy,
}

/// Backend seam for the single audio device.
pub trait ToneOutput {
    fn play_schedule(&mut self, schedule: &ToneSchedule) -> Result<(), AudioError>;
    /// Starts an open-ended tone with the attack ramp.
    fn start_tone(&mut self, timing: &ToneTiming) -> Result<(), AudioError>;
    /// Fades the open-ended tone out and releases it.
    fn stop_tone(&mut self);
    /// Silences scheduled playback and any open tone.
    fn stop_all(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AudioState {
    Idle,
    Keying { since: Instant },
    Playing { until: Instant },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    PlaybackFinished,
    KeyToneTimedOut,
}

/// Owns the output device and enforces that the key tone and scheduled
/// playback never sound together.
pub struct AudioSession {
    output: Result<Box<dyn ToneOutput>, String>,
    timing: ToneTiming,
    max_key_hold: Duration,
    state: AudioState,
}

impl AudioSession {
    pub fn new(output: Box<dyn ToneOutput>, timing: ToneTiming, max_key_hold: Duration) -> Self {
        Self {
            output: Ok(output),
            timing,
            max_key_hold,
            state: AudioState::Idle,
        }
    }

    pub fn unavailable(reason: impl Into<String>, timing: ToneTiming) -> Self {
        Self {
            output: Err(reason.into()),
            timing,
            max_key_hold: Duration::from_millis(DEFAULT_MAX_KEY_HOLD_MS),
            state: AudioState::Idle,
        }
    }

    fn output(&mut self) -> Result<&mut Box<dyn ToneOutput>, AudioError> {
        self.output
            .as_mut()
            .map_err(|reason| AudioError::PlaybackUnavailable(reason.clone()))
    }

    pub fn is_available(&self) -> bool {
        self.output.is_ok()
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        self.output.as_ref().err().map(String::as_str)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, AudioState::Playing { .. })
    }

    pub fn is_keying(&self) -> bool {
        matches!(self.state, AudioState::Keying { .. })
    }

    pub fn timing(&self) -> &ToneTiming {
        &self.timing
    }

    pub fn set_timing(&mut self, timing: ToneTiming) {
        self.timing = timing;
    }

    /// Schedules `code` and returns how long playback will take. Rejected
    /// while anything else is sounding.
    pub fn play(&mut self, code: &MorseCode, now: Instant) -> Result<Duration, AudioError> {
        if self.state != AudioState::Idle {
            return Err(AudioError::Busy);
        }
        let schedule = ToneSchedule::build(code, &self.timing);
        self.output()?.play_schedule(&schedule)?;
        debug!(code = %code, total_ms = schedule.total.as_millis() as u64, "playback scheduled");
        self.state = AudioState::Playing {
            until: now + schedule.total,
        };
        Ok(schedule.total)
    }

    /// Starts the key tone, cutting off scheduled playback if needed.
    pub fn start_key_tone(&mut self, now: Instant) -> Result<(), AudioError> {
        let timing = self.timing;
        match self.state {
            AudioState::Keying { .. } => return Ok(()),
            AudioState::Playing { .. } => {
                self.output()?.stop_all();
                self.state = AudioState::Idle;
            }
            AudioState::Idle => {}
        }
        self.output()?.start_tone(&timing)?;
        self.state = AudioState::Keying { since: now };
        Ok(())
    }

    pub fn stop_key_tone(&mut self) {
        if !self.is_keying() {
            return;
        }
        if let Ok(output) = self.output() {
            output.stop_tone();
        }
        self.state = AudioState::Idle;
    }

    /// Fires the playback completion and the stuck-key safety stop.
    pub fn poll(&mut self, now: Instant) -> Option<AudioEvent> {
        match self.state {
            AudioState::Playing { until } if now >= until => {
                self.state = AudioState::Idle;
                Some(AudioEvent::PlaybackFinished)
            }
            AudioState::Keying { since } if now.duration_since(since) >= self.max_key_hold => {
                warn!("key tone exceeded maximum hold, stopping");
                self.stop_key_tone();
                Some(AudioEvent::KeyToneTimedOut)
            }
            _ => None,
        }
    }
}
