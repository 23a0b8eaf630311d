#[cfg(feature = "audio")]
pub mod rodio_output;
pub mod schedule;
pub mod session;

use std::time::Duration;

use tracing::warn;

pub use schedule::{ScheduledTone, ToneSchedule, ToneTiming};
pub use session::{AudioError, AudioEvent, AudioSession, ToneOutput};

/// Opens the default output device, falling back to a session that reports
/// `PlaybackUnavailable` for every request.
pub fn open(enabled: bool, timing: ToneTiming, max_key_hold: Duration) -> AudioSession {
    if !enabled {
        return AudioSession::unavailable("audio disabled", timing);
    }
    open_device(timing, max_key_hold)
}

#[cfg(feature = "audio")]
fn open_device(timing: ToneTiming, max_key_hold: Duration) -> AudioSession {
    match rodio_output::RodioOutput::new(max_key_hold) {
        Ok(output) => AudioSession::new(Box::new(output), timing, max_key_hold),
        Err(e) => {
            warn!("audio output unavailable: {e}");
            AudioSession::unavailable(e.to_string(), timing)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_device(timing: ToneTiming, _max_key_hold: Duration) -> AudioSession {
    warn!("built without the audio feature");
    AudioSession::unavailable("built without audio support", timing)
}
