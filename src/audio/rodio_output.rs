use std::f32::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use crate::audio::schedule::{ToneSchedule, ToneTiming};
use crate::audio::session::{AudioError, ToneOutput};

const SAMPLE_RATE: u32 = 48_000;

fn frames_for(duration: Duration) -> u64 {
    (duration.as_secs_f64() * SAMPLE_RATE as f64).round() as u64
}

/// Mono sine rendering of a whole schedule, silence included.
struct ScheduleWaveform {
    schedule: ToneSchedule,
    frame: u64,
    total_frames: u64,
}

impl ScheduleWaveform {
    fn new(schedule: ToneSchedule) -> Self {
        let total_frames = frames_for(schedule.total);
        Self {
            schedule,
            frame: 0,
            total_frames,
        }
    }
}

impl Iterator for ScheduleWaveform {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame >= self.total_frames {
            return None;
        }
        let secs = self.frame as f64 / SAMPLE_RATE as f64;
        let gain = self.schedule.gain_at(Duration::from_secs_f64(secs));
        let sample = if gain > 0.0 {
            (2.0 * PI * self.schedule.frequency_hz * secs as f32).sin() * gain
        } else {
            0.0
        };
        self.frame += 1;
        Some(sample)
    }
}

impl Source for ScheduleWaveform {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_frames.saturating_sub(self.frame) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.schedule.total)
    }
}

/// Open-ended key tone. Fades in, holds until `released` is set (or the
/// hold limit passes), then fades out and ends.
struct KeyTone {
    frequency_hz: f32,
    gain: f32,
    ramp_frames: u64,
    max_frames: u64,
    frame: u64,
    release_frame: Option<u64>,
    released: Arc<AtomicBool>,
}

impl Iterator for KeyTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.release_frame.is_none()
            && (self.released.load(Ordering::Relaxed) || self.frame >= self.max_frames)
        {
            self.release_frame = Some(self.frame);
        }

        let ramp = self.ramp_frames.max(1) as f32;
        let attack = (self.frame as f32 / ramp).min(1.0);
        let level = match self.release_frame {
            Some(start) => {
                let decay = 1.0 - (self.frame - start) as f32 / ramp;
                if decay <= 0.0 {
                    return None;
                }
                attack.min(decay)
            }
            None => attack,
        };

        let secs = self.frame as f32 / SAMPLE_RATE as f32;
        self.frame += 1;
        Some((2.0 * PI * self.frequency_hz * secs).sin() * level * self.gain)
    }
}

impl Source for KeyTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

pub struct RodioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    max_key_hold: Duration,
    playback: Option<Sink>,
    key_tone: Option<(Sink, Arc<AtomicBool>)>,
}

impl RodioOutput {
    pub fn new(max_key_hold: Duration) -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| AudioError::PlaybackUnavailable(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            max_key_hold,
            playback: None,
            key_tone: None,
        })
    }

    fn sink(&self) -> Result<Sink, AudioError> {
        Sink::try_new(&self.handle).map_err(|e| AudioError::PlaybackUnavailable(e.to_string()))
    }
}

impl ToneOutput for RodioOutput {
    fn play_schedule(&mut self, schedule: &ToneSchedule) -> Result<(), AudioError> {
        let sink = self.sink()?;
        sink.append(ScheduleWaveform::new(schedule.clone()));
        if let Some(previous) = self.playback.replace(sink) {
            previous.stop();
        }
        Ok(())
    }

    fn start_tone(&mut self, timing: &ToneTiming) -> Result<(), AudioError> {
        if self.key_tone.is_some() {
            return Ok(());
        }
        let sink = self.sink()?;
        let released = Arc::new(AtomicBool::new(false));
        sink.append(KeyTone {
            frequency_hz: timing.frequency_hz,
            gain: timing.gain,
            ramp_frames: frames_for(timing.ramp),
            max_frames: frames_for(self.max_key_hold),
            frame: 0,
            release_frame: None,
            released: released.clone(),
        });
        self.key_tone = Some((sink, released));
        Ok(())
    }

    fn stop_tone(&mut self) {
        if let Some((sink, released)) = self.key_tone.take() {
            released.store(true, Ordering::Relaxed);
            // Let the fade-out play to the end on its own.
            sink.detach();
        }
    }

    fn stop_all(&mut self) {
        if let Some(sink) = self.playback.take() {
            sink.stop();
        }
        self.stop_tone();
    }
}
