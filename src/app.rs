use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::audio::{self, AudioError, AudioEvent, AudioSession};
use crate::config::Config;
use crate::engine::keyer::{KeyPress, Keyer};
use crate::engine::ledger::{MasteryLedger, QuizGate};
use crate::engine::unlock::PracticeSet;
use crate::morse::MorseSymbol;
use crate::session::input::{InputEvent, InputQueue};
use crate::session::picker::TargetPicker;
use crate::session::practice::{PracticeMode, PracticeSession, RoundOutcome};
use crate::store::json_store::JsonStore;
use crate::store::schema::{AttemptHistoryData, ProfileData};
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Practice,
    Stats,
    Settings,
}

pub const SETTINGS_FIELDS: &[&str] = &[
    "Theme",
    "Audio",
    "Volume",
    "Tone Frequency",
    "Unit Length",
    "Keyer Threshold",
    "Success Delay",
    "Failure Delay",
];

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub profile: ProfileData,
    pub practice_set: PracticeSet,
    pub ledger: MasteryLedger,
    pub session: Option<PracticeSession>,
    pub input: InputQueue,
    pub keyer: Keyer,
    pub keyer_available: bool,
    pub audio: AudioSession,
    pub store: Option<JsonStore>,
    /// Set when the last save failed; the stats screen flags its numbers.
    pub stats_stale: bool,
    pub status: Option<String>,
    pub should_quit: bool,
    pub settings_selected: usize,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("progress will not be saved: {e}");
                None
            }
        };
        let audio = audio::open(config.audio_enabled, config.tone_timing(), config.max_key_hold());
        Self::with_parts(config, store, audio)
    }

    pub fn with_parts(config: Config, store: Option<JsonStore>, audio: AudioSession) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme);

        let (profile, history) = match store {
            Some(ref s) => {
                if s.check_interrupted_import() {
                    warn!("removed backups left by an interrupted import");
                }
                match s.load_profile() {
                    Some(pd) if !pd.needs_reset() => (pd, s.load_history()),
                    _ => {
                        // Schema mismatch or parse failure: start over
                        warn!("stored profile unreadable, starting a fresh one");
                        (ProfileData::default(), AttemptHistoryData::default())
                    }
                }
            }
            None => (ProfileData::default(), AttemptHistoryData::default()),
        };

        let ledger = MasteryLedger::from_history(history.attempts);
        let mut practice_set = PracticeSet::from_included(profile.unlocked.clone());
        practice_set.update(&ledger, &config.mastery_thresholds());
        let keyer = Keyer::new(config.keyer_threshold_ms);
        let stats_stale = store.is_none();

        info!(
            attempts = ledger.history().len(),
            unlocked = practice_set.unlocked_count(),
            audio = audio.is_available(),
            "profile loaded"
        );

        let mut app = Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            profile,
            practice_set,
            ledger,
            session: None,
            input: InputQueue::new(),
            keyer,
            keyer_available: false,
            audio,
            store,
            stats_stale,
            status: None,
            should_quit: false,
            settings_selected: 0,
        };
        app.refresh_menu();
        app
    }

    fn refresh_menu(&mut self) {
        self.menu.quiz_note = match self.quiz_gate() {
            QuizGate::Unlocked => None,
            QuizGate::Locked { mastered, required } => Some(format!(
                "Locked until {required} characters are mastered ({mastered}/{required})"
            )),
        };
    }

    pub fn set_theme(&mut self, theme: Theme) {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        self.theme = theme;
        self.menu.theme = theme;
    }

    pub fn quiz_gate(&self) -> QuizGate {
        self.ledger
            .quiz_gate(&self.config.mastery_thresholds(), self.config.quiz_unlock_count)
    }

    fn targets_for(&self, mode: PracticeMode) -> Vec<char> {
        match mode {
            PracticeMode::Quiz => self
                .ledger
                .mastery_set(&self.config.mastery_thresholds())
                .into_iter()
                .collect(),
            PracticeMode::Drill | PracticeMode::FreeType => self.practice_set.included.clone(),
        }
    }

    /// Enters the practice screen. Returns false when the mode is not
    /// available yet, with the reason left in `status`.
    pub fn start_practice(&mut self, mode: PracticeMode) -> bool {
        if mode == PracticeMode::Quiz
            && let QuizGate::Locked { mastered, required } = self.quiz_gate()
        {
            self.status = Some(format!(
                "Quiz unlocks after mastering {required} characters ({mastered}/{required})"
            ));
            return false;
        }

        self.input.drain();
        self.keyer.abandon();
        self.audio.stop_key_tone();

        match PracticeSession::new(
            mode,
            self.config.mode_rules(mode),
            self.config.round_delays(),
            self.targets_for(mode),
            TargetPicker::new(),
        ) {
            Ok(session) => {
                self.session = Some(session);
                self.status = None;
                self.screen = AppScreen::Practice;
                true
            }
            Err(e) => {
                warn!(mode = mode.as_str(), "cannot start practice: {e}");
                self.status = Some(e.to_string());
                false
            }
        }
    }

    pub fn push_symbol(&self, symbol: MorseSymbol) {
        self.input.push(InputEvent::Symbol(symbol));
    }

    pub fn backspace(&self) {
        self.input.push(InputEvent::Backspace);
    }

    pub fn clear_input(&self) {
        self.input.push(InputEvent::Clear);
    }

    pub fn paste(&self, text: String) {
        self.input.push(InputEvent::Text(text));
    }

    pub fn key_press(&mut self, now: Instant) {
        if !self.keyer_available {
            return;
        }
        if self.keyer.press(now) == KeyPress::Started
            && let Err(e) = self.audio.start_key_tone(now)
        {
            debug!("key tone not started: {e}");
        }
    }

    pub fn key_release(&mut self, now: Instant) {
        self.audio.stop_key_tone();
        if let Some(symbol) = self.keyer.release(now) {
            self.push_symbol(symbol);
        }
    }

    /// Plays the current target's code.
    pub fn play_target(&mut self, now: Instant) {
        let Some(code) = self
            .session
            .as_ref()
            .and_then(|s| s.target())
            .map(|t| t.code().clone())
        else {
            return;
        };
        match self.audio.play(&code, now) {
            Ok(total) => debug!(total_ms = total.as_millis() as u64, "playing target"),
            Err(AudioError::Busy) => self.status = Some("Playback in progress".to_string()),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Drains queued input, then runs due timers. Called after every event.
    pub fn on_tick(&mut self, now: Instant) {
        let mut outcomes: Vec<RoundOutcome> = Vec::new();
        for event in self.input.drain() {
            if let Some(session) = self.session.as_mut()
                && let Some(outcome) = session.handle_input(event, now)
            {
                outcomes.push(outcome);
            }
        }
        for outcome in outcomes {
            self.apply_outcome(outcome);
        }

        if let Some(session) = self.session.as_mut() {
            session.poll(now);
        }

        match self.audio.poll(now) {
            Some(AudioEvent::KeyToneTimedOut) => self.keyer.abandon(),
            Some(AudioEvent::PlaybackFinished) => debug!("playback finished"),
            None => {}
        }
        // Without an audio device the key-tone timeout never fires.
        if self
            .keyer
            .held_for(now)
            .is_some_and(|held| held >= self.config.max_key_hold())
        {
            warn!("key held past the maximum, dropping the press");
            self.audio.stop_key_tone();
            self.keyer.abandon();
        }
    }

    fn apply_outcome(&mut self, outcome: RoundOutcome) {
        self.ledger.report_outcome(outcome.character, outcome.success);

        let thresholds = self.config.mastery_thresholds();
        if let Some(ch) = self.practice_set.update(&self.ledger, &thresholds) {
            info!(character = %ch, "character unlocked");
            self.status = Some(format!("Unlocked '{ch}'"));
        }

        if let Some(mode) = self.session.as_ref().map(PracticeSession::mode) {
            if mode == PracticeMode::Quiz
                && let QuizGate::Locked { mastered, required } = self.quiz_gate()
            {
                info!(mastered, required, "quiz relocked");
                self.go_to_menu();
                self.status = Some(format!(
                    "Quiz locked again: {mastered}/{required} characters mastered"
                ));
            }
            let targets = self.targets_for(mode);
            if let Some(session) = self.session.as_mut() {
                session.set_practice_set(targets);
            }
        }

        self.profile.unlocked = self.practice_set.included.clone();
        self.profile.last_practice_date = Some(Local::now().format("%Y-%m-%d").to_string());
        self.save_data();
    }

    fn save_data(&mut self) {
        let Some(ref store) = self.store else {
            self.stats_stale = true;
            return;
        };
        let history = AttemptHistoryData {
            attempts: self.ledger.history().to_vec(),
            ..Default::default()
        };
        let result = store
            .save_profile(&self.profile)
            .and_then(|()| store.save_history(&history));
        match result {
            Ok(()) => self.stats_stale = false,
            Err(e) => {
                warn!("failed to save progress: {e:#}");
                self.stats_stale = true;
            }
        }
    }

    pub fn go_to_menu(&mut self) {
        self.keyer.abandon();
        self.audio.stop_key_tone();
        self.session = None;
        self.refresh_menu();
        self.screen = AppScreen::Menu;
    }

    pub fn go_to_stats(&mut self) {
        self.screen = AppScreen::Stats;
    }

    pub fn go_to_settings(&mut self) {
        self.settings_selected = 0;
        self.screen = AppScreen::Settings;
    }

    /// Fluency series as chart points, one per attempt.
    pub fn fluency_points(&self) -> Vec<(f64, f64)> {
        self.ledger
            .fluency_series(self.config.fluency_window)
            .into_iter()
            .enumerate()
            .map(|(i, acc)| ((i + 1) as f64, acc))
            .collect()
    }

    pub fn settings_value(&self, index: usize) -> String {
        match index {
            0 => self.config.theme.clone(),
            1 => {
                if self.config.audio_enabled {
                    "on".to_string()
                } else {
                    "off".to_string()
                }
            }
            2 => format!("{:.0}%", self.config.volume * 100.0),
            3 => format!("{:.0} Hz", self.config.tone_frequency_hz),
            4 => format!("{} ms", self.config.unit_ms),
            5 => format!("{} ms", self.config.keyer_threshold_ms),
            6 => format!("{} ms", self.config.success_delay_ms),
            7 => format!("{} ms", self.config.failure_delay_ms),
            _ => String::new(),
        }
    }

    pub fn settings_cycle_forward(&mut self) {
        self.settings_step(true);
    }

    pub fn settings_cycle_backward(&mut self) {
        self.settings_step(false);
    }

    fn settings_step(&mut self, forward: bool) {
        fn step_u64(value: u64, delta: u64, forward: bool) -> u64 {
            if forward {
                value.saturating_add(delta)
            } else {
                value.saturating_sub(delta)
            }
        }

        match self.settings_selected {
            0 => self.cycle_theme(forward),
            1 => {
                self.config.audio_enabled = !self.config.audio_enabled;
                self.audio = audio::open(
                    self.config.audio_enabled,
                    self.config.tone_timing(),
                    self.config.max_key_hold(),
                );
            }
            2 => {
                let delta = if forward { 0.1 } else { -0.1 };
                self.config.volume = ((self.config.volume + delta) * 10.0).round() / 10.0;
            }
            3 => {
                let delta = if forward { 50.0 } else { -50.0 };
                self.config.tone_frequency_hz += delta;
            }
            4 => self.config.unit_ms = step_u64(self.config.unit_ms, 10, forward),
            5 => {
                self.config.keyer_threshold_ms =
                    step_u64(self.config.keyer_threshold_ms, 25, forward)
            }
            6 => {
                self.config.success_delay_ms =
                    step_u64(self.config.success_delay_ms, 100, forward)
            }
            7 => {
                self.config.failure_delay_ms =
                    step_u64(self.config.failure_delay_ms, 100, forward)
            }
            _ => {}
        }

        self.config.validate();
        self.audio.set_timing(self.config.tone_timing());
        self.keyer.set_threshold_ms(self.config.keyer_threshold_ms);
    }

    fn cycle_theme(&mut self, forward: bool) {
        let themes = Theme::available_themes();
        if themes.is_empty() {
            return;
        }
        let next = match themes.iter().position(|t| *t == self.config.theme) {
            Some(idx) if forward => (idx + 1) % themes.len(),
            Some(idx) => (idx + themes.len() - 1) % themes.len(),
            None => 0,
        };
        self.config.theme = themes[next].clone();
        if let Some(theme) = Theme::load(&self.config.theme) {
            self.set_theme(theme);
        }
    }

    pub fn save_config(&mut self) {
        if let Err(e) = self.config.save() {
            warn!("failed to save config: {e:#}");
            self.status = Some("Settings could not be saved".to_string());
        }
    }
}
