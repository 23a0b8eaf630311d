use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::audio::ToneTiming;
use crate::engine::ledger::MasteryThresholds;
use crate::session::practice::{ModeRules, PracticeMode, RoundDelays};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_audio_enabled")]
    pub audio_enabled: bool,
    #[serde(default = "default_tone_frequency_hz")]
    pub tone_frequency_hz: f32,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_unit_ms")]
    pub unit_ms: u64,
    #[serde(default = "default_lead_in_ms")]
    pub lead_in_ms: u64,
    #[serde(default = "default_ramp_ms")]
    pub ramp_ms: u64,
    #[serde(default = "default_keyer_threshold_ms")]
    pub keyer_threshold_ms: u64,
    #[serde(default = "default_keyer_max_hold_ms")]
    pub keyer_max_hold_ms: u64,
    #[serde(default = "default_success_delay_ms")]
    pub success_delay_ms: u64,
    #[serde(default = "default_failure_delay_ms")]
    pub failure_delay_ms: u64,
    #[serde(default = "default_drill_fail_on_divergence")]
    pub drill_fail_on_divergence: bool,
    #[serde(default = "default_free_fail_on_divergence")]
    pub free_fail_on_divergence: bool,
    #[serde(default = "default_quiz_fail_on_divergence")]
    pub quiz_fail_on_divergence: bool,
    #[serde(default = "default_mastery_min_accuracy")]
    pub mastery_min_accuracy: f64,
    #[serde(default = "default_mastery_min_attempts")]
    pub mastery_min_attempts: u32,
    #[serde(default = "default_quiz_unlock_count")]
    pub quiz_unlock_count: usize,
    #[serde(default = "default_fluency_window")]
    pub fluency_window: usize,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_audio_enabled() -> bool {
    true
}
fn default_tone_frequency_hz() -> f32 {
    crate::audio::schedule::DEFAULT_FREQUENCY_HZ
}
fn default_volume() -> f32 {
    crate::audio::schedule::DEFAULT_GAIN
}
fn default_unit_ms() -> u64 {
    crate::audio::schedule::DEFAULT_UNIT_MS
}
fn default_lead_in_ms() -> u64 {
    crate::audio::schedule::DEFAULT_LEAD_IN_MS
}
fn default_ramp_ms() -> u64 {
    crate::audio::schedule::DEFAULT_RAMP_MS
}
fn default_keyer_threshold_ms() -> u64 {
    crate::engine::keyer::DEFAULT_THRESHOLD_MS
}
fn default_keyer_max_hold_ms() -> u64 {
    crate::audio::session::DEFAULT_MAX_KEY_HOLD_MS
}
fn default_success_delay_ms() -> u64 {
    crate::session::practice::DEFAULT_SUCCESS_DELAY_MS
}
fn default_failure_delay_ms() -> u64 {
    crate::session::practice::DEFAULT_FAILURE_DELAY_MS
}
fn default_drill_fail_on_divergence() -> bool {
    true
}
fn default_free_fail_on_divergence() -> bool {
    false
}
fn default_quiz_fail_on_divergence() -> bool {
    false
}
fn default_mastery_min_accuracy() -> f64 {
    crate::engine::ledger::DEFAULT_MIN_ACCURACY
}
fn default_mastery_min_attempts() -> u32 {
    crate::engine::ledger::DEFAULT_MIN_ATTEMPTS
}
fn default_quiz_unlock_count() -> usize {
    crate::engine::ledger::DEFAULT_QUIZ_UNLOCK_COUNT
}
fn default_fluency_window() -> usize {
    crate::engine::ledger::DEFAULT_FLUENCY_WINDOW
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            audio_enabled: default_audio_enabled(),
            tone_frequency_hz: default_tone_frequency_hz(),
            volume: default_volume(),
            unit_ms: default_unit_ms(),
            lead_in_ms: default_lead_in_ms(),
            ramp_ms: default_ramp_ms(),
            keyer_threshold_ms: default_keyer_threshold_ms(),
            keyer_max_hold_ms: default_keyer_max_hold_ms(),
            success_delay_ms: default_success_delay_ms(),
            failure_delay_ms: default_failure_delay_ms(),
            drill_fail_on_divergence: default_drill_fail_on_divergence(),
            free_fail_on_divergence: default_free_fail_on_divergence(),
            quiz_fail_on_divergence: default_quiz_fail_on_divergence(),
            mastery_min_accuracy: default_mastery_min_accuracy(),
            mastery_min_attempts: default_mastery_min_attempts(),
            quiz_unlock_count: default_quiz_unlock_count(),
            fluency_window: default_fluency_window(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dotdash")
            .join("config.toml")
    }

    /// Clamp values into usable ranges. The failure delay is kept longer
    /// than the success delay so the correction stays readable.
    pub fn validate(&mut self) {
        self.unit_ms = self.unit_ms.clamp(20, 300);
        self.lead_in_ms = self.lead_in_ms.min(1000);
        self.ramp_ms = self.ramp_ms.clamp(1, 50);
        self.tone_frequency_hz = self.tone_frequency_hz.clamp(200.0, 2000.0);
        self.volume = self.volume.clamp(0.0, 1.0);
        self.keyer_threshold_ms = self.keyer_threshold_ms.clamp(50, 1000);
        self.keyer_max_hold_ms = self.keyer_max_hold_ms.clamp(1000, 30_000);
        self.success_delay_ms = self.success_delay_ms.clamp(100, 5000);
        if self.failure_delay_ms <= self.success_delay_ms {
            self.failure_delay_ms = self.success_delay_ms + 200;
        }
        self.failure_delay_ms = self.failure_delay_ms.min(10_000);
        self.mastery_min_accuracy = self.mastery_min_accuracy.clamp(0.0, 100.0);
        self.mastery_min_attempts = self.mastery_min_attempts.max(1);
        self.quiz_unlock_count = self.quiz_unlock_count.max(1);
        self.fluency_window = self.fluency_window.clamp(1, 100);
    }

    pub fn tone_timing(&self) -> ToneTiming {
        ToneTiming {
            unit: Duration::from_millis(self.unit_ms),
            lead_in: Duration::from_millis(self.lead_in_ms),
            ramp: Duration::from_millis(self.ramp_ms),
            frequency_hz: self.tone_frequency_hz,
            gain: self.volume,
        }
    }

    pub fn max_key_hold(&self) -> Duration {
        Duration::from_millis(self.keyer_max_hold_ms)
    }

    pub fn round_delays(&self) -> RoundDelays {
        RoundDelays {
            success: Duration::from_millis(self.success_delay_ms),
            failure: Duration::from_millis(self.failure_delay_ms),
        }
    }

    pub fn mode_rules(&self, mode: PracticeMode) -> ModeRules {
        let mut rules = ModeRules::for_mode(mode);
        rules.fail_on_divergence = match mode {
            PracticeMode::Drill => self.drill_fail_on_divergence,
            PracticeMode::FreeType => self.free_fail_on_divergence,
            PracticeMode::Quiz => self.quiz_fail_on_divergence,
        };
        rules
    }

    pub fn mastery_thresholds(&self) -> MasteryThresholds {
        MasteryThresholds {
            min_accuracy: self.mastery_min_accuracy,
            min_attempts: self.mastery_min_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.keyer_threshold_ms, 200);
        assert_eq!(config.unit_ms, 80);
        assert_eq!(config.tone_frequency_hz, 600.0);
        assert_eq!(config.mastery_min_attempts, 5);
        assert_eq!(config.quiz_unlock_count, 3);
        assert!(config.drill_fail_on_divergence);
        assert!(!config.free_fail_on_divergence);
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
theme = "terminal-default"
unit_ms = 60
audio_enabled = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.unit_ms, 60);
        assert!(!config.audio_enabled);
        assert_eq!(config.success_delay_ms, 600);
        assert_eq!(config.failure_delay_ms, 1200);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.keyer_threshold_ms, deserialized.keyer_threshold_ms);
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.fluency_window, deserialized.fluency_window);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.unit_ms = 5;
        config.volume = 3.0;
        config.keyer_threshold_ms = 0;
        config.mastery_min_accuracy = 250.0;
        config.validate();
        assert_eq!(config.unit_ms, 20);
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.keyer_threshold_ms, 50);
        assert_eq!(config.mastery_min_accuracy, 100.0);
    }

    #[test]
    fn test_validate_keeps_failure_delay_longer() {
        let mut config = Config::default();
        config.success_delay_ms = 900;
        config.failure_delay_ms = 500;
        config.validate();
        assert!(config.failure_delay_ms > config.success_delay_ms);
    }

    #[test]
    fn test_mode_rules_follow_config() {
        let mut config = Config::default();
        config.free_fail_on_divergence = true;
        assert!(config.mode_rules(PracticeMode::FreeType).fail_on_divergence);
        assert!(!config.mode_rules(PracticeMode::Quiz).show_reference);
    }

    #[test]
    fn test_tone_timing_from_config() {
        let config = Config::default();
        assert_eq!(config.tone_timing(), ToneTiming::default());
    }
}
