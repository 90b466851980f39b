//! Run configuration: tunables, calibration, feedback output
//!
//! Everything here is immutable for the duration of a session. Values come
//! from defaults, then an optional TOML file, then CLI overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{AlarmError, ConfigError, Result};
use crate::{
    DEFAULT_MIN_WEIGHT_KG, DEFAULT_REQUIRED_SQUATS, DEFAULT_REQUIRED_STILL_TIME_SECS,
    DEFAULT_STILLNESS_TOLERANCE_KG, DEFAULT_STOMP_COOLDOWN_SECS, DEFAULT_STOMP_DELTA_KG,
};

/// Protocol tunables shared by the classifier and the compliance machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    pub required_squats: u32,
    pub required_still_time_sec: f64,
    pub stomp_delta_kg: f64,
    pub stomp_cooldown_sec: f64,
    pub stillness_tolerance_kg: f64,
    pub min_weight_kg: f64,
    /// Movement during SILENCE sends the user back to COMPLIANCE.
    /// Off by default; the hold timer alone decides DONE.
    pub movement_resets_silence: bool,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            required_squats: DEFAULT_REQUIRED_SQUATS,
            required_still_time_sec: DEFAULT_REQUIRED_STILL_TIME_SECS,
            stomp_delta_kg: DEFAULT_STOMP_DELTA_KG,
            stomp_cooldown_sec: DEFAULT_STOMP_COOLDOWN_SECS,
            stillness_tolerance_kg: DEFAULT_STILLNESS_TOLERANCE_KG,
            min_weight_kg: DEFAULT_MIN_WEIGHT_KG,
            movement_resets_silence: false,
        }
    }
}

impl AlarmConfig {
    /// Reject tunables that would make the protocol meaningless
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.required_squats == 0 {
            return Err(ConfigError::RequiredSquats);
        }
        if !positive(self.required_still_time_sec) {
            return Err(ConfigError::RequiredStillTime(self.required_still_time_sec));
        }
        if !positive(self.stomp_delta_kg) {
            return Err(ConfigError::StompDelta(self.stomp_delta_kg));
        }
        if !non_negative(self.stomp_cooldown_sec) {
            return Err(ConfigError::StompCooldown(self.stomp_cooldown_sec));
        }
        if !positive(self.stillness_tolerance_kg) {
            return Err(ConfigError::StillnessTolerance(self.stillness_tolerance_kg));
        }
        if !non_negative(self.min_weight_kg) {
            return Err(ConfigError::MinWeight(self.min_weight_kg));
        }
        Ok(())
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Linear raw → kg mapping for the board
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Raw total with nobody on the board
    pub zero_offset: f64,
    /// Kilograms per raw unit
    pub scale: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            zero_offset: 0.0,
            scale: 1.0,
        }
    }
}

impl Calibration {
    pub fn new(zero_offset: f64, scale: f64) -> Self {
        Self { zero_offset, scale }
    }

    /// Convert a raw board total to kilograms
    pub fn raw_to_kg(&self, raw: f64) -> f64 {
        (raw - self.zero_offset) * self.scale
    }
}

/// How alarm cues are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// SoX `play` with volume and speed escalation
    Sox,
    /// Terminal bell
    Bell,
    /// No audio (testing)
    Silent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSettings {
    pub player: PlayerKind,
    pub wav: PathBuf,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            player: PlayerKind::Sox,
            wav: PathBuf::from("assets/alarm.wav"),
        }
    }
}

/// On-disk settings file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub alarm: AlarmConfig,
    pub calibration: Calibration,
    pub feedback: FeedbackSettings,
}

impl Settings {
    /// Load from TOML; missing sections fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(?path, "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.alarm.validate().map_err(AlarmError::Config)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AlarmConfig::default().validate().is_ok());
        assert!(!AlarmConfig::default().movement_resets_silence);
    }

    #[test]
    fn test_zero_squats_rejected() {
        let config = AlarmConfig {
            required_squats: 0,
            ..AlarmConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::RequiredSquats));
    }

    #[test]
    fn test_non_finite_still_time_rejected() {
        let config = AlarmConfig {
            required_still_time_sec: f64::NAN,
            ..AlarmConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RequiredStillTime(_))
        ));
    }

    #[test]
    fn test_negative_cooldown_rejected_zero_allowed() {
        let mut config = AlarmConfig {
            stomp_cooldown_sec: -0.1,
            ..AlarmConfig::default()
        };
        assert!(config.validate().is_err());
        config.stomp_cooldown_sec = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_raw_to_kg() {
        let calibration = Calibration::new(322.0, 0.010231);
        assert_eq!(calibration.raw_to_kg(322.0), 0.0);
        assert!((calibration.raw_to_kg(10322.0) - 102.31).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = Settings::from_toml(
            r#"
            [alarm]
            required_squats = 3

            [feedback]
            player = "bell"
            "#,
        )
        .unwrap();

        assert_eq!(settings.alarm.required_squats, 3);
        assert_eq!(settings.alarm.stomp_delta_kg, DEFAULT_STOMP_DELTA_KG);
        assert_eq!(settings.calibration, Calibration::default());
        assert_eq!(settings.feedback.player, PlayerKind::Bell);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let result = Settings::from_toml("[alarm]\nrequired_squats = 0\n");
        assert!(matches!(
            result,
            Err(AlarmError::Config(ConfigError::RequiredSquats))
        ));
    }

    #[test]
    fn test_toml_text_survives_reload() {
        let mut settings = Settings::default();
        settings.calibration = Calibration::new(310.5, 0.0125);
        let text = toml::to_string_pretty(&settings).unwrap();
        assert!(text.contains("[calibration]"));
        assert_eq!(Settings::from_toml(&text).unwrap(), settings);
    }
}
