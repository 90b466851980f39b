use thiserror::Error;

/// Rejected tunables. Raised at construction, never mid-run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("required_squats must be at least 1")]
    RequiredSquats,

    #[error("required_still_time_sec must be positive and finite, got {0}")]
    RequiredStillTime(f64),

    #[error("stomp_delta_kg must be positive and finite, got {0}")]
    StompDelta(f64),

    #[error("stomp_cooldown_sec must be non-negative and finite, got {0}")]
    StompCooldown(f64),

    #[error("stillness_tolerance_kg must be positive and finite, got {0}")]
    StillnessTolerance(f64),

    #[error("min_weight_kg must be non-negative and finite, got {0}")]
    MinWeight(f64),
}

#[derive(Error, Debug)]
pub enum AlarmError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Settings write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Invalid delay {0:?}: use forms like 10s, 5m, 2h or 8h10m")]
    InvalidDelay(String),

    #[error("Bad sample on line {line}: {content:?}")]
    SampleParse { line: usize, content: String },

    #[error("Calibration failed: {0}")]
    Calibration(String),

    #[error("Sample source closed before calibration finished")]
    SourceExhausted,
}

pub type Result<T> = std::result::Result<T, AlarmError>;
