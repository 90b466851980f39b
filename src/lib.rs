//! Alarm from Hell: an alarm that only goes quiet once you are out of bed
//!
//! Pipeline: SampleSource → Calibration → MotionClassifier → ComplianceMachine
//! → FeedbackController / terminal output
//!
//! States: SLEEP → PANIC → COMPLIANCE → SILENCE → DONE. Leaving the board
//! from COMPLIANCE or SILENCE drops back to PANIC and raises the escalation
//! level, which never comes back down.

pub mod core;
pub mod types;

// =============================================================================
// CONTROL LOOP
// =============================================================================

/// Fixed control-loop rate
pub const TICK_HZ: f64 = 30.0;

/// Seconds per control-loop tick
pub const TICK_DT: f64 = 1.0 / TICK_HZ;

/// Minimum interval between screen refreshes (seconds)
pub const RENDER_INTERVAL_SECS: f64 = 0.1;

// =============================================================================
// MOTION CLASSIFIER
// =============================================================================

/// Samples kept in the rolling history
pub const HISTORY_CAPACITY: usize = 30;

/// Samples required before any event is emitted
pub const WARMUP_SAMPLES: usize = 5;

/// Look-back window for stomp detection (seconds)
pub const STOMP_WINDOW_SECS: f64 = 0.15;

/// Minimum samples inside the stomp window
pub const STOMP_MIN_SAMPLES: usize = 3;

// =============================================================================
// DEFAULT TUNABLES [C] - Tuned on a Wii balance board
// =============================================================================

/// Repetitions required before the SILENCE phase
pub const DEFAULT_REQUIRED_SQUATS: u32 = 8;

/// Stillness required in SILENCE (seconds)
pub const DEFAULT_REQUIRED_STILL_TIME_SECS: f64 = 5.0;

/// Peak-to-peak swing that counts as a stomp (kg)
pub const DEFAULT_STOMP_DELTA_KG: f64 = 25.0;

/// Minimum gap between two stomps (seconds)
pub const DEFAULT_STOMP_COOLDOWN_SECS: f64 = 0.6;

/// Sample-to-sample change still considered "not moving" (kg)
/// Also the squat hysteresis depth below baseline
pub const DEFAULT_STILLNESS_TOLERANCE_KG: f64 = 1.5;

/// Below this the board counts as empty (kg)
pub const DEFAULT_MIN_WEIGHT_KG: f64 = 20.0;

// =============================================================================
// ESCALATION CURVE [C]
// =============================================================================

pub const ESCALATION_BASE_VOLUME: f64 = 0.6;
pub const ESCALATION_MAX_VOLUME: f64 = 1.0;
pub const ESCALATION_BASE_SPEED: f64 = 1.0;
pub const ESCALATION_MAX_SPEED: f64 = 1.6;
/// Volume and speed increase per escalation level
pub const ESCALATION_STEP: f64 = 0.12;
/// Pause between alarm cues at level 0 (seconds)
pub const ESCALATION_BASE_GAP_SECS: f64 = 0.4;
/// Gap shrink per level (seconds)
pub const ESCALATION_GAP_STEP_SECS: f64 = 0.08;
pub const ESCALATION_MIN_GAP_SECS: f64 = 0.05;
/// Random playback speed variation, +/-
pub const SPEED_JITTER: f64 = 0.03;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
