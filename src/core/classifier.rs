//! Motion Classifier: turns calibrated weight samples into motion events
//!
//! Checks run in priority order, first match wins:
//! 1. Warm-up: fewer than 5 samples → NONE
//! 2. STOMP: max - min ≥ stomp delta within 0.15 s, outside cooldown
//! 3. SQUAT: dip below baseline - tolerance, recovery above baseline - tolerance/2
//! 4. STILLNESS: no sample-to-sample change above tolerance for the still time
//!
//! Baseline is the mean of the whole history (up to 30 samples).

use tracing::trace;

use crate::core::error::ConfigError;
use crate::core::history::{RollingHistory, Sample};
use crate::types::{AlarmConfig, MotionEvent};
use crate::{STOMP_MIN_SAMPLES, STOMP_WINDOW_SECS, WARMUP_SAMPLES};

/// Squat hysteresis sub-state
#[derive(Debug, Clone, Copy, PartialEq)]
enum SquatPhase {
    Standing,
    /// Below the entry threshold; tracks the deepest weight seen
    Squatting { min_weight: f64 },
}

/// Stateful classifier over a rolling window of samples
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    stomp_delta_kg: f64,
    stomp_cooldown_sec: f64,
    tolerance_kg: f64,
    required_still_time_sec: f64,
    history: RollingHistory,
    /// Timestamp of the last emitted stomp
    last_stomp: Option<f64>,
    /// Timestamp of the last recorded movement; starts at the first sample
    last_movement: Option<f64>,
    squat: SquatPhase,
    /// Movement recorded during the most recent call
    moved: bool,
    last_event: MotionEvent,
}

impl MotionClassifier {
    /// Create a classifier, rejecting invalid tunables
    pub fn new(config: &AlarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            stomp_delta_kg: config.stomp_delta_kg,
            stomp_cooldown_sec: config.stomp_cooldown_sec,
            tolerance_kg: config.stillness_tolerance_kg,
            required_still_time_sec: config.required_still_time_sec,
            history: RollingHistory::new(),
            last_stomp: None,
            last_movement: None,
            squat: SquatPhase::Standing,
            moved: false,
            last_event: MotionEvent::None,
        })
    }

    /// Classify one sample. Never fails; out-of-order timestamps give
    /// defined but meaningless elapsed times.
    pub fn classify(&mut self, weight: f64, timestamp: f64) -> MotionEvent {
        self.moved = false;
        let event = self.evaluate(weight, timestamp);
        self.last_event = event;
        if !event.is_none() {
            trace!(%event, weight, timestamp, "motion event");
        }
        event
    }

    fn evaluate(&mut self, weight: f64, timestamp: f64) -> MotionEvent {
        self.history.push(Sample::new(timestamp, weight));
        if self.last_movement.is_none() {
            self.last_movement = Some(timestamp);
        }

        if self.history.len() < WARMUP_SAMPLES {
            return MotionEvent::None;
        }

        if self.detect_stomp(timestamp) {
            self.last_stomp = Some(timestamp);
            self.mark_movement(timestamp);
            return MotionEvent::Stomp;
        }

        let baseline = self.baseline();

        match self.squat {
            SquatPhase::Standing => {
                if weight < baseline - self.tolerance_kg {
                    self.squat = SquatPhase::Squatting { min_weight: weight };
                    self.mark_movement(timestamp);
                }
            }
            SquatPhase::Squatting { min_weight } => {
                if weight >= baseline - self.tolerance_kg / 2.0 {
                    self.squat = SquatPhase::Standing;
                    self.mark_movement(timestamp);
                    return MotionEvent::Squat;
                }
                self.squat = SquatPhase::Squatting {
                    min_weight: min_weight.min(weight),
                };
            }
        }

        let previous = self.history.previous().map(|s| s.weight).unwrap_or(weight);
        if (weight - previous).abs() > self.tolerance_kg {
            self.mark_movement(timestamp);
            return MotionEvent::None;
        }

        let still_since = self.last_movement.unwrap_or(timestamp);
        if timestamp - still_since >= self.required_still_time_sec {
            return MotionEvent::Stillness;
        }

        MotionEvent::None
    }

    /// Peak-to-peak swing inside the stomp window, gated by the cooldown
    fn detect_stomp(&self, now: f64) -> bool {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for sample in self.history.iter() {
            if now - sample.timestamp <= STOMP_WINDOW_SECS {
                count += 1;
                min = min.min(sample.weight);
                max = max.max(sample.weight);
            }
        }

        if count < STOMP_MIN_SAMPLES || max - min < self.stomp_delta_kg {
            return false;
        }

        match self.last_stomp {
            Some(last) => now - last >= self.stomp_cooldown_sec,
            None => true,
        }
    }

    fn mark_movement(&mut self, timestamp: f64) {
        self.last_movement = Some(timestamp);
        self.moved = true;
    }

    /// Standing reference: mean of the current history
    pub fn baseline(&self) -> f64 {
        self.history.mean_weight().unwrap_or(0.0)
    }

    /// Is the squat hysteresis currently in the low band?
    pub fn in_squat(&self) -> bool {
        matches!(self.squat, SquatPhase::Squatting { .. })
    }

    /// Deepest weight of the squat in progress
    pub fn squat_min_weight(&self) -> Option<f64> {
        match self.squat {
            SquatPhase::Squatting { min_weight } => Some(min_weight),
            SquatPhase::Standing => None,
        }
    }

    /// Did the most recent call record movement?
    pub fn moved(&self) -> bool {
        self.moved
    }

    pub fn last_event(&self) -> MotionEvent {
        self.last_event
    }

    pub fn last_stomp(&self) -> Option<f64> {
        self.last_stomp
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    /// Forget all samples and sub-state
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_stomp = None;
        self.last_movement = None;
        self.squat = SquatPhase::Standing;
        self.moved = false;
        self.last_event = MotionEvent::None;
    }
}

// =============================================================================
// TESTS
// =============================================================================
