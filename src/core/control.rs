//! Control-loop contract: one tick = one calibrated reading
//!
//! Per tick:
//! 1. First tick only: trigger the alarm (SLEEP → PANIC)
//! 2. Weight below minimum → board left, skip classification
//! 3. Otherwise occupy (if PANIC), classify, STOMP/SQUAT → repetition
//! 4. Movement while already in SILENCE → moved (opt-in). The landing after
//!    the finishing repetition is ignored until one steady sample arrives.
//! 5. Still in SILENCE → hold tick of one dt
//!
//! STILLNESS events are reported but do not advance the hold timer; the
//! per-tick hold is the only path that does.

use tracing::{debug, info};

use crate::core::classifier::MotionClassifier;
use crate::core::error::ConfigError;
use crate::core::machine::ComplianceMachine;
use crate::types::{AlarmConfig, ComplianceState, MotionEvent, ReasonCode, StatusOutput};
use crate::TICK_DT;

/// Classifier + compliance machine, driven one reading at a time
#[derive(Debug, Clone)]
pub struct ControlLoop {
    classifier: MotionClassifier,
    machine: ComplianceMachine,
    min_weight_kg: f64,
    movement_resets_silence: bool,
    /// SILENCE just entered; movement ignored until a steady sample
    settling: bool,
    dt: f64,
    triggered: bool,
    last_event: MotionEvent,
    tick_count: u64,
}

impl ControlLoop {
    pub fn new(config: &AlarmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            classifier: MotionClassifier::new(config)?,
            machine: ComplianceMachine::new(config)?,
            min_weight_kg: config.min_weight_kg,
            movement_resets_silence: config.movement_resets_silence,
            settling: false,
            dt: TICK_DT,
            triggered: false,
            last_event: MotionEvent::None,
            tick_count: 0,
        })
    }

    /// Process one reading. Total: never fails, whatever the input.
    pub fn tick(&mut self, weight_kg: f64, timestamp: f64) -> StatusOutput {
        let before = self.machine.state();
        let mut reason = ReasonCode::R005_STATE_MAINTAINED;
        let mut note = |r: ReasonCode| {
            if r.is_effective() {
                reason = r;
            }
        };

        self.tick_count += 1;
        if !self.triggered {
            self.triggered = true;
            note(self.machine.start());
        }

        if weight_kg < self.min_weight_kg {
            note(self.machine.left_platform());
            self.last_event = MotionEvent::None;
        } else {
            let was_silent = self.machine.state() == ComplianceState::Silence;
            if self.machine.state() == ComplianceState::Panic {
                note(self.machine.occupied());
            }

            let event = self.classifier.classify(weight_kg, timestamp);
            self.last_event = event;
            if !event.is_none() {
                debug!(%event, weight_kg, "motion");
            }

            if event.is_repetition() {
                note(self.machine.repetition());
            }

            if was_silent && self.movement_resets_silence {
                let moved = self.classifier.moved();
                if self.settling {
                    self.settling = moved;
                } else if moved {
                    note(self.machine.moved());
                }
            }
        }

        if before != ComplianceState::Silence && self.machine.state() == ComplianceState::Silence {
            self.settling = true;
        }

        if self.machine.state() == ComplianceState::Silence {
            note(self.machine.hold_tick(self.dt));
        }

        let after = self.machine.state();
        if after != before {
            info!(
                from = %before,
                to = %after,
                reason = reason.code(),
                status = %self.machine.status_line(),
                "state change"
            );
        }

        self.status(weight_kg, reason)
    }

    fn status(&self, weight_kg: f64, reason: ReasonCode) -> StatusOutput {
        StatusOutput::new(
            weight_kg,
            self.machine.state(),
            self.machine.context(),
            (
                self.machine.required_squats(),
                self.machine.required_still_time(),
            ),
            self.last_event,
            reason,
        )
    }

    pub fn state(&self) -> ComplianceState {
        self.machine.state()
    }

    pub fn machine(&self) -> &ComplianceMachine {
        &self.machine
    }

    pub fn classifier(&self) -> &MotionClassifier {
        &self.classifier
    }

    pub fn last_event(&self) -> MotionEvent {
        self.last_event
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_done(&self) -> bool {
        self.machine.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(squats: u32, still: f64) -> ControlLoop {
        ControlLoop::new(&AlarmConfig {
            required_squats: squats,
            required_still_time_sec: still,
            ..AlarmConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_first_tick_triggers_and_occupies() {
        let mut c = control(3, 5.0);
        let status = c.tick(70.0, 0.0);
        assert_eq!(status.state, ComplianceState::Compliance);
        assert_eq!(status.reason, ReasonCode::R002_BOARD_OCCUPIED);
    }

    #[test]
    fn test_empty_board_stays_in_panic() {
        let mut c = control(3, 5.0);
        let status = c.tick(2.0, 0.0);
        assert_eq!(status.state, ComplianceState::Panic);
        assert_eq!(status.reason, ReasonCode::R001_ALARM_TRIGGERED);
        assert_eq!(status.progress.escalation_level, 0);
        // Empty board skips the classifier entirely
        assert_eq!(c.classifier().sample_count(), 0);
    }

    #[test]
    fn test_leaving_escalates_once_per_departure() {
        let mut c = control(3, 5.0);
        c.tick(70.0, 0.0);
        let status = c.tick(1.0, TICK_DT);
        assert_eq!(status.state, ComplianceState::Panic);
        assert_eq!(status.progress.escalation_level, 1);

        // Staying off the board does not keep escalating
        let status = c.tick(1.0, 2.0 * TICK_DT);
        assert_eq!(status.progress.escalation_level, 1);
        assert_eq!(status.event, MotionEvent::None);
    }

    #[test]
    fn test_stomp_counts_as_repetition() {
        let mut c = control(3, 5.0);
        for i in 0..5 {
            c.tick(60.0, i as f64 * TICK_DT);
        }
        let status = c.tick(95.0, 5.0 * TICK_DT);
        assert_eq!(status.event, MotionEvent::Stomp);
        assert_eq!(status.progress.squats_done, 1);
        assert_eq!(status.reason, ReasonCode::R003_REPETITION_COUNTED);
    }

    #[test]
    fn test_landing_after_finishing_stomp_is_not_movement() {
        let mut c = ControlLoop::new(&AlarmConfig {
            required_squats: 1,
            required_still_time_sec: 5.0,
            movement_resets_silence: true,
            ..AlarmConfig::default()
        })
        .unwrap();
        for i in 0..30 {
            c.tick(80.0, i as f64 * TICK_DT);
        }

        let status = c.tick(110.0, 30.0 * TICK_DT);
        assert_eq!(status.event, MotionEvent::Stomp);
        assert_eq!(status.state, ComplianceState::Silence);

        // Dropping back from the spike is part of the stomp
        let status = c.tick(80.0, 31.0 * TICK_DT);
        assert!(c.classifier().moved());
        assert_eq!(status.state, ComplianceState::Silence);

        let status = c.tick(80.0, 32.0 * TICK_DT);
        assert_eq!(status.state, ComplianceState::Silence);

        // Settled: a real shift of weight now counts
        let status = c.tick(84.0, 33.0 * TICK_DT);
        assert_eq!(status.state, ComplianceState::Compliance);
        assert_eq!(status.reason, ReasonCode::R004_MOVEMENT_DETECTED);
        assert_eq!(status.progress.squats_done, 1);
    }

    #[test]
    fn test_movement_in_silence_ignored_by_default() {
        let mut c = control(1, 5.0);
        for i in 0..30 {
            c.tick(80.0, i as f64 * TICK_DT);
        }
        c.tick(110.0, 30.0 * TICK_DT);
        c.tick(80.0, 31.0 * TICK_DT);
        let status = c.tick(84.0, 32.0 * TICK_DT);
        assert_eq!(status.state, ComplianceState::Silence);
        assert_eq!(status.reason, ReasonCode::R004_HOLD_ACCUMULATING);
    }
}
