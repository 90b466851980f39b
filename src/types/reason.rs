//! Reason codes for compliance transitions

use serde::{Deserialize, Serialize};

/// Outcome of every compliance operation, including the ones that did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Alarm
    // =========================================================================
    /// SLEEP → PANIC
    R001_ALARM_TRIGGERED,

    // =========================================================================
    // R002: Board presence
    // =========================================================================
    /// PANIC → COMPLIANCE
    R002_BOARD_OCCUPIED,
    /// COMPLIANCE/SILENCE → PANIC, progress wiped, escalation raised
    R002_BOARD_LEFT,

    // =========================================================================
    // R003: Repetitions
    // =========================================================================
    /// Repetition counted, more required
    R003_REPETITION_COUNTED,
    /// Last repetition counted, COMPLIANCE → SILENCE
    R003_REPETITIONS_COMPLETE,

    // =========================================================================
    // R004: Stillness
    // =========================================================================
    /// Still time accumulating in SILENCE
    R004_HOLD_ACCUMULATING,
    /// Still time reached, SILENCE → DONE
    R004_HOLD_COMPLETE,
    /// Movement in SILENCE, back to COMPLIANCE
    R004_MOVEMENT_DETECTED,

    // =========================================================================
    // R005: Steady state
    // =========================================================================
    /// Tick processed, nothing changed
    R005_STATE_MAINTAINED,

    // =========================================================================
    // R006: No-op
    // =========================================================================
    /// Operation has no effect in the current state
    R006_IGNORED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_ALARM_TRIGGERED => "R001_ALARM_TRIGGERED",
            Self::R002_BOARD_OCCUPIED => "R002_BOARD_OCCUPIED",
            Self::R002_BOARD_LEFT => "R002_BOARD_LEFT",
            Self::R003_REPETITION_COUNTED => "R003_REPETITION_COUNTED",
            Self::R003_REPETITIONS_COMPLETE => "R003_REPETITIONS_COMPLETE",
            Self::R004_HOLD_ACCUMULATING => "R004_HOLD_ACCUMULATING",
            Self::R004_HOLD_COMPLETE => "R004_HOLD_COMPLETE",
            Self::R004_MOVEMENT_DETECTED => "R004_MOVEMENT_DETECTED",
            Self::R005_STATE_MAINTAINED => "R005_STATE_MAINTAINED",
            Self::R006_IGNORED => "R006_IGNORED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_ALARM_TRIGGERED => "Alarm triggered",
            Self::R002_BOARD_OCCUPIED => "Someone is on the board",
            Self::R002_BOARD_LEFT => "Board abandoned - progress reset",
            Self::R003_REPETITION_COUNTED => "Repetition counted",
            Self::R003_REPETITIONS_COMPLETE => "All repetitions done",
            Self::R004_HOLD_ACCUMULATING => "Holding still",
            Self::R004_HOLD_COMPLETE => "Stillness reached",
            Self::R004_MOVEMENT_DETECTED => "Moved during silence",
            Self::R005_STATE_MAINTAINED => "State unchanged",
            Self::R006_IGNORED => "Not applicable in this state",
        }
    }

    /// True when the operation changed state or progress
    pub fn is_effective(&self) -> bool {
        !matches!(self, Self::R005_STATE_MAINTAINED | Self::R006_IGNORED)
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
