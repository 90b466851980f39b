//! Compliance Machine: the alarm protocol
//!
//! State transitions:
//! - SLEEP → PANIC: start
//! - PANIC → COMPLIANCE: board occupied
//! - COMPLIANCE → SILENCE: required repetitions reached
//! - SILENCE → DONE: required still time reached
//! - SILENCE → COMPLIANCE: moved (repetitions kept)
//! - COMPLIANCE/SILENCE → PANIC: board left (progress wiped, escalation +1)
//!
//! Every operation is total: anything not listed above is a no-op.

use crate::core::error::ConfigError;
use crate::types::{AlarmConfig, ComplianceState, ProgressContext, ReasonCode};

/// Inputs to the transition function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Start,
    Occupied,
    Repetition,
    /// Seconds of stillness to credit
    HoldTick(f64),
    Moved,
    LeftPlatform,
}

/// Result of applying one operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: ComplianceState,
    pub context: ProgressContext,
    pub reason: ReasonCode,
}

impl Transition {
    fn ignored(state: ComplianceState, context: ProgressContext) -> Self {
        Self {
            state,
            context,
            reason: ReasonCode::R006_IGNORED,
        }
    }
}

/// Requirements the transition function needs from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Requirements {
    pub squats: u32,
    pub still_time_sec: f64,
}

impl From<&AlarmConfig> for Requirements {
    fn from(config: &AlarmConfig) -> Self {
        Self {
            squats: config.required_squats,
            still_time_sec: config.required_still_time_sec,
        }
    }
}

/// Pure transition table: (state, context, op) → (state, context, reason)
pub fn transition(
    state: ComplianceState,
    context: ProgressContext,
    op: Operation,
    required: Requirements,
) -> Transition {
    use ComplianceState::*;

    let mut ctx = context;
    match (state, op) {
        (Sleep, Operation::Start) => Transition {
            state: Panic,
            context: ctx,
            reason: ReasonCode::R001_ALARM_TRIGGERED,
        },

        (Panic, Operation::Occupied) => Transition {
            state: Compliance,
            context: ctx,
            reason: ReasonCode::R002_BOARD_OCCUPIED,
        },

        (Compliance, Operation::Repetition) => {
            // Saturates: a repetition after re-entry from SILENCE only
            // sends the user back, it cannot overshoot the requirement
            ctx.squats_done = (ctx.squats_done + 1).min(required.squats);
            if ctx.squats_done >= required.squats {
                ctx.still_seconds = 0.0;
                Transition {
                    state: Silence,
                    context: ctx,
                    reason: ReasonCode::R003_REPETITIONS_COMPLETE,
                }
            } else {
                Transition {
                    state: Compliance,
                    context: ctx,
                    reason: ReasonCode::R003_REPETITION_COUNTED,
                }
            }
        }

        (Silence, Operation::HoldTick(dt)) => {
            if dt.is_finite() && dt > 0.0 {
                ctx.still_seconds += dt;
            }
            if ctx.still_seconds >= required.still_time_sec {
                Transition {
                    state: Done,
                    context: ctx,
                    reason: ReasonCode::R004_HOLD_COMPLETE,
                }
            } else {
                Transition {
                    state: Silence,
                    context: ctx,
                    reason: ReasonCode::R004_HOLD_ACCUMULATING,
                }
            }
        }

        (Silence, Operation::Moved) => {
            ctx.still_seconds = 0.0;
            Transition {
                state: Compliance,
                context: ctx,
                reason: ReasonCode::R004_MOVEMENT_DETECTED,
            }
        }

        (Compliance | Silence, Operation::LeftPlatform) => {
            ctx.squats_done = 0;
            ctx.still_seconds = 0.0;
            ctx.escalation_level = ctx.escalation_level.saturating_add(1);
            Transition {
                state: Panic,
                context: ctx,
                reason: ReasonCode::R002_BOARD_LEFT,
            }
        }

        _ => Transition::ignored(state, context),
    }
}

/// Compliance state machine: owns state and progress
#[derive(Debug, Clone)]
pub struct ComplianceMachine {
    state: ComplianceState,
    context: ProgressContext,
    required: Requirements,
}

impl ComplianceMachine {
    /// Create a machine in SLEEP, rejecting invalid tunables
    pub fn new(config: &AlarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: ComplianceState::Sleep,
            context: ProgressContext::new(),
            required: Requirements::from(config),
        })
    }

    /// Apply any operation; never fails
    pub fn apply(&mut self, op: Operation) -> ReasonCode {
        let next = transition(self.state, self.context, op, self.required);
        self.state = next.state;
        self.context = next.context;
        next.reason
    }

    pub fn start(&mut self) -> ReasonCode {
        self.apply(Operation::Start)
    }

    pub fn occupied(&mut self) -> ReasonCode {
        self.apply(Operation::Occupied)
    }

    pub fn repetition(&mut self) -> ReasonCode {
        self.apply(Operation::Repetition)
    }

    pub fn hold_tick(&mut self, dt: f64) -> ReasonCode {
        self.apply(Operation::HoldTick(dt))
    }

    pub fn moved(&mut self) -> ReasonCode {
        self.apply(Operation::Moved)
    }

    pub fn left_platform(&mut self) -> ReasonCode {
        self.apply(Operation::LeftPlatform)
    }

    pub fn state(&self) -> ComplianceState {
        self.state
    }

    pub fn context(&self) -> ProgressContext {
        self.context
    }

    pub fn required_squats(&self) -> u32 {
        self.required.squats
    }

    pub fn required_still_time(&self) -> f64 {
        self.required.still_time_sec
    }

    pub fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    /// One-line debug summary
    pub fn status_line(&self) -> String {
        format!(
            "state={} | squats={}/{} | still={:.1}/{}s | escalation={}",
            self.state,
            self.context.squats_done,
            self.required.squats,
            self.context.still_seconds,
            self.required.still_time_sec,
            self.context.escalation_level
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
