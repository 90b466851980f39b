//! Output structures for terminal display

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::types::{ComplianceState, MotionEvent, ProgressContext, ReasonCode};

/// Snapshot produced after every control-loop tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutput {
    /// Wall-clock time of the tick
    pub timestamp: DateTime<Utc>,
    /// Calibrated weight (kg)
    pub weight_kg: f64,
    /// Current state
    pub state: ComplianceState,
    /// Progress counters
    pub progress: ProgressContext,
    pub required_squats: u32,
    pub required_still_time_sec: f64,
    /// Classifier output this tick
    pub event: MotionEvent,
    /// Most significant transition this tick
    pub reason: ReasonCode,
}

impl StatusOutput {
    pub fn new(
        weight_kg: f64,
        state: ComplianceState,
        progress: ProgressContext,
        required: (u32, f64),
        event: MotionEvent,
        reason: ReasonCode,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            weight_kg,
            state,
            progress,
            required_squats: required.0,
            required_still_time_sec: required.1,
            event,
            reason,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        format!(
            "{} {} | {:.1} kg | squats={}/{} | still={:.1}s | escalation={} | {}",
            self.state.emoji(),
            self.state.to_string().color(self.state.color()).bold(),
            self.weight_kg,
            self.progress.squats_done,
            self.required_squats,
            self.progress.still_seconds,
            self.progress.escalation_level,
            self.reason.code().dimmed()
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "state={} | weight={:.1} | squats={}/{} | still={:.1}s | escalation={} | event={} | reason={}",
            self.state,
            self.weight_kg,
            self.progress.squats_done,
            self.required_squats,
            self.progress.still_seconds,
            self.progress.escalation_level,
            self.event,
            self.reason.code()
        )
    }
}
