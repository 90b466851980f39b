//! Progress counters owned by the compliance machine

use serde::{Deserialize, Serialize};

/// Progress through the current attempt plus the escalation ratchet.
///
/// Only the compliance machine mutates this; everyone else gets copies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressContext {
    /// Repetitions counted in COMPLIANCE (never above the requirement)
    pub squats_done: u32,
    /// Seconds held still in SILENCE
    pub still_seconds: f64,
    /// Times the board was abandoned mid-protocol; never decreases
    pub escalation_level: u32,
}

impl ProgressContext {
    pub fn new() -> Self {
        Self::default()
    }
}
