//! Compliance state definitions

use colored::Color;
use serde::{Deserialize, Serialize};

/// The five states of an alarm session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceState {
    /// Initial state, alarm not yet triggered
    Sleep,
    /// Alarm ringing, nobody on the board
    Panic,
    /// On the board, repetitions being counted
    Compliance,
    /// Repetitions done, holding still
    Silence,
    /// Terminal: alarm dismissed
    Done,
}

impl ComplianceState {
    /// Terminal color for display
    pub fn color(&self) -> Color {
        match self {
            ComplianceState::Sleep => Color::BrightBlack,
            ComplianceState::Panic => Color::Red,
            ComplianceState::Compliance => Color::Yellow,
            ComplianceState::Silence => Color::Cyan,
            ComplianceState::Done => Color::Green,
        }
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            ComplianceState::Sleep => "💤",
            ComplianceState::Panic => "🚨",
            ComplianceState::Compliance => "🏋",
            ComplianceState::Silence => "🤫",
            ComplianceState::Done => "✅",
        }
    }

    /// True once the alarm has been dismissed
    pub fn is_terminal(&self) -> bool {
        matches!(self, ComplianceState::Done)
    }
}

impl std::fmt::Display for ComplianceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComplianceState::Sleep => "SLEEP",
            ComplianceState::Panic => "PANIC",
            ComplianceState::Compliance => "COMPLIANCE",
            ComplianceState::Silence => "SILENCE",
            ComplianceState::Done => "DONE",
        };
        write!(f, "{}", name)
    }
}
