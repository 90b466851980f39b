//! Semantic motion events produced by the classifier

use serde::{Deserialize, Serialize};

/// At most one event is produced per classified sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotionEvent {
    /// Short, large weight spike
    Stomp,
    /// Dip below the standing baseline followed by recovery
    Squat,
    /// No movement for the required still time (level-triggered)
    Stillness,
    #[default]
    None,
}

impl MotionEvent {
    /// Stomps and squats both count as a repetition
    pub fn is_repetition(&self) -> bool {
        matches!(self, MotionEvent::Stomp | MotionEvent::Squat)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, MotionEvent::None)
    }
}

impl std::fmt::Display for MotionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MotionEvent::Stomp => "STOMP",
            MotionEvent::Squat => "SQUAT",
            MotionEvent::Stillness => "STILLNESS",
            MotionEvent::None => "NONE",
        };
        write!(f, "{}", name)
    }
}
