//! Core types for Alarm from Hell

mod state;
mod event;
mod context;
mod reason;
mod output;
mod config;

pub use state::ComplianceState;
pub use event::MotionEvent;
pub use context::ProgressContext;
pub use reason::ReasonCode;
pub use output::StatusOutput;
pub use config::{AlarmConfig, Calibration, FeedbackSettings, PlayerKind, Settings};
