//! Core modules for Alarm from Hell

pub mod error;
pub mod history;
pub mod classifier;
pub mod machine;
pub mod control;
pub mod source;
pub mod calibration;
pub mod delay;
pub mod feedback;
pub mod session;

pub use error::{AlarmError, ConfigError, Result};
pub use history::{RollingHistory, Sample};
pub use classifier::MotionClassifier;
pub use machine::{transition, ComplianceMachine, Operation, Requirements, Transition};
pub use control::ControlLoop;
pub use source::{LineSource, SampleSource, ScriptedSource};
pub use calibration::{measure_average, DEFAULT_CALIBRATION_SAMPLES};
pub use delay::{format_countdown, parse_delay};
pub use feedback::{EscalationProfile, FeedbackCommand, FeedbackController, Player};
pub use session::{run_session, wait_before_alarm, SessionEnd};
