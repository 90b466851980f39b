//! Feedback Controller: alarm audio on its own task
//!
//! The control loop only ever sends the latest desired command over a watch
//! channel. Nothing flows back. Escalation level maps to louder, faster
//! cues with shorter pauses between them.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::types::{ComplianceState, FeedbackSettings, PlayerKind};
use crate::{
    ESCALATION_BASE_GAP_SECS, ESCALATION_BASE_SPEED, ESCALATION_BASE_VOLUME,
    ESCALATION_GAP_STEP_SECS, ESCALATION_MAX_SPEED, ESCALATION_MAX_VOLUME,
    ESCALATION_MIN_GAP_SECS, ESCALATION_STEP, SPEED_JITTER,
};

/// Length of a cue for players without real audio
const SYNTHETIC_CUE: Duration = Duration::from_millis(500);

/// Desired output, latest wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackCommand {
    Play { level: u32 },
    Stop,
}

impl FeedbackCommand {
    /// What the alarm should be doing in a given state.
    /// SILENCE plays one level softer as a reward for getting there.
    pub fn for_state(state: ComplianceState, escalation_level: u32) -> Self {
        match state {
            ComplianceState::Panic | ComplianceState::Compliance => FeedbackCommand::Play {
                level: escalation_level,
            },
            ComplianceState::Silence => FeedbackCommand::Play {
                level: escalation_level.saturating_sub(1),
            },
            ComplianceState::Sleep | ComplianceState::Done => FeedbackCommand::Stop,
        }
    }
}

/// Playback parameters for one escalation level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationProfile {
    pub volume: f64,
    pub speed: f64,
    pub gap: Duration,
}

impl EscalationProfile {
    pub fn for_level(level: u32) -> Self {
        let e = level as f64;
        let volume = (ESCALATION_BASE_VOLUME + e * ESCALATION_STEP).min(ESCALATION_MAX_VOLUME);
        let speed = (ESCALATION_BASE_SPEED + e * ESCALATION_STEP).min(ESCALATION_MAX_SPEED);
        let gap = (ESCALATION_BASE_GAP_SECS - e * ESCALATION_GAP_STEP_SECS)
            .max(ESCALATION_MIN_GAP_SECS);
        Self {
            volume,
            speed,
            gap: Duration::from_secs_f64(gap),
        }
    }

    /// Small random speed variation so the cue never sounds exactly the same
    pub fn jittered<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.speed += rng.gen_range(-SPEED_JITTER..=SPEED_JITTER);
        self
    }
}

/// Output backend
#[derive(Debug, Clone, PartialEq)]
pub enum Player {
    /// SoX `play` on a WAV file
    Sox { wav: PathBuf },
    /// Terminal bell on stderr
    Bell,
    Silent,
}

impl Player {
    pub fn from_settings(settings: &FeedbackSettings) -> Self {
        match settings.player {
            PlayerKind::Sox => Player::Sox {
                wav: settings.wav.clone(),
            },
            PlayerKind::Bell => Player::Bell,
            PlayerKind::Silent => Player::Silent,
        }
    }

    /// Arguments passed to `play` for a profile
    pub fn sox_args(wav: &std::path::Path, profile: &EscalationProfile) -> Vec<String> {
        vec![
            "-q".to_string(),
            wav.display().to_string(),
            "vol".to_string(),
            format!("{:.2}", profile.volume),
            "speed".to_string(),
            format!("{:.3}", profile.speed),
        ]
    }

    /// Play one cue. Dropping the future kills a running `play`.
    async fn play_once(&self, profile: &EscalationProfile) -> std::io::Result<()> {
        match self {
            Player::Sox { wav } => {
                let status = Command::new("play")
                    .args(Self::sox_args(wav, profile))
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .status()
                    .await?;
                if !status.success() {
                    debug!(%status, "play exited unsuccessfully");
                }
                Ok(())
            }
            Player::Bell => {
                eprint!("\x07");
                tokio::time::sleep(SYNTHETIC_CUE).await;
                Ok(())
            }
            Player::Silent => {
                tokio::time::sleep(SYNTHETIC_CUE).await;
                Ok(())
            }
        }
    }
}

/// Handle to the background feedback task
#[derive(Debug)]
pub struct FeedbackController {
    tx: watch::Sender<FeedbackCommand>,
    task: JoinHandle<()>,
}

impl FeedbackController {
    /// Spawn the feedback task on the current tokio runtime
    pub fn spawn(player: Player) -> Self {
        let (tx, rx) = watch::channel(FeedbackCommand::Stop);
        let task = tokio::spawn(run_feedback(player, rx));
        Self { tx, task }
    }

    /// Play at `level`. Idempotent.
    pub fn start(&self, level: u32) {
        self.send(FeedbackCommand::Play { level });
    }

    /// Silence output. Idempotent.
    pub fn stop(&self) {
        self.send(FeedbackCommand::Stop);
    }

    pub fn send(&self, command: FeedbackCommand) {
        self.tx.send_if_modified(|current| {
            if *current == command {
                false
            } else {
                *current = command;
                true
            }
        });
    }

    /// Latest command sent
    pub fn desired(&self) -> FeedbackCommand {
        *self.tx.borrow()
    }

    /// Stop output and wait for the task to exit
    pub async fn shutdown(self) {
        self.stop();
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            warn!(error = %e, "feedback task ended abnormally");
        }
    }
}

async fn run_feedback(player: Player, mut rx: watch::Receiver<FeedbackCommand>) {
    let mut rng = StdRng::from_entropy();
    loop {
        let command = *rx.borrow_and_update();
        let level = match command {
            FeedbackCommand::Stop => {
                if rx.changed().await.is_err() {
                    break;
                }
                continue;
            }
            FeedbackCommand::Play { level } => level,
        };

        let profile = EscalationProfile::for_level(level).jittered(&mut rng);

        // Any change of command interrupts the cue in progress
        tokio::select! {
            result = player.play_once(&profile) => {
                if let Err(e) = result {
                    warn!(error = %e, "alarm cue failed");
                }
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(profile.gap) => {}
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    debug!("feedback task exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_for_state() {
        assert_eq!(
            FeedbackCommand::for_state(ComplianceState::Panic, 2),
            FeedbackCommand::Play { level: 2 }
        );
        assert_eq!(
            FeedbackCommand::for_state(ComplianceState::Compliance, 0),
            FeedbackCommand::Play { level: 0 }
        );
        assert_eq!(
            FeedbackCommand::for_state(ComplianceState::Silence, 2),
            FeedbackCommand::Play { level: 1 }
        );
        assert_eq!(
            FeedbackCommand::for_state(ComplianceState::Silence, 0),
            FeedbackCommand::Play { level: 0 }
        );
        assert_eq!(
            FeedbackCommand::for_state(ComplianceState::Done, 5),
            FeedbackCommand::Stop
        );
        assert_eq!(
            FeedbackCommand::for_state(ComplianceState::Sleep, 0),
            FeedbackCommand::Stop
        );
    }

    #[test]
    fn test_profile_level_zero() {
        let p = EscalationProfile::for_level(0);
        assert!((p.volume - 0.6).abs() < 1e-9);
        assert!((p.speed - 1.0).abs() < 1e-9);
        assert_eq!(p.gap, Duration::from_secs_f64(0.4));
    }

    #[test]
    fn test_profile_saturates() {
        let p = EscalationProfile::for_level(50);
        assert_eq!(p.volume, ESCALATION_MAX_VOLUME);
        assert_eq!(p.speed, ESCALATION_MAX_SPEED);
        assert_eq!(p.gap, Duration::from_secs_f64(ESCALATION_MIN_GAP_SECS));
    }

    #[test]
    fn test_profile_is_monotonic() {
        for level in 0..10 {
            let a = EscalationProfile::for_level(level);
            let b = EscalationProfile::for_level(level + 1);
            assert!(b.volume >= a.volume);
            assert!(b.speed >= a.speed);
            assert!(b.gap <= a.gap);
        }
    }

    #[test]
    fn test_jitter_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let base = EscalationProfile::for_level(3);
        for _ in 0..100 {
            let p = base.jittered(&mut rng);
            assert!((p.speed - base.speed).abs() <= SPEED_JITTER + 1e-12);
            assert_eq!(p.volume, base.volume);
        }
    }

    #[test]
    fn test_sox_args() {
        let profile = EscalationProfile::for_level(1);
        let args = Player::sox_args(std::path::Path::new("alarm.wav"), &profile);
        assert_eq!(args, vec!["-q", "alarm.wav", "vol", "0.72", "speed", "1.120"]);
    }
}
