//! Session runner: source → control loop → feedback, paced at 30 Hz
//!
//! The sample source is read on its own thread because reads block with no
//! timeout. Readings cross into the async loop through a channel of
//! capacity 1, so each tick consumes exactly one blocking read. The control
//! loop and its state never leave this task.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::control::ControlLoop;
use crate::core::error::Result;
use crate::core::feedback::{FeedbackCommand, FeedbackController};
use crate::core::source::SampleSource;
use crate::types::{AlarmConfig, Calibration, StatusOutput};
use crate::{RENDER_INTERVAL_SECS, TICK_DT};

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEnd {
    /// Protocol finished: alarm dismissed
    Completed,
    /// Sample stream ended first
    SourceExhausted,
    /// Shutdown signal (Ctrl-C)
    Interrupted,
}

/// Run one alarm session until DONE, end of input, or `shutdown` resolves.
///
/// `on_status` is called at most every 100 ms, and always for the final
/// DONE status. Feedback is stopped on every exit path.
///
/// The source is not released on return: its reader thread drops it only
/// after the read in progress completes.
pub async fn run_session<S, F, R>(
    source: S,
    calibration: Calibration,
    config: &AlarmConfig,
    feedback: &FeedbackController,
    shutdown: F,
    mut on_status: R,
) -> Result<SessionEnd>
where
    S: SampleSource + 'static,
    F: Future<Output = ()>,
    R: FnMut(&StatusOutput),
{
    let mut control = ControlLoop::new(config)?;

    let (tx, mut rx) = mpsc::channel::<Result<f64>>(1);
    // Detached: a read may block forever, the thread exits on its next send
    std::thread::Builder::new()
        .name("sample-pump".to_string())
        .spawn(move || pump_samples(source, calibration, tx))?;

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(TICK_DT));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let render_every = Duration::from_secs_f64(RENDER_INTERVAL_SECS);
    let started = Instant::now();
    let mut last_render: Option<Instant> = None;
    tokio::pin!(shutdown);

    info!(
        required_squats = config.required_squats,
        required_still_time = config.required_still_time_sec,
        "session started"
    );

    let outcome = loop {
        let reading = tokio::select! {
            _ = &mut shutdown => break Ok(SessionEnd::Interrupted),
            reading = next_reading(&mut ticker, &mut rx) => reading,
        };

        let weight_kg = match reading {
            None => break Ok(SessionEnd::SourceExhausted),
            Some(Err(e)) => break Err(e),
            Some(Ok(kg)) => kg,
        };

        let status = control.tick(weight_kg, started.elapsed().as_secs_f64());
        feedback.send(FeedbackCommand::for_state(
            status.state,
            status.progress.escalation_level,
        ));

        if status.state.is_terminal() {
            on_status(&status);
            break Ok(SessionEnd::Completed);
        }

        let now = Instant::now();
        if last_render.map_or(true, |t| now.duration_since(t) >= render_every) {
            on_status(&status);
            last_render = Some(now);
        }
    };

    feedback.stop();
    match &outcome {
        Ok(end) => info!(?end, ticks = control.tick_count(), "session ended"),
        Err(e) => warn!(error = %e, "session aborted"),
    }
    outcome
}

/// Wait for the next tick, then take one reading
async fn next_reading(
    ticker: &mut tokio::time::Interval,
    rx: &mut mpsc::Receiver<Result<f64>>,
) -> Option<Result<f64>> {
    ticker.tick().await;
    rx.recv().await
}

/// Owns the source for its whole life; dropping it releases the device
fn pump_samples<S: SampleSource>(mut source: S, calibration: Calibration, tx: mpsc::Sender<Result<f64>>) {
    loop {
        let item = match source.read_raw() {
            Ok(Some(raw)) => Ok(calibration.raw_to_kg(raw)),
            Ok(None) => break,
            Err(e) => Err(e),
        };
        let fatal = item.is_err();
        if tx.blocking_send(item).is_err() || fatal {
            break;
        }
    }
    debug!("sample pump finished");
}

/// Count down before the alarm. Returns false if `shutdown` fired first.
pub async fn wait_before_alarm<F, C>(delay: Duration, shutdown: F, mut on_tick: C) -> bool
where
    F: Future<Output = ()>,
    C: FnMut(Duration),
{
    let deadline = Instant::now() + delay;
    tokio::pin!(shutdown);
    info!(secs = delay.as_secs(), "alarm scheduled");

    loop {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        let remaining = deadline - now;
        on_tick(remaining);

        let step = remaining.min(Duration::from_secs(1));
        tokio::select! {
            _ = &mut shutdown => return false,
            _ = tokio::time::sleep(step) => {}
        }
    }
}
