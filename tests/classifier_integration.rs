//! Integration tests for the motion classifier
//!
//! Tests the windowed thresholds: warm-up, stomp cooldown, squat hysteresis

use alarm_from_hell::core::MotionClassifier;
use alarm_from_hell::types::{AlarmConfig, MotionEvent};
use alarm_from_hell::WARMUP_SAMPLES;
use proptest::prelude::*;

fn classifier(config: &AlarmConfig) -> MotionClassifier {
    MotionClassifier::new(config).unwrap()
}

/// (weight, time step) pairs turned into increasing timestamps
fn timeline(steps: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut t = 0.0;
    steps
        .iter()
        .map(|&(w, dt)| {
            t += dt;
            (w, t)
        })
        .collect()
}

/// Spike of 30 kg inside 0.15 s on the fifth sample
#[test]
fn test_stomp_on_spike_within_window() {
    let config = AlarmConfig {
        stomp_delta_kg: 25.0,
        ..AlarmConfig::default()
    };
    let mut c = classifier(&config);

    let samples = [(50.0, 0.00), (50.0, 0.03), (50.0, 0.06), (50.0, 0.09), (80.0, 0.12)];
    let events: Vec<MotionEvent> = samples.iter().map(|&(w, t)| c.classify(w, t)).collect();

    assert_eq!(&events[..4], &[MotionEvent::None; 4]);
    assert_eq!(events[4], MotionEvent::Stomp);
}

/// A stomp wins over a squat recovery on the same sample
#[test]
fn test_stomp_takes_precedence() {
    let mut c = classifier(&AlarmConfig::default());
    let mut t = 0.0;
    for _ in 0..30 {
        c.classify(80.0, t);
        t += 0.2;
    }
    // Drop into the squat band, then slam back well above baseline
    c.classify(77.0, t);
    assert!(c.in_squat());
    c.classify(76.0, t + 0.05);
    assert_eq!(c.classify(110.0, t + 0.1), MotionEvent::Stomp);
    // The squat sub-state was not evaluated on the stomp tick
    assert!(c.in_squat());
}

/// Entering a squat, wobbling between the two thresholds, then recovering
#[test]
fn test_squat_hysteresis_band() {
    let mut c = classifier(&AlarmConfig::default());
    let mut t = 0.0;
    for _ in 0..30 {
        c.classify(80.0, t);
        t += 0.1;
    }

    // Enter: 77 < ~79.9 - 1.5
    assert_eq!(c.classify(77.0, t), MotionEvent::None);
    assert!(c.in_squat());

    // Wobble between entry (baseline - 1.5) and exit (baseline - 0.75)
    for _ in 0..5 {
        t += 0.1;
        let w = c.baseline() - 1.1;
        assert_ne!(c.classify(w, t), MotionEvent::Squat);
        assert!(c.in_squat());
    }

    t += 0.1;
    assert_eq!(c.classify(80.0, t), MotionEvent::Squat);
    assert!(!c.in_squat());
}

#[test]
fn test_stillness_is_level_triggered_until_movement() {
    let config = AlarmConfig {
        required_still_time_sec: 1.0,
        ..AlarmConfig::default()
    };
    let mut c = classifier(&config);

    let mut stillness = 0;
    for i in 0..60 {
        if c.classify(70.0, i as f64 / 30.0) == MotionEvent::Stillness {
            stillness += 1;
        }
    }
    // Ticks 30..59 are all at or past one second
    assert_eq!(stillness, 30);

    assert_eq!(c.classify(75.0, 2.0), MotionEvent::None);
    assert_eq!(c.classify(75.0, 2.1), MotionEvent::None);
}

fn weight_steps() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..150.0, 0.001f64..0.2), 0..250)
}

/// Mostly standing around 80 kg with dips, so the squat band gets exercised
fn standing_steps() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((72.0f64..82.0, 0.02f64..0.06), 5..300)
}

proptest! {
    #[test]
    fn prop_warmup_emits_nothing(steps in weight_steps()) {
        let mut c = classifier(&AlarmConfig::default());
        for (i, (w, t)) in timeline(&steps).into_iter().enumerate() {
            let event = c.classify(w, t);
            if i + 1 < WARMUP_SAMPLES {
                prop_assert_eq!(event, MotionEvent::None);
            }
        }
    }

    #[test]
    fn prop_stomps_respect_cooldown(
        steps in weight_steps(),
        cooldown in 0.0f64..1.5,
    ) {
        let config = AlarmConfig {
            stomp_cooldown_sec: cooldown,
            ..AlarmConfig::default()
        };
        let mut c = classifier(&config);
        let mut last_stomp: Option<f64> = None;

        for (w, t) in timeline(&steps) {
            if c.classify(w, t) == MotionEvent::Stomp {
                if let Some(prev) = last_stomp {
                    prop_assert!(t - prev >= cooldown);
                }
                last_stomp = Some(t);
            }
        }
    }

    #[test]
    fn prop_squat_exits_only_above_recovery_threshold(steps in standing_steps()) {
        let config = AlarmConfig::default();
        let half_band = config.stillness_tolerance_kg / 2.0;
        let mut c = classifier(&config);

        for (w, t) in timeline(&steps) {
            let was_in_squat = c.in_squat();
            let event = c.classify(w, t);
            if !was_in_squat || event == MotionEvent::Stomp {
                continue;
            }

            let recovered = w >= c.baseline() - half_band;
            prop_assert_eq!(c.in_squat(), !recovered);
            prop_assert_eq!(event == MotionEvent::Squat, recovered);
        }
    }

    #[test]
    fn prop_at_most_one_event_and_never_panics(steps in weight_steps()) {
        let mut c = classifier(&AlarmConfig::default());
        for (w, t) in timeline(&steps) {
            let event = c.classify(w, t);
            prop_assert_eq!(c.last_event(), event);
        }
        prop_assert!(c.sample_count() <= 30);
    }
}

/// Out-of-order timestamps are tolerated
#[test]
fn test_backwards_time_does_not_panic() {
    let mut c = classifier(&AlarmConfig::default());
    for i in 0..40 {
        let t = if i % 3 == 0 { -(i as f64) } else { i as f64 * 0.01 };
        c.classify(60.0 + (i % 7) as f64, t);
    }
    assert_eq!(c.sample_count(), 30);
}
