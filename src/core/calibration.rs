//! Board calibration: raw totals → kilograms
//!
//! Two measurements: the empty board (zero offset) and the user standing
//! still with a known body weight (scale).

use tracing::info;

use crate::core::error::{AlarmError, Result};
use crate::core::source::SampleSource;
use crate::types::Calibration;

/// Default samples per measurement, about 5 s at board rate
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 150;

impl Calibration {
    /// Derive offset and scale from the two averaged measurements
    pub fn from_measurements(empty_raw: f64, loaded_raw: f64, body_kg: f64) -> Result<Self> {
        if !(body_kg.is_finite() && body_kg > 0.0) {
            return Err(AlarmError::Calibration(format!(
                "body weight must be positive, got {}",
                body_kg
            )));
        }
        let span = loaded_raw - empty_raw;
        if !(span.is_finite() && span > 0.0) {
            return Err(AlarmError::Calibration(format!(
                "loaded reading {:.2} is not above empty reading {:.2}",
                loaded_raw, empty_raw
            )));
        }
        Ok(Calibration::new(empty_raw, body_kg / span))
    }
}

/// Average the next `samples` raw readings
pub fn measure_average<S: SampleSource + ?Sized>(source: &mut S, samples: usize) -> Result<f64> {
    let samples = samples.max(1);
    let mut sum = 0.0;
    for _ in 0..samples {
        match source.read_raw()? {
            Some(raw) => sum += raw,
            None => return Err(AlarmError::SourceExhausted),
        }
    }
    let mean = sum / samples as f64;
    info!(samples, mean, "measured raw average");
    Ok(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::ScriptedSource;

    #[test]
    fn test_from_measurements() {
        let calibration = Calibration::from_measurements(322.0, 8386.0, 82.5).unwrap();
        assert_eq!(calibration.zero_offset, 322.0);
        assert!((calibration.raw_to_kg(8386.0) - 82.5).abs() < 1e-9);
        assert!(calibration.raw_to_kg(322.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_loaded_below_empty() {
        assert!(matches!(
            Calibration::from_measurements(500.0, 400.0, 80.0),
            Err(AlarmError::Calibration(_))
        ));
        assert!(Calibration::from_measurements(500.0, 500.0, 80.0).is_err());
    }

    #[test]
    fn test_rejects_bad_body_weight() {
        assert!(Calibration::from_measurements(0.0, 100.0, 0.0).is_err());
        assert!(Calibration::from_measurements(0.0, 100.0, f64::NAN).is_err());
    }

    #[test]
    fn test_measure_average() {
        let mut source = ScriptedSource::new([10.0, 20.0, 30.0, 99.0]);
        assert_eq!(measure_average(&mut source, 3).unwrap(), 20.0);
        assert_eq!(source.remaining(), 1);
    }

    #[test]
    fn test_measure_average_short_source() {
        let mut source = ScriptedSource::new([10.0]);
        assert!(matches!(
            measure_average(&mut source, 5),
            Err(AlarmError::SourceExhausted)
        ));
    }
}
