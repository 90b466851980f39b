//! Alarm delay parsing: "10s", "5m", "2h", "8h10m", "1h30m", "45m20s"

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::{AlarmError, Result};

lazy_static! {
    /// Whole string must be a run of <digits><unit> tokens
    static ref RE_DELAY: Regex = Regex::new(r"^(?:\d+[hms])+$").unwrap();

    static ref RE_DELAY_TOKEN: Regex = Regex::new(r"(\d+)([hms])").unwrap();
}

/// Parse a combined delay string into a duration
pub fn parse_delay(value: &str) -> Result<Duration> {
    let value = value.trim().to_lowercase();
    if !RE_DELAY.is_match(&value) {
        return Err(AlarmError::InvalidDelay(value));
    }

    let mut total: u64 = 0;
    for caps in RE_DELAY_TOKEN.captures_iter(&value) {
        let amount: u64 = caps[1]
            .parse()
            .map_err(|_| AlarmError::InvalidDelay(value.clone()))?;
        let unit = match &caps[2] {
            "h" => 3600,
            "m" => 60,
            _ => 1,
        };
        total = amount
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| AlarmError::InvalidDelay(value.clone()))?;
    }
    Ok(Duration::from_secs(total))
}

/// Countdown text, e.g. "07:05" or "8:10:00"
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
