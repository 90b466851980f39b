//! Sample sources: where raw board readings come from
//!
//! Device discovery and the board link live outside this crate. Anything
//! that can print board totals, one per line, can drive an alarm session.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::core::error::{AlarmError, Result};

/// Blocking producer of raw board totals
pub trait SampleSource: Send {
    /// Next raw reading; `Ok(None)` once the stream has ended
    fn read_raw(&mut self) -> Result<Option<f64>>;
}

/// Line-oriented reader.
///
/// Each line is either a single total or the four corner sensors
/// (`tl tr bl br`), which are summed. Blank lines and `#` comments are skipped.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl<R: BufRead + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }
}

impl LineSource<Box<dyn BufRead + Send>> {
    /// Open a file, or stdin for `-`
    pub fn open(path: &Path) -> Result<Self> {
        let reader: Box<dyn BufRead + Send> = if path == Path::new("-") {
            Box::new(BufReader::new(io::stdin()))
        } else {
            Box::new(BufReader::new(File::open(path)?))
        };
        Ok(Self::new(reader))
    }
}

/// One parsed input line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Blank or comment-only line
    Blank,
    Total(f64),
    Invalid,
}

/// Parse one line into a board total
pub fn parse_reading(line: &str) -> Reading {
    let content = line.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Reading::Blank;
    }

    let fields: std::result::Result<Vec<f64>, _> = content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .map(str::parse::<f64>)
        .collect();

    match fields {
        Ok(values) if values.len() == 1 || values.len() == 4 => {
            let total: f64 = values.iter().sum();
            if total.is_finite() {
                Reading::Total(total)
            } else {
                Reading::Invalid
            }
        }
        _ => Reading::Invalid,
    }
}

impl<R: BufRead + Send> SampleSource for LineSource<R> {
    fn read_raw(&mut self) -> Result<Option<f64>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            match parse_reading(&self.buf) {
                Reading::Blank => continue,
                Reading::Total(total) => return Ok(Some(total)),
                Reading::Invalid => {
                    return Err(AlarmError::SampleParse {
                        line: self.line_number,
                        content: self.buf.trim_end().to_string(),
                    })
                }
            }
        }
    }
}

/// Replays a fixed list of raw readings
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    readings: VecDeque<f64>,
}

impl ScriptedSource {
    pub fn new(readings: impl IntoIterator<Item = f64>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Append `count` copies of `raw`
    pub fn hold(mut self, raw: f64, count: usize) -> Self {
        self.readings.extend(std::iter::repeat(raw).take(count));
        self
    }

    /// Append a sequence of readings
    pub fn then(mut self, readings: impl IntoIterator<Item = f64>) -> Self {
        self.readings.extend(readings);
        self
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl SampleSource for ScriptedSource {
    fn read_raw(&mut self) -> Result<Option<f64>> {
        Ok(self.readings.pop_front())
    }
}
