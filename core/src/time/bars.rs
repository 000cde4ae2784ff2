use std::fmt;
use std::str::FromStr;

use crate::time::{parse_fields, Ppq, Signature, TimeError};

/// A bar:beat:tick position with 1-indexed bars and beats and 0-indexed ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarsTime {
  bars: f64,
  beats: f64,
  ticks: f64,
}

impl BarsTime {
  pub fn new(bars: f64, beats: f64, ticks: f64) -> BarsTime {
    BarsTime { bars, beats, ticks }
  }

  pub fn start() -> BarsTime {
    BarsTime::new(1.0, 1.0, 0.0)
  }

  pub fn get_bars(&self) -> f64 {
    self.bars
  }

  pub fn get_beats(&self) -> f64 {
    self.beats
  }

  pub fn get_ticks(&self) -> f64 {
    self.ticks
  }

  /// Whole beats elapsed since `1:01:00`. Only the signature numerator is used.
  pub fn to_beats(&self, signature: Signature, ppq: Ppq) -> f64 {
    (self.bars - 1.0) * signature.get_num_beats() + (self.beats - 1.0) + ppq.ticks_to_beats(self.ticks)
  }
}

impl FromStr for BarsTime {
  type Err = TimeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let fields = parse_fields("bar:beat:tick", s, 3)?;
    Ok(BarsTime::new(fields[0], fields[1], fields[2]))
  }
}

impl fmt::Display for BarsTime {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}:{:02}:{:02}", self.bars, self.beats, self.ticks)
  }
}
