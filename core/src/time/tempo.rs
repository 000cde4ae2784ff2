use crate::time::{Seconds, TimeError, TimeResult};

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Beats per minute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo(f64);

impl Tempo {
  pub fn new(value: f64) -> TimeResult<Tempo> {
    if value.is_finite() && value > 0.0 {
      Ok(Tempo(value))
    } else {
      Err(TimeError::InvalidParameter { name: "bpm", value })
    }
  }

  pub fn get_value(&self) -> f64 {
    self.0
  }

  pub fn seconds_per_beat(&self) -> Seconds {
    SECONDS_PER_MINUTE / self.0
  }

  pub fn beats_to_seconds(&self, beats: f64) -> Seconds {
    beats * self.seconds_per_beat()
  }
}

impl From<Tempo> for f64 {
  fn from(item: Tempo) -> Self {
    item.0
  }
}
