use crate::time::{TimeError, TimeResult};

/// Pulses (ticks) per quarter note, the tick resolution of one beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ppq(i64);

impl Ppq {
  pub fn new(value: i64) -> TimeResult<Ppq> {
    if value > 0 {
      Ok(Ppq(value))
    } else {
      Err(TimeError::InvalidParameter {
        name: "ppq",
        value: value as f64,
      })
    }
  }

  pub fn get_value(&self) -> i64 {
    self.0
  }

  pub fn ticks_to_beats(&self, ticks: f64) -> f64 {
    ticks / self.0 as f64
  }
}

impl From<Ppq> for f64 {
  fn from(item: Ppq) -> Self {
    item.0 as f64
  }
}
