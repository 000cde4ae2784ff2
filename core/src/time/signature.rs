use std::str::FromStr;

use crate::time::{parse_fields, TimeError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signature {
  num_beats: f64,  // numerator
  note_value: f64, // denominator
}

impl Signature {
  pub fn new(num_beats: f64, note_value: f64) -> Signature {
    Signature {
      num_beats,
      note_value,
    }
  }

  pub fn get_num_beats(&self) -> f64 {
    self.num_beats
  }

  pub fn get_note_value(&self) -> f64 {
    self.note_value
  }
}

impl FromStr for Signature {
  type Err = TimeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let fields = parse_fields("time signature", s, 2)?;
    Ok(Signature::new(fields[0], fields[1]))
  }
}
