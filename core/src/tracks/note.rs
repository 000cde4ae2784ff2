use serde_derive::{Deserialize, Serialize};

use crate::time::Seconds;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Note {
  pub index: usize,
  pub start: Seconds,
  pub duration: Seconds,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstrumentInfo {
  pub name: String,
  pub notes: Vec<Note>,
}
