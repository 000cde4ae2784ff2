pub mod decoder;
pub mod tempo_map;

pub use self::decoder::SmfReader;
pub use self::tempo_map::TempoMap;

use std::path::Path;

use failure::Fail;

use crate::time::Seconds;

pub const DRUM_CHANNEL: u8 = 9;

#[derive(Debug, Fail)]
pub enum MidiError {
  #[fail(display = "Failed to read the MIDI file: {}", cause)]
  Io { cause: String },

  #[fail(display = "Failed to parse the MIDI file: {}", cause)]
  Parse { cause: String },
}

pub type MidiResult<T> = Result<T, MidiError>;

#[derive(Debug, Clone, PartialEq)]
pub struct MidiNote {
  pub key: u8,
  pub velocity: u8,
  pub start: Seconds,
  pub end: Seconds,
}

impl MidiNote {
  pub fn new(key: u8, velocity: u8, start: Seconds, end: Seconds) -> MidiNote {
    MidiNote {
      key,
      velocity,
      start,
      end,
    }
  }

  pub fn duration(&self) -> Seconds {
    self.end - self.start
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
  pub name: String,
  pub program: u8,
  pub is_drum: bool,
  pub notes: Vec<MidiNote>,
}

impl Instrument {
  pub fn new<T>(name: T, program: u8, is_drum: bool) -> Instrument
  where
    T: Into<String>,
  {
    Instrument {
      name: name.into(),
      program,
      is_drum,
      notes: Vec::new(),
    }
  }

  pub fn with_notes(mut self, notes: Vec<MidiNote>) -> Instrument {
    self.notes = notes;
    self
  }
}

/// Source of decoded instruments, with note times already in seconds.
pub trait MidiReader {
  fn read_instruments(&self, path: &Path) -> MidiResult<Vec<Instrument>>;
}
