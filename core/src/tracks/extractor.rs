use failure::Fail;

use crate::midi::Instrument;
use crate::tracks::{InstrumentInfo, Note};

#[derive(Debug, Fail, PartialEq)]
pub enum TrackError {
  #[fail(display = "Number of instruments is {} which does not equal to 1", count)]
  InstrumentCount { count: usize },

  #[fail(display = "Instrument '{}' has no notes", name)]
  EmptyTrack { name: String },
}

pub type TrackResult<T> = Result<T, TrackError>;

/// Extracts the notes of the only instrument of a score.
///
/// Note starts are shifted so that the first note in source order starts at zero.
/// Notes are not re-sorted, so a later note starting before the first one gets a negative start.
pub fn extract_instrument(instruments: Vec<Instrument>) -> TrackResult<InstrumentInfo> {
  if instruments.len() != 1 {
    return Err(TrackError::InstrumentCount {
      count: instruments.len(),
    });
  }

  let instrument = instruments.into_iter().next().ok_or(TrackError::InstrumentCount { count: 0 })?;

  let offset = match instrument.notes.first() {
    Some(note) => note.start,
    None => {
      return Err(TrackError::EmptyTrack {
        name: instrument.name,
      })
    }
  };

  let notes = instrument
    .notes
    .iter()
    .enumerate()
    .map(|(index, note)| Note {
      index,
      start: note.start - offset,
      duration: note.duration(),
    })
    .collect();

  Ok(InstrumentInfo {
    name: instrument.name,
    notes,
  })
}
