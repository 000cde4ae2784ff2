use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::trace;

use midly::{MetaMessage, MidiMessage, Smf, Track, TrackEventKind};

use crate::midi::{Instrument, MidiError, MidiNote, MidiReader, MidiResult, TempoMap, DRUM_CHANNEL};

const NUM_CHANNELS: usize = 16;

type ChannelKey = (u8, u8);

struct PendingNote {
  tick: u64,
  velocity: u8,
}

/// Collects the instruments of a single track, one per channel and program.
struct TrackDecoder<'a> {
  tempo_map: &'a TempoMap,
  name: Option<String>,
  programs: [u8; NUM_CHANNELS],
  pending: HashMap<ChannelKey, Vec<PendingNote>>,
  instruments: Vec<Instrument>,
  index: HashMap<ChannelKey, usize>,
}

impl<'a> TrackDecoder<'a> {
  fn new(tempo_map: &'a TempoMap) -> TrackDecoder<'a> {
    TrackDecoder {
      tempo_map,
      name: None,
      programs: [0; NUM_CHANNELS],
      pending: HashMap::new(),
      instruments: Vec::new(),
      index: HashMap::new(),
    }
  }

  fn decode(mut self, track: &Track) -> Vec<Instrument> {
    let mut tick = 0u64;
    for event in track {
      tick += u64::from(event.delta.as_int());
      match event.kind {
        TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
          if self.name.is_none() {
            self.name = Some(String::from_utf8_lossy(name).into_owned());
          }
        }
        TrackEventKind::Midi { channel, message } => {
          let channel = channel.as_int();
          match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
              self.note_start(tick, channel, key.as_int(), vel.as_int())
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
              self.note_end(tick, channel, key.as_int())
            }
            MidiMessage::ProgramChange { program } => {
              self.programs[usize::from(channel)] = program.as_int();
            }
            _ => {}
          }
        }
        _ => {}
      }
    }

    let name = self.name.unwrap_or_default();
    self
      .instruments
      .into_iter()
      .map(|mut instrument| {
        instrument.name = name.clone();
        instrument
      })
      .collect()
  }

  fn note_start(&mut self, tick: u64, channel: u8, key: u8, velocity: u8) {
    self
      .pending
      .entry((channel, key))
      .or_insert_with(Vec::new)
      .push(PendingNote { tick, velocity });
  }

  /// Closes every open note of the key that started before `tick`.
  /// Notes starting on `tick` stay open, unless none could be closed, in which case they are dropped.
  fn note_end(&mut self, tick: u64, channel: u8, key: u8) {
    let pending = match self.pending.remove(&(channel, key)) {
      Some(pending) => pending,
      None => {
        trace!("Ignoring note off without note on: channel={} key={}", channel, key);
        return;
      }
    };

    let (to_keep, to_close): (Vec<PendingNote>, Vec<PendingNote>) =
      pending.into_iter().partition(|note| note.tick == tick);

    if to_close.is_empty() {
      trace!("Dropping zero length note: channel={} key={} tick={}", channel, key, tick);
      return;
    }

    let tempo_map = self.tempo_map;
    let end = tempo_map.tick_to_seconds(tick);
    for started in to_close {
      let note = MidiNote::new(key, started.velocity, tempo_map.tick_to_seconds(started.tick), end);
      self.instrument_mut(channel).notes.push(note);
    }

    if !to_keep.is_empty() {
      self.pending.insert((channel, key), to_keep);
    }
  }

  fn instrument_mut(&mut self, channel: u8) -> &mut Instrument {
    let program = self.programs[usize::from(channel)];
    let instruments = &mut self.instruments;
    let position = *self.index.entry((channel, program)).or_insert_with(|| {
      instruments.push(Instrument::new("", program, channel == DRUM_CHANNEL));
      instruments.len() - 1
    });
    &mut self.instruments[position]
  }
}

/// Decodes Standard MIDI Files into instruments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmfReader;

impl SmfReader {
  pub fn new() -> SmfReader {
    SmfReader
  }

  pub fn decode(&self, data: &[u8]) -> MidiResult<Vec<Instrument>> {
    let smf = Smf::parse(data).map_err(|err| MidiError::Parse {
      cause: err.to_string(),
    })?;

    let tempo_map = TempoMap::from_smf(&smf)?;

    let instruments = smf
      .tracks
      .iter()
      .flat_map(|track| TrackDecoder::new(&tempo_map).decode(track))
      .collect();

    Ok(instruments)
  }
}

impl MidiReader for SmfReader {
  fn read_instruments(&self, path: &Path) -> MidiResult<Vec<Instrument>> {
    let data = fs::read(path).map_err(|err| MidiError::Io {
      cause: format!("{}: {}", path.display(), err),
    })?;
    self.decode(&data)
  }
}
