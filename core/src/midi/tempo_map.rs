use midly::{MetaMessage, Smf, Timing, TrackEventKind};

use crate::midi::{MidiError, MidiResult};
use crate::time::Seconds;

pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoChange {
  tick: u64,
  seconds: Seconds,
  micros_per_beat: u32,
}

/// Maps absolute ticks of a MIDI file into seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum TempoMap {
  Metrical {
    ticks_per_beat: u16,
    changes: Vec<TempoChange>,
  },
  Timecode {
    ticks_per_second: f64,
  },
}

impl TempoMap {
  /// Tempo changes are only read from the first track, the conductor track of format 1 files.
  pub fn from_smf(smf: &Smf) -> MidiResult<TempoMap> {
    match smf.header.timing {
      Timing::Metrical(ticks_per_beat) => {
        let mut tick = 0u64;
        let mut tempos = Vec::new();
        if let Some(track) = smf.tracks.first() {
          for event in track {
            tick += u64::from(event.delta.as_int());
            if let TrackEventKind::Meta(MetaMessage::Tempo(micros_per_beat)) = event.kind {
              tempos.push((tick, micros_per_beat.as_int()));
            }
          }
        }
        TempoMap::metrical(ticks_per_beat.as_int(), tempos)
      }
      Timing::Timecode(fps, subframes) => TempoMap::timecode(fps.as_f32(), subframes),
    }
  }

  pub fn metrical<I>(ticks_per_beat: u16, tempos: I) -> MidiResult<TempoMap>
  where
    I: IntoIterator<Item = (u64, u32)>,
  {
    if ticks_per_beat == 0 {
      return Err(MidiError::Parse {
        cause: "ticks per beat must be greater than zero".to_string(),
      });
    }

    let mut tempos: Vec<(u64, u32)> = tempos.into_iter().collect();
    tempos.sort_by_key(|(tick, _)| *tick);

    let mut changes = vec![TempoChange {
      tick: 0,
      seconds: 0.0,
      micros_per_beat: DEFAULT_MICROS_PER_BEAT,
    }];

    for (tick, micros_per_beat) in tempos {
      let last = changes[changes.len() - 1];
      if tick == last.tick {
        let index = changes.len() - 1;
        changes[index].micros_per_beat = micros_per_beat;
      } else {
        changes.push(TempoChange {
          tick,
          seconds: last.seconds + Self::elapsed(tick - last.tick, last.micros_per_beat, ticks_per_beat),
          micros_per_beat,
        });
      }
    }

    Ok(TempoMap::Metrical {
      ticks_per_beat,
      changes,
    })
  }

  pub fn timecode(frames_per_second: f32, subframes: u8) -> MidiResult<TempoMap> {
    let ticks_per_second = f64::from(frames_per_second) * f64::from(subframes);
    if ticks_per_second > 0.0 {
      Ok(TempoMap::Timecode { ticks_per_second })
    } else {
      Err(MidiError::Parse {
        cause: "ticks per frame must be greater than zero".to_string(),
      })
    }
  }

  pub fn tick_to_seconds(&self, tick: u64) -> Seconds {
    match self {
      TempoMap::Metrical {
        ticks_per_beat,
        changes,
      } => {
        let index = changes.partition_point(|change| change.tick <= tick);
        let change = &changes[index.saturating_sub(1)];
        change.seconds + Self::elapsed(tick - change.tick, change.micros_per_beat, *ticks_per_beat)
      }
      TempoMap::Timecode { ticks_per_second } => tick as f64 / ticks_per_second,
    }
  }

  fn elapsed(ticks: u64, micros_per_beat: u32, ticks_per_beat: u16) -> Seconds {
    ticks as f64 * f64::from(micros_per_beat) / MICROS_PER_SECOND / f64::from(ticks_per_beat)
  }
}
