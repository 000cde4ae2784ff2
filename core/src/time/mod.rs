pub mod bars;
pub mod signature;
pub mod tempo;
pub mod ticks;

pub use self::bars::BarsTime;
pub use self::signature::Signature;
pub use self::tempo::Tempo;
pub use self::ticks::Ppq;

use failure::Fail;

pub type Seconds = f64;

pub const FIELD_SEPARATOR: char = ':';

#[derive(Debug, Fail, PartialEq)]
pub enum TimeError {
  #[fail(display = "Malformed {} '{}': {}", kind, input, cause)]
  Format {
    kind: &'static str,
    input: String,
    cause: String,
  },

  #[fail(display = "Invalid {} {}: it must be greater than zero", name, value)]
  InvalidParameter { name: &'static str, value: f64 },
}

pub type TimeResult<T> = Result<T, TimeError>;

/// Converts a bar:beat:tick position into the seconds elapsed since `1:01:00`.
///
/// Beats are counted with the time signature numerator only:
/// `(bar - 1) * numerator + (beat - 1) + tick / ppq` beats at `60 / bpm` seconds each.
/// The denominator is parsed and validated but it does not scale the result,
/// so `"2:01:00"` is four beats in both `4:4` and `4:8`.
pub fn bbt_to_seconds(bpm: f64, ppq: i64, bbt: &str, time_signature: &str) -> TimeResult<Seconds> {
  let tempo = Tempo::new(bpm)?;
  let ppq = Ppq::new(ppq)?;
  let signature = time_signature.parse::<Signature>()?;
  let position = bbt.parse::<BarsTime>()?;
  let seconds = tempo.beats_to_seconds(position.to_beats(signature, ppq));
  if seconds.is_finite() {
    Ok(seconds)
  } else {
    Err(TimeError::Format {
      kind: "bar:beat:tick",
      input: bbt.to_string(),
      cause: "the position is out of range".to_string(),
    })
  }
}

pub(crate) fn parse_fields(kind: &'static str, input: &str, expected: usize) -> TimeResult<Vec<f64>> {
  let format_error = |cause: String| TimeError::Format {
    kind,
    input: input.to_string(),
    cause,
  };

  let parts: Vec<&str> = input.split(FIELD_SEPARATOR).collect();
  if parts.len() != expected {
    return Err(format_error(format!(
      "expected {} fields separated by '{}' but found {}",
      expected,
      FIELD_SEPARATOR,
      parts.len()
    )));
  }

  parts
    .iter()
    .map(|part| {
      let part = part.trim();
      match part.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format_error(format!("'{}' is not a finite number", part))),
        Err(err) => Err(format_error(format!("'{}' is not a number ({})", part, err))),
      }
    })
    .collect()
}
