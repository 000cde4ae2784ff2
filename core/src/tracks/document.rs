use failure::Fail;

use serde_json::{Map, Value};

use crate::tracks::InstrumentInfo;

pub const INSTRUMENTS_KEY: &str = "instruments";
pub const TRACKS_DATA_KEY: &str = "tracks_data";

#[derive(Debug, Fail)]
pub enum DocumentError {
  #[fail(display = "Failed to access {}: {}", path, cause)]
  Io { path: String, cause: String },

  #[fail(display = "Invalid JSON in {}: {}", path, cause)]
  Json { path: String, cause: String },

  #[fail(display = "Tracks document not found: {}", path)]
  NotFound { path: String },

  #[fail(display = "Malformed tracks document: {}", cause)]
  Malformed { cause: String },
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// The tracks.json document.
///
/// Only `instruments` and `tracks_data` are interpreted, every other key is kept as it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct TracksDocument {
  root: Map<String, Value>,
}

impl Default for TracksDocument {
  fn default() -> Self {
    let mut root = Map::new();
    root.insert(INSTRUMENTS_KEY.to_string(), Value::Object(Map::new()));
    TracksDocument { root }
  }
}

impl TracksDocument {
  pub fn new() -> TracksDocument {
    TracksDocument::default()
  }

  pub fn from_value(value: Value) -> DocumentResult<TracksDocument> {
    match value {
      Value::Object(root) => Ok(TracksDocument { root }),
      other => Err(DocumentError::Malformed {
        cause: format!("expected a JSON object at the top level but found {}", json_type(&other)),
      }),
    }
  }

  pub fn root(&self) -> &Map<String, Value> {
    &self.root
  }

  pub fn root_mut(&mut self) -> &mut Map<String, Value> {
    &mut self.root
  }

  pub fn into_value(self) -> Value {
    Value::Object(self.root)
  }

  /// Stores `info` under `instrument_name`, replacing a previous entry with the same name.
  pub fn update_instrument(&mut self, instrument_name: &str, info: &InstrumentInfo) -> DocumentResult<()> {
    let value = serde_json::to_value(info).map_err(|err| DocumentError::Malformed {
      cause: format!("unable to serialize instrument '{}': {}", instrument_name, err),
    })?;

    let instruments = self
      .root
      .entry(INSTRUMENTS_KEY)
      .or_insert_with(|| Value::Object(Map::new()));

    match instruments {
      Value::Object(instruments) => {
        instruments.insert(instrument_name.to_string(), value);
        Ok(())
      }
      other => Err(DocumentError::Malformed {
        cause: format!("'{}' must be an object but found {}", INSTRUMENTS_KEY, json_type(other)),
      }),
    }
  }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod test {

  use serde_json::{json, Value};

  use super::{DocumentError, TracksDocument};
  use crate::tracks::{InstrumentInfo, Note};

  fn to_value(info: InstrumentInfo) -> Value {
    serde_json::to_value(&info).unwrap()
  }

  fn info(name: &str, starts: &[f64]) -> InstrumentInfo {
    InstrumentInfo {
      name: name.to_string(),
      notes: starts
        .iter()
        .enumerate()
        .map(|(index, &start)| Note {
          index,
          start,
          duration: 0.5,
        })
        .collect(),
    }
  }

  #[test]
  pub fn new_document() {
    assert_eq!(TracksDocument::new().into_value(), json!({ "instruments": {} }));
  }

  #[test]
  pub fn from_value_requires_object() {
    match TracksDocument::from_value(json!([1, 2, 3])) {
      Err(DocumentError::Malformed { cause }) => assert!(cause.contains("an array")),
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn update_creates_instruments() {
    let mut document = TracksDocument::from_value(json!({ "version": 3 })).unwrap();
    document.update_instrument("lead", &info("Lead", &[0.0])).unwrap();

    assert_eq!(document.root()["version"], json!(3));
    assert_eq!(document.root()["instruments"]["lead"], to_value(info("Lead", &[0.0])));
  }

  #[test]
  pub fn update_keeps_other_instruments() {
    let mut document = TracksDocument::from_value(json!({
      "instruments": {
        "A": { "name": "Alpha", "notes": [{ "index": 0, "start": 0.0, "duration": 1.5 }], "color": "red" }
      },
      "tracks_data": { "bpm": 120 }
    }))
    .unwrap();
    let before = document.root()["instruments"]["A"].clone();

    document.update_instrument("B", &info("Beta", &[0.0, 1.0])).unwrap();

    assert_eq!(document.root()["instruments"]["A"], before);
    assert_eq!(document.root()["tracks_data"], json!({ "bpm": 120 }));
    assert_eq!(document.root()["instruments"]["B"], to_value(info("Beta", &[0.0, 1.0])));
  }

  #[test]
  pub fn update_is_idempotent() {
    let mut document = TracksDocument::new();
    document.update_instrument("A", &info("Alpha", &[0.0])).unwrap();
    document.update_instrument("B", &info("Beta", &[0.0, 0.5])).unwrap();
    let once = document.clone();

    document.update_instrument("B", &info("Beta", &[0.0, 0.5])).unwrap();
    assert_eq!(document, once);
  }

  #[test]
  pub fn update_overwrites_same_name() {
    let mut document = TracksDocument::new();
    document.update_instrument("A", &info("Old", &[0.0, 1.0, 2.0])).unwrap();
    document.update_instrument("A", &info("New", &[0.0])).unwrap();

    assert_eq!(
      document.root()["instruments"],
      json!({ "A": to_value(info("New", &[0.0])) })
    );
  }

  #[test]
  pub fn update_rejects_non_object_instruments() {
    let mut document = TracksDocument::from_value(json!({ "instruments": [] })).unwrap();
    match document.update_instrument("A", &info("Alpha", &[0.0])) {
      Err(DocumentError::Malformed { .. }) => {}
      other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(document.root()["instruments"], json!([]));
  }
}
