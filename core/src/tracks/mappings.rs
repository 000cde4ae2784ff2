use failure::Fail;

use log::debug;

use serde_json::{Map, Value};

use crate::time::{bbt_to_seconds, BarsTime, Seconds, TimeError};
use crate::tracks::document::{json_type, TRACKS_DATA_KEY};
use crate::tracks::TracksDocument;

#[derive(Debug, Fail)]
pub enum MappingError {
  #[fail(display = "Missing field {}", field)]
  MissingField { field: String },

  #[fail(display = "Invalid field {}: expected {} but found {}", field, expected, found)]
  InvalidField {
    field: String,
    expected: &'static str,
    found: &'static str,
  },

  #[fail(display = "Value of {} is out of range", field)]
  OutOfRange { field: String },

  #[fail(display = "Invalid time in {}: {}", field, cause)]
  Time {
    field: String,
    #[cause]
    cause: TimeError,
  },
}

pub type MappingResult<T> = Result<T, MappingError>;

struct Timing {
  bpm: f64,
  ppq: i64,
  time_signature: String,
}

impl Timing {
  fn from_tracks_data(tracks_data: &Map<String, Value>) -> MappingResult<Timing> {
    for key in &["bpm", "ppq", "time_signature", "mappings"] {
      required(tracks_data, key, TRACKS_DATA_KEY)?;
    }

    let bpm = required(tracks_data, "bpm", TRACKS_DATA_KEY)?;
    let ppq = required(tracks_data, "ppq", TRACKS_DATA_KEY)?;
    let time_signature = required(tracks_data, "time_signature", TRACKS_DATA_KEY)?;

    Ok(Timing {
      bpm: bpm
        .as_f64()
        .ok_or_else(|| invalid(field_path(TRACKS_DATA_KEY, "bpm"), "a number", bpm))?,
      ppq: ppq
        .as_i64()
        .ok_or_else(|| invalid(field_path(TRACKS_DATA_KEY, "ppq"), "an integer", ppq))?,
      time_signature: time_signature
        .as_str()
        .ok_or_else(|| invalid(field_path(TRACKS_DATA_KEY, "time_signature"), "a string", time_signature))?
        .to_string(),
    })
  }

  fn to_seconds(&self, bbt: &str, field: String) -> MappingResult<Seconds> {
    bbt_to_seconds(self.bpm, self.ppq, bbt, &self.time_signature)
      .map_err(|cause| MappingError::Time { field, cause })
  }
}

/// Fills the seconds fields of every mapping loop from its bar:beat:tick fields,
/// using `1:01:00` for missing `between_*_bbt` fields.
pub fn normalize_mappings(document: &mut TracksDocument) -> MappingResult<()> {
  normalize_mappings_with_default(document, &BarsTime::start().to_string())
}

/// Same as [`normalize_mappings`] with a custom position for missing `between_*_bbt` fields.
pub fn normalize_mappings_with_default(document: &mut TracksDocument, default_bbt: &str) -> MappingResult<()> {
  let tracks_data = match document.root_mut().get_mut(TRACKS_DATA_KEY) {
    Some(Value::Object(tracks_data)) => tracks_data,
    Some(other) => return Err(invalid(TRACKS_DATA_KEY.to_string(), "an object", other)),
    None => {
      return Err(MappingError::MissingField {
        field: TRACKS_DATA_KEY.to_string(),
      })
    }
  };

  let timing = Timing::from_tracks_data(tracks_data)?;

  let mappings_path = field_path(TRACKS_DATA_KEY, "mappings");
  let mappings = match tracks_data.get_mut("mappings") {
    Some(Value::Array(mappings)) => mappings,
    Some(other) => return Err(invalid(mappings_path, "an array", other)),
    None => return Err(MappingError::MissingField { field: mappings_path }),
  };

  for (index, mapping) in mappings.iter_mut().enumerate() {
    let mapping_path = format!("{}[{}]", mappings_path, index);
    let mapping = match mapping {
      Value::Object(mapping) => mapping,
      other => return Err(invalid(mapping_path, "an object", other)),
    };

    let loops_data_path = field_path(&mapping_path, "loops_data");
    match mapping.get_mut("loops_data") {
      Some(Value::Object(loops_data)) if !loops_data.is_empty() => {
        normalize_loops_data(&timing, loops_data, &loops_data_path, default_bbt)?
      }
      Some(Value::Object(_)) | Some(Value::Null) | None => {}
      Some(other) => return Err(invalid(loops_data_path, "an object", other)),
    }
  }

  Ok(())
}

fn normalize_loops_data(
  timing: &Timing,
  loops_data: &mut Map<String, Value>,
  path: &str,
  default_bbt: &str,
) -> MappingResult<()> {
  let between_first = optional_bbt(timing, loops_data, "between_first_bbt", path, default_bbt)?;
  let between_second = optional_bbt(timing, loops_data, "between_second_bbt", path, default_bbt)?;
  let between = between_second - between_first;
  if !between.is_finite() {
    return Err(MappingError::OutOfRange {
      field: field_path(path, "between"),
    });
  }
  loops_data.insert("between".to_string(), Value::from(between));

  let loops_path = field_path(path, "loops");
  let loops = match loops_data.get_mut("loops") {
    Some(Value::Array(loops)) => loops,
    Some(other) => return Err(invalid(loops_path, "an array", other)),
    None => return Err(MappingError::MissingField { field: loops_path }),
  };

  for (index, item) in loops.iter_mut().enumerate() {
    let loop_path = format!("{}[{}]", loops_path, index);
    let item = match item {
      Value::Object(item) => item,
      other => return Err(invalid(loop_path, "an object", other)),
    };

    let start_bbt_path = field_path(&loop_path, "start_bbt");
    let start_bbt = match item.get("start_bbt") {
      Some(Value::String(start_bbt)) => start_bbt.clone(),
      Some(other) => return Err(invalid(start_bbt_path, "a string", other)),
      None => return Err(MappingError::MissingField { field: start_bbt_path }),
    };

    let start = timing.to_seconds(&start_bbt, start_bbt_path)?;
    debug!("{} {} -> {}s", loop_path, start_bbt, start);
    item.insert("start".to_string(), Value::from(start));
  }

  Ok(())
}

fn optional_bbt(
  timing: &Timing,
  loops_data: &Map<String, Value>,
  key: &str,
  path: &str,
  default_bbt: &str,
) -> MappingResult<Seconds> {
  let field = field_path(path, key);
  match loops_data.get(key) {
    Some(Value::String(bbt)) => timing.to_seconds(bbt, field),
    Some(Value::Null) | None => timing.to_seconds(default_bbt, field),
    Some(other) => Err(invalid(field, "a string", other)),
  }
}

fn required<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> MappingResult<&'a Value> {
  object.get(key).ok_or_else(|| MappingError::MissingField {
    field: field_path(path, key),
  })
}

fn invalid(field: String, expected: &'static str, found: &Value) -> MappingError {
  MappingError::InvalidField {
    field,
    expected,
    found: json_type(found),
  }
}

fn field_path(parent: &str, key: &str) -> String {
  format!("{}.{}", parent, key)
}

#[cfg(test)]
mod test {

  use serde_json::{json, Value};

  use super::{normalize_mappings, normalize_mappings_with_default, MappingError};
  use crate::time::TimeError;
  use crate::tracks::TracksDocument;

  fn document(mappings: Value) -> TracksDocument {
    TracksDocument::from_value(json!({
      "instruments": { "A": { "name": "Alpha", "notes": [] } },
      "tracks_data": {
        "bpm": 120,
        "ppq": 96,
        "time_signature": "4:4",
        "mappings": mappings
      },
      "title": "demo"
    }))
    .unwrap()
  }

  fn mapping(document: &TracksDocument, index: usize) -> &Value {
    &document.root()["tracks_data"]["mappings"][index]
  }

  #[test]
  pub fn normalize_loops() {
    let mut document = document(json!([{
      "id": "intro",
      "loops_data": {
        "between_first_bbt": "1:01:00",
        "between_second_bbt": "2:01:00",
        "loops": [
          { "start_bbt": "1:02:00", "track": "A" },
          { "start_bbt": "3:01:48", "start": 99.0 }
        ]
      }
    }]));

    normalize_mappings(&mut document).unwrap();

    let loops_data = &mapping(&document, 0)["loops_data"];
    assert_eq!(loops_data["between"], json!(2.0));
    assert_eq!(
      loops_data["loops"],
      json!([
        { "start_bbt": "1:02:00", "track": "A", "start": 0.5 },
        { "start_bbt": "3:01:48", "start": 4.25 }
      ])
    );
    assert_eq!(mapping(&document, 0)["id"], json!("intro"));
    assert_eq!(document.root()["title"], json!("demo"));
    assert_eq!(document.root()["instruments"]["A"]["name"], json!("Alpha"));
  }

  #[test]
  pub fn mapping_without_loops_data_is_untouched() {
    let plain = json!({ "id": "outro", "between": "keep", "loops": [{ "start_bbt": "9:01:00" }] });
    let mut document = document(json!([plain.clone(), { "id": "null", "loops_data": null }]));

    normalize_mappings(&mut document).unwrap();

    assert_eq!(*mapping(&document, 0), plain);
    assert_eq!(*mapping(&document, 1), json!({ "id": "null", "loops_data": null }));
  }

  #[test]
  pub fn default_between_is_zero() {
    let mut document = document(json!([{ "loops_data": { "loops": [] } }]));

    normalize_mappings(&mut document).unwrap();

    assert_eq!(mapping(&document, 0)["loops_data"]["between"], json!(0.0));
  }

  #[test]
  pub fn between_can_be_negative() {
    let mut document = document(json!([{
      "loops_data": { "between_first_bbt": "2:01:00", "loops": [] }
    }]));

    normalize_mappings(&mut document).unwrap();

    assert_eq!(mapping(&document, 0)["loops_data"]["between"], json!(-2.0));
  }

  #[test]
  pub fn custom_default_bbt() {
    let mut document = document(json!([{
      "loops_data": { "between_first_bbt": "1:01:00", "loops": [] }
    }]));

    normalize_mappings_with_default(&mut document, "1:03:00").unwrap();

    assert_eq!(mapping(&document, 0)["loops_data"]["between"], json!(1.0));
  }

  #[test]
  pub fn normalize_is_idempotent() {
    let mut document = document(json!([{
      "loops_data": {
        "between_second_bbt": "1:03:00",
        "loops": [{ "start_bbt": "5:01:00" }]
      }
    }]));

    normalize_mappings(&mut document).unwrap();
    let once = document.clone();
    normalize_mappings(&mut document).unwrap();

    assert_eq!(document, once);
  }

  #[test]
  pub fn normalize_overwrites_stale_values() {
    let mut document = document(json!([{
      "loops_data": { "between": 42.0, "loops": [{ "start_bbt": "2:01:00", "start": 42.0 }] }
    }]));

    normalize_mappings(&mut document).unwrap();

    let loops_data = &mapping(&document, 0)["loops_data"];
    assert_eq!(loops_data["between"], json!(0.0));
    assert_eq!(loops_data["loops"][0]["start"], json!(2.0));
  }

  #[test]
  pub fn missing_bpm() {
    let mut document = TracksDocument::from_value(json!({
      "tracks_data": { "ppq": 96, "time_signature": "4:4", "mappings": [] }
    }))
    .unwrap();

    match normalize_mappings(&mut document) {
      Err(MappingError::MissingField { field }) => assert_eq!(field, "tracks_data.bpm"),
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn missing_tracks_data() {
    let mut document = TracksDocument::new();
    match normalize_mappings(&mut document) {
      Err(MappingError::MissingField { field }) => assert_eq!(field, "tracks_data"),
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn missing_mappings_without_loops() {
    let mut document = TracksDocument::from_value(json!({
      "tracks_data": { "bpm": 120, "ppq": 96, "time_signature": "4:4" }
    }))
    .unwrap();

    match normalize_mappings(&mut document) {
      Err(MappingError::MissingField { field }) => assert_eq!(field, "tracks_data.mappings"),
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn missing_start_bbt() {
    let mut document = document(json!([{ "loops_data": { "loops": [{ "track": "A" }] } }]));

    match normalize_mappings(&mut document) {
      Err(MappingError::MissingField { field }) => {
        assert_eq!(field, "tracks_data.mappings[0].loops_data.loops[0].start_bbt")
      }
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn wrongly_typed_ppq() {
    let mut document = TracksDocument::from_value(json!({
      "tracks_data": { "bpm": 120, "ppq": "96", "time_signature": "4:4", "mappings": [] }
    }))
    .unwrap();

    match normalize_mappings(&mut document) {
      Err(MappingError::InvalidField { field, found, .. }) => {
        assert_eq!(field, "tracks_data.ppq");
        assert_eq!(found, "a string");
      }
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn malformed_loop_bbt() {
    let mut document = document(json!([{ "loops_data": { "loops": [{ "start_bbt": "2:01" }] } }]));

    match normalize_mappings(&mut document) {
      Err(MappingError::Time { field, cause }) => {
        assert_eq!(field, "tracks_data.mappings[0].loops_data.loops[0].start_bbt");
        match cause {
          TimeError::Format { .. } => {}
          other => panic!("unexpected cause {:?}", other),
        }
      }
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn loop_start_out_of_range() {
    let mut document = document(json!([{ "loops_data": { "loops": [{ "start_bbt": "1e308:01:00" }] } }]));

    match normalize_mappings(&mut document) {
      Err(MappingError::Time {
        field,
        cause: TimeError::Format { .. },
      }) => assert_eq!(field, "tracks_data.mappings[0].loops_data.loops[0].start_bbt"),
      other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(
      mapping(&document, 0)["loops_data"]["loops"][0],
      json!({ "start_bbt": "1e308:01:00" })
    );
  }

  #[test]
  pub fn between_out_of_range() {
    let mut document = TracksDocument::from_value(json!({
      "tracks_data": {
        "bpm": 30,
        "ppq": 96,
        "time_signature": "4:4",
        "mappings": [{
          "loops_data": {
            "between_first_bbt": "-2e307:01:00",
            "between_second_bbt": "2e307:01:00",
            "loops": []
          }
        }]
      }
    }))
    .unwrap();

    match normalize_mappings(&mut document) {
      Err(MappingError::OutOfRange { field }) => assert_eq!(field, "tracks_data.mappings[0].loops_data.between"),
      other => panic!("unexpected result {:?}", other),
    }
  }

  #[test]
  pub fn zero_ppq() {
    let mut document = TracksDocument::from_value(json!({
      "tracks_data": {
        "bpm": 120,
        "ppq": 0,
        "time_signature": "4:4",
        "mappings": [{ "loops_data": { "loops": [] } }]
      }
    }))
    .unwrap();

    match normalize_mappings(&mut document) {
      Err(MappingError::Time {
        cause: TimeError::InvalidParameter { name, .. },
        ..
      }) => assert_eq!(name, "ppq"),
      other => panic!("unexpected result {:?}", other),
    }
  }
}
