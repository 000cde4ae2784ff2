use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

use crate::tracks::{DocumentError, DocumentResult, TracksDocument};

const TEMP_SUFFIX: &str = ".tmp";

/// Whole-file persistence of a tracks document.
pub struct JsonStore {
  path: PathBuf,
  indent: usize,
}

impl JsonStore {
  pub fn new<P>(path: P, indent: usize) -> JsonStore
  where
    P: Into<PathBuf>,
  {
    JsonStore {
      path: path.into(),
      indent,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn load(&self) -> DocumentResult<Option<TracksDocument>> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(ref err) if err.kind() == ErrorKind::NotFound => return Ok(None),
      Err(err) => return Err(self.io_error(err)),
    };

    let value: Value = serde_json::from_str(&content).map_err(|err| DocumentError::Json {
      path: self.path.display().to_string(),
      cause: err.to_string(),
    })?;

    debug!("Loaded {}", self.path.display());

    TracksDocument::from_value(value).map(Some)
  }

  pub fn load_or_default(&self) -> DocumentResult<TracksDocument> {
    self.load().map(Option::unwrap_or_default)
  }

  pub fn load_existing(&self) -> DocumentResult<TracksDocument> {
    self.load()?.ok_or_else(|| DocumentError::NotFound {
      path: self.path.display().to_string(),
    })
  }

  /// Replaces the file contents through a temporary sibling file and a rename.
  pub fn save(&self, document: &TracksDocument) -> DocumentResult<()> {
    let mut content = self.to_pretty_json(document)?;
    content.push(b'\n');

    let temp_path = self.temp_path();
    fs::write(&temp_path, &content).map_err(|err| self.io_error(err))?;
    fs::rename(&temp_path, &self.path).map_err(|err| {
      let _ = fs::remove_file(&temp_path);
      self.io_error(err)
    })?;

    debug!("Saved {} ({} bytes)", self.path.display(), content.len());
    Ok(())
  }

  /// The file name with `.tmp` appended, so it never collides with a sibling sharing the stem.
  fn temp_path(&self) -> PathBuf {
    let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
    name.push(TEMP_SUFFIX);
    self.path.with_file_name(name)
  }

  fn to_pretty_json(&self, document: &TracksDocument) -> DocumentResult<Vec<u8>> {
    let indent = vec![b' '; self.indent];
    let mut content = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut content, PrettyFormatter::with_indent(&indent));
    document
      .root()
      .serialize(&mut serializer)
      .map_err(|err| DocumentError::Malformed {
        cause: err.to_string(),
      })?;
    Ok(content)
  }

  fn io_error(&self, err: std::io::Error) -> DocumentError {
    DocumentError::Io {
      path: self.path.display().to_string(),
      cause: err.to_string(),
    }
  }
}
