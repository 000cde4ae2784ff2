use std::fs;
use std::path::{Path, PathBuf};

use failure::Fail;

use log::{info, warn};

use crate::config::Config;
use crate::midi::{MidiError, MidiReader};
use crate::tracks::{
  extract_instrument, mappings::normalize_mappings_with_default, DocumentError, JsonStore, MappingError, TrackError,
  TracksDocument,
};

#[derive(Debug, Fail)]
pub enum ProjectError {
  #[fail(display = "Failed to list scores in {}: {}", path, cause)]
  ListScores { path: String, cause: String },

  #[fail(display = "Unable to derive an instrument name from {}", path)]
  InstrumentName { path: String },

  #[fail(display = "Failed to read {}: {}", path, cause)]
  Midi {
    path: String,
    #[cause]
    cause: MidiError,
  },

  #[fail(display = "Failed to extract {}: {}", path, cause)]
  Track {
    path: String,
    #[cause]
    cause: TrackError,
  },

  #[fail(display = "{}", _0)]
  Document(#[cause] DocumentError),

  #[fail(display = "Failed to normalize mappings of {}: {}", path, cause)]
  Mapping {
    path: String,
    #[cause]
    cause: MappingError,
  },
}

impl From<DocumentError> for ProjectError {
  fn from(err: DocumentError) -> Self {
    ProjectError::Document(err)
  }
}

pub type ProjectResult<T> = Result<T, ProjectError>;

/// The instrument name of a score file: its file name without the extension.
pub fn file_stem_name(path: &Path) -> Option<String> {
  path
    .file_stem()
    .and_then(|stem| stem.to_str())
    .filter(|stem| !stem.is_empty())
    .map(str::to_string)
}

/// An input directory holding the scores folder and the tracks document.
pub struct Project {
  in_dir: PathBuf,
  config: Config,
}

impl Project {
  pub fn new<P>(in_dir: P, config: Config) -> Project
  where
    P: Into<PathBuf>,
  {
    Project {
      in_dir: in_dir.into(),
      config,
    }
  }

  pub fn scores_dir(&self) -> PathBuf {
    self.in_dir.join(&self.config.notes.scores_dir)
  }

  pub fn tracks_path(&self) -> PathBuf {
    self.in_dir.join(&self.config.output.tracks_file)
  }

  fn store(&self) -> JsonStore {
    JsonStore::new(self.tracks_path(), self.config.output.indent)
  }

  /// Score files with the configured extension, sorted by path.
  pub fn score_files(&self) -> ProjectResult<Vec<PathBuf>> {
    let scores_dir = self.scores_dir();
    if !scores_dir.is_dir() {
      warn!("Scores folder {} does not exist", scores_dir.display());
      return Ok(Vec::new());
    }

    let list_error = |err: std::io::Error| ProjectError::ListScores {
      path: scores_dir.display().to_string(),
      cause: err.to_string(),
    };

    let extension = self.config.notes.extension.as_str();
    let mut paths = Vec::new();
    for entry in fs::read_dir(&scores_dir).map_err(list_error)? {
      let path = entry.map_err(list_error)?.path();
      let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(extension));
      if matches && path.is_file() {
        paths.push(path);
      }
    }
    paths.sort();
    Ok(paths)
  }

  /// Extracts the notes of every score into the tracks document.
  ///
  /// The document is written once after all the scores have been extracted,
  /// so any failure leaves the previous document untouched.
  pub fn do_notes<R, N>(&self, reader: &R, resolve_name: N) -> ProjectResult<TracksDocument>
  where
    R: MidiReader + ?Sized,
    N: Fn(&Path) -> Option<String>,
  {
    let store = self.store();
    let mut document = store.load_or_default()?;

    let paths = self.score_files()?;
    if paths.is_empty() {
      warn!("No score files found in {}", self.scores_dir().display());
    }

    for path in paths {
      info!("Extracting {} ...", path.display());
      let path_str = path.display().to_string();

      let instrument_name = resolve_name(&path).ok_or_else(|| ProjectError::InstrumentName {
        path: path_str.clone(),
      })?;

      let instruments = reader.read_instruments(&path).map_err(|cause| ProjectError::Midi {
        path: path_str.clone(),
        cause,
      })?;

      let info = extract_instrument(instruments).map_err(|cause| ProjectError::Track {
        path: path_str.clone(),
        cause,
      })?;

      info!("{}: {} notes", instrument_name, info.notes.len());
      document.update_instrument(&instrument_name, &info)?;
    }

    store.save(&document)?;
    info!("Write file {}", store.path().display());

    Ok(document)
  }

  /// Converts the bar:beat:tick fields of the existing tracks document mappings into seconds.
  pub fn do_mappings(&self) -> ProjectResult<TracksDocument> {
    let store = self.store();
    let mut document = store.load_existing()?;

    normalize_mappings_with_default(&mut document, &self.config.mappings.default_bbt).map_err(|cause| {
      ProjectError::Mapping {
        path: store.path().display().to_string(),
        cause,
      }
    })?;

    store.save(&document)?;
    info!("Write file {}", store.path().display());

    Ok(document)
  }
}
