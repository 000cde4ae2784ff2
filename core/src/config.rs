use failure::Error;

use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Notes {
  pub scores_dir: String,
  pub extension: String,
}

impl Default for Notes {
  fn default() -> Notes {
    Notes {
      scores_dir: "scores".to_string(),
      extension: "mid".to_string(),
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Mappings {
  pub default_bbt: String,
}

impl Default for Mappings {
  fn default() -> Mappings {
    Mappings {
      default_bbt: "1:01:00".to_string(),
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Output {
  pub tracks_file: String,
  pub indent: usize,
}

impl Default for Output {
  fn default() -> Output {
    Output {
      tracks_file: "tracks.json".to_string(),
      indent: 4,
    }
  }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
  pub notes: Notes,
  pub mappings: Mappings,
  pub output: Output,
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
  }

  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }
}
