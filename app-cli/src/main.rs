use std::path::{Path, PathBuf};

use clap::Parser;

use log::{debug, info, warn, LevelFilter};

use failure::{Error, Fail};

use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use tracks_prep_core::{config::Config, file_stem_name, midi::SmfReader, Project};

const TRACKS_PREP_CONFIG: &str = "TRACKS_PREP_CONFIG";
const DEFAULT_TRACKS_PREP_CONFIG: &str = "tracks-prep.toml";

const TRACKS_PREP_LOG_CONFIG: &str = "TRACKS_PREP_LOG_CONFIG";
const DEFAULT_TRACKS_PREP_LOG_CONFIG: &str = "log4rs.yaml";

const CONSOLE_PATTERN: &str = "{d(%H:%M:%S)} {h({l})} {m}{n}";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },

  #[fail(display = "Failed to load the configuration from {}: {}", path, cause)]
  ConfigLoad { path: String, cause: String },

  #[fail(display = "Input folder not found: {}", path)]
  InDirNotFound { path: String },
}

/// Prepares score timing data for a project folder
#[derive(Parser, Debug)]
#[command(name = "tracks-prep")]
#[command(about = "Extracts score notes and converts mapping positions into seconds")]
#[command(version)]
struct Args {
  /// Extract the notes of every score into the tracks file
  #[arg(long = "do_notes")]
  do_notes: bool,

  /// Convert the bar:beat:tick positions of the tracks file mappings into seconds
  #[arg(long = "do_mappings")]
  do_mappings: bool,

  /// Project folder holding the scores folder and the tracks file
  #[arg(long = "in_dir")]
  in_dir: PathBuf,

  /// Configuration file, defaults to $TRACKS_PREP_CONFIG or tracks-prep.toml
  #[arg(long)]
  config: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let args = Args::parse();

  let config = init_config(args.config.as_deref())?;

  if !args.in_dir.is_dir() {
    return Err(
      MainError::InDirNotFound {
        path: args.in_dir.display().to_string(),
      }
      .into(),
    );
  }

  let project = Project::new(args.in_dir.clone(), config);

  if !args.do_notes && !args.do_mappings {
    warn!("Nothing to do, use --do_notes and/or --do_mappings");
  }

  if args.do_notes {
    info!("Extracting notes from {} ...", project.scores_dir().display());
    project.do_notes(&SmfReader::new(), file_stem_name)?;
  }

  if args.do_mappings {
    info!("Converting mappings in {} ...", project.tracks_path().display());
    project.do_mappings()?;
  }

  Ok(())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path = std::env::var(TRACKS_PREP_LOG_CONFIG)
    .unwrap_or_else(|_| DEFAULT_TRACKS_PREP_LOG_CONFIG.to_string());

  if Path::new(&log_config_path).exists() {
    log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
      MainError::LoggingInit {
        cause: err.to_string(),
      }
    })?;
  } else {
    let console = ConsoleAppender::builder()
      .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
      .build();

    let log_config = LogConfig::builder()
      .appender(Appender::builder().build("console", Box::new(console)))
      .build(Root::builder().appender("console").build(LevelFilter::Info))
      .map_err(|err| MainError::LoggingInit {
        cause: err.to_string(),
      })?;

    log4rs::init_config(log_config).map_err(|err| MainError::LoggingInit {
      cause: err.to_string(),
    })?;
  }

  Ok(())
}

fn init_config(path: Option<&Path>) -> Result<Config, Error> {
  let explicit = path
    .map(|path| path.display().to_string())
    .or_else(|| std::env::var(TRACKS_PREP_CONFIG).ok());

  let config_path = match explicit {
    Some(config_path) => config_path,
    None if Path::new(DEFAULT_TRACKS_PREP_CONFIG).exists() => DEFAULT_TRACKS_PREP_CONFIG.to_string(),
    None => {
      debug!("No configuration file found, using defaults");
      return Ok(Config::default());
    }
  };

  info!("Loading configuration from {} ...", config_path);
  let config = Config::from_file(config_path.as_str()).map_err(|err| MainError::ConfigLoad {
    path: config_path.clone(),
    cause: err.to_string(),
  })?;
  debug!("{:#?}", config);

  Ok(config)
}
