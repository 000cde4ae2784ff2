pub mod config;
pub mod midi;
pub mod project;
pub mod time;
pub mod tracks;

pub use crate::project::{file_stem_name, Project, ProjectError};
pub use crate::time::bbt_to_seconds;
