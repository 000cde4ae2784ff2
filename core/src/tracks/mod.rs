pub mod document;
pub mod extractor;
pub mod mappings;
pub mod note;
pub mod store;

pub use self::document::{DocumentError, DocumentResult, TracksDocument};
pub use self::extractor::{extract_instrument, TrackError};
pub use self::mappings::{normalize_mappings, MappingError};
pub use self::note::{InstrumentInfo, Note};
pub use self::store::JsonStore;
