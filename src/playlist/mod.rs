pub mod download;
pub mod error;
pub mod model;
pub mod source;

pub use error::PlaylistError;
pub use model::{PlaylistDocument, Track, TrackEntry};
pub use source::{PlaylistSource, source_for};
