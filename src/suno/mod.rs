//! Client for the song-generation API's timestamped-lyrics endpoint
//!
//! This is the alignment source: it reports every sung word with start/end
//! times in seconds. The conversion pipeline in `crate::alignment` turns
//! that word list into display lines.

pub mod api;

pub use api::SunoClient;
