//! Lyrics API client module.

pub mod api;
pub mod models;

pub use api::LyricsApiClient;
