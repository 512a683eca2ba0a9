//! Lyrics API request and response models.

use serde::{Deserialize, Deserializer, Serialize};

/// A search hit returned by the `/search` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Song {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Song {
    /// Get the title, or a placeholder if the backend sent none.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Unknown Title"
        } else {
            &self.title
        }
    }

    /// Get the artist name, or a placeholder if the backend sent none.
    pub fn display_artist(&self) -> &str {
        if self.artist.is_empty() {
            "Unknown Artist"
        } else {
            &self.artist
        }
    }
}

/// Response for the `/lyrics` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LyricsResponse {
    pub lyrics: String,
}

/// Response for the `/song-summary` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Response for the `/song-rating` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingResponse {
    pub rating: String,
}

/// Body shared by the summary and rating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongRequest<'a> {
    pub artist: &'a str,
    pub song: &'a str,
}

/// Error body the backend sends alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Decode `null` (or a missing field, with `#[serde(default)]`) as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
