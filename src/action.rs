//! Application actions/events that drive state changes.

use crate::client::models::Song;

/// Actions that can be dispatched to update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Application lifecycle
    Quit,
    Tick,

    // Search box
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    /// Fired by the debouncer once typing has gone quiet
    RunSearch,
    SearchResults {
        query: String,
        songs: Vec<Song>,
    },
    SearchFailed {
        query: String,
    },

    // Dropdown
    DismissDropdown,
    NavigateUp,
    NavigateDown,
    Select,

    // Mouse
    MouseClick(u16, u16),
    MouseScroll(i16), // positive = down, negative = up

    // Detail fetches
    LyricsLoaded {
        token: u64,
        lyrics: Option<String>,
    },
    DetailsLoaded {
        token: u64,
        details: Option<SongDetails>,
    },
    ThumbnailLoaded {
        token: u64,
        data: Vec<u8>,
    },
    ScrollDetails(i16),

    // Overlays
    ToggleHelp,

    // No-op
    None,
}

/// Summary and rating of a song, fetched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDetails {
    pub summary: String,
    pub rating: String,
}
