//! Main application state and logic.

use color_eyre::Result;
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc;

use crate::action::{Action, SongDetails};
use crate::client::models::Song;
use crate::client::LyricsApiClient;
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::ui::{DetailsState, SearchState};

/// Rows scrolled per detail-scroll step from the mouse wheel.
const MOUSE_SCROLL_LINES: i16 = 3;

/// UI layout areas for mouse click detection.
#[derive(Debug, Default, Clone)]
pub struct UiLayout {
    /// Results dropdown area (if visible)
    pub dropdown: Option<Rect>,
}

/// Main application state.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,

    /// Configuration
    pub config: Config,

    /// API client
    pub client: Option<LyricsApiClient>,

    /// Search box and dropdown state
    pub search: SearchState,

    /// Selection and fetched details
    pub details: DetailsState,

    /// Help overlay visible
    pub show_help: bool,

    /// Error message to display
    pub error_message: Option<String>,

    /// Action sender for async operations
    pub action_tx: mpsc::UnboundedSender<Action>,

    /// Pending search timer
    debouncer: Debouncer,

    /// UI layout areas for mouse detection
    pub layout: UiLayout,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        let mut error_message = None;

        let client = if config.is_valid() {
            match LyricsApiClient::new(&config.api.base_url, config.timeout()) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::error!("Failed to build HTTP client: {}", e);
                    error_message = Some(format!("Failed to build HTTP client: {}", e));
                    None
                }
            }
        } else {
            error_message = Some(format!(
                "Invalid API URL {:?}. Set api.base_url in the config file or pass --api-url.",
                config.api.base_url
            ));
            None
        };

        Self {
            should_quit: false,
            debouncer: Debouncer::new(config.debounce()),
            config,
            client,
            search: SearchState::new(),
            details: DetailsState::new(),
            show_help: false,
            error_message,
            action_tx,
            layout: UiLayout::default(),
        }
    }

    /// Initialize the application. Must run before the terminal is taken over.
    pub fn init(&mut self) {
        if let Some(client) = &self.client {
            tracing::info!("Using lyrics API at {}", client.base_url());
        }

        if self.config.ui.show_thumbnail {
            self.details.enable_thumbnails();
        }
    }

    /// Handle an action and update state.
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }

            Action::Tick => {
                // Spinners animate on redraw; nothing to update.
            }

            // Search box
            Action::SearchInput(c) => {
                self.search.input(c);
                self.on_query_changed();
            }

            Action::SearchBackspace => {
                if self.search.backspace() {
                    self.on_query_changed();
                }
            }

            Action::SearchClear => {
                self.search.clear_query();
                self.on_query_changed();
            }

            Action::RunSearch => {
                self.perform_search();
            }

            Action::SearchResults { query, songs } => {
                if query == self.search.trimmed_query() {
                    tracing::debug!("{} results for {:?}", songs.len(), query);
                    self.search.set_results(songs);
                } else {
                    tracing::debug!("Ignoring stale results for {:?}", query);
                }
            }

            Action::SearchFailed { query } => {
                if query == self.search.trimmed_query() {
                    self.search.searching = false;
                }
            }

            // Dropdown
            Action::DismissDropdown => {
                self.search.dismiss();
                self.show_help = false;
                self.error_message = None;
            }

            Action::NavigateUp => {
                if self.search.show_dropdown() {
                    self.search.select_previous();
                } else {
                    self.details.scroll_by(-1);
                }
            }

            Action::NavigateDown => {
                if self.search.show_dropdown() {
                    self.search.select_next();
                } else {
                    self.details.scroll_by(1);
                }
            }

            Action::Select => {
                if self.search.show_dropdown() {
                    if let Some(song) = self.search.selected_song().cloned() {
                        self.select_song(song);
                    }
                }
            }

            // Mouse
            Action::MouseClick(x, y) => {
                self.handle_mouse_click(x, y);
            }

            Action::MouseScroll(delta) => {
                let lines = if delta < 0 {
                    -MOUSE_SCROLL_LINES
                } else {
                    MOUSE_SCROLL_LINES
                };
                self.details.scroll_by(lines);
            }

            // Detail fetches
            Action::LyricsLoaded { token, lyrics } => {
                if !self.details.is_current(token) {
                    tracing::debug!("Ignoring lyrics for superseded selection {}", token);
                    return Ok(());
                }
                if self.details.apply_lyrics(lyrics) {
                    self.fetch_details(token);
                }
            }

            Action::DetailsLoaded { token, details } => {
                if !self.details.is_current(token) {
                    tracing::debug!("Ignoring details for superseded selection {}", token);
                    return Ok(());
                }
                self.details.apply_details(details);
            }

            Action::ThumbnailLoaded { token, data } => {
                if self.details.is_current(token) {
                    self.details.set_thumbnail(&data);
                }
            }

            Action::ScrollDetails(delta) => {
                self.details.scroll_by(delta);
            }

            // Overlays
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
            }

            Action::None => {}
        }

        Ok(())
    }

    /// React to an edit of the query text.
    fn on_query_changed(&mut self) {
        if self.search.trimmed_query().is_empty() {
            self.debouncer.cancel();
            self.search.clear_results();
        } else {
            self.debouncer.schedule(&self.action_tx, Action::RunSearch);
        }
    }

    /// Search for the query as it stands now.
    fn perform_search(&mut self) {
        let query = self.search.trimmed_query().to_string();
        if query.is_empty() {
            self.search.clear_results();
            return;
        }

        let Some(client) = self.client.clone() else {
            return;
        };

        self.search.searching = true;
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match client.search(&query).await {
                Ok(songs) => {
                    let _ = tx.send(Action::SearchResults { query, songs });
                }
                Err(e) => {
                    tracing::error!("Search for {:?} failed: {}", query, e);
                    let _ = tx.send(Action::SearchFailed { query });
                }
            }
        });
    }

    /// Select a result row under the mouse, if any.
    fn handle_mouse_click(&mut self, x: u16, y: u16) {
        let Some(dropdown) = self.layout.dropdown else {
            return;
        };
        if !self.search.show_dropdown() || !dropdown.contains(Position { x, y }) {
            return;
        }

        // Skip the top border.
        let Some(row) = y.checked_sub(dropdown.y + 1) else {
            return;
        };
        if row + 2 >= dropdown.height {
            return;
        }

        if let Some(song) = self.search.song_at_row(row).cloned() {
            self.select_song(song);
        }
    }

    /// Make `song` the selection and start fetching its lyrics.
    fn select_song(&mut self, song: Song) {
        self.debouncer.cancel();
        self.search.dismiss();
        self.search.clear_query();
        // Any in-flight search is now stale and will be dropped on arrival.
        self.search.searching = false;

        let token = self.details.select(song.clone());
        tracing::info!(
            "Selected {:?} by {:?} (selection {})",
            song.title,
            song.artist,
            token
        );

        let Some(client) = self.client.clone() else {
            return;
        };

        self.details.lyrics.begin();
        let tx = self.action_tx.clone();
        let lyrics_client = client.clone();
        let (artist, title) = (song.artist.clone(), song.title.clone());
        tokio::spawn(async move {
            let lyrics = match lyrics_client.lyrics(&artist, &title).await {
                Ok(lyrics) => Some(lyrics),
                Err(e) => {
                    tracing::warn!("Lyrics for {:?} by {:?} failed: {}", title, artist, e);
                    None
                }
            };
            let _ = tx.send(Action::LyricsLoaded { token, lyrics });
        });

        if let Some(url) = song.thumbnail.filter(|_| self.details.picker.is_some()) {
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                match client.fetch_bytes(&url).await {
                    Ok(data) => {
                        let _ = tx.send(Action::ThumbnailLoaded { token, data });
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load thumbnail {}: {}", url, e);
                    }
                }
            });
        }
    }

    /// Fetch the summary and rating for the current selection concurrently.
    fn fetch_details(&mut self, token: u64) {
        let (Some(client), Some(song)) = (self.client.clone(), self.details.selected.clone())
        else {
            return;
        };

        self.details.begin_details();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let (artist, title) = (song.artist.as_str(), song.title.as_str());
            let details = match tokio::try_join!(
                client.song_summary(artist, title),
                client.song_rating(artist, title)
            ) {
                Ok((summary, rating)) => Some(SongDetails { summary, rating }),
                Err(e) => {
                    tracing::error!(
                        "Summary/rating for {:?} by {:?} failed: {}",
                        title,
                        artist,
                        e
                    );
                    None
                }
            };
            let _ = tx.send(Action::DetailsLoaded { token, details });
        });
    }
}
