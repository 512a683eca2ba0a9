//! Selected song header and lyrics/summary/rating panel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, StatefulImage};

use super::spinner::Spinner;
use crate::action::SongDetails;
use crate::client::models::Song;
use crate::ui::markdown;

/// Shown in place of lyrics when the lyrics request fails.
pub const LYRICS_NOT_FOUND: &str = "Lyrics not found.";

/// Shown in place of the summary and rating when either request fails.
pub const DETAILS_FAILED: &str = "Could not generate summary or rating.";

/// One asynchronously fetched value and its loading flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSlot {
    pub value: Option<String>,
    pub loading: bool,
}

impl FetchSlot {
    /// Mark the request as started.
    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Store the outcome of the request.
    pub fn resolve(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
        self.loading = false;
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.loading = false;
    }
}

/// State of the current selection and its fetched details.
pub struct DetailsState {
    /// Currently selected song
    pub selected: Option<Song>,

    /// Generation of the current selection; bumped on every selection
    token: u64,

    pub lyrics: FetchSlot,
    pub summary: FetchSlot,
    pub rating: FetchSlot,

    /// Thumbnail image protocol (for Sixel/Kitty/etc.)
    pub thumbnail: Option<StatefulProtocol>,

    /// Image picker for terminal graphics
    pub picker: Option<Picker>,

    /// Scroll offset of the lyrics pane
    pub scroll: u16,

    /// Largest useful scroll offset, as of the last render
    max_scroll: u16,
}

impl Default for DetailsState {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailsState {
    pub fn new() -> Self {
        Self {
            selected: None,
            token: 0,
            lyrics: FetchSlot::default(),
            summary: FetchSlot::default(),
            rating: FetchSlot::default(),
            thumbnail: None,
            picker: None,
            scroll: 0,
            max_scroll: 0,
        }
    }

    /// Query the terminal for graphics support so thumbnails can be drawn.
    pub fn enable_thumbnails(&mut self) {
        self.picker = Picker::from_query_stdio().ok();
        if self.picker.is_none() {
            tracing::info!("Terminal graphics unavailable, thumbnails disabled");
        }
    }

    /// Make `song` the selection, dropping everything fetched for the previous
    /// one. Returns the token responses for this selection must carry.
    pub fn select(&mut self, song: Song) -> u64 {
        self.lyrics.clear();
        self.summary.clear();
        self.rating.clear();
        self.thumbnail = None;
        self.scroll = 0;
        self.max_scroll = 0;
        self.selected = Some(song);
        self.token += 1;
        self.token
    }

    /// Whether a response tagged with `token` belongs to the current selection.
    pub fn is_current(&self, token: u64) -> bool {
        self.selected.is_some() && token == self.token
    }

    /// Store the lyrics outcome. Returns true when lyrics were found.
    pub fn apply_lyrics(&mut self, lyrics: Option<String>) -> bool {
        match lyrics {
            Some(text) => {
                self.lyrics.resolve(text);
                true
            }
            None => {
                self.lyrics.resolve(LYRICS_NOT_FOUND);
                false
            }
        }
    }

    /// Mark the summary and rating requests as started.
    pub fn begin_details(&mut self) {
        self.summary.begin();
        self.rating.begin();
    }

    /// Store the joined summary and rating outcome.
    pub fn apply_details(&mut self, details: Option<SongDetails>) {
        match details {
            Some(details) => {
                self.summary.resolve(details.summary);
                self.rating.resolve(details.rating);
            }
            None => {
                self.summary.resolve(DETAILS_FAILED);
                self.rating.resolve(DETAILS_FAILED);
            }
        }
    }

    /// Decode and install the thumbnail image.
    pub fn set_thumbnail(&mut self, image_data: &[u8]) {
        if let Some(picker) = &self.picker {
            match image::load_from_memory(image_data) {
                Ok(dyn_image) => self.thumbnail = Some(picker.new_resize_protocol(dyn_image)),
                Err(e) => tracing::warn!("Failed to decode thumbnail: {}", e),
            }
        }
    }

    /// Scroll the lyrics pane by `delta` lines, stopping at the last line.
    pub fn scroll_by(&mut self, delta: i16) {
        self.scroll = self
            .scroll
            .saturating_add_signed(delta)
            .min(self.max_scroll);
    }
}

/// Height of the selected-song header including borders.
pub const HEADER_HEIGHT: u16 = 5;

/// Render the selected-song header and, once lyrics exist, the detail panel.
pub fn render_details(frame: &mut Frame, area: Rect, state: &mut DetailsState) {
    let Some(song) = state.selected.clone() else {
        let hint = Paragraph::new("Search for a song above and pick it to see its lyrics.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(3)])
        .split(area);

    render_header(frame, chunks[0], &song, state);

    if state.lyrics.loading {
        frame.render_widget(
            Spinner::new()
                .label("Fetching lyrics...")
                .style(Style::default().fg(Color::Cyan)),
            chunks[1],
        );
        return;
    }

    let Some(lyrics) = state.lyrics.value.clone() else {
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    render_markdown_slot(frame, columns[0], "Rating", &state.rating, Color::Magenta);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[1]);

    render_markdown_slot(frame, right[0], "Summary", &state.summary, Color::Green);

    let lyrics_block = Block::default()
        .borders(Borders::ALL)
        .title("Lyrics")
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lyrics)
        .block(lyrics_block)
        .wrap(Wrap { trim: false });

    // Rows past the pane's height, borders included.
    let rows = u16::try_from(paragraph.line_count(right[1].width)).unwrap_or(u16::MAX);
    state.max_scroll = rows.saturating_sub(right[1].height);
    state.scroll = state.scroll.min(state.max_scroll);

    frame.render_widget(paragraph.scroll((state.scroll, 0)), right[1]);
}

fn render_header(frame: &mut Frame, area: Rect, song: &Song, state: &mut DetailsState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Now viewing")
        .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let has_thumbnail = state.thumbnail.is_some() && state.picker.is_some();
    let art_width = if has_thumbnail { inner.height * 2 } else { 0 }; // Approximate square

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if has_thumbnail {
            vec![Constraint::Length(art_width + 1), Constraint::Min(10)]
        } else {
            vec![Constraint::Min(10)]
        })
        .split(inner);

    if let Some(ref mut protocol) = state.thumbnail {
        if has_thumbnail {
            frame.render_stateful_widget(StatefulImage::default(), chunks[0], protocol);
        }
    }

    let info_area = if has_thumbnail { chunks[1] } else { chunks[0] };
    let info = vec![
        Line::from(Span::styled(
            song.display_title().to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            song.display_artist().to_string(),
            Style::default().fg(Color::Cyan),
        )),
    ];
    frame.render_widget(Paragraph::new(info), info_area);
}

fn render_markdown_slot(frame: &mut Frame, area: Rect, title: &str, slot: &FetchSlot, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if slot.loading {
        frame.render_widget(
            Spinner::new()
                .label(format!("Generating {}...", title.to_lowercase()))
                .style(Style::default().fg(color)),
            inner,
        );
    } else if let Some(value) = &slot.value {
        let paragraph = Paragraph::new(markdown::to_text(value)).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn queen() -> Song {
        Song {
            id: 1,
            title: String::from("Bohemian Rhapsody"),
            artist: String::from("Queen"),
            thumbnail: Some(String::from("url")),
        }
    }

    fn screen(state: &mut DetailsState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| render_details(frame, frame.area(), state))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_select_clears_previous_results() {
        let mut state = DetailsState::new();
        let first = state.select(queen());
        state.apply_lyrics(Some(String::from("old lyrics")));
        state.apply_details(Some(SongDetails {
            summary: String::from("old summary"),
            rating: String::from("old rating"),
        }));

        let second = state.select(queen());
        assert_ne!(first, second);
        assert_eq!(state.lyrics, FetchSlot::default());
        assert_eq!(state.summary, FetchSlot::default());
        assert_eq!(state.rating, FetchSlot::default());
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
    }

    #[test]
    fn test_lyrics_failure_uses_placeholder() {
        let mut state = DetailsState::new();
        state.select(queen());
        state.lyrics.begin();

        assert!(!state.apply_lyrics(None));
        assert_eq!(state.lyrics.value.as_deref(), Some(LYRICS_NOT_FOUND));
        assert!(!state.lyrics.loading);
    }

    #[test]
    fn test_detail_failure_marks_both_slots() {
        let mut state = DetailsState::new();
        state.select(queen());
        state.begin_details();
        assert!(state.summary.loading && state.rating.loading);

        state.apply_details(None);
        assert_eq!(state.summary.value.as_deref(), Some(DETAILS_FAILED));
        assert_eq!(state.rating.value.as_deref(), Some(DETAILS_FAILED));
        assert!(!state.summary.loading && !state.rating.loading);
    }

    #[test]
    fn test_no_token_is_current_without_selection() {
        let state = DetailsState::new();
        assert!(!state.is_current(0));
    }

    #[test]
    fn test_scroll_stops_at_last_line() {
        let mut state = DetailsState::new();
        state.scroll_by(-5);
        assert_eq!(state.scroll, 0);

        state.select(queen());
        let lyrics = (1..=40)
            .map(|n| format!("line {}", n))
            .collect::<Vec<_>>()
            .join("\n");
        state.apply_lyrics(Some(lyrics));
        screen(&mut state);

        state.scroll_by(i16::MAX);
        let max = state.scroll;
        assert!(max > 0 && max < 40);

        state.scroll_by(10);
        assert_eq!(state.scroll, max);
        let text = screen(&mut state);
        assert!(text.contains("line 40"));
        assert_eq!(state.scroll, max);

        state.scroll_by(-1);
        assert_eq!(state.scroll, max - 1);
    }

    #[test]
    fn test_short_lyrics_do_not_scroll() {
        let mut state = DetailsState::new();
        state.select(queen());
        state.apply_lyrics(Some(String::from("Is this the real life...")));
        screen(&mut state);

        state.scroll_by(10);
        assert_eq!(state.scroll, 0);
    }

    #[test]
    fn test_panel_hidden_until_lyrics_arrive() {
        let mut state = DetailsState::new();
        state.select(queen());
        state.lyrics.begin();

        let loading = screen(&mut state);
        assert!(loading.contains("Bohemian Rhapsody"));
        assert!(loading.contains("Fetching lyrics..."));
        assert!(!loading.contains("Rating"));

        state.apply_lyrics(Some(String::from("Is this the real life...")));
        state.begin_details();
        let loaded = screen(&mut state);
        assert!(loaded.contains("Is this the real life..."));
        assert!(loaded.contains("Rating"));
        assert!(loaded.contains("Generating summary..."));
    }

    #[test]
    fn test_renders_markdown_details() {
        let mut state = DetailsState::new();
        state.select(queen());
        state.apply_lyrics(Some(String::from("Is this the real life...")));
        state.apply_details(Some(SongDetails {
            summary: String::from("A **confession** of a crime."),
            rating: String::from("## T for Teen\n- violence"),
        }));

        let text = screen(&mut state);
        assert!(text.contains("A confession of a crime."));
        assert!(text.contains("T for Teen"));
        assert!(text.contains("• violence"));
        assert!(!text.contains("##"));
    }
}
