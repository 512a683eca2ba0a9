//! Search box and results dropdown component.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::client::models::Song;

/// Most dropdown rows shown at once.
const MAX_DROPDOWN_ROWS: u16 = 10;

/// Search state.
#[derive(Debug, Default)]
pub struct SearchState {
    /// Current search query, as typed
    pub query: String,

    /// Results of the last applied search, in backend order
    pub results: Vec<Song>,

    /// Whether the dropdown has been opened by a search response
    pub dropdown_visible: bool,

    /// Highlighted dropdown row
    pub list_state: ListState,

    /// A search request is in flight
    pub searching: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The query with surrounding whitespace removed.
    pub fn trimmed_query(&self) -> &str {
        self.query.trim()
    }

    /// Add character to query.
    pub fn input(&mut self, c: char) {
        self.query.push(c);
    }

    /// Remove last character from query. Returns whether anything changed.
    pub fn backspace(&mut self) -> bool {
        self.query.pop().is_some()
    }

    /// Clear the query text.
    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Clear search results and hide the dropdown.
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.list_state.select(None);
        self.dropdown_visible = false;
        self.searching = false;
    }

    /// Replace the results and open the dropdown.
    pub fn set_results(&mut self, songs: Vec<Song>) {
        self.results = songs;
        self.dropdown_visible = true;
        self.searching = false;
        self.list_state
            .select(if self.results.is_empty() { None } else { Some(0) });
    }

    /// Hide the dropdown without touching the results.
    pub fn dismiss(&mut self) {
        self.dropdown_visible = false;
    }

    /// Whether the dropdown should actually be drawn.
    pub fn show_dropdown(&self) -> bool {
        self.dropdown_visible && !self.trimmed_query().is_empty() && !self.results.is_empty()
    }

    /// Move selection up.
    pub fn select_previous(&mut self) {
        let len = self.results.len();
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i > 0 => i - 1,
            Some(_) => len - 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        let len = self.results.len();
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i < len - 1 => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Get the highlighted song.
    pub fn selected_song(&self) -> Option<&Song> {
        self.list_state
            .selected()
            .and_then(|i| self.results.get(i))
    }

    /// Map a row inside the dropdown's inner area to a song, honoring scroll.
    pub fn song_at_row(&self, row: u16) -> Option<&Song> {
        self.results.get(self.list_state.offset() + row as usize)
    }
}

/// Height of the dropdown including borders.
pub fn dropdown_height(state: &SearchState) -> u16 {
    (state.results.len() as u16).min(MAX_DROPDOWN_ROWS) + 2
}

/// Render the search input box.
pub fn render_search_box(frame: &mut Frame, area: Rect, state: &SearchState) {
    let title = if state.searching {
        "Search songs (searching...)"
    } else {
        "Search songs"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);

    let line = if state.query.is_empty() {
        Line::from(Span::styled(
            "Type a song title or artist...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        // Keep the end of a long query (and the cursor) in view.
        let visible = tail_fitting(&state.query, inner.width.saturating_sub(1) as usize);
        Line::from(vec![
            Span::styled(visible.to_string(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ])
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Render the results dropdown.
pub fn render_dropdown(frame: &mut Frame, area: Rect, state: &mut SearchState) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Results ({})", state.results.len()))
        .border_style(Style::default().fg(Color::Yellow));

    let items: Vec<ListItem> = state
        .results
        .iter()
        .map(|song| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    song.display_title().to_string(),
                    Style::default().fg(Color::White),
                ),
                Span::styled(" - ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    song.display_artist().to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut state.list_state);
}

/// Longest suffix of `s` whose display width fits in `max`.
fn tail_fitting(s: &str, max: usize) -> &str {
    if s.width() <= max {
        return s;
    }

    let mut width = 0;
    let mut start = s.len();
    for (idx, c) in s.char_indices().rev() {
        width += c.width().unwrap_or(0);
        if width > max {
            break;
        }
        start = idx;
    }
    &s[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: i64, title: &str) -> Song {
        Song {
            id,
            title: title.to_string(),
            artist: String::from("Queen"),
            thumbnail: None,
        }
    }

    #[test]
    fn test_dropdown_requires_query_and_results() {
        let mut state = SearchState::new();
        state.set_results(vec![]);
        assert!(state.dropdown_visible);
        assert!(!state.show_dropdown());

        state.query = String::from("   ");
        state.set_results(vec![song(1, "Bohemian Rhapsody")]);
        assert!(!state.show_dropdown());

        state.query = String::from("Bohemian");
        assert!(state.show_dropdown());

        state.dismiss();
        assert!(!state.show_dropdown());
        assert_eq!(state.results.len(), 1);
    }

    #[test]
    fn test_results_keep_backend_order() {
        let mut state = SearchState::new();
        state.set_results(vec![song(3, "C"), song(1, "A"), song(2, "B")]);
        let ids: Vec<i64> = state.results.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(state.selected_song().map(|s| s.id), Some(3));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = SearchState::new();
        state.set_results(vec![song(1, "A"), song(2, "B")]);

        state.select_previous();
        assert_eq!(state.selected_song().map(|s| s.id), Some(2));
        state.select_next();
        assert_eq!(state.selected_song().map(|s| s.id), Some(1));
    }

    #[test]
    fn test_clear_results_hides_dropdown() {
        let mut state = SearchState::new();
        state.query = String::from("abc");
        state.set_results(vec![song(1, "A")]);
        state.clear_results();
        assert!(state.results.is_empty());
        assert!(!state.dropdown_visible);
        assert!(state.selected_song().is_none());
    }

    #[test]
    fn test_backspace_on_empty_query() {
        let mut state = SearchState::new();
        assert!(!state.backspace());
        state.input('a');
        assert!(state.backspace());
        assert!(state.query.is_empty());
    }

    #[test]
    fn test_tail_fitting() {
        assert_eq!(tail_fitting("hello", 10), "hello");
        assert_eq!(tail_fitting("hello world", 5), "world");
        assert_eq!(tail_fitting("日本語", 4), "本語");
        assert_eq!(tail_fitting("日本語", 3), "語");
    }
}
