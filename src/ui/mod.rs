//! Main UI layout and rendering.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

pub mod components;
pub mod markdown;

pub use components::*;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Main layout: [title] [search box] [details] [status]
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Search box
            Constraint::Min(5),    // Details
            Constraint::Length(1), // Status line
        ])
        .split(area);

    render_title(frame, chunks[0]);
    render_search_box(frame, chunks[1], &app.search);
    render_details(frame, chunks[2], &mut app.details);
    render_status(frame, chunks[3]);

    // The dropdown hangs below the search box, on top of the details.
    if app.search.show_dropdown() {
        let height = search::dropdown_height(&app.search).min(chunks[2].height);
        let dropdown = Rect {
            x: chunks[1].x,
            y: chunks[2].y,
            width: chunks[1].width,
            height,
        };
        app.layout.dropdown = Some(dropdown);
        render_dropdown(frame, dropdown, &mut app.search);
    } else {
        app.layout.dropdown = None;
    }

    if app.show_help {
        render_help(frame, area);
    }

    if let Some(error) = &app.error_message {
        render_error(frame, area, error);
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "lyricscope",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  song lyrics, summaries and ratings",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

fn render_status(frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Cyan);
    let text = Style::default().fg(Color::DarkGray);
    let status = Paragraph::new(Line::from(vec![
        Span::styled("↑/↓", key),
        Span::styled(" pick  ", text),
        Span::styled("Enter", key),
        Span::styled(" select  ", text),
        Span::styled("Esc", key),
        Span::styled(" hide  ", text),
        Span::styled("PgUp/PgDn", key),
        Span::styled(" scroll  ", text),
        Span::styled("F1", key),
        Span::styled(" help  ", text),
        Span::styled("Ctrl+C", key),
        Span::styled(" quit", text),
    ]));
    frame.render_widget(status, area);
}

/// Render the help overlay.
fn render_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", heading)),
        Line::from(""),
        Line::from("  Type          Search as you type"),
        Line::from("  Backspace     Delete last character"),
        Line::from("  Ctrl+U        Clear the search box"),
        Line::from("  ↑/↓           Move through results"),
        Line::from("  Enter         Show the highlighted song"),
        Line::from("  Esc           Hide results / close overlays"),
        Line::from("  PgUp/PgDn     Scroll lyrics (also Ctrl+K/Ctrl+J)"),
        Line::from("  F1            Toggle this help"),
        Line::from("  Ctrl+C        Quit"),
        Line::from(""),
        Line::from(Span::styled("Mouse", heading)),
        Line::from("  Click         Select a result"),
        Line::from("  Scroll        Scroll lyrics"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or F1 to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// Render an error message overlay.
fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(60, 20, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error [Esc to dismiss]")
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::Song;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Config::default(), tx)
    }

    #[test]
    fn test_dropdown_drawn_and_recorded() {
        let mut app = app();
        app.search.query = String::from("Bohemian");
        app.search.set_results(vec![Song {
            id: 1,
            title: String::from("Bohemian Rhapsody"),
            artist: String::from("Queen"),
            thumbnail: None,
        }]);

        let screen = draw(&mut app);
        assert!(screen.contains("Results (1)"));
        assert!(screen.contains("Bohemian Rhapsody - Queen"));

        let dropdown = app.layout.dropdown.expect("dropdown area recorded");
        assert_eq!(dropdown.y, 4);
        assert_eq!(dropdown.height, 3);
    }

    #[test]
    fn test_dismissed_dropdown_not_drawn() {
        let mut app = app();
        app.search.query = String::from("Bohemian");
        app.search.set_results(vec![Song {
            id: 1,
            title: String::from("Bohemian Rhapsody"),
            artist: String::from("Queen"),
            thumbnail: None,
        }]);
        app.search.dismiss();

        let screen = draw(&mut app);
        assert!(!screen.contains("Results (1)"));
        assert!(app.layout.dropdown.is_none());
    }

    #[test]
    fn test_error_overlay() {
        let mut app = app();
        app.error_message = Some(String::from("Invalid API URL"));
        let screen = draw(&mut app);
        assert!(screen.contains("Invalid API URL"));
    }
}
