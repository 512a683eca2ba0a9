//! lyricscope - search songs, read their lyrics and get AI summaries and ratings.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing_subscriber::prelude::*;

mod action;
mod app;
mod client;
mod config;
mod debounce;
mod tui;
mod ui;

use action::Action;
use app::App;
use config::Config;
use tui::Tui;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "lyricscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lyrics API base URL (overrides config)
    #[arg(short = 'u', long, env = "LYRICSCOPE_API_URL")]
    api_url: Option<String>,

    /// Search debounce delay in milliseconds (overrides config)
    #[arg(short, long)]
    debounce_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tui::install_hooks()?;
    init_logging()?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default configuration: {}", e);
            Config::default()
        }),
    };

    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    if let Some(ms) = args.debounce_ms {
        config.search.debounce_ms = ms;
    }
    config.normalize();

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(config, action_tx.clone());
    app.init();

    let mut tui = Tui::enter()?;
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        tui.draw(|frame| ui::render(frame, &mut app))?;

        tokio::select! {
            _ = ticker.tick() => {
                action_tx.send(Action::Tick)?;
            }
            Some(event) = events.next() => {
                let action = match event? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        handle_key_event(key.code, key.modifiers)
                    }
                    Event::Mouse(mouse) => handle_mouse_event(mouse),
                    _ => Action::None,
                };
                if action != Action::None {
                    action_tx.send(action)?;
                }
            }
            Some(action) = action_rx.recv() => {
                app.handle_action(action)?;
            }
        }

        // Process all pending actions
        while let Ok(action) = action_rx.try_recv() {
            app.handle_action(action)?;
        }

        if app.should_quit {
            break;
        }
    }

    drop(tui);
    tracing::info!("Exiting");

    Ok(())
}

/// Log to a file under the cache directory; the terminal belongs to the TUI.
fn init_logging() -> Result<()> {
    let log_file = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lyricscope")
        .join("lyricscope.log");

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(std::fs::File::create(&log_file)?))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(file_layer)
        .try_init()
        .ok();

    Ok(())
}

/// Map key events to actions.
///
/// The search box always has focus, so plain characters are query input and
/// commands live on control keys.
fn handle_key_event(code: KeyCode, modifiers: KeyModifiers) -> Action {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    match code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Action::Quit,
        KeyCode::Char('u') if ctrl => Action::SearchClear,
        KeyCode::Char('j') if ctrl => Action::ScrollDetails(10),
        KeyCode::Char('k') if ctrl => Action::ScrollDetails(-10),
        KeyCode::Char(_) if ctrl => Action::None,
        KeyCode::Char(c) => Action::SearchInput(c),

        KeyCode::Esc => Action::DismissDropdown,
        KeyCode::Enter => Action::Select,
        KeyCode::Backspace => Action::SearchBackspace,
        KeyCode::Up => Action::NavigateUp,
        KeyCode::Down => Action::NavigateDown,
        KeyCode::PageDown => Action::ScrollDetails(10),
        KeyCode::PageUp => Action::ScrollDetails(-10),
        KeyCode::F(1) => Action::ToggleHelp,

        _ => Action::None,
    }
}

/// Handle mouse events.
fn handle_mouse_event(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::MouseClick(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => Action::MouseScroll(-1),
        MouseEventKind::ScrollDown => Action::MouseScroll(1),
        _ => Action::None,
    }
}
