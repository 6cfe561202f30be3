//! Terminal scrollytelling reader.
//!
//! Shows one artwork's story as a scrollable column of segments. Every redraw
//! recomputes which segments sit inside the trigger zone and feeds that into
//! the segment triggers, which play and stop the audio layers.

pub mod reader;

pub use reader::{Action, ReaderState, VOLUME_STEP};

use crate::config::ScrollConfig;
use crate::gallery::Artwork;
use crate::prefs::{AudioPreferences, KeyValueStore};
use crate::session::ArtworkAudio;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::{self, stdout};
use std::time::Duration;

/// Input poll interval; also the redraw rate while idle.
const POLL: Duration = Duration::from_millis(50);

/// Everything the reader shows besides the story itself.
struct StatusLine {
    title: String,
    artist: String,
    volume: f32,
    muted: bool,
    ambient_on: bool,
    active: Vec<String>,
}

pub struct Viewer<'a> {
    artwork: &'a Artwork,
    session: &'a mut ArtworkAudio,
    store: &'a dyn KeyValueStore,
    prefs: AudioPreferences,
    reader: ReaderState,
    ambient_on: bool,
}

impl<'a> Viewer<'a> {
    pub fn new(
        artwork: &'a Artwork,
        session: &'a mut ArtworkAudio,
        store: &'a dyn KeyValueStore,
        prefs: AudioPreferences,
        scroll: &ScrollConfig,
    ) -> Self {
        let ambient_on = prefs.auto_play_audio && session.has_ambient();
        Self {
            artwork,
            session,
            store,
            prefs,
            reader: ReaderState::new(artwork, scroll),
            ambient_on,
        }
    }

    /// Take over the terminal until the user quits.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(out))?;

        let result = self.event_loop(&mut terminal);

        // Restore the terminal even when the loop failed.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.session.stop_all_layers();
        self.session.stop_ambient();
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        loop {
            let size = terminal.size()?;
            // Header and status rows are not part of the story viewport.
            self.reader
                .resize(size.width, size.height.saturating_sub(2));
            for (segment, edge) in self.reader.sync(&mut *self.session) {
                log::debug!("Segment {} {:?}", segment, edge);
            }

            let status = self.status();
            let reader = &self.reader;
            terminal.draw(|f| draw_ui(f, reader, &status))?;

            if !event::poll(POLL)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let Some(action) = Action::from_key(key.code) else {
                    continue;
                };
                if action == Action::Quit {
                    return Ok(());
                }
                self.handle(action);
            }
        }
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::ToggleMute => {
                self.session.toggle_mute();
            }
            Action::VolumeUp => self.change_volume(VOLUME_STEP),
            Action::VolumeDown => self.change_volume(-VOLUME_STEP),
            Action::ToggleAmbient => {
                if self.ambient_on {
                    self.session.stop_ambient();
                } else {
                    self.session.play_ambient();
                }
                self.ambient_on = !self.ambient_on && self.session.has_ambient();
            }
            scroll => self.reader.apply(scroll),
        }
    }

    fn change_volume(&mut self, delta: f32) {
        let volume = self.session.set_volume(self.session.volume() + delta);
        self.prefs.set_gain(volume);
        if let Err(e) = self.prefs.save(self.store) {
            log::warn!("Failed to save audio preferences: {}", e);
        }
    }

    fn status(&self) -> StatusLine {
        let audio = self.session.snapshot();
        StatusLine {
            title: self.artwork.title.clone(),
            artist: self.artwork.artist.clone(),
            volume: audio.master_volume,
            muted: audio.muted,
            ambient_on: self.ambient_on,
            active: audio.active_layers,
        }
    }
}

fn draw_ui(f: &mut Frame, reader: &ReaderState, status: &StatusLine) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Line::from(vec![
        Span::styled(status.title.as_str(), Style::default().bold()),
        Span::raw("  "),
        Span::styled(status.artist.as_str(), Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    draw_story(f, reader, chunks[1]);

    let volume = if status.muted {
        "muted".to_string()
    } else {
        format!("{:>3}%", (status.volume * 100.0).round() as u32)
    };
    let layers = if status.active.is_empty() {
        "-".to_string()
    } else {
        status.active.join(", ")
    };
    let footer = Line::from(vec![
        Span::styled(format!(" vol {} ", volume), Style::default().fg(Color::Yellow)),
        Span::raw(format!(
            " ambient {} ",
            if status.ambient_on { "on" } else { "off" }
        )),
        Span::raw(format!(" layers {} ", layers)),
        Span::styled(
            "  j/k scroll  m mute  +/- volume  a ambient  q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(footer), chunks[2]);
}

fn draw_story(f: &mut Frame, reader: &ReaderState, area: Rect) {
    let in_view = reader.in_view();
    for (id, lines, hidden, row) in reader.visible_segments() {
        let row = row as u16;
        if row >= area.height {
            continue;
        }
        let highlighted = in_view.contains(&id);
        let heading_style = if highlighted {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text_style = if highlighted {
            Style::default()
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut text = vec![Line::styled(format!("◆ {}", id), heading_style)];
        text.extend(
            lines
                .iter()
                .map(|line| Line::styled(line.as_str(), text_style)),
        );

        let height = (text.len() as u16)
            .saturating_sub(hidden as u16)
            .min(area.height - row);
        let rect = Rect::new(area.x + 2, area.y + row, area.width.saturating_sub(4), height);
        f.render_widget(Paragraph::new(text).scroll((hidden as u16, 0)), rect);
    }
}
