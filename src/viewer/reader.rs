use crate::config::ScrollConfig;
use crate::gallery::Artwork;
use crate::scroll::{Edge, LayerControl, SegmentTriggers, StoryLayout, TriggerZone};
use crossterm::event::KeyCode;

/// Volume step for the `+`/`-` keys.
pub const VOLUME_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    ToggleMute,
    VolumeUp,
    VolumeDown,
    ToggleAmbient,
    Quit,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::PageDown),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::Top),
            KeyCode::End | KeyCode::Char('G') => Some(Action::Bottom),
            KeyCode::Char('m') | KeyCode::Char('M') => Some(Action::ToggleMute),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::VolumeUp),
            KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::VolumeDown),
            KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::ToggleAmbient),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

struct Segment {
    id: String,
    text: String,
    lines: Vec<String>,
}

/// Scroll position and segment layout of the story being read.
pub struct ReaderState {
    segments: Vec<Segment>,
    triggers: SegmentTriggers,
    zone: TriggerZone,
    gap: u32,
    step: u32,
    width: u16,
    viewport_height: u32,
    layout: StoryLayout,
    scroll: u32,
}

impl ReaderState {
    pub fn new(artwork: &Artwork, config: &ScrollConfig) -> Self {
        let segments = artwork
            .story_segments
            .iter()
            .map(|s| Segment {
                id: s.id.clone(),
                text: s.text.clone(),
                lines: Vec::new(),
            })
            .collect();
        let mut state = Self {
            segments,
            triggers: SegmentTriggers::for_artwork(artwork),
            zone: TriggerZone::new(config.trigger_start, config.trigger_end),
            gap: u32::from(config.segment_gap),
            step: u32::from(config.scroll_step.max(1)),
            width: 0,
            viewport_height: 0,
            layout: StoryLayout::new(&[], 0, 0),
            scroll: 0,
        };
        state.resize(80, 24);
        state
    }

    /// Re-wrap the story for a new viewport, keeping the scroll in range.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width == self.width && u32::from(height) == self.viewport_height {
            return;
        }
        let text_width = usize::from(width.saturating_sub(4).max(10));
        for segment in self.segments.iter_mut() {
            segment.lines = wrap(&segment.text, text_width);
        }
        // One extra row for the segment heading.
        let heights: Vec<u32> = self
            .segments
            .iter()
            .map(|segment| segment.lines.len() as u32 + 1)
            .collect();
        self.width = width;
        self.viewport_height = u32::from(height);
        // The story starts one screen down, below the artwork header.
        self.layout = StoryLayout::new(&heights, self.viewport_height, self.gap);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn apply(&mut self, action: Action) {
        let page = self.viewport_height.saturating_sub(2).max(1);
        match action {
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(self.step),
            Action::ScrollDown => self.scroll = (self.scroll + self.step).min(self.max_scroll()),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(page),
            Action::PageDown => self.scroll = (self.scroll + page).min(self.max_scroll()),
            Action::Top => self.scroll = 0,
            Action::Bottom => self.scroll = self.max_scroll(),
            _ => {}
        }
    }

    /// Push the current visibility into the segment triggers.
    pub fn sync(&mut self, control: &mut dyn LayerControl) -> Vec<(String, Edge)> {
        let visible = self.visibility();
        self.triggers.update(&visible, control)
    }

    pub fn visibility(&self) -> Vec<bool> {
        self.layout
            .visibility(&self.zone, self.scroll, self.viewport_height)
    }

    pub fn in_view(&self) -> Vec<&str> {
        self.triggers.in_view()
    }

    pub fn scroll(&self) -> u32 {
        self.scroll
    }

    pub fn max_scroll(&self) -> u32 {
        self.layout.max_scroll(self.viewport_height)
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Segments overlapping the viewport: (id, wrapped lines, rows hidden
    /// above the viewport, row in the viewport where drawing starts).
    pub fn visible_segments(&self) -> Vec<(&str, &[String], u32, u32)> {
        let bottom = self.scroll + self.viewport_height;
        self.segments
            .iter()
            .zip(self.layout.spans())
            .filter(|(_, span)| span.bottom() > self.scroll && span.top < bottom)
            .map(|(segment, span)| {
                let hidden = self.scroll.saturating_sub(span.top);
                let row = span.top.saturating_sub(self.scroll);
                (segment.id.as_str(), segment.lines.as_slice(), hidden, row)
            })
            .collect()
    }
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
