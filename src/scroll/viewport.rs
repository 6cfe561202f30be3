/// Where on the viewport a segment counts as "in view".
///
/// Both values are fractions of the viewport height measured from its top.
/// A segment is in view while its top edge is above `start` and its bottom
/// edge is below `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerZone {
    pub start: f32,
    pub end: f32,
}

impl Default for TriggerZone {
    fn default() -> Self {
        Self {
            start: 0.6,
            end: 0.4,
        }
    }
}

impl TriggerZone {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start: start.clamp(0.0, 1.0),
            end: end.clamp(0.0, 1.0),
        }
    }

    /// `top`/`bottom` are content coordinates, `scroll` the content offset
    /// at the top of the viewport.
    pub fn contains(&self, top: f32, bottom: f32, scroll: f32, viewport_height: f32) -> bool {
        let start_line = scroll + self.start * viewport_height;
        let end_line = scroll + self.end * viewport_height;
        top <= start_line && bottom >= end_line
    }
}

/// A segment's vertical extent in the laid-out story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub top: u32,
    pub height: u32,
}

impl Span {
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

/// Segments stacked top to bottom with a fixed gap between them and the same
/// amount of blank space before the first and after the last.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryLayout {
    spans: Vec<Span>,
    lead: u32,
}

impl StoryLayout {
    /// `lead` is the space above the first segment and below the last.
    pub fn new(heights: &[u32], lead: u32, gap: u32) -> Self {
        let mut top = lead;
        let spans = heights
            .iter()
            .map(|&height| {
                let span = Span { top, height };
                top += height + gap;
                span
            })
            .collect();
        Self { spans, lead }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn content_height(&self) -> u32 {
        self.spans
            .last()
            .map_or(self.lead, |last| last.bottom() + self.lead)
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll(&self, viewport_height: u32) -> u32 {
        self.content_height().saturating_sub(viewport_height)
    }

    /// Visible flag per segment for the given scroll position.
    pub fn visibility(&self, zone: &TriggerZone, scroll: u32, viewport_height: u32) -> Vec<bool> {
        self.spans
            .iter()
            .map(|span| {
                zone.contains(
                    span.top as f32,
                    span.bottom() as f32,
                    scroll as f32,
                    viewport_height as f32,
                )
            })
            .collect()
    }
}
