use crate::gallery::Artwork;

/// What a visibility trigger drives.
pub trait LayerControl {
    fn play_layer(&mut self, segment_id: &str);
    fn stop_layer(&mut self, segment_id: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    OutOfView,
    InView,
}

/// The transition an update caused, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Entered,
    Left,
}

/// Turns a segment's visible flag into play/stop calls on its edges.
#[derive(Debug, Clone)]
pub struct VisibilityTrigger {
    segment_id: String,
    state: Visibility,
}

impl VisibilityTrigger {
    pub fn new(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            state: Visibility::OutOfView,
        }
    }

    pub fn segment_id(&self) -> &str {
        &self.segment_id
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    /// Feed the current visible flag. Only a change of state reaches `control`.
    pub fn update(&mut self, visible: bool, control: &mut dyn LayerControl) -> Option<Edge> {
        match (self.state, visible) {
            (Visibility::OutOfView, true) => {
                self.state = Visibility::InView;
                control.play_layer(&self.segment_id);
                Some(Edge::Entered)
            }
            (Visibility::InView, false) => {
                self.state = Visibility::OutOfView;
                control.stop_layer(&self.segment_id);
                Some(Edge::Left)
            }
            _ => None,
        }
    }
}

/// One trigger per story segment, in story order.
#[derive(Debug, Clone, Default)]
pub struct SegmentTriggers {
    triggers: Vec<VisibilityTrigger>,
}

impl SegmentTriggers {
    pub fn for_artwork(artwork: &Artwork) -> Self {
        Self {
            triggers: artwork
                .story_segments
                .iter()
                .map(|segment| VisibilityTrigger::new(segment.id.clone()))
                .collect(),
        }
    }

    /// Feed one visible flag per segment, in story order. Extra flags are
    /// ignored; missing ones leave their trigger untouched.
    pub fn update(&mut self, visible: &[bool], control: &mut dyn LayerControl) -> Vec<(String, Edge)> {
        self.triggers
            .iter_mut()
            .zip(visible)
            .filter_map(|(trigger, &flag)| {
                trigger
                    .update(flag, control)
                    .map(|edge| (trigger.segment_id().to_string(), edge))
            })
            .collect()
    }

    /// Segments currently in view.
    pub fn in_view(&self) -> Vec<&str> {
        self.triggers
            .iter()
            .filter(|t| t.state() == Visibility::InView)
            .map(VisibilityTrigger::segment_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl LayerControl for Recorder {
        fn play_layer(&mut self, segment_id: &str) {
            self.calls.push(format!("play:{segment_id}"));
        }

        fn stop_layer(&mut self, segment_id: &str) {
            self.calls.push(format!("stop:{segment_id}"));
        }
    }

    #[test]
    fn initially_visible_plays_once() {
        let mut recorder = Recorder::default();
        let mut trigger = VisibilityTrigger::new("s");

        assert_eq!(trigger.update(true, &mut recorder), Some(Edge::Entered));
        assert_eq!(trigger.update(true, &mut recorder), None);
        assert_eq!(recorder.calls, vec!["play:s"]);
    }

    #[test]
    fn initially_hidden_does_nothing() {
        let mut recorder = Recorder::default();
        let mut trigger = VisibilityTrigger::new("s");
        assert_eq!(trigger.update(false, &mut recorder), None);
        assert!(recorder.calls.is_empty());
        assert_eq!(trigger.state(), Visibility::OutOfView);
    }

    #[test]
    fn scrolling_back_replays() {
        let mut recorder = Recorder::default();
        let mut trigger = VisibilityTrigger::new("s");

        for visible in [true, false, true] {
            trigger.update(visible, &mut recorder);
        }
        assert_eq!(recorder.calls, vec!["play:s", "stop:s", "play:s"]);
    }

    #[test]
    fn segment_triggers_report_edges() {
        let mut recorder = Recorder::default();
        let mut triggers = SegmentTriggers {
            triggers: vec![
                VisibilityTrigger::new("a"),
                VisibilityTrigger::new("b"),
                VisibilityTrigger::new("c"),
            ],
        };

        let edges = triggers.update(&[true, false, false], &mut recorder);
        assert_eq!(edges, vec![("a".to_string(), Edge::Entered)]);

        let edges = triggers.update(&[false, true], &mut recorder);
        assert_eq!(
            edges,
            vec![("a".to_string(), Edge::Left), ("b".to_string(), Edge::Entered)]
        );
        assert_eq!(triggers.in_view(), vec!["b"]);
        assert_eq!(recorder.calls, vec!["play:a", "stop:a", "play:b"]);
    }
}
