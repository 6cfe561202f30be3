// Scroll-visibility handling: which segments are in view and the triggers
// that turn visibility edges into layer play/stop calls

pub mod trigger;
pub mod viewport;

pub use trigger::{Edge, LayerControl, SegmentTriggers, Visibility, VisibilityTrigger};
pub use viewport::{Span, StoryLayout, TriggerZone};
