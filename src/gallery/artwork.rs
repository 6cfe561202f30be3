use serde::{Deserialize, Serialize};

/// Image animation a segment asks the page for while it is in view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageEffect {
    ZoomInCenter,
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    PanLeftDown,
    PanRightUp,
    RotateSubtle,
    ScaleBreathe,
}

/// One scroll-triggered block of an artwork's story.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorySegment {
    pub id: String,
    pub text: String,
    /// Audio layer played while the segment is in view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_layer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_effect: Option<ImageEffect>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub text: String,
    pub created_at: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub liked_by: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Love,
    Inspiring,
    Thoughtful,
    Beautiful,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reaction {
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub count: u32,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_image: String,
    #[serde(default)]
    pub thumbnail_image: String,
    /// Looping background track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_ambient: Option<String>,
    #[serde(default)]
    pub story_segments: Vec<StorySegment>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dominant_colors: Vec<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl Artwork {
    pub fn segment(&self, id: &str) -> Option<&StorySegment> {
        self.story_segments.iter().find(|s| s.id == id)
    }

    /// `(segment id, layer locator)` for every segment that has a layer.
    pub fn audio_layers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.story_segments
            .iter()
            .filter_map(|s| s.audio_layer.as_deref().map(|uri| (s.id.as_str(), uri)))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn reaction_count(&self, kind: ReactionType) -> u32 {
        self.reactions
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.count)
            .sum()
    }
}
