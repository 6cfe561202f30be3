// Artwork data model and the catalog it is read from

pub mod artwork;
pub mod catalog;

pub use artwork::{Artwork, Comment, ImageEffect, Reaction, ReactionType, StorySegment};
pub use catalog::Catalog;
