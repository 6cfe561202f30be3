use super::artwork::Artwork;
use crate::error::CatalogError;
use std::collections::HashSet;
use std::path::Path;

/// The artworks available to the reader, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    artworks: Vec<Artwork>,
}

impl Catalog {
    pub fn new(artworks: Vec<Artwork>) -> Result<Self, CatalogError> {
        for artwork in &artworks {
            let mut seen = HashSet::new();
            for segment in &artwork.story_segments {
                if !seen.insert(segment.id.as_str()) {
                    return Err(CatalogError::DuplicateSegment {
                        artwork: artwork.id.clone(),
                        segment: segment.id.clone(),
                    });
                }
            }
        }
        Ok(Self { artworks })
    }

    /// Parse a JSON array of artworks.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let catalog = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded {} artworks from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Artwork, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownArtwork(id.to_string()))
    }

    pub fn by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Artwork> + 'a {
        self.artworks.iter().filter(move |a| a.has_tag(tag))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.artworks.iter().map(|a| a.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artwork> {
        self.artworks.iter()
    }

    pub fn len(&self) -> usize {
        self.artworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }
}
