//! Audio for one mounted artwork page.
//!
//! An [`ArtworkAudio`] is created when the page mounts and dropped when it
//! unmounts. Mounting tears down whatever the engine held before, resolves and
//! preloads the artwork's sounds; dropping releases them, unless a newer mount
//! has already taken the engine over.

use crate::assets::AssetLoader;
use crate::audio::{AudioSnapshot, AudioState, LayerSource};
use crate::config::AudioConfig;
use crate::gallery::Artwork;
use crate::scroll::LayerControl;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioOptions {
    pub ambient_volume: f32,
    pub layer_volume: f32,
    pub autoplay: bool,
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            ambient_volume: 0.3,
            layer_volume: 0.5,
            autoplay: false,
        }
    }
}

impl AudioOptions {
    pub fn from_config(config: &AudioConfig, autoplay: bool) -> Self {
        Self {
            ambient_volume: config.ambient_volume,
            layer_volume: config.layer_volume,
            autoplay,
        }
    }
}

pub struct ArtworkAudio {
    artwork_id: String,
    audio: AudioState,
    options: AudioOptions,
    /// Resolved ambient path, if the artwork has one and it could be found.
    ambient: Option<String>,
    /// Segment id -> resolved layer path.
    layers: HashMap<String, String>,
    ready: bool,
    /// Mount token from the engine; see [`AudioEngine::begin_mount`](crate::audio::AudioEngine::begin_mount).
    epoch: u64,
}

impl ArtworkAudio {
    pub async fn mount(
        artwork: &Artwork,
        audio: AudioState,
        loader: &AssetLoader,
        options: AudioOptions,
    ) -> Self {
        log::info!("Mounting audio for artwork {}", artwork.id);
        let epoch = audio.with(|engine| engine.begin_mount()).unwrap_or(0);

        let ambient = match &artwork.audio_ambient {
            Some(uri) => resolve(loader, uri).await,
            None => None,
        };

        let mut layers = HashMap::new();
        for (segment_id, uri) in artwork.audio_layers() {
            if let Some(path) = resolve(loader, uri).await {
                layers.insert(segment_id.to_string(), path);
            }
        }

        let sources: Vec<LayerSource> = artwork
            .story_segments
            .iter()
            .filter_map(|segment| {
                layers.get(&segment.id).map(|path| LayerSource {
                    id: segment.id.clone(),
                    uri: path.clone(),
                    gain: options.layer_volume,
                })
            })
            .collect();

        let loaded = audio.preload_layers(&sources);
        log::info!(
            "Preloaded {}/{} layers for {}",
            loaded,
            artwork.audio_layers().count(),
            artwork.id
        );

        let session = Self {
            artwork_id: artwork.id.clone(),
            audio,
            options,
            ambient,
            layers,
            ready: true,
            epoch,
        };
        if options.autoplay {
            session.play_ambient();
        }
        session
    }

    pub fn artwork_id(&self) -> &str {
        &self.artwork_id
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn has_ambient(&self) -> bool {
        self.ambient.is_some()
    }

    pub fn has_layer(&self, segment_id: &str) -> bool {
        self.layers.contains_key(segment_id)
    }

    pub fn audio(&self) -> &AudioState {
        &self.audio
    }

    pub fn play_ambient(&self) {
        if let Some(path) = &self.ambient {
            self.audio.load_ambient(path, self.options.ambient_volume);
        }
    }

    pub fn stop_ambient(&self) {
        self.audio.with(|engine| engine.stop_ambient());
    }

    /// Play the layer of a segment that declares one; anything else is ignored.
    pub fn play_layer(&self, segment_id: &str) -> bool {
        if !self.layers.contains_key(segment_id) {
            log::debug!("Segment {} has no audio layer", segment_id);
            return false;
        }
        let volume = self.options.layer_volume;
        self.audio
            .with(|engine| engine.play_layer(segment_id, volume))
            .unwrap_or(false)
    }

    pub fn stop_layer(&self, segment_id: &str) -> bool {
        self.audio
            .with(|engine| engine.stop_layer(segment_id))
            .unwrap_or(false)
    }

    pub fn stop_all_layers(&self) -> Vec<String> {
        self.audio
            .with(|engine| engine.stop_all_layers())
            .unwrap_or_default()
    }

    pub fn active_layers(&self) -> Vec<String> {
        self.audio
            .with(|engine| engine.active_layers())
            .unwrap_or_default()
    }

    pub fn set_volume(&self, volume: f32) -> f32 {
        self.audio
            .with(|engine| engine.set_master_volume(volume))
            .unwrap_or(0.0)
    }

    pub fn volume(&self) -> f32 {
        self.audio
            .with(|engine| engine.master_volume())
            .unwrap_or(0.0)
    }

    pub fn toggle_mute(&self) -> bool {
        self.audio
            .with(|engine| engine.toggle_mute())
            .unwrap_or(false)
    }

    pub fn is_muted(&self) -> bool {
        self.audio
            .with(|engine| engine.is_muted())
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> AudioSnapshot {
        self.audio
            .with(|engine| engine.snapshot())
            .unwrap_or_default()
    }
}

impl LayerControl for ArtworkAudio {
    fn play_layer(&mut self, segment_id: &str) {
        ArtworkAudio::play_layer(self, segment_id);
    }

    fn stop_layer(&mut self, segment_id: &str) {
        ArtworkAudio::stop_layer(self, segment_id);
    }
}

impl Drop for ArtworkAudio {
    fn drop(&mut self) {
        let epoch = self.epoch;
        if self.audio.with(|engine| engine.end_mount(epoch)) == Some(true) {
            log::info!("Unmounted audio for artwork {}", self.artwork_id);
        }
    }
}

async fn resolve(loader: &AssetLoader, uri: &str) -> Option<String> {
    match loader.resolve(uri).await {
        Ok(info) => Some(info.path.to_string_lossy().into_owned()),
        Err(e) => {
            log::warn!("Audio asset {} unavailable: {}", uri, e);
            None
        }
    }
}
