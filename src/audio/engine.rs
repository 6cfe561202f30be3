use super::backend::{Sound, SoundBackend};
use super::fade::FadeEnd;
use super::registry::{LayerState, SoundHandle, SoundRegistry};
use super::volume::MasterVolume;
use std::sync::Arc;
use std::time::Duration;

/// Default fade length for ambient and layers.
pub const DEFAULT_FADE: Duration = Duration::from_millis(1500);

/// A segment layer to preload.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSource {
    pub id: String,
    pub uri: String,
    pub gain: f32,
}

/// Point-in-time view of the engine, for status displays and logs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioSnapshot {
    pub ambient_playing: bool,
    /// Sorted.
    pub active_layers: Vec<String>,
    pub total_layers: usize,
    pub master_volume: f32,
    pub muted: bool,
}

/// Adaptive audio for one mounted artwork: the ambient loop, the segment
/// layers and the master volume.
///
/// Time only moves through [`AudioEngine::advance`]; a
/// [`FadeDriver`](super::fader::FadeDriver) calls it on a fixed tick.
pub struct AudioEngine {
    registry: SoundRegistry,
    volume: MasterVolume,
    /// Bumped by every mount; only the newest mount may tear down.
    mount_epoch: u64,
}

impl AudioEngine {
    pub fn new(backend: Box<dyn SoundBackend>, fade_duration: Duration) -> Self {
        log::info!(
            "Audio engine ready ({} backend, {} ms fades)",
            backend.name(),
            fade_duration.as_millis()
        );
        Self {
            registry: SoundRegistry::new(backend, fade_duration),
            volume: MasterVolume::default(),
            mount_epoch: 0,
        }
    }

    pub fn registry(&self) -> &SoundRegistry {
        &self.registry
    }

    pub fn fade_duration(&self) -> Duration {
        self.registry.fade_duration()
    }

    pub fn backend(&self) -> Arc<dyn SoundBackend> {
        self.registry.backend()
    }

    // ===== Mount lifecycle =====

    /// Release everything the previous page held and claim the engine for a
    /// new one. Returns the token [`end_mount`](Self::end_mount) expects.
    pub fn begin_mount(&mut self) -> u64 {
        self.registry.unload_all();
        self.mount_epoch += 1;
        self.mount_epoch
    }

    /// Release everything if `epoch` is still the current mount. A page
    /// that has already been replaced leaves its successor alone.
    pub fn end_mount(&mut self, epoch: u64) -> bool {
        if epoch != self.mount_epoch {
            log::debug!("Mount {} already replaced by {}", epoch, self.mount_epoch);
            return false;
        }
        self.registry.unload_all();
        true
    }

    pub fn mount_epoch(&self) -> u64 {
        self.mount_epoch
    }

    // ===== Registry =====

    pub fn load_ambient(&mut self, uri: &str, target_gain: f32) -> bool {
        self.registry.load_ambient(uri, target_gain)
    }

    pub fn start_ambient(&mut self, uri: &str, sound: Box<dyn Sound>, target_gain: f32) {
        self.registry.start_ambient(uri, sound, target_gain);
    }

    pub fn stop_ambient(&mut self) -> bool {
        self.registry.stop_ambient()
    }

    pub fn ambient(&self) -> Option<&SoundHandle> {
        self.registry.ambient()
    }

    pub fn load_layer(&mut self, id: &str, uri: &str, gain: f32) -> bool {
        self.registry.load_layer(id, uri, gain)
    }

    pub fn insert_layer(&mut self, id: &str, uri: &str, sound: Box<dyn Sound>, gain: f32) -> bool {
        self.registry.insert_layer(id, uri, sound, gain)
    }

    /// Preload a batch of layers. Returns how many new handles were created.
    pub fn preload_layers<'a>(&mut self, layers: impl IntoIterator<Item = &'a LayerSource>) -> usize {
        layers
            .into_iter()
            .filter(|layer| self.registry.load_layer(&layer.id, &layer.uri, layer.gain))
            .count()
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.registry.layer(id).is_some()
    }

    pub fn layer_state(&self, id: &str) -> Option<LayerState> {
        self.registry.layer(id).map(|layer| layer.state())
    }

    pub fn unload_all(&mut self) {
        self.registry.unload_all();
    }

    // ===== Layer playback =====

    /// Fade a preloaded layer in.
    ///
    /// Unknown ids are logged and ignored. A layer that is already fading in
    /// or audible is left alone. A layer still fading out is turned around
    /// from its current level instead of restarting.
    pub fn play_layer(&mut self, id: &str, target_gain: f32) -> bool {
        let fade = self.registry.fade_duration();
        let Some(layer) = self.registry.layer_mut(id) else {
            log::warn!("Layer {} not preloaded, ignoring play", id);
            return false;
        };
        let target = target_gain.clamp(0.0, 1.0);
        let playing = layer.handle.is_playing();

        match layer.state {
            LayerState::FadingIn | LayerState::Audible if playing => {
                log::debug!("Layer {} already sounding", id);
                return false;
            }
            LayerState::FadingOut if playing => {
                log::debug!("Layer {} re-entered while fading out", id);
            }
            _ => layer.handle.start(),
        }
        layer.handle.fade_to(target, fade, FadeEnd::Hold);
        layer.state = LayerState::FadingIn;
        log::debug!("Layer {} fading in to {:.2}", id, target);
        true
    }

    /// Fade an active layer out; playback stops once the fade completes.
    pub fn stop_layer(&mut self, id: &str) -> bool {
        let fade = self.registry.fade_duration();
        let Some(layer) = self.registry.layer_mut(id) else {
            return false;
        };
        match layer.state {
            LayerState::Idle | LayerState::FadingOut => false,
            LayerState::FadingIn | LayerState::Audible => {
                layer.handle.fade_to(0.0, fade, FadeEnd::Stop);
                layer.state = LayerState::FadingOut;
                log::debug!("Layer {} fading out", id);
                true
            }
        }
    }

    /// Call [`stop_layer`](Self::stop_layer) for every active layer and
    /// return their ids.
    pub fn stop_all_layers(&mut self) -> Vec<String> {
        let ids = self.registry.active_ids();
        for id in &ids {
            self.stop_layer(id);
        }
        ids
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.layer_state(id).is_some_and(LayerState::is_active)
    }

    /// Ids currently sounding or fading, sorted.
    pub fn active_layers(&self) -> Vec<String> {
        self.registry.active_ids()
    }

    // ===== Volume =====

    /// Clamp and apply the master volume. Returns the stored level.
    pub fn set_master_volume(&mut self, volume: f32) -> f32 {
        let level = self.volume.set_level(volume);
        self.registry.set_output_gain(self.volume.effective());
        level
    }

    /// Flip mute and return the new state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.volume.toggle_mute();
        self.registry.set_output_gain(self.volume.effective());
        log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.registry.set_output_gain(self.volume.effective());
    }

    pub fn master_volume(&self) -> f32 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn effective_gain(&self) -> f32 {
        self.volume.effective()
    }

    pub fn snapshot(&self) -> AudioSnapshot {
        AudioSnapshot {
            ambient_playing: self.ambient().is_some_and(SoundHandle::is_playing),
            active_layers: self.active_layers(),
            total_layers: self.registry.layer_count(),
            master_volume: self.volume.level(),
            muted: self.volume.is_muted(),
        }
    }

    // ===== Time =====

    pub fn advance(&mut self, dt: Duration) {
        self.registry.advance(dt);
    }
}
