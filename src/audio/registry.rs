use super::backend::{Sound, SoundBackend};
use super::fade::{Fade, FadeEnd};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// A loaded sound plus the fade level the engine keeps for it.
///
/// `gain` is the fade level in 0.0..=1.0. What reaches the output is
/// `gain * output_gain`, applied on every change.
pub struct SoundHandle {
    id: Uuid,
    uri: String,
    looping: bool,
    gain: f32,
    fade: Option<Fade>,
    sound: Box<dyn Sound>,
}

impl SoundHandle {
    fn new(uri: &str, looping: bool, sound: Box<dyn Sound>) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri: uri.to_string(),
            looping,
            gain: 0.0,
            fade: None,
            sound,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn is_playing(&self) -> bool {
        self.sound.is_playing()
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Level the in-flight fade is heading to.
    pub fn fade_target(&self) -> Option<f32> {
        self.fade.as_ref().map(Fade::target)
    }

    /// Restart from silence.
    pub(crate) fn start(&mut self) {
        self.fade = None;
        self.gain = 0.0;
        self.sound.set_volume(0.0);
        self.sound.play();
    }

    /// Replace any in-flight fade with a ramp from the current level.
    pub(crate) fn fade_to(&mut self, target: f32, duration: Duration, end: FadeEnd) {
        self.fade = Some(Fade::new(self.gain, target, duration, end));
    }

    pub(crate) fn halt(&mut self) {
        self.fade = None;
        self.sound.stop();
    }

    fn apply(&mut self, output_gain: f32) {
        self.sound.set_volume(self.gain * output_gain);
    }

    /// Step the fade. Returns the completion action when it just finished.
    fn advance(&mut self, dt: Duration, output_gain: f32) -> Option<FadeEnd> {
        let fade = self.fade.as_mut()?;
        self.gain = fade.advance(dt);
        let finished = fade.is_finished().then(|| fade.end());
        if finished.is_some() {
            self.fade = None;
        }
        self.apply(output_gain);
        finished
    }
}

/// Where a preloaded layer is in its play/stop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Idle,
    FadingIn,
    Audible,
    FadingOut,
}

impl LayerState {
    /// Active from the fade-in until the matching fade-out completes.
    pub fn is_active(self) -> bool {
        self != LayerState::Idle
    }
}

pub struct Layer {
    pub(crate) handle: SoundHandle,
    pub(crate) gain: f32,
    pub(crate) state: LayerState,
}

impl Layer {
    pub fn handle(&self) -> &SoundHandle {
        &self.handle
    }

    /// Level given at preload time.
    pub fn configured_gain(&self) -> f32 {
        self.gain
    }

    pub fn state(&self) -> LayerState {
        self.state
    }
}

/// Owns every sound of the mounted artwork: the ambient slot, ambients still
/// fading out after being replaced, and the segment layers.
pub struct SoundRegistry {
    backend: Arc<dyn SoundBackend>,
    fade_duration: Duration,
    output_gain: f32,
    ambient: Option<SoundHandle>,
    retiring: Vec<SoundHandle>,
    layers: HashMap<String, Layer>,
}

impl SoundRegistry {
    pub fn new(backend: Box<dyn SoundBackend>, fade_duration: Duration) -> Self {
        Self {
            backend: Arc::from(backend),
            fade_duration,
            output_gain: 1.0,
            ambient: None,
            retiring: Vec::new(),
            layers: HashMap::new(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// The backend, for loading sounds without holding the engine.
    pub fn backend(&self) -> Arc<dyn SoundBackend> {
        self.backend.clone()
    }

    pub fn fade_duration(&self) -> Duration {
        self.fade_duration
    }

    pub fn set_output_gain(&mut self, gain: f32) {
        self.output_gain = gain;
        let handles = self
            .ambient
            .iter_mut()
            .chain(self.retiring.iter_mut())
            .chain(self.layers.values_mut().map(|layer| &mut layer.handle));
        for handle in handles {
            handle.apply(gain);
        }
    }

    /// Start a new ambient loop, fading out whatever was playing before.
    ///
    /// Returns false when the source could not be loaded; the previous
    /// ambient is retired either way.
    pub fn load_ambient(&mut self, uri: &str, target_gain: f32) -> bool {
        match self.backend.load(uri, true) {
            Ok(sound) => {
                self.start_ambient(uri, sound, target_gain);
                true
            }
            Err(e) => {
                self.retire_ambient();
                log::warn!("Ambient load failed: {}", e);
                false
            }
        }
    }

    /// [`load_ambient`](Self::load_ambient) for a sound loaded beforehand.
    pub fn start_ambient(&mut self, uri: &str, sound: Box<dyn Sound>, target_gain: f32) {
        self.retire_ambient();
        let mut handle = SoundHandle::new(uri, true, sound);
        handle.start();
        handle.fade_to(target_gain.clamp(0.0, 1.0), self.fade_duration, FadeEnd::Hold);
        log::info!("Ambient started: {} ({})", uri, handle.id());
        self.ambient = Some(handle);
    }

    /// Fade the ambient out and release it afterwards.
    pub fn stop_ambient(&mut self) -> bool {
        self.retire_ambient()
    }

    fn retire_ambient(&mut self) -> bool {
        let Some(mut previous) = self.ambient.take() else {
            return false;
        };
        log::debug!("Retiring ambient {} ({})", previous.uri(), previous.id());
        previous.fade_to(0.0, self.fade_duration, FadeEnd::Release);
        self.retiring.push(previous);
        true
    }

    pub fn ambient(&self) -> Option<&SoundHandle> {
        self.ambient.as_ref()
    }

    /// Number of replaced ambients still fading out.
    pub fn retiring_count(&self) -> usize {
        self.retiring.len()
    }

    /// Preload a segment layer. A no-op when `id` is already known.
    ///
    /// Returns true when a new handle was created.
    pub fn load_layer(&mut self, id: &str, uri: &str, gain: f32) -> bool {
        if self.layers.contains_key(id) {
            log::debug!("Layer {} already preloaded", id);
            return false;
        }
        match self.backend.load(uri, false) {
            Ok(sound) => self.insert_layer(id, uri, sound, gain),
            Err(e) => {
                log::warn!("Layer {} load failed: {}", id, e);
                false
            }
        }
    }

    /// [`load_layer`](Self::load_layer) for a sound loaded beforehand. The
    /// sound is dropped if `id` is already known.
    pub fn insert_layer(&mut self, id: &str, uri: &str, sound: Box<dyn Sound>, gain: f32) -> bool {
        if self.layers.contains_key(id) {
            log::debug!("Layer {} already preloaded", id);
            return false;
        }
        let handle = SoundHandle::new(uri, false, sound);
        log::debug!("Layer {} preloaded from {} ({})", id, uri, handle.id());
        self.layers.insert(
            id.to_string(),
            Layer {
                handle,
                gain,
                state: LayerState::Idle,
            },
        );
        true
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.get(id)
    }

    pub(crate) fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.get_mut(id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Ids of active layers, sorted.
    pub fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .layers
            .iter()
            .filter(|(_, layer)| layer.state.is_active())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Release every handle immediately.
    pub fn unload_all(&mut self) {
        let count = self.layers.len() + self.retiring.len() + usize::from(self.ambient.is_some());
        for handle in self
            .ambient
            .iter_mut()
            .chain(self.retiring.iter_mut())
            .chain(self.layers.values_mut().map(|layer| &mut layer.handle))
        {
            handle.halt();
        }
        self.ambient = None;
        self.retiring.clear();
        self.layers.clear();
        if count > 0 {
            log::info!("Released {} sound handles", count);
        }
    }

    /// Step every in-flight fade and run the completions that are due.
    pub fn advance(&mut self, dt: Duration) {
        let output_gain = self.output_gain;

        // The slot only ever holds a `Hold` fade; stopping moves it to `retiring`.
        if let Some(ambient) = self.ambient.as_mut() {
            ambient.advance(dt, output_gain);
        }

        self.retiring.retain_mut(|handle| {
            if handle.advance(dt, output_gain).is_none() && handle.is_fading() {
                return true;
            }
            handle.halt();
            log::debug!("Released ambient {} ({})", handle.uri(), handle.id());
            false
        });

        for (id, layer) in self.layers.iter_mut() {
            match layer.handle.advance(dt, output_gain) {
                Some(FadeEnd::Hold) => {
                    if layer.state == LayerState::FadingIn {
                        layer.state = LayerState::Audible;
                    }
                }
                Some(FadeEnd::Stop) | Some(FadeEnd::Release) => {
                    layer.handle.halt();
                    layer.state = LayerState::Idle;
                    log::debug!("Layer {} stopped", id);
                }
                None => {}
            }
        }
    }
}
