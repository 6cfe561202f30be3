pub mod backend;
pub mod engine;
pub mod fade;
pub mod fader;
pub mod registry;
pub mod rodio_backend;
pub mod silent;
pub mod volume;

pub use self::engine::{AudioEngine, AudioSnapshot, LayerSource, DEFAULT_FADE};
pub use self::fader::FadeDriver;
pub use self::registry::LayerState;

use self::backend::SoundBackend;
use self::rodio_backend::RodioBackend;
use self::silent::SilentBackend;
use rodio::OutputStream;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared handle to the engine, passed to the fade driver and the page session.
#[derive(Clone)]
pub struct AudioState(pub Arc<Mutex<AudioEngine>>);

impl AudioState {
    pub fn new(engine: AudioEngine) -> Self {
        Self(Arc::new(Mutex::new(engine)))
    }

    /// Run `f` with the engine locked. Returns None if the lock is poisoned.
    pub fn with<R>(&self, f: impl FnOnce(&mut AudioEngine) -> R) -> Option<R> {
        match self.0.lock() {
            Ok(mut engine) => Some(f(&mut engine)),
            Err(e) => {
                log::error!("Failed to lock audio engine: {}", e);
                None
            }
        }
    }

    /// Preload layers, decoding them before the engine is locked so fades
    /// keep ticking meanwhile. Returns how many new layers were added.
    pub fn preload_layers(&self, layers: &[LayerSource]) -> usize {
        let Some(backend) = self.with(|engine| engine.backend()) else {
            return 0;
        };
        let mut loaded = Vec::new();
        for layer in layers {
            if self.with(|engine| engine.has_layer(&layer.id)).unwrap_or(true) {
                continue;
            }
            match backend.load(&layer.uri, false) {
                Ok(sound) => loaded.push((layer, sound)),
                Err(e) => log::warn!("Layer {} load failed: {}", layer.id, e),
            }
        }
        self.with(|engine| {
            loaded
                .into_iter()
                .map(|(layer, sound)| engine.insert_layer(&layer.id, &layer.uri, sound, layer.gain))
                .filter(|inserted| *inserted)
                .count()
        })
        .unwrap_or(0)
    }

    /// [`AudioEngine::load_ambient`] with the decode done outside the lock.
    pub fn load_ambient(&self, uri: &str, target_gain: f32) -> bool {
        let Some(backend) = self.with(|engine| engine.backend()) else {
            return false;
        };
        match backend.load(uri, true) {
            Ok(sound) => self
                .with(|engine| engine.start_ambient(uri, sound, target_gain))
                .is_some(),
            Err(e) => {
                log::warn!("Ambient load failed: {}", e);
                self.with(|engine| engine.stop_ambient());
                false
            }
        }
    }
}

/// Output device setup.
pub struct AudioSystem;

impl AudioSystem {
    /// Open the default output device.
    ///
    /// Returns the engine and the output stream. The caller MUST keep the
    /// stream alive for as long as audio should play; it is `None` when no
    /// device could be opened and the engine runs on the silent backend.
    pub fn open(fade_duration: Duration) -> (AudioState, Option<OutputStream>) {
        let (backend, stream): (Box<dyn SoundBackend>, Option<OutputStream>) =
            match OutputStream::try_default() {
                Ok((stream, stream_handle)) => {
                    (Box::new(RodioBackend::new(stream_handle)), Some(stream))
                }
                Err(e) => {
                    log::warn!("No audio output ({}), continuing silently", e);
                    (Box::new(SilentBackend::new()), None)
                }
            };
        (AudioState::new(AudioEngine::new(backend, fade_duration)), stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::Sound;
    use crate::error::AudioError;
    use std::sync::OnceLock;

    /// Records whether the engine lock was held each time a sound loaded.
    struct LockWatcher {
        inner: SilentBackend,
        audio: Arc<OnceLock<AudioState>>,
        held: Arc<Mutex<Vec<bool>>>,
    }

    impl SoundBackend for LockWatcher {
        fn load(&self, uri: &str, looping: bool) -> Result<Box<dyn Sound>, AudioError> {
            if let Some(audio) = self.audio.get() {
                let held = audio.0.try_lock().is_err();
                self.held.lock().unwrap().push(held);
            }
            self.inner.load(uri, looping)
        }

        fn name(&self) -> &'static str {
            "lock-watcher"
        }
    }

    fn watched() -> (AudioState, Arc<Mutex<Vec<bool>>>) {
        let slot = Arc::new(OnceLock::new());
        let held = Arc::new(Mutex::new(Vec::new()));
        let backend = LockWatcher {
            inner: SilentBackend::new(),
            audio: slot.clone(),
            held: held.clone(),
        };
        let audio = AudioState::new(AudioEngine::new(Box::new(backend), DEFAULT_FADE));
        let _ = slot.set(audio.clone());
        (audio, held)
    }

    fn source(id: &str) -> LayerSource {
        LayerSource {
            id: id.to_string(),
            uri: format!("{id}.mp3"),
            gain: 0.5,
        }
    }

    #[test]
    fn preload_decodes_outside_the_engine_lock() {
        let (audio, held) = watched();
        let added = audio.preload_layers(&[source("a"), source("b")]);
        assert_eq!(added, 2);

        assert!(audio.load_ambient("amb.mp3", 0.3));
        assert_eq!(*held.lock().unwrap(), vec![false, false, false]);
        assert_eq!(audio.with(|engine| engine.snapshot().total_layers), Some(2));
    }

    #[test]
    fn preload_skips_known_layers() {
        let (audio, held) = watched();
        assert_eq!(audio.preload_layers(&[source("a")]), 1);
        assert_eq!(audio.preload_layers(&[source("a"), source("b")]), 1);
        // "a" was not decoded a second time.
        assert_eq!(held.lock().unwrap().len(), 2);
    }
}
