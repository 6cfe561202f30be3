//! A backend that produces no output.
//!
//! Used when the audio device cannot be opened, so an artwork page degrades to
//! silence instead of failing, and in tests, where a [`SilentProbe`] exposes
//! what the engine asked every sound to do.
//!
//! Released sounds are forgotten unless a probe was taken, so a long session on
//! the fallback path does not accumulate state.

use super::backend::{Sound, SoundBackend};
use crate::error::AudioError;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Snapshot of one silent sound.
#[derive(Debug, Clone, PartialEq)]
pub struct SilentSoundState {
    pub uri: String,
    pub looping: bool,
    pub volume: f32,
    pub playing: bool,
    pub play_count: u32,
    pub released: bool,
}

#[derive(Default)]
struct Shared {
    /// Keyed by load order.
    sounds: BTreeMap<u64, SilentSoundState>,
    next_key: u64,
    missing: HashSet<String>,
    keep_released: bool,
}

#[derive(Default, Clone)]
pub struct SilentBackend {
    shared: Arc<Mutex<Shared>>,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting sounds after the backend moved into an engine.
    /// From here on released sounds stay visible.
    pub fn probe(&self) -> SilentProbe {
        lock(&self.shared).keep_released = true;
        SilentProbe {
            shared: self.shared.clone(),
        }
    }

    /// Make loads of `uri` fail, as a missing file would.
    pub fn fail_on(&self, uri: &str) {
        lock(&self.shared).missing.insert(uri.to_string());
    }
}

impl SoundBackend for SilentBackend {
    fn load(&self, uri: &str, looping: bool) -> Result<Box<dyn Sound>, AudioError> {
        let mut shared = lock(&self.shared);
        if shared.missing.contains(uri) {
            return Err(AudioError::Read {
                uri: uri.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            });
        }
        let key = shared.next_key;
        shared.next_key += 1;
        shared.sounds.insert(
            key,
            SilentSoundState {
                uri: uri.to_string(),
                looping,
                volume: 0.0,
                playing: false,
                play_count: 0,
                released: false,
            },
        );
        Ok(Box::new(SilentSound {
            shared: self.shared.clone(),
            key,
        }))
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

struct SilentSound {
    shared: Arc<Mutex<Shared>>,
    key: u64,
}

impl SilentSound {
    fn update(&self, f: impl FnOnce(&mut SilentSoundState)) {
        if let Some(state) = lock(&self.shared).sounds.get_mut(&self.key) {
            f(state);
        }
    }
}

impl Sound for SilentSound {
    fn play(&mut self) {
        self.update(|s| {
            s.playing = true;
            s.play_count += 1;
        });
    }

    fn stop(&mut self) {
        self.update(|s| s.playing = false);
    }

    fn set_volume(&mut self, volume: f32) {
        self.update(|s| s.volume = volume);
    }

    fn is_playing(&self) -> bool {
        lock(&self.shared)
            .sounds
            .get(&self.key)
            .is_some_and(|s| s.playing)
    }
}

impl Drop for SilentSound {
    fn drop(&mut self) {
        let mut shared = lock(&self.shared);
        if !shared.keep_released {
            shared.sounds.remove(&self.key);
            return;
        }
        if let Some(state) = shared.sounds.get_mut(&self.key) {
            state.playing = false;
            state.released = true;
        }
    }
}

/// Read-only view over the sounds a [`SilentBackend`] created.
#[derive(Clone)]
pub struct SilentProbe {
    shared: Arc<Mutex<Shared>>,
}

impl SilentProbe {
    /// Every sound loaded since the probe was taken, in load order.
    pub fn sounds(&self) -> Vec<SilentSoundState> {
        lock(&self.shared).sounds.values().cloned().collect()
    }

    pub fn loaded_count(&self) -> usize {
        lock(&self.shared).sounds.len()
    }

    /// Sounds for `uri` that have not been released yet.
    pub fn live(&self, uri: &str) -> Vec<SilentSoundState> {
        lock(&self.shared)
            .sounds
            .values()
            .filter(|s| s.uri == uri && !s.released)
            .cloned()
            .collect()
    }

    /// Most recently loaded sound for `uri`.
    pub fn latest(&self, uri: &str) -> Option<SilentSoundState> {
        lock(&self.shared)
            .sounds
            .values()
            .rev()
            .find(|s| s.uri == uri)
            .cloned()
    }
}

// Poisoning only happens if a test panicked mid-update; keep reading.
fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
