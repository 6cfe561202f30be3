use crate::error::AudioError;

/// A loaded sound the engine can start, stop and set the level of.
///
/// Volumes passed in are final output levels: fade level times the effective
/// master gain. Implementations do no mixing of their own.
pub trait Sound: Send {
    fn play(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn is_playing(&self) -> bool;
}

/// Creates sounds from resolved audio locators.
///
/// Shared between the engine and callers that decode ahead of taking the
/// engine lock, so loading only needs `&self`.
pub trait SoundBackend: Send + Sync {
    fn load(&self, uri: &str, looping: bool) -> Result<Box<dyn Sound>, AudioError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
