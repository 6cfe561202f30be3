use super::AudioState;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Background task that moves every fade forward.
///
/// Each tick locks the engine and advances it by the measured time since the
/// previous tick, so late ticks do not slow fades down. Dropping the driver
/// stops the task.
pub struct FadeDriver {
    task: JoinHandle<()>,
}

impl FadeDriver {
    /// Must be called from inside a tokio runtime.
    pub fn spawn(audio: AudioState, tick: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_tick = Instant::now();

            loop {
                interval.tick().await;
                let now = Instant::now();
                let dt = now.duration_since(last_tick);
                last_tick = now;

                if audio.with(|engine| engine.advance(dt)).is_none() {
                    log::error!("Fade driver stopping: audio engine unavailable");
                    break;
                }
            }
        });
        log::debug!("Fade driver started ({} ms tick)", tick.as_millis());
        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for FadeDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::silent::SilentBackend;
    use crate::audio::AudioEngine;

    #[tokio::test(start_paused = true)]
    async fn driver_completes_fades_in_real_time() {
        let backend = SilentBackend::new();
        let probe = backend.probe();
        let audio = AudioState::new(AudioEngine::new(
            Box::new(backend),
            Duration::from_millis(1500),
        ));
        let _driver = FadeDriver::spawn(audio.clone(), Duration::from_millis(10));

        audio.with(|engine| {
            engine.load_layer("seg1", "l1.mp3", 0.5);
            engine.play_layer("seg1", 0.5);
        });
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(probe.latest("l1.mp3").unwrap().volume, 0.5);

        audio.with(|engine| engine.stop_layer("seg1"));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(audio.with(|engine| engine.is_active("seg1")), Some(true));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(audio.with(|engine| engine.is_active("seg1")), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_driver_freezes_fades() {
        let audio = AudioState::new(AudioEngine::new(
            Box::new(SilentBackend::new()),
            Duration::from_millis(1500),
        ));
        let driver = FadeDriver::spawn(audio.clone(), Duration::from_millis(10));
        assert!(driver.is_running());

        audio.with(|engine| engine.load_ambient("amb.mp3", 0.3));
        drop(driver);
        tokio::time::sleep(Duration::from_millis(2000)).await;

        let gain = audio.with(|engine| engine.ambient().map(|a| a.gain()));
        assert_eq!(gain, Some(Some(0.0)));
    }
}
