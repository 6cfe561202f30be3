use super::backend::{Sound, SoundBackend};
use crate::error::AudioError;
use rodio::{Decoder, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// Decoded PCM kept in memory so a layer can be restarted without re-decoding.
#[derive(Clone)]
struct Pcm {
    channels: u16,
    sample_rate: u32,
    samples: Arc<Vec<f32>>,
}

impl Pcm {
    fn decode(uri: &str, data: Vec<u8>) -> Result<Self, AudioError> {
        let decoder = Decoder::new(Cursor::new(data)).map_err(|e| AudioError::Decode {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        // Metadata must be read before the decoder is consumed.
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();
        Ok(Self {
            channels,
            sample_rate,
            samples: Arc::new(samples),
        })
    }

    fn source(&self) -> SharedSamples {
        SharedSamples {
            pcm: self.clone(),
            position: 0,
        }
    }
}

/// A playback cursor over decoded samples. Cloning shares the samples.
#[derive(Clone)]
struct SharedSamples {
    pcm: Pcm,
    position: usize,
}

impl Iterator for SharedSamples {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.pcm.samples.get(self.position).copied()?;
        self.position += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pcm.samples.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl Source for SharedSamples {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.pcm.samples.len().saturating_sub(self.position))
    }

    fn channels(&self) -> u16 {
        self.pcm.channels
    }

    fn sample_rate(&self) -> u32 {
        self.pcm.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        let frames = self.pcm.samples.len() as u64 / u64::from(self.pcm.channels.max(1));
        let rate = u64::from(self.pcm.sample_rate.max(1));
        Some(Duration::from_micros(frames * 1_000_000 / rate))
    }
}

/// Plays decoded files through a rodio output stream.
pub struct RodioBackend {
    stream_handle: OutputStreamHandle,
}

impl RodioBackend {
    pub fn new(stream_handle: OutputStreamHandle) -> Self {
        Self { stream_handle }
    }
}

impl SoundBackend for RodioBackend {
    fn load(&self, uri: &str, looping: bool) -> Result<Box<dyn Sound>, AudioError> {
        let data = std::fs::read(uri).map_err(|source| AudioError::Read {
            uri: uri.to_string(),
            source,
        })?;
        let pcm = Pcm::decode(uri, data)?;
        log::debug!(
            "Decoded {} ({} ch, {} Hz, {} samples)",
            uri,
            pcm.channels,
            pcm.sample_rate,
            pcm.samples.len()
        );
        Ok(Box::new(RodioSound {
            stream_handle: self.stream_handle.clone(),
            pcm,
            looping,
            volume: 0.0,
            sink: None,
        }))
    }

    fn name(&self) -> &'static str {
        "rodio"
    }
}

/// One sound. A new sink is created per playback; stopping drops it.
struct RodioSound {
    stream_handle: OutputStreamHandle,
    pcm: Pcm,
    looping: bool,
    volume: f32,
    sink: Option<Sink>,
}

impl Sound for RodioSound {
    fn play(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        match Sink::try_new(&self.stream_handle) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                if self.looping {
                    sink.append(self.pcm.source().repeat_infinite());
                } else {
                    sink.append(self.pcm.source());
                }
                sink.play();
                self.sink = Some(sink);
            }
            Err(e) => log::warn!("Sink creation failed: {}", e),
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.empty() && !sink.is_paused())
    }
}

impl Drop for RodioSound {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm() -> Pcm {
        Pcm {
            channels: 2,
            sample_rate: 4,
            samples: Arc::new(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]),
        }
    }

    #[test]
    fn sources_share_decoded_samples() {
        let pcm = pcm();
        let source = pcm.source();
        let restarted = source.clone();
        assert_eq!(Arc::strong_count(&pcm.samples), 3);

        let played: Vec<f32> = source.collect();
        assert_eq!(played, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]);
        assert_eq!(Arc::strong_count(&pcm.samples), 2);
        assert_eq!(restarted.current_frame_len(), Some(8));
    }

    #[test]
    fn source_reports_format() {
        let mut source = pcm().source();
        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 4);
        // 4 frames at 4 Hz.
        assert_eq!(source.total_duration(), Some(Duration::from_secs(1)));
        source.next();
        assert_eq!(source.current_frame_len(), Some(7));
        assert_eq!(source.size_hint(), (7, Some(7)));
    }
}
