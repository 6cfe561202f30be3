use std::time::Duration;

/// What happens to a handle once its fade reaches the target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeEnd {
    /// Keep playing at the target level.
    Hold,
    /// Stop playback; the handle stays loaded.
    Stop,
    /// Stop and drop the handle.
    Release,
}

/// A linear gain ramp advanced by explicit time steps.
///
/// A handle owns at most one fade. Starting another one replaces it, which is
/// what cancels the old ramp and its completion action.
#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
    end: FadeEnd,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: Duration, end: FadeEnd) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            end,
        }
    }

    /// Move the ramp forward and return the new level.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.level()
    }

    pub fn level(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn end(&self) -> FadeEnd {
        self.end
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ramps_linearly() {
        let mut fade = Fade::new(0.0, 0.5, Duration::from_millis(1500), FadeEnd::Hold);
        assert_abs_diff_eq!(fade.advance(Duration::from_millis(750)), 0.25, epsilon = 1e-5);
        assert!(!fade.is_finished());
        assert_eq!(fade.remaining(), Duration::from_millis(750));
        assert_abs_diff_eq!(fade.advance(Duration::from_millis(750)), 0.5, epsilon = 1e-5);
        assert!(fade.is_finished());
    }

    #[test]
    fn overshoot_clamps_to_target() {
        let mut fade = Fade::new(0.8, 0.0, Duration::from_millis(100), FadeEnd::Stop);
        assert_eq!(fade.advance(Duration::from_secs(5)), 0.0);
        assert_eq!(fade.end(), FadeEnd::Stop);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let fade = Fade::new(0.0, 0.3, Duration::ZERO, FadeEnd::Hold);
        assert!(fade.is_finished());
        assert_eq!(fade.level(), 0.3);
    }
}
