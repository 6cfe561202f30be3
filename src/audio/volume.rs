/// Master volume with mute layered on top.
///
/// The output gain is always derived from both fields, so changing the level
/// while muted stays silent and unmuting returns to the last level set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterVolume {
    level: f32,
    muted: bool,
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self {
            level: 1.0,
            muted: false,
        }
    }
}

impl MasterVolume {
    /// Clamp and store the level. Returns the stored value.
    pub fn set_level(&mut self, level: f32) -> f32 {
        self.level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
        self.level
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mute_round_trip_restores_level() {
        let mut volume = MasterVolume::default();
        volume.set_level(0.6);
        assert!(volume.toggle_mute());
        assert_eq!(volume.effective(), 0.0);
        assert!(!volume.toggle_mute());
        assert_eq!(volume.effective(), 0.6);
    }

    #[test]
    fn setting_level_while_muted_stays_silent() {
        let mut volume = MasterVolume::default();
        volume.toggle_mute();
        volume.set_level(0.9);
        assert_eq!(volume.effective(), 0.0);
        volume.toggle_mute();
        assert_eq!(volume.effective(), 0.9);
    }

    #[test]
    fn level_is_clamped() {
        let mut volume = MasterVolume::default();
        assert_eq!(volume.set_level(1.7), 1.0);
        assert_eq!(volume.set_level(-0.2), 0.0);
        assert_eq!(volume.set_level(f32::NAN), 0.0);
    }
}
