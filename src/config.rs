//! Engine configuration fixed at construction time.

use crate::dsp::voices::MAX_VOICES;

/// Default ramp for every parameter, in milliseconds.
pub const DEFAULT_SMOOTHING_MS: f32 = 50.0;

/// Knobs that shape the engine itself rather than the sound of a preset.
///
/// ```
/// use basic_chorus::ChorusConfig;
///
/// let config = ChorusConfig::default().with_voices(2).with_smoothing_ms(20.0);
/// assert_eq!(config.voices_per_channel, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusConfig {
    /// Modulated read heads per channel, `1..=4`.
    pub voices_per_channel: usize,
    /// Length of the linear parameter ramp.
    pub smoothing_ms: f32,
}

impl Default for ChorusConfig {
    fn default() -> Self {
        Self {
            voices_per_channel: 1,
            smoothing_ms: DEFAULT_SMOOTHING_MS,
        }
    }
}

impl ChorusConfig {
    /// Use `voices` read heads per channel (clamped to `1..=4`).
    pub fn with_voices(mut self, voices: usize) -> Self {
        self.voices_per_channel = voices.clamp(1, MAX_VOICES);
        self
    }

    /// Ramp parameter changes over `ms` milliseconds. Zero disables
    /// smoothing; negative values are treated as zero.
    pub fn with_smoothing_ms(mut self, ms: f32) -> Self {
        self.smoothing_ms = if ms.is_finite() { ms.max(0.0) } else { 0.0 };
        self
    }
}
