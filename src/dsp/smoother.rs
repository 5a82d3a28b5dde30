//! # Parameter Smoother
//!
//! When a user moves a knob, the target value jumps instantly. Jumping the
//! delay time or the mix by the same amount inside the audio loop would
//! click, so each control is ramped linearly toward its target over a short
//! window (50 ms by default).
//!
//! ```text
//! step = (target - current) / ramp_samples
//! ```
//!
//! A new target restarts the ramp from wherever the value currently is, so
//! the per-sample change never exceeds `|target - current| / ramp_samples`.
//! The final step lands exactly on the target to avoid accumulated error.

use crate::parameter::ParamRange;

/// Linear ramp from the current value to a clamped target.
///
/// Owned by the audio thread. Targets arrive via
/// [`set_target`](Self::set_target) once per block; the value is advanced
/// with [`next_value`](Self::next_value) once per sample.
#[derive(Debug, Clone)]
pub struct ParameterSmoother {
    range: ParamRange,
    current: f32,
    target: f32,
    step: f32,
    steps_left: u32,
    ramp_samples: u32,
}

impl ParameterSmoother {
    /// A settled smoother at the range's default. Until
    /// [`set_ramp`](Self::set_ramp) is called, new targets apply instantly.
    pub fn new(range: ParamRange) -> Self {
        Self {
            range,
            current: range.default,
            target: range.default,
            step: 0.0,
            steps_left: 0,
            ramp_samples: 0,
        }
    }

    /// Set the ramp length. A zero-length ramp makes targets apply instantly.
    pub fn set_ramp(&mut self, sample_rate: f32, ramp_ms: f32) {
        let samples = (ramp_ms.max(0.0) * sample_rate / 1000.0).round();
        self.ramp_samples = samples as u32;
    }

    /// Clamp `value` to the declared range and start ramping toward it.
    /// Setting the same target again does not restart the ramp.
    pub fn set_target(&mut self, value: f32) {
        let value = self.range.clamp(value);
        if value == self.target {
            return;
        }

        self.target = value;
        if self.ramp_samples == 0 {
            self.snap_to_target();
        } else {
            self.steps_left = self.ramp_samples;
            self.step = (self.target - self.current) / self.ramp_samples as f32;
        }
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.steps_left > 0 {
            self.steps_left -= 1;
            if self.steps_left == 0 {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
        self.current
    }

    /// Jump straight to the target.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.step = 0.0;
        self.steps_left = 0;
    }

    /// The value most recently returned by [`next_value`](Self::next_value).
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the ramp has finished.
    pub fn is_settled(&self) -> bool {
        self.steps_left == 0
    }

    /// Magnitude of the per-sample step of the ramp in progress.
    pub fn step_size(&self) -> f32 {
        if self.steps_left == 0 {
            0.0
        } else {
            self.step.abs()
        }
    }

    /// Ramp length in samples.
    pub fn ramp_samples(&self) -> u32 {
        self.ramp_samples
    }
}
