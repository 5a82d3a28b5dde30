//! # Low-Frequency Oscillator
//!
//! The LFO is a sine wave far below the audible range (a few Hz at most)
//! that sweeps the chorus delay time back and forth. It is never heard
//! directly; you hear its effect as a gentle, periodic pitch wobble on the
//! delayed copy.
//!
//! ## Phase Accumulation
//!
//! The oscillator keeps a phase in radians and adds a fixed increment every
//! sample:
//!
//! ```text
//! increment = 2π * frequency / sample_rate
//! ```
//!
//! Changing the frequency only changes the increment, so the output never
//! jumps when the Rate knob moves.
//!
//! ## Output Convention
//!
//! [`Lfo::tick`] returns `sin(phase)` in `[-1, 1]` for the phase *before*
//! advancing. A freshly reset LFO with no offset therefore starts at 0.

use std::f32::consts::TAU;

/// A sine LFO with a fixed starting phase.
///
/// Several LFOs run at the same frequency in a multi-channel chorus; each
/// one gets its own `phase_offset` so left and right (and extra voices)
/// sweep out of step with each other.
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase in radians, always in `[0, 2π)`.
    phase: f32,

    /// Phase added per sample.
    increment: f32,

    /// Where the phase restarts on [`reset`](Self::reset).
    phase_offset: f32,

    sample_rate: f32,
}

impl Lfo {
    /// Create a stopped LFO that starts at `phase_offset` radians.
    pub fn new(sample_rate: f32, phase_offset: f32) -> Self {
        let phase_offset = wrap_phase(phase_offset);
        Self {
            phase: phase_offset,
            increment: 0.0,
            phase_offset,
            sample_rate,
        }
    }

    /// Change the rate without touching the phase.
    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.increment = TAU * frequency_hz / self.sample_rate;
    }

    /// Current rate in Hz.
    pub fn frequency(&self) -> f32 {
        self.increment * self.sample_rate / TAU
    }

    /// Return the output for the current phase, then advance by one sample.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let output = self.phase.sin();

        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
            // Only reachable when the rate exceeds the sample rate.
            if self.phase >= TAU {
                self.phase = wrap_phase(self.phase);
            }
        }

        output
    }

    /// Rewind to the starting phase.
    pub fn reset(&mut self) {
        self.phase = self.phase_offset;
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// The phase this LFO restarts from.
    pub fn phase_offset(&self) -> f32 {
        self.phase_offset
    }
}

/// Fold any angle into `[0, 2π)`.
fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
