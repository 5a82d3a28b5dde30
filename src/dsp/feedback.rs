//! # Feedback Path
//!
//! Routing part of the wet signal back into the delay line turns the single
//! delayed copy into a decaying train of copies. Small amounts thicken the
//! chorus; large amounts ring like a flanger. A negative gain flips the
//! phase of every recirculation, which notches the resonances differently.
//!
//! ```text
//! input ──►(+)──► [ delay line ] ──► wet
//!           ▲                        │
//!           └──── × feedback ◄───────┘
//! ```
//!
//! The loop closes within one sample: the wet value read for this sample is
//! the one that goes back in, before the write head moves.

/// Magnitudes below this are flushed to zero. A recirculating loop with a
/// gain under 1 decays geometrically into denormal range, where floating
/// point gets very slow on some CPUs.
pub const DENORMAL_THRESHOLD: f32 = 1e-20;

/// The sample to store in the delay line: `input + gain * wet`.
#[inline]
pub fn feedback_input(input: f32, wet: f32, gain: f32) -> f32 {
    flush_denormal(input + gain * wet)
}

/// Replace denormal-range values with an exact zero.
#[inline]
pub fn flush_denormal(sample: f32) -> f32 {
    if sample.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        sample
    }
}
