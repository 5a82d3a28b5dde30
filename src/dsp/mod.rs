//! # DSP (Digital Signal Processing) Primitives
//!
//! The building blocks of the chorus, leaf first:
//!
//! - **`lfo`**: A slow sine oscillator that sweeps the delay time.
//! - **`delay_line`**: A ring buffer with fractional, linearly
//!   interpolated reads.
//! - **`voices`**: One or more LFO-driven read heads per channel, averaged
//!   into a single wet signal.
//! - **`feedback`**: The path that recirculates the wet signal into the
//!   delay line.
//! - **`smoother`**: Linear ramps that keep knob moves click-free.

pub mod delay_line;
pub mod feedback;
pub mod lfo;
pub mod smoother;
pub mod voices;
