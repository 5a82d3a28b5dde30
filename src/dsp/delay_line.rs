//! # Delay Line (Ring Buffer)
//!
//! The chorus hears the past through this buffer. A "write head" records
//! incoming audio onto a circular tape and a "read head" trails behind it
//! by a delay that the LFO keeps nudging back and forth. The moving read
//! head is what bends the pitch of the delayed copy.
//!
//! Each audio sample goes through three steps:
//!
//! 1. Read the delayed sample from `(write_pos - delay_in_samples)`,
//!    wrapping around to the end of the buffer if we go past the start.
//! 2. Write the new sample at `write_pos`.
//! 3. Advance `write_pos` by 1, wrapping back to 0 at the end.
//!
//! [`DelayLine::write`] does steps 2 and 3 together, so a read must always
//! happen before the write for the same sample.
//!
//! ## Linear Interpolation
//!
//! A modulated delay is almost never a whole number of samples, so the read
//! blends the two stored neighbours around the requested position:
//!
//! ```text
//! result = sample_a * (1 - frac) + sample_b * frac
//! ```
//!
//! For position 441.3:
//! - `sample_a` is at position 441 (weight 0.7)
//! - `sample_b` is at position 442 (weight 0.3)

use std::collections::TryReserveError;
use std::num::NonZeroUsize;

/// Extra slots past the longest requested delay. The interpolated read
/// touches one sample beyond the integer delay, and one more keeps the read
/// head clear of the slot that is about to be overwritten.
pub const INTERPOLATION_MARGIN: usize = 2;

/// A ring buffer that functions as a fractional audio delay line.
///
/// The only constructor is [`DelayLine::try_new`], which allocates the
/// full capacity up front, so an unprepared delay line cannot exist. The
/// buffer never grows or shrinks afterwards.
#[derive(Debug)]
pub struct DelayLine {
    /// The circular buffer storing audio samples. Starts out silent.
    buffer: Vec<f32>,

    /// Where the next incoming sample will be stored. Advances by 1 each
    /// sample, wrapping to 0 at `buffer_len`.
    write_pos: usize,

    /// Cached buffer length.
    buffer_len: usize,
}

impl DelayLine {
    /// Allocate a silent delay line holding `capacity` samples.
    ///
    /// Allocation is fallible so that a host asking for an absurd sample
    /// rate gets an error back from `prepare()` instead of an abort.
    pub fn try_new(capacity: NonZeroUsize) -> Result<Self, TryReserveError> {
        let buffer_len = capacity.get();
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(buffer_len)?;
        buffer.resize(buffer_len, 0.0);

        Ok(Self {
            buffer,
            write_pos: 0,
            buffer_len,
        })
    }

    /// Number of samples the ring holds.
    pub fn capacity(&self) -> usize {
        self.buffer_len
    }

    /// The longest delay, in samples, that [`read`](Self::read) will honour.
    pub fn max_delay(&self) -> f32 {
        self.buffer_len.saturating_sub(INTERPOLATION_MARGIN).max(1) as f32
    }

    /// Store one sample at the write head and advance the head.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos == self.buffer_len {
            self.write_pos = 0;
        }
    }

    /// Read the sample written `delay_samples` samples ago, interpolating
    /// linearly when the delay is fractional.
    ///
    /// A delay of 1.0 returns the most recently written sample. Requests
    /// outside `[1, max_delay()]` are clamped into that range.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let delay_clamped = delay_samples.clamp(1.0, self.max_delay());

        let delay_int = delay_clamped as usize;
        let delay_frac = delay_clamped - delay_int as f32;

        // index_a is the newer sample, index_b one step older.
        let index_a = (self.write_pos + self.buffer_len - delay_int) % self.buffer_len;
        let index_b = (self.write_pos + self.buffer_len - delay_int - 1) % self.buffer_len;

        let sample_a = self.buffer[index_a];
        let sample_b = self.buffer[index_b];

        sample_a * (1.0 - delay_frac) + sample_b * delay_frac
    }

    /// Clear the entire buffer to silence and rewind the write head.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Whether every stored sample is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.buffer.iter().all(|&s| s == 0.0)
    }

    /// Current write head position.
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }
}
