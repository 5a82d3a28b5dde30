//! # Voice Mixer
//!
//! A chorus "voice" is one read head on the delay line, swept by its own
//! LFO. Several voices on the same channel read the same stored audio at
//! slightly different, independently wobbling delays; averaging them gives
//! the thick, ensemble sound the effect is named after.
//!
//! ```text
//!                      ┌── tap(delay + depth·swing·lfo₀) ──┐
//! [ channel delay ] ───┼── tap(delay + depth·swing·lfo₁) ──┼── mean ──► wet
//!                      └── ...                           ──┘
//! ```
//!
//! Voice LFOs are spread evenly around the cycle and every channel is
//! rotated a further quarter turn, so a stereo pair sweeps in quadrature.

use std::collections::TryReserveError;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::delay_line::DelayLine;
use super::lfo::Lfo;

/// Most voices a single channel may carry.
pub const MAX_VOICES: usize = 4;

/// Starting LFO phase for `voice` of `voice_count` on `channel`.
pub fn voice_phase(channel: usize, voice: usize, voice_count: usize) -> f32 {
    let channel_offset = channel as f32 * FRAC_PI_2;
    let voice_offset = voice as f32 * TAU / voice_count.max(1) as f32;
    channel_offset + voice_offset
}

/// Where each voice should read, in samples.
#[derive(Debug, Clone, Copy)]
pub struct TapLayout {
    /// Unmodulated delay.
    pub centre: f32,
    /// Peak deviation from `centre` at the current depth.
    pub swing: f32,
    /// Shortest delay any tap may read.
    pub min_delay: f32,
}

impl TapLayout {
    /// The delay for one LFO output in `[-1, 1]`.
    #[inline]
    pub fn delay_for(&self, lfo: f32) -> f32 {
        (self.centre + self.swing * lfo).max(self.min_delay)
    }
}

/// The set of modulated taps for one channel.
#[derive(Debug)]
pub struct VoiceMixer {
    lfos: Vec<Lfo>,
}

impl VoiceMixer {
    /// Build `voice_count` LFOs for `channel`. The count is clamped to
    /// `1..=MAX_VOICES`.
    pub fn try_new(
        sample_rate: f32,
        channel: usize,
        voice_count: usize,
    ) -> Result<Self, TryReserveError> {
        let voice_count = voice_count.clamp(1, MAX_VOICES);

        let mut lfos = Vec::new();
        lfos.try_reserve_exact(voice_count)?;
        lfos.extend(
            (0..voice_count).map(|v| Lfo::new(sample_rate, voice_phase(channel, v, voice_count))),
        );

        Ok(Self { lfos })
    }

    /// Share one rate across every voice.
    pub fn set_frequency(&mut self, frequency_hz: f32) {
        for lfo in &mut self.lfos {
            lfo.set_frequency(frequency_hz);
        }
    }

    /// Advance every voice one sample and return the mean of their taps.
    #[inline]
    pub fn render(&mut self, delay_line: &DelayLine, layout: TapLayout) -> f32 {
        let mut sum = 0.0;
        for lfo in &mut self.lfos {
            sum += delay_line.read(layout.delay_for(lfo.tick()));
        }
        sum / self.lfos.len() as f32
    }

    /// Rewind every voice to its starting phase.
    pub fn reset(&mut self) {
        for lfo in &mut self.lfos {
            lfo.reset();
        }
    }

    pub fn voice_count(&self) -> usize {
        self.lfos.len()
    }

    /// The voices' LFOs, in voice order.
    pub fn lfos(&self) -> &[Lfo] {
        &self.lfos
    }
}
