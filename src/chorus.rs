//! # Chorus Engine
//!
//! Owns every piece of audio-thread state (delay lines, voice LFOs and
//! parameter smoothers) and turns a block of dry audio into chorused
//! audio in place.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized ──prepare──► Prepared ──process──► Processing
//!       ▲                        ▲                     │
//!       └── failed prepare       └──────reset──────────┘
//! ```
//!
//! `prepare()` is the only place memory is allocated. `process()` never
//! allocates, never locks and runs in time proportional to
//! `block size × channels × voices`.
//!
//! ## Per-Sample Algorithm
//!
//! For every sample, across all channels:
//!
//! 1. **Smooth** all five parameters one step toward their targets.
//! 2. **Modulate**: each voice LFO picks a delay of
//!    `centre + depth × 10 ms × lfo`, never shorter than 1 ms.
//! 3. **Read** the delay line at those fractional delays and average them
//!    into the wet sample.
//! 4. **Feed back**: write `input + feedback × wet` into the delay line.
//! 5. **Mix**: `output = input × (1 − mix) + wet × mix`.

use std::collections::TryReserveError;
use std::num::NonZeroUsize;
use std::sync::Arc;

use nih_plug::{nih_debug_assert, nih_debug_assert_failure, nih_log};

use crate::config::ChorusConfig;
use crate::dsp::delay_line::{DelayLine, INTERPOLATION_MARGIN};
use crate::dsp::feedback::feedback_input;
use crate::dsp::smoother::ParameterSmoother;
use crate::dsp::voices::{TapLayout, VoiceMixer};
use crate::error::PrepareError;
use crate::parameter::{ChorusHandle, ParamId, ParameterTargets};

/// Longest centre delay the `CENTREDELAY` parameter can ask for.
pub const MAX_CENTRE_DELAY_MS: f32 = 100.0;

/// How far the LFO moves the delay at full depth, either side of centre.
pub const MAX_EXCURSION_MS: f32 = 10.0;

/// The modulated delay never gets shorter than this.
pub const MIN_DELAY_MS: f32 = 1.0;

/// LFO frequency per `RATE` step, so 0–99 covers 0–9.9 Hz.
pub const HZ_PER_RATE_STEP: f32 = 0.1;

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No buffers yet. `process()` outputs silence.
    Uninitialized,
    /// Buffers sized and cleared, waiting for audio.
    Prepared,
    /// At least one block processed since the last prepare or reset.
    Processing,
}

/// Delay line length needed for every reachable delay at `sample_rate`.
pub fn delay_capacity_for(sample_rate: f32) -> usize {
    let longest_ms = MAX_CENTRE_DELAY_MS + MAX_EXCURSION_MS;
    let samples = (longest_ms * sample_rate / 1000.0).ceil() as usize;
    samples.saturating_add(INTERPOLATION_MARGIN)
}

/// Per-channel audio state.
#[derive(Debug)]
struct ChannelState {
    delay_line: DelayLine,
    voices: VoiceMixer,
}

/// The chorus signal processor.
///
/// Construct it once, hand [`handle()`](Self::handle) to whatever thread
/// moves the knobs, then drive `prepare`/`reset`/`process` from the audio
/// thread.
///
/// ```
/// use basic_chorus::{ChorusConfig, ChorusEngine, ParamId};
///
/// let mut engine = ChorusEngine::new(ChorusConfig::default());
/// engine.set_parameter(ParamId::Mix, 0.5);
/// engine.set_parameter(ParamId::Depth, 0.3);
/// engine.prepare(48000.0, 512, 2).unwrap();
///
/// let mut left = vec![0.0f32; 512];
/// let mut right = vec![0.0f32; 512];
/// engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);
/// ```
#[derive(Debug)]
pub struct ChorusEngine {
    config: ChorusConfig,

    /// Targets shared with every [`ChorusHandle`].
    targets: Arc<ParameterTargets>,

    /// Audio-thread view of the targets, indexed like [`ParamId::ALL`].
    smoothers: [ParameterSmoother; ParamId::COUNT],

    channels: Vec<ChannelState>,

    sample_rate: f32,
    max_block_size: usize,
    state: EngineState,
}

impl ChorusEngine {
    /// An unprepared engine with every parameter at its default.
    pub fn new(config: ChorusConfig) -> Self {
        Self {
            config,
            targets: Arc::new(ParameterTargets::new()),
            smoothers: ParamId::ALL.map(|id| ParameterSmoother::new(id.range())),
            channels: Vec::new(),
            sample_rate: 0.0,
            max_block_size: 0,
            state: EngineState::Uninitialized,
        }
    }

    /// A handle for setting parameters from another thread.
    pub fn handle(&self) -> ChorusHandle {
        ChorusHandle::new(self.targets.clone())
    }

    /// Size the delay lines and voices for the host's configuration.
    ///
    /// Any previous buffers are dropped first, so on error the engine is
    /// `Uninitialized` and [`process`](Self::process) outputs silence.
    /// Parameter targets set before this call take effect immediately,
    /// without a ramp.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<(), PrepareError> {
        self.release();

        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(PrepareError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(PrepareError::ZeroBlockSize);
        }
        if num_channels == 0 {
            return Err(PrepareError::ZeroChannels);
        }

        let sample_rate = sample_rate as f32;
        let capacity = delay_capacity_for(sample_rate);
        self.channels = self
            .build_channels(sample_rate, capacity, num_channels)
            .map_err(|source| PrepareError::Allocation {
                samples: capacity,
                channels: num_channels,
                source,
            })?;

        let targets = self.targets.snapshot();
        for (smoother, target) in self.smoothers.iter_mut().zip(targets) {
            smoother.set_ramp(sample_rate, self.config.smoothing_ms);
            smoother.set_target(target);
            smoother.snap_to_target();
        }

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.state = EngineState::Prepared;

        nih_log!(
            "chorus prepared: {} Hz, {} channel(s), {} voice(s), {} delay samples per channel",
            sample_rate,
            num_channels,
            self.config.voices_per_channel,
            capacity
        );

        Ok(())
    }

    fn build_channels(
        &self,
        sample_rate: f32,
        capacity: usize,
        num_channels: usize,
    ) -> Result<Vec<ChannelState>, TryReserveError> {
        // delay_capacity_for always adds the interpolation margin.
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        let mut channels = Vec::new();
        channels.try_reserve_exact(num_channels)?;
        for channel in 0..num_channels {
            channels.push(ChannelState {
                delay_line: DelayLine::try_new(capacity)?,
                voices: VoiceMixer::try_new(
                    sample_rate,
                    channel,
                    self.config.voices_per_channel,
                )?,
            });
        }

        Ok(channels)
    }

    /// Drop all buffers and go back to `Uninitialized`.
    fn release(&mut self) {
        self.channels = Vec::new();
        self.sample_rate = 0.0;
        self.max_block_size = 0;
        self.state = EngineState::Uninitialized;
    }

    /// Silence the delay lines and rewind the LFOs.
    ///
    /// Parameter targets and smoothed values are left alone, so a reset
    /// never causes a parameter jump.
    pub fn reset(&mut self) {
        if self.state == EngineState::Uninitialized {
            return;
        }

        for channel in &mut self.channels {
            channel.delay_line.clear();
            channel.voices.reset();
        }
        self.state = EngineState::Prepared;
    }

    /// Publish a new target for `id`. Safe before `prepare()`; out-of-range
    /// values are clamped.
    pub fn set_parameter(&self, id: ParamId, value: f64) {
        self.targets.slot(id).set(value as f32);
    }

    /// The latest (clamped) target for `id`.
    pub fn parameter(&self, id: ParamId) -> f32 {
        self.targets.slot(id).get()
    }

    /// The smoothed value `id` had at the last processed sample.
    pub fn smoothed(&self, id: ParamId) -> f32 {
        self.smoothers[id.index()].current()
    }

    /// Process one block in place. `buffer` is indexed `[channel][sample]`.
    ///
    /// Channels past the prepared count are silenced. Before a successful
    /// `prepare()` the whole block is silenced.
    pub fn process(&mut self, buffer: &mut [&mut [f32]]) {
        if self.state == EngineState::Uninitialized {
            nih_debug_assert_failure!("ChorusEngine::process() called before prepare()");
            for channel in buffer.iter_mut() {
                channel.fill(0.0);
            }
            return;
        }
        self.state = EngineState::Processing;

        let num_samples = buffer.iter().map(|c| c.len()).max().unwrap_or(0);
        nih_debug_assert!(num_samples <= self.max_block_size);
        nih_debug_assert!(buffer.len() <= self.channels.len());

        // Targets are read once per block.
        let targets = self.targets.snapshot();
        for (smoother, target) in self.smoothers.iter_mut().zip(targets) {
            smoother.set_target(target);
        }

        let active = buffer.len().min(self.channels.len());
        let (active, extra) = buffer.split_at_mut(active);
        for channel in extra.iter_mut() {
            channel.fill(0.0);
        }

        let samples_per_ms = self.sample_rate / 1000.0;
        let min_delay = MIN_DELAY_MS * samples_per_ms;

        for i in 0..num_samples {
            // Step 1: smooth
            let rate = self.next_value(ParamId::Rate);
            let depth = self.next_value(ParamId::Depth);
            let centre_ms = self.next_value(ParamId::CentreDelay);
            let feedback = self.next_value(ParamId::Feedback);
            let mix = self.next_value(ParamId::Mix);

            // Step 2: modulate
            let layout = TapLayout {
                centre: centre_ms.max(MIN_DELAY_MS) * samples_per_ms,
                swing: depth * MAX_EXCURSION_MS * samples_per_ms,
                min_delay,
            };
            let frequency = rate * HZ_PER_RATE_STEP;

            for (channel, samples) in self.channels.iter_mut().zip(active.iter_mut()) {
                let Some(sample) = samples.get_mut(i) else {
                    continue;
                };

                channel.voices.set_frequency(frequency);

                let input = *sample;

                // Step 3: read every voice tap and average them
                let wet = channel.voices.render(&channel.delay_line, layout);

                // Step 4: feed back, which also advances the write head
                channel.delay_line.write(feedback_input(input, wet, feedback));

                // Step 5: mix
                *sample = input * (1.0 - mix) + wet * mix;
            }
        }
    }

    #[inline]
    fn next_value(&mut self, id: ParamId) -> f32 {
        self.smoothers[id.index()].next_value()
    }

    /// How many samples the effect keeps sounding after the input stops,
    /// or `None` when full feedback makes it ring forever.
    ///
    /// Each trip around the loop is scaled by `|feedback|`, so the tail is
    /// the number of trips needed to fall to -60 dB (0.001) times the
    /// longest current delay.
    pub fn tail_samples(&self) -> Option<u32> {
        if self.state == EngineState::Uninitialized {
            return Some(0);
        }

        let centre = self.smoothers[ParamId::CentreDelay.index()].target();
        let depth = self.smoothers[ParamId::Depth.index()].target();
        let feedback = self.smoothers[ParamId::Feedback.index()].target().abs();

        let longest = (centre + depth * MAX_EXCURSION_MS) * self.sample_rate / 1000.0;

        if feedback >= 1.0 {
            None
        } else if feedback > 0.001 {
            let repeats = -3.0 / feedback.log10(); // log10(0.001) = -3
            Some((repeats * longest).ceil() as u32)
        } else {
            Some(longest.ceil() as u32)
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> ChorusConfig {
        self.config
    }

    /// Sample rate from the last successful `prepare()`, 0 before that.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of prepared channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples held by each channel's delay line, 0 when unprepared.
    pub fn delay_capacity(&self) -> usize {
        self.channels
            .first()
            .map_or(0, |channel| channel.delay_line.capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(params: &[(ParamId, f64)]) -> ChorusEngine {
        let engine = ChorusEngine::new(ChorusConfig::default());
        for &(id, value) in params {
            engine.set_parameter(id, value);
        }
        engine
    }

    fn process_mono(engine: &mut ChorusEngine, block: &mut [f32]) {
        engine.process(&mut [block]);
    }

    fn impulse(len: usize) -> Vec<f32> {
        let mut block = vec![0.0; len];
        block[0] = 1.0;
        block
    }

    #[test]
    fn test_lifecycle_states() {
        let mut engine = ChorusEngine::new(ChorusConfig::default());
        assert_eq!(engine.state(), EngineState::Uninitialized);

        engine.prepare(48000.0, 64, 2).unwrap();
        assert_eq!(engine.state(), EngineState::Prepared);
        assert_eq!(engine.num_channels(), 2);
        assert_eq!(engine.sample_rate(), 48000.0);

        let mut left = vec![0.1; 64];
        let mut right = vec![0.1; 64];
        engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);
        assert_eq!(engine.state(), EngineState::Processing);

        engine.reset();
        assert_eq!(engine.state(), EngineState::Prepared);
    }

    #[test]
    fn test_process_before_prepare_is_silent() {
        let mut engine = engine_with(&[(ParamId::Mix, 0.0)]);
        let mut block = vec![0.5; 32];
        process_mono(&mut engine, &mut block);

        assert!(block.iter().all(|&s| s == 0.0));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert_eq!(engine.tail_samples(), Some(0));
    }

    #[test]
    fn test_prepare_rejects_bad_config() {
        let mut engine = ChorusEngine::new(ChorusConfig::default());

        for rate in [0.0, -44100.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                engine.prepare(rate, 64, 2),
                Err(PrepareError::InvalidSampleRate(_))
            ));
        }
        assert!(matches!(
            engine.prepare(48000.0, 0, 2),
            Err(PrepareError::ZeroBlockSize)
        ));
        assert!(matches!(
            engine.prepare(48000.0, 64, 0),
            Err(PrepareError::ZeroChannels)
        ));
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    /// A failed re-prepare drops the old buffers instead of keeping stale
    /// audio around.
    #[test]
    fn test_failed_prepare_returns_to_uninitialized() {
        let mut engine = ChorusEngine::new(ChorusConfig::default());
        engine.prepare(48000.0, 64, 2).unwrap();
        assert!(engine.delay_capacity() > 0);

        assert!(engine.prepare(48000.0, 64, 0).is_err());
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert_eq!(engine.delay_capacity(), 0);
        assert_eq!(engine.sample_rate(), 0.0);

        let mut block = vec![0.5; 16];
        process_mono(&mut engine, &mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    /// A sample rate this large asks for more delay memory than can ever
    /// be addressed, so the reservation fails instead of aborting.
    #[test]
    fn test_allocation_failure_leaves_engine_uninitialized() {
        let mut engine = ChorusEngine::new(ChorusConfig::default());
        engine.prepare(48000.0, 64, 2).unwrap();

        let result = engine.prepare(1e30, 64, 2);
        assert!(matches!(
            result,
            Err(PrepareError::Allocation { channels: 2, .. })
        ));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert_eq!(engine.delay_capacity(), 0);
        assert_eq!(engine.num_channels(), 0);
        assert_eq!(engine.sample_rate(), 0.0);
        assert_eq!(engine.tail_samples(), Some(0));

        let mut left = vec![0.5; 16];
        let mut right = vec![0.5; 16];
        engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);
        assert!(left.iter().chain(&right).all(|&s| s == 0.0));

        // A sane configuration still works afterwards.
        engine.prepare(48000.0, 64, 2).unwrap();
        assert_eq!(engine.state(), EngineState::Prepared);
    }

    /// Hosts occasionally send more samples than announced. Nothing is
    /// sized by the block length, so the whole block is still processed.
    #[test]
    fn test_block_longer_than_prepared_size() {
        let mut engine = engine_with(&[(ParamId::Mix, 1.0), (ParamId::CentreDelay, 5.0)]);
        engine.prepare(1000.0, 4, 1).unwrap();

        let mut block = impulse(16);
        process_mono(&mut engine, &mut block);

        assert_eq!(block[5], 1.0);
        assert_eq!(block.iter().filter(|&&s| s != 0.0).count(), 1);
        assert_eq!(engine.state(), EngineState::Processing);
    }

    #[test]
    fn test_capacity_covers_longest_delay() {
        let mut engine = ChorusEngine::new(ChorusConfig::default());
        engine.prepare(48000.0, 64, 1).unwrap();

        // 110 ms at 48 kHz plus the interpolation margin.
        assert_eq!(engine.delay_capacity(), 5280 + INTERPOLATION_MARGIN);
    }

    /// Mix = 0 must hand back the input untouched, whatever the other
    /// controls are doing.
    #[test]
    fn test_dry_mix_is_identity() {
        let mut engine = engine_with(&[
            (ParamId::Mix, 0.0),
            (ParamId::Rate, 99.0),
            (ParamId::Depth, 1.0),
            (ParamId::CentreDelay, 37.0),
            (ParamId::Feedback, -0.9),
        ]);
        engine.prepare(44100.0, 128, 2).unwrap();

        for block_index in 0..20 {
            let input: Vec<f32> = (0..128)
                .map(|i| ((block_index * 128 + i) as f32 * 0.05).sin() * 0.8)
                .collect();
            let mut left = input.clone();
            let mut right = input.clone();
            engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);

            assert_eq!(left, input);
            assert_eq!(right, input);
        }
    }

    /// An impulse comes out exactly `centre` samples later and nowhere else.
    #[test]
    fn test_impulse_is_delayed_sample_exact() {
        let mut engine = engine_with(&[
            (ParamId::Mix, 1.0),
            (ParamId::Depth, 0.0),
            (ParamId::Feedback, 0.0),
            (ParamId::CentreDelay, 2.0),
        ]);
        engine.prepare(48000.0, 256, 1).unwrap();

        // 2 ms at 48 kHz.
        let mut block = impulse(256);
        process_mono(&mut engine, &mut block);

        for (n, &sample) in block.iter().enumerate() {
            let expected = if n == 96 { 1.0 } else { 0.0 };
            assert_eq!(sample, expected, "sample {n}");
        }
    }

    /// Depth = 0 means a fixed delay, however fast the LFO runs.
    #[test]
    fn test_zero_depth_ignores_rate() {
        let mut engine = engine_with(&[
            (ParamId::Mix, 1.0),
            (ParamId::Rate, 99.0),
            (ParamId::CentreDelay, 5.0),
        ]);
        engine.prepare(1000.0, 200, 1).unwrap();

        let input: Vec<f32> = (0..200).map(|n| n as f32).collect();
        let mut block = input.clone();
        process_mono(&mut engine, &mut block);

        for n in 5..200 {
            assert_eq!(block[n], input[n - 5], "sample {n}");
        }
    }

    /// Fully wet with depth: on a ramp input the output reveals the delay,
    /// which must stay within centre ± 10 ms and actually move.
    #[test]
    fn test_full_wet_follows_modulated_delay() {
        let mut engine = engine_with(&[
            (ParamId::Mix, 1.0),
            (ParamId::Depth, 1.0),
            (ParamId::CentreDelay, 20.0),
            (ParamId::Rate, 20.0),
        ]);
        engine.prepare(1000.0, 1000, 1).unwrap();

        let input: Vec<f32> = (0..1000).map(|n| n as f32).collect();
        let mut block = input.clone();
        process_mono(&mut engine, &mut block);

        let delays: Vec<f32> = (40..1000).map(|n| input[n] - block[n]).collect();
        for &delay in &delays {
            assert!((10.0 - 1e-3..=30.0 + 1e-3).contains(&delay), "delay {delay}");
        }

        let shortest = delays.iter().cloned().fold(f32::MAX, f32::min);
        let longest = delays.iter().cloned().fold(f32::MIN, f32::max);
        assert!(shortest < 11.0 && longest > 29.0);
    }

    #[test]
    fn test_feedback_repeats_and_sign() {
        for (gain, second) in [(0.5, 0.5), (-0.5, -0.5)] {
            let mut engine = engine_with(&[
                (ParamId::Mix, 1.0),
                (ParamId::CentreDelay, 5.0),
                (ParamId::Feedback, gain),
            ]);
            engine.prepare(1000.0, 32, 1).unwrap();

            let mut block = impulse(32);
            process_mono(&mut engine, &mut block);

            assert_eq!(block[5], 1.0);
            assert_eq!(block[10], second);
            assert_eq!(block[15], 0.25);
            assert_eq!(block[7], 0.0);
        }
    }

    #[test]
    fn test_out_of_range_parameters_are_clamped() {
        let mut engine = engine_with(&[
            (ParamId::Feedback, 5.0),
            (ParamId::CentreDelay, 0.0),
            (ParamId::Mix, -2.0),
            (ParamId::Rate, 1000.0),
        ]);
        assert_eq!(engine.parameter(ParamId::Feedback), 1.0);
        assert_eq!(engine.parameter(ParamId::CentreDelay), 1.0);
        assert_eq!(engine.parameter(ParamId::Mix), 0.0);
        assert_eq!(engine.parameter(ParamId::Rate), 99.0);

        engine.prepare(48000.0, 64, 1).unwrap();
        let mut block = vec![0.0; 64];
        process_mono(&mut engine, &mut block);
        assert_eq!(engine.smoothed(ParamId::Feedback), 1.0);
        assert!(engine.smoothed(ParamId::CentreDelay) >= MIN_DELAY_MS);
    }

    /// Targets set before prepare() apply without a ramp.
    #[test]
    fn test_cached_parameters_apply_at_prepare() {
        let mut engine = engine_with(&[(ParamId::Mix, 1.0), (ParamId::Depth, 0.4)]);
        engine.prepare(48000.0, 64, 1).unwrap();
        assert_eq!(engine.smoothed(ParamId::Mix), 1.0);
        assert_eq!(engine.smoothed(ParamId::Depth), 0.4);
    }

    #[test]
    fn test_capacity_never_changes_while_processing() {
        let mut engine = engine_with(&[(ParamId::Mix, 0.5), (ParamId::Depth, 1.0)]);
        engine.prepare(44100.0, 512, 2).unwrap();
        let capacity = engine.delay_capacity();

        let handle = engine.handle();
        let mut left = vec![0.0; 512];
        let mut right = vec![0.0; 512];
        for i in 0..100 {
            handle.set_parameter(ParamId::CentreDelay, (i % 100) as f64 + 1.0);
            left.fill(0.3);
            right.fill(-0.3);
            engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);
            assert_eq!(engine.delay_capacity(), capacity);
        }
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = engine_with(&[
            (ParamId::Mix, 0.7),
            (ParamId::Depth, 0.8),
            (ParamId::Rate, 30.0),
            (ParamId::Feedback, 0.6),
        ]);
        engine.prepare(48000.0, 256, 2).unwrap();

        let mut left: Vec<f32> = (0..256).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut right = left.clone();
        engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);

        let smoothed_before = ParamId::ALL.map(|id| engine.smoothed(id));

        let assert_clean = |engine: &ChorusEngine| {
            for channel in &engine.channels {
                assert!(channel.delay_line.is_silent());
                assert_eq!(channel.delay_line.write_pos(), 0);
                for lfo in channel.voices.lfos() {
                    assert_eq!(lfo.phase(), lfo.phase_offset());
                }
            }
        };

        engine.reset();
        assert_clean(&engine);
        engine.reset();
        assert_clean(&engine);

        assert_eq!(ParamId::ALL.map(|id| engine.smoothed(id)), smoothed_before);
    }

    /// After a reset the impulse test holds again, even after noisy audio.
    #[test]
    fn test_impulse_after_reset() {
        let mut engine = engine_with(&[(ParamId::Mix, 1.0), (ParamId::CentreDelay, 3.0)]);
        engine.prepare(1000.0, 64, 1).unwrap();

        let mut noise: Vec<f32> = (0..64).map(|i| ((i * 7919) % 13) as f32 - 6.0).collect();
        process_mono(&mut engine, &mut noise);

        engine.reset();
        let mut block = impulse(64);
        process_mono(&mut engine, &mut block);

        let nonzero: Vec<usize> = (0..64).filter(|&n| block[n] != 0.0).collect();
        assert_eq!(nonzero, vec![3]);
        assert_eq!(block[3], 1.0);
    }

    /// A step in Mix shows up in the output as a ramp no steeper than one
    /// ramp step per sample.
    #[test]
    fn test_mix_step_is_smoothed() {
        let mut engine = engine_with(&[(ParamId::CentreDelay, 100.0)]);
        engine.prepare(1000.0, 100, 1).unwrap();
        engine.set_parameter(ParamId::Mix, 1.0);

        // The delay line is still empty for the first 100 samples, so the
        // output is just `1 - mix`.
        let mut block = vec![1.0; 100];
        process_mono(&mut engine, &mut block);

        let max_step = 1.0 / 50.0 + 1e-6;
        let mut previous = 1.0;
        for &sample in &block {
            assert!((sample - previous).abs() <= max_step);
            previous = sample;
        }
        assert!(block[0] < 1.0);
        assert_eq!(block[60], 0.0);
    }

    #[test]
    fn test_stereo_channels_are_decorrelated() {
        let mut engine = engine_with(&[
            (ParamId::Mix, 1.0),
            (ParamId::Depth, 1.0),
            (ParamId::Rate, 20.0),
            (ParamId::CentreDelay, 20.0),
        ]);
        engine.prepare(1000.0, 500, 2).unwrap();

        let input: Vec<f32> = (0..500).map(|n| n as f32).collect();
        let mut left = input.clone();
        let mut right = input.clone();
        engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);

        let differing = (40..500).filter(|&n| (left[n] - right[n]).abs() > 1.0).count();
        assert!(differing > 100, "only {differing} samples differ");
    }

    #[test]
    fn test_extra_channels_are_silenced() {
        let mut engine = engine_with(&[(ParamId::Mix, 0.0)]);
        engine.prepare(48000.0, 16, 1).unwrap();

        let mut left = vec![0.5; 16];
        let mut right = vec![0.5; 16];
        engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);

        assert!(left.iter().all(|&s| s == 0.5));
        assert!(right.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_multiple_voices_keep_fixed_delay_exact() {
        let mut engine = ChorusEngine::new(ChorusConfig::default().with_voices(2));
        engine.set_parameter(ParamId::Mix, 1.0);
        engine.set_parameter(ParamId::CentreDelay, 4.0);
        engine.prepare(1000.0, 16, 1).unwrap();
        assert_eq!(engine.config().voices_per_channel, 2);

        let mut block = impulse(16);
        process_mono(&mut engine, &mut block);
        assert_eq!(block[4], 1.0);
        assert_eq!(block.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn test_tail_length() {
        let mut engine = engine_with(&[(ParamId::CentreDelay, 10.0)]);
        engine.prepare(1000.0, 16, 1).unwrap();
        assert_eq!(engine.tail_samples(), Some(10));

        engine.set_parameter(ParamId::Feedback, -0.5);
        let mut block = vec![0.0; 16];
        process_mono(&mut engine, &mut block);
        // About ten trips around the loop to reach -60 dB.
        assert_eq!(engine.tail_samples(), Some(100));

        engine.set_parameter(ParamId::Feedback, 1.0);
        process_mono(&mut engine, &mut block);
        assert_eq!(engine.tail_samples(), None);
    }
}
