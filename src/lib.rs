//! # Basic Chorus: A Modulated Delay-Line Chorus (AU/VST3/CLAP)
//!
//! A chorus makes one voice sound like several by mixing the dry signal
//! with copies of itself whose delay time slowly wobbles. The wobble bends
//! the pitch of each copy by a few cents, and the slightly detuned copies
//! beating against the original give the familiar shimmer.
//!
//! The signal-processing engine ([`ChorusEngine`]) is plain Rust with an
//! explicit `prepare`/`reset`/`set_parameter`/`process` contract, so any
//! host can drive it. The [nih-plug](https://github.com/robbert-vdh/nih-plug)
//! plugin in this file is one such host.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬─────────────────────────────────────────── × (1 - mix) ───┐
//!         │                                                           │
//!         │         ┌──────── FEEDBACK LOOP ────────────┐             │
//!         │         │                                   │             │
//!         └──►(+)──►┴─► [Ring Buffer / Delay Line] ──► [Voice taps]   │
//!              ▲          (centre delay ± LFO)         (mean of N)    │
//!              │                                            │         │
//!              └──────────────── × feedback ◄───────────────┤         │
//!                                                           │         │
//!                                                           └─ × mix ►(+)──► Output
//! ```

mod chorus;
mod config;
pub mod dsp;
mod error;
mod parameter;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use nih_plug::prelude::*;

pub use chorus::{
    delay_capacity_for, ChorusEngine, EngineState, HZ_PER_RATE_STEP, MAX_CENTRE_DELAY_MS,
    MAX_EXCURSION_MS, MIN_DELAY_MS,
};
pub use config::{ChorusConfig, DEFAULT_SMOOTHING_MS};
pub use error::{PrepareError, UnknownParamError};
pub use parameter::{AtomicParam, ChorusHandle, ParamId, ParamRange};
pub use params::ChorusParams;

/// The plugin struct.
///
/// The parameter tree is shared with the host via `Arc` and can be touched
/// from any thread; its change callbacks only publish atomic targets. The
/// engine (delay lines, LFOs, smoothers) belongs to the audio thread and
/// is only accessed from `initialize()`, `reset()` and `process()`.
struct BasicChorus {
    params: Arc<ChorusParams>,
    engine: ChorusEngine,
}

impl Default for BasicChorus {
    fn default() -> Self {
        // Buffers are allocated in initialize() once the sample rate and
        // channel count are known.
        let engine = ChorusEngine::new(ChorusConfig::default());
        let params = Arc::new(ChorusParams::new(&engine.handle()));

        Self { params, engine }
    }
}

impl Plugin for BasicChorus {
    const NAME: &'static str = "Basic Chorus";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since most DAW tracks are stereo. Input and output
    // channel counts always match.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Size the engine for the host's sample rate, block size and channel
    /// count. Returning `false` tells the host this configuration can't be
    /// used.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        // A restored preset may not have fired any change callbacks, so
        // publish the host's current values before the engine snaps to them.
        let handle = self.engine.handle();
        self.params.sync(&handle);

        match self.engine.prepare(
            buffer_config.sample_rate as f64,
            buffer_config.max_buffer_size as usize,
            num_channels,
        ) {
            Ok(()) => true,
            Err(err) => {
                nih_error!("failed to prepare chorus: {err}");
                false
            }
        }
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        self.engine.process(buffer.as_slice());

        // With full feedback the loop never decays, so ask the host to keep
        // calling us for as long as the plugin is active.
        match self.engine.tail_samples() {
            Some(samples) => ProcessStatus::Tail(samples),
            None => ProcessStatus::KeepAlive,
        }
    }
}

impl ClapPlugin for BasicChorus {
    const CLAP_ID: &'static str = "com.loveless-audio.basic-chorus";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A modulated delay-line chorus with feedback");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Chorus,
    ];
}

impl Vst3Plugin for BasicChorus {
    // `*b"..."` turns the 16-character ASCII literal into a `[u8; 16]`.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssChorus_v001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Modulation];
}

nih_export_clap!(BasicChorus);
nih_export_vst3!(BasicChorus);

// Wrap the CLAP plugin into AUv2 format for Logic Pro.
clap_wrapper::export_auv2!();
