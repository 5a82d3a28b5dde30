//! # Plugin Parameters
//!
//! The knobs the user sees in the DAW. Each one mirrors a [`ParamId`]:
//!
//! - The **string id** (`#[id = "..."]`) is the one presets are stored
//!   under. Never change these once published.
//! - The **range, default and step** come straight from
//!   [`ParamId::range`], so the host and the engine can never disagree.
//!
//! ## Smoothing
//!
//! None of these parameters carry a nih-plug smoother. Every value change
//! goes through a callback into the engine's [`ChorusHandle`], and the
//! engine ramps toward it on the audio thread. This keeps a single
//! smoothing policy no matter who drives the engine.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::chorus::HZ_PER_RATE_STEP;
use crate::parameter::{ChorusHandle, ParamId};

/// All user-facing parameters for the chorus plugin.
#[derive(Params)]
pub struct ChorusParams {
    /// **Rate**: how fast the delay time wobbles, in tenths of a Hz.
    /// 0 stops the LFO; 99 is 9.9 Hz, a fast vibrato.
    #[id = "RATE"]
    pub rate: IntParam,

    /// **Depth**: how far the LFO pushes the delay either side of the
    /// centre, as a fraction of 10 ms.
    #[id = "DEPTH"]
    pub depth: FloatParam,

    /// **Centre Delay**: the unmodulated delay in milliseconds. Around
    /// 10–30 ms is the classic chorus zone; shorter starts to flange.
    #[id = "CENTREDELAY"]
    pub centre_delay: IntParam,

    /// **Feedback**: how much wet signal is sent back into the delay line.
    /// Negative values invert it on every pass.
    #[id = "FEEDBACK"]
    pub feedback: FloatParam,

    /// **Mix**: 0% dry only, 100% wet only.
    #[id = "MIX"]
    pub mix: FloatParam,
}

impl ChorusParams {
    /// Build the parameter tree, routing every change into `handle`.
    pub fn new(handle: &ChorusHandle) -> Self {
        Self {
            rate: int_param(ParamId::Rate, handle).with_value_to_string(Arc::new(|steps: i32| {
                format!("{:.1} Hz", steps as f32 * HZ_PER_RATE_STEP)
            })),

            depth: float_param(ParamId::Depth, handle)
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            centre_delay: int_param(ParamId::CentreDelay, handle).with_unit(" ms"),

            feedback: float_param(ParamId::Feedback, handle)
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            mix: float_param(ParamId::Mix, handle)
                .with_unit("%")
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),
        }
    }

    /// Push every current value into the engine. Used after the host
    /// restores a preset, when no change callbacks have fired yet.
    pub fn sync(&self, handle: &ChorusHandle) {
        handle.set_parameter(ParamId::Rate, self.rate.value() as f64);
        handle.set_parameter(ParamId::Depth, self.depth.value() as f64);
        handle.set_parameter(ParamId::CentreDelay, self.centre_delay.value() as f64);
        handle.set_parameter(ParamId::Feedback, self.feedback.value() as f64);
        handle.set_parameter(ParamId::Mix, self.mix.value() as f64);
    }
}

fn int_param(id: ParamId, handle: &ChorusHandle) -> IntParam {
    let range = id.range();
    let handle = handle.clone();

    IntParam::new(
        id.name(),
        range.default as i32,
        IntRange::Linear {
            min: range.min as i32,
            max: range.max as i32,
        },
    )
    .with_callback(Arc::new(move |value: i32| {
        handle.set_parameter(id, value as f64)
    }))
}

fn float_param(id: ParamId, handle: &ChorusHandle) -> FloatParam {
    let range = id.range();
    let handle = handle.clone();

    FloatParam::new(
        id.name(),
        range.default,
        FloatRange::Linear {
            min: range.min,
            max: range.max,
        },
    )
    .with_step_size(range.step)
    .with_callback(Arc::new(move |value: f32| {
        handle.set_parameter(id, value as f64)
    }))
}
