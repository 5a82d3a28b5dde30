//! # Chorus Parameters
//!
//! The five controls the chorus engine understands, their declared ranges,
//! and the lock-free slots that carry new values from the control thread
//! to the audio thread.
//!
//! | Id            | Range      | Default | Kind    |
//! |---------------|------------|---------|---------|
//! | `RATE`        | 0 – 99     | 0       | integer, `rate / 10` Hz |
//! | `DEPTH`       | 0.0 – 1.0  | 0.0     | float   |
//! | `CENTREDELAY` | 1 – 100 ms | 1       | integer |
//! | `FEEDBACK`    | -1.0 – 1.0 | 0.0     | float   |
//! | `MIX`         | 0.0 – 1.0  | 0.0     | float   |
//!
//! ## Thread Sharing
//!
//! Each target is an `f32` stored as raw bits in an `AtomicU32`. The
//! control thread publishes with a single `Release` store; the audio
//! thread picks values up with one `Acquire` load per parameter at the
//! start of every block. No locks, no queues, and a new value is at most
//! one block late.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::UnknownParamError;

/// One of the chorus controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// LFO speed, in tenths of a Hz.
    Rate,
    /// Modulation excursion as a fraction of the maximum swing.
    Depth,
    /// Nominal, unmodulated delay time in milliseconds.
    CentreDelay,
    /// Signed gain of the signal recirculated into the delay line.
    Feedback,
    /// Wet/dry balance: 0 is fully dry, 1 fully wet.
    Mix,
}

impl ParamId {
    /// Number of parameters.
    pub const COUNT: usize = 5;

    /// Every parameter, in slot order.
    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::Rate,
        ParamId::Depth,
        ParamId::CentreDelay,
        ParamId::Feedback,
        ParamId::Mix,
    ];

    /// Stable string id. Hosts persist presets under these, so they must
    /// never change.
    pub const fn id(self) -> &'static str {
        match self {
            ParamId::Rate => "RATE",
            ParamId::Depth => "DEPTH",
            ParamId::CentreDelay => "CENTREDELAY",
            ParamId::Feedback => "FEEDBACK",
            ParamId::Mix => "MIX",
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            ParamId::Rate => "Rate",
            ParamId::Depth => "Depth",
            ParamId::CentreDelay => "Centre Delay",
            ParamId::Feedback => "Feedback",
            ParamId::Mix => "Mix",
        }
    }

    /// Declared range and default.
    pub const fn range(self) -> ParamRange {
        match self {
            ParamId::Rate => ParamRange::integer(0.0, 99.0, 0.0),
            ParamId::Depth => ParamRange::float(0.0, 1.0, 0.0),
            ParamId::CentreDelay => ParamRange::integer(1.0, 100.0, 1.0),
            ParamId::Feedback => ParamRange::float(-1.0, 1.0, 0.0),
            ParamId::Mix => ParamRange::float(0.0, 1.0, 0.0),
        }
    }

    /// Position of this parameter in [`ParamId::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ParamId {
    type Err = UnknownParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownParamError(s.to_owned()))
    }
}

/// The numeric contract of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
    /// Value before anyone touches the control.
    pub default: f32,
    /// UI step. Integer parameters are also rounded to it by [`clamp`](Self::clamp).
    pub step: f32,
    /// Whether only whole numbers are valid.
    pub integer: bool,
}

impl ParamRange {
    const fn integer(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            step: 1.0,
            integer: true,
        }
    }

    const fn float(min: f32, max: f32, default: f32) -> Self {
        Self {
            min,
            max,
            default,
            step: 0.01,
            integer: false,
        }
    }

    /// Bring any input into range. Integer parameters round to the nearest
    /// whole number, and NaN falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }

        let value = if self.integer { value.round() } else { value };
        value.clamp(self.min, self.max)
    }

    /// Distance between the range ends.
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// A single lock-free parameter target.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    range: ParamRange,
}

impl AtomicParam {
    /// A slot holding the range's default.
    pub fn new(range: ParamRange) -> Self {
        Self {
            value: AtomicU32::new(range.default.to_bits()),
            range,
        }
    }

    /// Clamp and publish a new target (control thread).
    #[inline]
    pub fn set(&self, value: f32) {
        let clamped = self.range.clamp(value);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Read the latest target (audio thread).
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// The range this slot clamps to.
    pub fn range(&self) -> ParamRange {
        self.range
    }
}

/// All five targets, shared between the engine and its handles.
#[derive(Debug)]
pub(crate) struct ParameterTargets {
    slots: [AtomicParam; ParamId::COUNT],
}

impl ParameterTargets {
    pub(crate) fn new() -> Self {
        Self {
            slots: ParamId::ALL.map(|id| AtomicParam::new(id.range())),
        }
    }

    pub(crate) fn slot(&self, id: ParamId) -> &AtomicParam {
        &self.slots[id.index()]
    }

    /// One atomic read per parameter, indexed like [`ParamId::ALL`].
    pub(crate) fn snapshot(&self) -> [f32; ParamId::COUNT] {
        ParamId::ALL.map(|id| self.slot(id).get())
    }
}

/// The control-thread side of a [`ChorusEngine`](crate::ChorusEngine).
///
/// Cheap to clone and safe to use from any thread. Setting a parameter
/// only publishes a new target; the engine ramps toward it on the audio
/// thread.
#[derive(Debug, Clone)]
pub struct ChorusHandle {
    targets: Arc<ParameterTargets>,
}

impl ChorusHandle {
    pub(crate) fn new(targets: Arc<ParameterTargets>) -> Self {
        Self { targets }
    }

    /// Publish a new target. Out-of-range values are clamped silently.
    pub fn set_parameter(&self, id: ParamId, value: f64) {
        self.targets.slot(id).set(value as f32);
    }

    /// The latest published (clamped) target.
    pub fn parameter(&self, id: ParamId) -> f32 {
        self.targets.slot(id).get()
    }
}
