//! Error types.
//!
//! Only two things can fail: preparing the engine (bad host configuration
//! or a refused allocation) and parsing a string parameter id. Everything
//! on the audio path is infallible by construction.

use std::collections::TryReserveError;

use thiserror::Error;

/// Why [`ChorusEngine::prepare`](crate::ChorusEngine::prepare) refused to
/// run. The engine is left `Uninitialized` and outputs silence.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// The sample rate was zero, negative, or not a number.
    #[error("invalid sample rate {0} Hz")]
    InvalidSampleRate(f64),

    /// The host announced blocks of zero samples.
    #[error("maximum block size must be at least one sample")]
    ZeroBlockSize,

    /// There is nothing to process without channels.
    #[error("channel count must be at least one")]
    ZeroChannels,

    /// The delay buffers could not be allocated.
    #[error("could not allocate {samples} delay samples for {channels} channel(s)")]
    Allocation {
        /// Samples per channel that were requested.
        samples: usize,
        /// Number of channels that were requested.
        channels: usize,
        /// The allocator's answer.
        #[source]
        source: TryReserveError,
    },
}

/// A string that does not name any chorus parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown chorus parameter id `{0}`")]
pub struct UnknownParamError(pub String);
