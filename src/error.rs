//! Error types and result utilities for conversion and remapping.

use thiserror::Error;

use crate::channels::ChannelRole;
use crate::format::SampleFormat;

/// Convenience type alias for results that may contain a [`PcmError`].
pub type PcmResult<T> = Result<T, PcmError>;

/// Top-level error for every fallible operation in the crate.
///
/// Errors are grouped by concern so callers can match on the family they care
/// about (e.g. collapse to stereo on any [`LayoutError`]) without inspecting
/// message strings.
#[derive(Error, Debug)]
pub enum PcmError {
    /// The sample format has no registered transform.
    ///
    /// Stream setup must fail on this error; there is no fallback format.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(SampleFormat),

    /// A channel layout could not be built or remapped.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A caller-supplied parameter or buffer was invalid.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Configuration could not be parsed or serialized.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Channel layout and mix matrix errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The input or output layout has no channels.
    #[error("The {side} channel layout is empty")]
    EmptyLayout {
        /// Which side of the remap was empty (`"input"` or `"output"`).
        side: &'static str,
    },

    /// A role appears more than once in a layout.
    #[error("Channel role {0} appears more than once in the layout")]
    DuplicateRole(ChannelRole),

    /// A role name could not be parsed.
    #[error("Unknown channel role '{0}'")]
    UnknownRole(String),

    /// The front centre channel has no substitute in the output layout.
    #[error("The output layout cannot represent a front centre source")]
    NoCenterPath,

    /// A source role has no path to any destination role.
    #[error("Channel role {0} cannot be routed to the output layout")]
    Unroutable(ChannelRole),

    /// `apply` was called before a successful `initialize`.
    #[error("The remapper has not been initialized")]
    NotInitialized,
}

/// Invalid parameter or buffer errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A parameter value is outside its valid domain.
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        /// Name of the parameter.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A buffer is shorter than the block being processed requires.
    #[error("Buffer '{buffer}' too small: need {required} elements, got {actual}")]
    BufferTooSmall {
        /// Name of the buffer.
        buffer: &'static str,
        /// Elements required for the requested block.
        required: usize,
        /// Elements actually supplied.
        actual: usize,
    },
}

impl ParameterError {
    /// Create an invalid value error.
    pub fn invalid_value(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a buffer size error.
    pub const fn buffer_too_small(buffer: &'static str, required: usize, actual: usize) -> Self {
        Self::BufferTooSmall {
            buffer,
            required,
            actual,
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse TOML.
    #[error("Failed to parse configuration TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML.
    #[error("Failed to serialize configuration TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Checks that `buffer` holds `count` items of `width` elements each and
/// returns the number of elements that covers.
///
/// A `count` whose element total overflows `usize` is rejected rather than
/// wrapped.
#[inline]
pub(crate) fn ensure_len<T>(
    buffer: &'static str,
    slice: &[T],
    count: usize,
    width: usize,
) -> PcmResult<usize> {
    let required = count.checked_mul(width).ok_or_else(|| {
        ParameterError::invalid_value(buffer, format!("{count} x {width} elements overflows usize"))
    })?;
    if slice.len() < required {
        return Err(ParameterError::buffer_too_small(buffer, required, slice.len()).into());
    }
    Ok(required)
}
