//! Channel remapping between speaker layouts.
//!
//! A [`Remapper`] resolves a static [`MixMatrix`] from an input layout to an
//! output layout once, then applies it to blocks of interleaved normalized
//! frames. Roles the destination lacks are folded into substitutes through a
//! fixed cascade of downmix rules, and gains are normalized so no output
//! clips when every source is at full scale.
//!
//! ```rust
//! use pcm_remap::{RemapConfig, RemapOptions, Remapper, StdLayout};
//!
//! let mut remapper = Remapper::new(RemapConfig::default());
//! remapper
//!     .initialize(
//!         &StdLayout::Layout5_1.into(),
//!         &StdLayout::Layout2_0.into(),
//!         &RemapOptions::default(),
//!     )
//!     .unwrap();
//!
//! // full-scale centre only
//! let input = [0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
//! let mut output = [0.0f32; 2];
//! remapper.apply(&input, &mut output, 1).unwrap();
//! assert_eq!(output[0], output[1]);
//! assert!(output[0] > 0.0 && output[0] <= 1.0);
//! ```

mod matrix;
mod rules;

#[cfg(test)]
mod tests;

use tracing::{debug, warn};

pub use matrix::{MixContribution, MixEntry, MixMatrix, Route, SourceState};

use crate::channels::ChannelLayout;
use crate::config::RemapConfig;
use crate::{LayoutError, PcmResult};

/// Per-call switches for [`Remapper::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapOptions {
    /// Map roles one to one and drop what the output lacks. Used when the
    /// output is already known to be a superset of the input.
    pub final_stage: bool,
    /// Normalize gains even when the configuration disables it.
    pub force_normalize: bool,
    /// Standard layout the sink really carries. Output roles it omits are
    /// treated as absent and left silent.
    pub layout_hint: Option<ChannelLayout>,
}

impl RemapOptions {
    /// Sets [`final_stage`](Self::final_stage).
    pub fn with_final_stage(mut self, final_stage: bool) -> Self {
        self.final_stage = final_stage;
        self
    }

    /// Sets [`force_normalize`](Self::force_normalize).
    pub fn with_force_normalize(mut self, force_normalize: bool) -> Self {
        self.force_normalize = force_normalize;
        self
    }

    /// Sets [`layout_hint`](Self::layout_hint).
    pub fn with_layout_hint(mut self, hint: impl Into<ChannelLayout>) -> Self {
        self.layout_hint = Some(hint.into());
        self
    }
}

/// Builds and applies a mix matrix.
///
/// `initialize` takes `&mut self` and `apply` takes `&self`, so a rebuild can
/// never race an in-flight block.
#[derive(Debug, Clone, Default)]
pub struct Remapper {
    config: RemapConfig,
    matrix: Option<MixMatrix>,
}

impl Remapper {
    /// Creates an uninitialized remapper.
    pub const fn new(config: RemapConfig) -> Self {
        Self {
            config,
            matrix: None,
        }
    }

    /// Configuration consulted by the next [`initialize`](Self::initialize).
    pub const fn config(&self) -> &RemapConfig {
        &self.config
    }

    /// Replaces the configuration. The current matrix is kept until the
    /// next [`initialize`](Self::initialize).
    pub const fn set_config(&mut self, config: RemapConfig) {
        self.config = config;
    }

    /// Builds the matrix mapping `input` to `output`.
    ///
    /// On failure the previously built matrix, if any, stays in effect.
    ///
    /// # Errors
    /// - [`LayoutError::EmptyLayout`] if either layout has no channels.
    /// - [`LayoutError::NoCenterPath`] if a front centre source has no
    ///   substitute in the output.
    /// - [`LayoutError::Unroutable`] if some input role cannot reach the
    ///   output.
    /// - [`ParameterError::InvalidValue`](crate::ParameterError::InvalidValue)
    ///   if the configured centre mix level is out of range.
    pub fn initialize(
        &mut self,
        input: &ChannelLayout,
        output: &ChannelLayout,
        options: &RemapOptions,
    ) -> PcmResult<()> {
        match MixMatrix::build(input, output, options, &self.config) {
            Ok(matrix) => {
                debug!("Built mix matrix {} -> {}:\n{}", input, output, matrix);
                self.matrix = Some(matrix);
                Ok(())
            }
            Err(e) => {
                warn!("Cannot remap {} to {}: {}", input, output, e);
                Err(e)
            }
        }
    }

    /// Mixes `frames` interleaved frames from `input` into `output`.
    ///
    /// # Errors
    /// Returns [`LayoutError::NotInitialized`] before a successful
    /// [`initialize`](Self::initialize), or a parameter error if a buffer is
    /// too small.
    pub fn apply(&self, input: &[f32], output: &mut [f32], frames: usize) -> PcmResult<()> {
        self.matrix
            .as_ref()
            .ok_or(LayoutError::NotInitialized)?
            .apply(input, output, frames)
    }

    /// The matrix in effect, if any.
    pub const fn matrix(&self) -> Option<&MixMatrix> {
        self.matrix.as_ref()
    }

    /// Returns true once a matrix has been built.
    pub const fn is_initialized(&self) -> bool {
        self.matrix.is_some()
    }
}
