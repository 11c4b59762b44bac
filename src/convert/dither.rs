//! Triangular dither for low bit-depth output.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::PcmResult;
use crate::config::DitherConfig;

/// Source of dither offsets, one per encoded sample.
///
/// Offsets follow a triangular distribution (the sum of two uniform variables)
/// spanning `(-amplitude, amplitude)` quantization steps. The amplitude is
/// always below one step, so dither can move a sample by at most one code.
///
/// A `Dither` is stateful and belongs to one output stream; the converters
/// themselves stay stateless.
#[derive(Debug, Clone)]
pub struct Dither {
    rng: SmallRng,
    amplitude: f64,
}

impl Dither {
    /// Creates a dither source from configuration.
    ///
    /// A configured seed gives a reproducible sequence; otherwise the
    /// generator is seeded from system entropy.
    ///
    /// # Errors
    /// Returns an error if the amplitude is outside `[0, 1)`.
    pub fn new(config: &DitherConfig) -> PcmResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Ok(Self {
            rng,
            amplitude: config.amplitude as f64,
        })
    }

    /// Peak offset in quantization steps.
    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Next offset, in quantization steps.
    #[inline]
    pub fn next_offset(&mut self) -> f64 {
        let a: f64 = self.rng.r#gen();
        let b: f64 = self.rng.r#gen();
        (a - b) * self.amplitude
    }
}
