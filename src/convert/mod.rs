//! Sample format conversion to and from the normalized `f32` domain.
//!
//! A [`Converter`] is selected once per stream for one [`SampleFormat`] and is
//! then a pure function over caller-owned buffers. Formats without a
//! transform are rejected at selection time with
//! [`PcmError::UnsupportedFormat`]; there is no silent fallback.
//!
//! ```rust
//! use pcm_remap::{Converter, SampleFormat};
//!
//! let converter = Converter::new(SampleFormat::U8).unwrap();
//! let mut normalized = [0.0f32; 3];
//! converter.to_normalized(&[0, 128, 255], 3, &mut normalized).unwrap();
//! assert_eq!(normalized[0], -1.0);
//! assert_eq!(normalized[1], 0.0);
//!
//! let mut encoded = [0u8; 3];
//! converter.from_normalized(&normalized, 3, &mut encoded).unwrap();
//! assert_eq!(encoded, [0, 128, 255]);
//! ```

mod codec;
mod dither;
mod planar;
mod portable;
#[cfg(feature = "simd")]
mod simd;


use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use tracing::debug;

pub use dither::Dither;

use self::codec::Codec;
use crate::config::{ConvertConfig, DitherConfig};
use crate::error::ensure_len;
use crate::format::{ByteOrder, SampleEncoding, SampleFormat};
use crate::{ParameterError, PcmError, PcmResult};

/// Conversion kernel implementation.
///
/// Every kernel produces bit-identical output for the same input and dither
/// sequence; they differ only in throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Scalar reference kernel, available on every target.
    Portable,
    /// Four samples per iteration using `f64x4` lanes.
    #[cfg(feature = "simd")]
    Vectorized,
}

impl Kernel {
    /// The fastest compiled-in kernel, or [`Kernel::Portable`] when
    /// `accelerated` is false.
    pub const fn preferred(accelerated: bool) -> Self {
        #[cfg(feature = "simd")]
        if accelerated {
            return Self::Vectorized;
        }
        let _ = accelerated;
        Self::Portable
    }

    /// Every compiled-in kernel.
    #[cfg(feature = "simd")]
    pub const ALL: &'static [Kernel] = &[Self::Portable, Self::Vectorized];

    /// Every compiled-in kernel.
    #[cfg(not(feature = "simd"))]
    pub const ALL: &'static [Kernel] = &[Self::Portable];
}

impl Display for Kernel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Portable => f.write_str("portable"),
            #[cfg(feature = "simd")]
            Self::Vectorized => f.write_str("vectorized"),
        }
    }
}

/// Stateless transform between one encoded format and normalized `f32`.
///
/// Converters are immutable and `Send + Sync`; one instance may serve any
/// number of threads working on disjoint buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converter {
    format: SampleFormat,
    codec: Codec,
    kernel: Kernel,
}

impl Converter {
    /// Selects the transform for `format` using the preferred kernel.
    ///
    /// # Errors
    /// Returns [`PcmError::UnsupportedFormat`] for formats with no transform
    /// (currently only [`SampleEncoding::Raw`]).
    pub fn new(format: SampleFormat) -> PcmResult<Self> {
        Self::with_kernel(format, Kernel::preferred(true))
    }

    /// Selects the transform for `format` using a specific kernel.
    ///
    /// # Errors
    /// Returns [`PcmError::UnsupportedFormat`] for formats with no transform.
    pub fn with_kernel(format: SampleFormat, kernel: Kernel) -> PcmResult<Self> {
        let codec = Codec::for_format(format).ok_or(PcmError::UnsupportedFormat(format))?;
        Ok(Self {
            format,
            codec,
            kernel,
        })
    }

    /// The format this converter was selected for.
    pub const fn format(&self) -> SampleFormat {
        self.format
    }

    /// The kernel in use.
    pub const fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Size of one encoded sample in bytes.
    pub const fn bytes_per_sample(&self) -> usize {
        self.codec.bytes()
    }

    /// Whether [`from_normalized_dithered`](Self::from_normalized_dithered)
    /// adds dither for this format.
    pub const fn is_ditherable(&self) -> bool {
        self.codec.is_ditherable()
    }

    /// Decodes `sample_count` interleaved samples into normalized floats.
    ///
    /// `sample_count` counts scalars, not frames. Planar formats go through
    /// [`to_normalized_planar`](Self::to_normalized_planar) instead.
    ///
    /// # Errors
    /// Returns [`PcmError::Parameter`] if either buffer is too small or the
    /// converter was selected for a planar format.
    pub fn to_normalized(&self, input: &[u8], sample_count: usize, output: &mut [f32]) -> PcmResult<()> {
        self.ensure_packed()?;
        let in_len = ensure_len("input", input, sample_count, self.bytes_per_sample())?;
        ensure_len("output", output, sample_count, 1)?;
        let input = &input[..in_len];
        let output = &mut output[..sample_count];
        match self.kernel {
            Kernel::Portable => portable::decode(&self.codec, input, output),
            #[cfg(feature = "simd")]
            Kernel::Vectorized => simd::decode(&self.codec, input, output),
        }
        Ok(())
    }

    /// Encodes `sample_count` normalized floats without dither.
    ///
    /// Values outside `[-1, 1]` are clamped for integer formats and written
    /// unchanged for float formats. `±1.0` map exactly to the extreme codes.
    /// Planar formats go through
    /// [`from_normalized_planar`](Self::from_normalized_planar) instead.
    ///
    /// # Errors
    /// Returns [`PcmError::Parameter`] if either buffer is too small or the
    /// converter was selected for a planar format.
    pub fn from_normalized(&self, input: &[f32], sample_count: usize, output: &mut [u8]) -> PcmResult<()> {
        self.encode(input, sample_count, output, None)
    }

    /// Encodes `sample_count` normalized floats, dithering formats of 16
    /// significant bits or fewer.
    ///
    /// Wider formats ignore `dither` and leave its sequence untouched.
    ///
    /// # Errors
    /// Same as [`from_normalized`](Self::from_normalized).
    pub fn from_normalized_dithered(
        &self,
        input: &[f32],
        sample_count: usize,
        output: &mut [u8],
        dither: &mut Dither,
    ) -> PcmResult<()> {
        let dither = self.codec.is_ditherable().then_some(dither);
        self.encode(input, sample_count, output, dither)
    }

    fn ensure_packed(&self) -> PcmResult<()> {
        if self.format.is_planar() {
            return Err(ParameterError::invalid_value(
                "format",
                format!("{} is planar; use the planar entry points", self.format),
            )
            .into());
        }
        Ok(())
    }

    fn encode(
        &self,
        input: &[f32],
        sample_count: usize,
        output: &mut [u8],
        dither: Option<&mut Dither>,
    ) -> PcmResult<()> {
        self.ensure_packed()?;
        ensure_len("input", input, sample_count, 1)?;
        let out_len = ensure_len("output", output, sample_count, self.bytes_per_sample())?;
        let input = &input[..sample_count];
        let output = &mut output[..out_len];
        match self.kernel {
            Kernel::Portable => portable::encode(&self.codec, input, output, dither),
            #[cfg(feature = "simd")]
            Kernel::Vectorized => simd::encode(&self.codec, input, output, dither),
        }
        Ok(())
    }

    /// Decodes `frames` samples from each channel plane into interleaved
    /// normalized frames.
    ///
    /// # Errors
    /// Returns [`PcmError::Parameter`] if a plane or the output is too small.
    pub fn to_normalized_planar(&self, planes: &[&[u8]], frames: usize, output: &mut [f32]) -> PcmResult<()> {
        for plane in planes {
            ensure_len("plane", plane, frames, self.bytes_per_sample())?;
        }
        ensure_len("output", output, frames, planes.len())?;
        planar::decode(&self.codec, planes, frames, output);
        Ok(())
    }

    /// Encodes interleaved normalized frames into one byte plane per channel.
    ///
    /// Dither, when given, only applies to formats of 16 bits or fewer.
    ///
    /// # Errors
    /// Returns [`PcmError::Parameter`] if the input or a plane is too small.
    pub fn from_normalized_planar(
        &self,
        input: &[f32],
        frames: usize,
        planes: &mut [&mut [u8]],
        dither: Option<&mut Dither>,
    ) -> PcmResult<()> {
        ensure_len("input", input, frames, planes.len())?;
        for plane in planes.iter() {
            ensure_len("plane", plane, frames, self.bytes_per_sample())?;
        }
        let dither = dither.filter(|_| self.codec.is_ditherable());
        planar::encode(&self.codec, input, frames, planes, dither);
        Ok(())
    }
}

impl Dither {
    /// Creates the dither source for one output stream, or `None` when
    /// dither is disabled.
    ///
    /// # Errors
    /// Returns an error if the amplitude is outside `[0, 1)`.
    pub fn for_stream(config: &DitherConfig) -> PcmResult<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(config).map(Some)
    }
}

/// Capability map from sample format to converter.
///
/// Built once per session; every convertible format, packed and planar, in
/// every byte order it supports, has an entry.
#[derive(Debug, Clone)]
pub struct ConverterMap {
    converters: HashMap<SampleFormat, Converter>,
    kernel: Kernel,
}

impl ConverterMap {
    /// Builds the map using the kernel `config` asks for.
    pub fn new(config: &ConvertConfig) -> Self {
        let kernel = Kernel::preferred(config.accelerated);
        let mut converters = HashMap::new();
        for encoding in SampleEncoding::ALL {
            for order in [ByteOrder::Little, ByteOrder::Big] {
                let packed = SampleFormat::new(encoding, order).canonical();
                for format in [packed, packed.into_planar()] {
                    if let Ok(converter) = Converter::with_kernel(format, kernel) {
                        converters.insert(format, converter);
                    }
                }
            }
        }
        debug!(
            kernel = %kernel,
            formats = converters.len(),
            "built sample converter map"
        );
        Self { converters, kernel }
    }

    /// The kernel every converter in the map uses.
    pub const fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// The converter for `format`, if it has one.
    pub fn get(&self, format: SampleFormat) -> Option<&Converter> {
        self.converters.get(&format.canonical())
    }

    /// The converter for `format`.
    ///
    /// # Errors
    /// Returns [`PcmError::UnsupportedFormat`] if the format has no transform.
    pub fn select(&self, format: SampleFormat) -> PcmResult<Converter> {
        self.get(format).copied().ok_or(PcmError::UnsupportedFormat(format))
    }

    /// Whether `format` has a transform.
    pub fn supports(&self, format: SampleFormat) -> bool {
        self.get(format).is_some()
    }

    /// Every supported format, in no particular order.
    pub fn supported_formats(&self) -> impl Iterator<Item = SampleFormat> + '_ {
        self.converters.keys().copied()
    }
}

impl Default for ConverterMap {
    fn default() -> Self {
        Self::new(&ConvertConfig::default())
    }
}
