// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![deny(missing_docs)] // Documentation is a must for release

//! # pcm_remap
//!
//! Sample format conversion and channel remapping for an audio playback
//! pipeline.
//!
//! Encoded PCM bytes are decoded into interleaved normalized `f32` frames,
//! remapped from the source speaker layout to the sink's, and encoded again
//! for the device:
//!
//! ```text
//! bytes -> Converter::to_normalized -> Remapper::apply -> Converter::from_normalized -> bytes
//! ```
//!
//! ## Conversion
//!
//! A [`Converter`] handles one [`SampleFormat`]: unsigned and signed 8-bit,
//! 16-bit, the three 24-bit containers, 32-bit integers and 32/64-bit floats,
//! in either byte order, packed or planar. Integer scaling is asymmetric so
//! the minimum code maps to exactly `-1.0` and every 8, 16 and 24-bit code
//! survives a round trip. Output for 16 bits or fewer can be dithered with a
//! seeded triangular [`Dither`].
//!
//! ## Remapping
//!
//! A [`Remapper`] builds a [`MixMatrix`] between two [`ChannelLayout`]s by
//! folding roles the output lacks into substitutes (top layer into ear
//! level, sides and backs into each other and then into the fronts, front
//! centre into the front pair), optionally cloning stereo into surrounds, and
//! normalizing gains so no output clips.
//!
//! ```rust
//! use pcm_remap::{ChannelLayout, Converter, RemapConfig, RemapOptions, Remapper, SampleFormat, StdLayout};
//!
//! # fn main() -> pcm_remap::PcmResult<()> {
//! let decoder = Converter::new(SampleFormat::S16LE)?;
//! let encoder = Converter::new(SampleFormat::FLOAT)?;
//!
//! let mut remapper = Remapper::new(RemapConfig::default());
//! let input = ChannelLayout::from(StdLayout::Layout5_1);
//! let output = ChannelLayout::from(StdLayout::Layout2_0);
//! remapper.initialize(&input, &output, &RemapOptions::default())?;
//!
//! let frames = 2;
//! let pcm = vec![0u8; frames * input.len() * decoder.bytes_per_sample()];
//! let mut decoded = vec![0.0f32; frames * input.len()];
//! let mut mixed = vec![0.0f32; frames * output.len()];
//! let mut device = vec![0u8; frames * output.len() * encoder.bytes_per_sample()];
//!
//! decoder.to_normalized(&pcm, decoded.len(), &mut decoded)?;
//! remapper.apply(&decoded, &mut mixed, frames)?;
//! encoder.from_normalized(&mixed, mixed.len(), &mut device)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `simd` (default): the vectorized conversion kernel, built on `wide`.

pub mod channels;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod remap;

pub use channels::{ChannelLayout, ChannelRole, StdLayout};
pub use config::{ConvertConfig, DitherConfig, EngineConfig, RemapConfig};
pub use convert::{Converter, ConverterMap, Dither, Kernel};
pub use error::{ConfigError, LayoutError, ParameterError, PcmError, PcmResult};
pub use format::{ByteOrder, SampleEncoding, SampleFormat};
pub use remap::{MixContribution, MixEntry, MixMatrix, RemapOptions, Remapper, Route, SourceState};
