//! Engine configuration.
//!
//! Settings are plain serde structs with defaults for every field, so a
//! partial TOML document only overrides what it names:
//!
//! ```rust
//! use pcm_remap::EngineConfig;
//!
//! let config = EngineConfig::from_toml(
//!     r#"
//!     [remap]
//!     stereo_upmix = true
//!     "#,
//! )
//! .unwrap();
//! assert!(config.remap.stereo_upmix);
//! assert!(config.remap.normalize_levels);
//! ```
//!
//! The remap switches are read by [`Remapper::initialize`](crate::Remapper::initialize)
//! only; changing them takes effect at the next rebuild.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ParameterError, PcmResult};

/// Switches consulted when a mix matrix is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemapConfig {
    /// Clone stereo fronts into surround outputs the source lacks.
    pub stereo_upmix: bool,
    /// Scale gains so no output clips when every source is at full scale.
    pub normalize_levels: bool,
    /// Level in dB applied to a front centre folded into substitute
    /// channels. Positive values boost dialogue in downmixes.
    pub center_mix_level_db: f32,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            stereo_upmix: false,
            normalize_levels: true,
            center_mix_level_db: 0.0,
        }
    }
}

impl RemapConfig {
    /// Accepted centre mix levels in dB.
    pub const CENTER_MIX_LEVEL_RANGE: std::ops::RangeInclusive<f32> = -30.0..=30.0;

    /// Linear gain for [`center_mix_level_db`](Self::center_mix_level_db).
    pub fn center_mix_gain(&self) -> f32 {
        10.0f32.powf(self.center_mix_level_db / 20.0)
    }

    /// Checks the centre mix level.
    ///
    /// # Errors
    /// Returns [`ParameterError::InvalidValue`] if the level is outside
    /// [`CENTER_MIX_LEVEL_RANGE`](Self::CENTER_MIX_LEVEL_RANGE) or not finite.
    pub fn validate(&self) -> PcmResult<()> {
        if !Self::CENTER_MIX_LEVEL_RANGE.contains(&self.center_mix_level_db) {
            return Err(ParameterError::invalid_value(
                "remap.center_mix_level_db",
                format!("{} dB is outside [-30, 30]", self.center_mix_level_db),
            )
            .into());
        }
        Ok(())
    }
}

/// Dither applied when narrowing to 16 bits or fewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DitherConfig {
    /// Whether output streams should dither at all.
    pub enabled: bool,
    /// Peak offset in quantization steps, in `[0, 1)`.
    pub amplitude: f32,
    /// Fixed seed for reproducible noise; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude: 0.5,
            seed: None,
        }
    }
}

impl DitherConfig {
    /// Checks the amplitude is below one quantization step.
    ///
    /// # Errors
    /// Returns [`ParameterError::InvalidValue`] for amplitudes outside `[0, 1)`.
    pub fn validate(&self) -> PcmResult<()> {
        if !(0.0..1.0).contains(&self.amplitude) {
            return Err(ParameterError::invalid_value(
                "dither.amplitude",
                format!("{} is outside [0, 1)", self.amplitude),
            )
            .into());
        }
        Ok(())
    }
}

/// Converter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Prefer the vectorized kernel when it is compiled in.
    pub accelerated: bool,
    /// Output dither.
    pub dither: DitherConfig,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            accelerated: true,
            dither: DitherConfig::default(),
        }
    }
}

/// All engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mix matrix settings.
    pub remap: RemapConfig,
    /// Sample conversion settings.
    pub convert: ConvertConfig,
}

impl EngineConfig {
    /// Parses a TOML document and validates it.
    ///
    /// # Errors
    /// - [`ConfigError::TomlParse`] if the document is not valid TOML or a
    ///   field has the wrong type.
    /// - [`ParameterError::InvalidValue`] if a value fails validation.
    pub fn from_toml(toml_str: &str) -> PcmResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(ConfigError::from)?;
        config.remap.validate()?;
        config.convert.dither.validate()?;
        Ok(config)
    }

    /// Serializes to a TOML document.
    ///
    /// # Errors
    /// Returns [`ConfigError::TomlSerialize`] if serialization fails.
    pub fn to_toml(&self) -> PcmResult<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::from)?)
    }
}
