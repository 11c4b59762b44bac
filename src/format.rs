//! Sample format tags.
//!
//! A [`SampleFormat`] identifies how one scalar sample is stored on the wire:
//! its [`SampleEncoding`] (integer or float width, signedness, container size),
//! its [`ByteOrder`], and whether channels are packed (interleaved) or planar.
//!
//! Formats format and parse using short lowercase names such as `"s16le"`,
//! `"s24be3"`, `"s24le4msb"`, `"f32le"` or `"u8"`; planar formats carry a
//! trailing `p` (`"f32lep"`).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ParameterError, PcmError};

/// Byte order of multi-byte samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    /// Byte order of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: ByteOrder = ByteOrder::Little;
    /// Byte order of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::Big;

    /// Returns true if this is the host byte order.
    #[inline]
    pub const fn is_native(self) -> bool {
        matches!(
            (self, Self::NATIVE),
            (Self::Little, Self::Little) | (Self::Big, Self::Big)
        )
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Little => "le",
            Self::Big => "be",
        }
    }
}

/// Storage of a single scalar sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleEncoding {
    /// Unsigned 8-bit, centred at 128.
    U8,
    /// Signed 8-bit.
    S8,
    /// Signed 16-bit.
    S16,
    /// Signed 24-bit in three bytes.
    S24Packed,
    /// Signed 24-bit in the three least significant bytes of a 4-byte
    /// container, sign extended.
    S24Padded,
    /// Signed 24-bit in the three most significant bytes of a 4-byte
    /// container.
    S24PaddedMsb,
    /// Signed 32-bit.
    S32,
    /// IEEE 754 single precision.
    F32,
    /// IEEE 754 double precision.
    F64,
    /// Compressed bitstream passed through without decoding.
    Raw,
}

impl SampleEncoding {
    /// Every encoding.
    pub const ALL: [SampleEncoding; 10] = [
        Self::U8,
        Self::S8,
        Self::S16,
        Self::S24Packed,
        Self::S24Padded,
        Self::S24PaddedMsb,
        Self::S32,
        Self::F32,
        Self::F64,
        Self::Raw,
    ];

    /// Bytes occupied by one sample, or `None` for [`SampleEncoding::Raw`].
    pub const fn bytes_per_sample(self) -> Option<usize> {
        match self {
            Self::U8 | Self::S8 => Some(1),
            Self::S16 => Some(2),
            Self::S24Packed => Some(3),
            Self::S24Padded | Self::S24PaddedMsb | Self::S32 | Self::F32 => Some(4),
            Self::F64 => Some(8),
            Self::Raw => None,
        }
    }

    /// Number of bits that carry sample information.
    pub const fn significant_bits(self) -> u32 {
        match self {
            Self::U8 | Self::S8 => 8,
            Self::S16 => 16,
            Self::S24Packed | Self::S24Padded | Self::S24PaddedMsb => 24,
            Self::S32 | Self::F32 => 32,
            Self::F64 => 64,
            Self::Raw => 0,
        }
    }

    /// Returns true for the IEEE float encodings.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns true for the integer encodings.
    pub const fn is_integer(self) -> bool {
        !self.is_float() && !matches!(self, Self::Raw)
    }

    /// Returns true if negative values are representable.
    pub const fn is_signed(self) -> bool {
        !matches!(self, Self::U8 | Self::Raw)
    }

    /// Whether byte order affects this encoding.
    const fn has_byte_order(self) -> bool {
        !matches!(self, Self::U8 | Self::S8 | Self::Raw)
    }
}

/// Tag identifying a complete on-wire sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleFormat {
    /// Scalar storage.
    pub encoding: SampleEncoding,
    /// Byte order of multi-byte encodings. Ignored for single-byte encodings.
    pub byte_order: ByteOrder,
    /// `true` when each channel lives in its own buffer.
    pub planar: bool,
}

impl SampleFormat {
    /// Unsigned 8-bit.
    pub const U8: Self = Self::new(SampleEncoding::U8, ByteOrder::NATIVE);
    /// Signed 8-bit.
    pub const S8: Self = Self::new(SampleEncoding::S8, ByteOrder::NATIVE);
    /// Signed 16-bit little endian.
    pub const S16LE: Self = Self::new(SampleEncoding::S16, ByteOrder::Little);
    /// Signed 16-bit big endian.
    pub const S16BE: Self = Self::new(SampleEncoding::S16, ByteOrder::Big);
    /// Signed 16-bit native endian.
    pub const S16NE: Self = Self::new(SampleEncoding::S16, ByteOrder::NATIVE);
    /// Signed 24-bit in 3 bytes, little endian.
    pub const S24LE3: Self = Self::new(SampleEncoding::S24Packed, ByteOrder::Little);
    /// Signed 24-bit in 3 bytes, big endian.
    pub const S24BE3: Self = Self::new(SampleEncoding::S24Packed, ByteOrder::Big);
    /// Signed 24-bit in the low bytes of 4, little endian.
    pub const S24LE4: Self = Self::new(SampleEncoding::S24Padded, ByteOrder::Little);
    /// Signed 24-bit in the low bytes of 4, big endian.
    pub const S24BE4: Self = Self::new(SampleEncoding::S24Padded, ByteOrder::Big);
    /// Signed 24-bit in the high bytes of 4, native endian.
    pub const S24NE4MSB: Self = Self::new(SampleEncoding::S24PaddedMsb, ByteOrder::NATIVE);
    /// Signed 32-bit little endian.
    pub const S32LE: Self = Self::new(SampleEncoding::S32, ByteOrder::Little);
    /// Signed 32-bit big endian.
    pub const S32BE: Self = Self::new(SampleEncoding::S32, ByteOrder::Big);
    /// Native endian `f32`, the pipeline's internal format.
    pub const FLOAT: Self = Self::new(SampleEncoding::F32, ByteOrder::NATIVE);
    /// Native endian `f64`.
    pub const DOUBLE: Self = Self::new(SampleEncoding::F64, ByteOrder::NATIVE);
    /// Compressed passthrough.
    pub const RAW: Self = Self::new(SampleEncoding::Raw, ByteOrder::NATIVE);

    /// Packed format with the given encoding and byte order.
    pub const fn new(encoding: SampleEncoding, byte_order: ByteOrder) -> Self {
        Self {
            encoding,
            byte_order,
            planar: false,
        }
    }

    /// The planar variant of this format.
    pub const fn into_planar(self) -> Self {
        Self {
            planar: true,
            ..self
        }
    }

    /// The packed variant of this format.
    pub const fn into_packed(self) -> Self {
        Self {
            planar: false,
            ..self
        }
    }

    /// Bytes per scalar sample, `None` for raw bitstreams.
    #[inline]
    pub const fn bytes_per_sample(&self) -> Option<usize> {
        self.encoding.bytes_per_sample()
    }

    /// Bits carrying sample information.
    #[inline]
    pub const fn significant_bits(&self) -> u32 {
        self.encoding.significant_bits()
    }

    /// Returns true when each channel lives in its own buffer.
    #[inline]
    pub const fn is_planar(&self) -> bool {
        self.planar
    }

    /// Returns true for float encodings.
    #[inline]
    pub const fn is_float(&self) -> bool {
        self.encoding.is_float()
    }

    /// Returns true for the compressed passthrough tag.
    #[inline]
    pub const fn is_raw(&self) -> bool {
        matches!(self.encoding, SampleEncoding::Raw)
    }

    /// Same format with byte order canonicalised, so formats that differ
    /// only in an irrelevant byte order compare equal.
    pub const fn canonical(self) -> Self {
        if self.encoding.has_byte_order() {
            self
        } else {
            Self {
                byte_order: ByteOrder::Little,
                ..self
            }
        }
    }
}

impl Display for SampleFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let order = self.byte_order.suffix();
        match self.encoding {
            SampleEncoding::U8 => f.write_str("u8")?,
            SampleEncoding::S8 => f.write_str("s8")?,
            SampleEncoding::S16 => write!(f, "s16{order}")?,
            SampleEncoding::S24Packed => write!(f, "s24{order}3")?,
            SampleEncoding::S24Padded => write!(f, "s24{order}4")?,
            SampleEncoding::S24PaddedMsb => write!(f, "s24{order}4msb")?,
            SampleEncoding::S32 => write!(f, "s32{order}")?,
            SampleEncoding::F32 => write!(f, "f32{order}")?,
            SampleEncoding::F64 => write!(f, "f64{order}")?,
            SampleEncoding::Raw => f.write_str("raw")?,
        }
        if self.planar {
            f.write_str("p")?;
        }
        Ok(())
    }
}

impl FromStr for SampleFormat {
    type Err = PcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let (name, planar) = match name.strip_suffix('p') {
            Some(packed) => (packed.to_string(), true),
            _ => (name, false),
        };

        let order_of = |rest: &str| -> Option<(ByteOrder, String)> {
            if let Some(tail) = rest.strip_prefix("le") {
                Some((ByteOrder::Little, tail.to_string()))
            } else if let Some(tail) = rest.strip_prefix("be") {
                Some((ByteOrder::Big, tail.to_string()))
            } else if let Some(tail) = rest.strip_prefix("ne") {
                Some((ByteOrder::NATIVE, tail.to_string()))
            } else {
                None
            }
        };

        let parsed = match name.as_str() {
            "u8" => Some(Self::U8),
            "s8" => Some(Self::S8),
            "raw" => Some(Self::RAW),
            other => {
                let (encoding_prefix, rest) = match (other.get(..3), other.get(3..)) {
                    (Some(prefix), Some(rest)) => (prefix, rest),
                    _ => ("", ""),
                };
                match (encoding_prefix, order_of(rest)) {
                    ("s16", Some((order, tail))) if tail.is_empty() => {
                        Some(Self::new(SampleEncoding::S16, order))
                    }
                    ("s24", Some((order, tail))) => match tail.as_str() {
                        "3" => Some(Self::new(SampleEncoding::S24Packed, order)),
                        "4" => Some(Self::new(SampleEncoding::S24Padded, order)),
                        "4msb" => Some(Self::new(SampleEncoding::S24PaddedMsb, order)),
                        _ => None,
                    },
                    ("s32", Some((order, tail))) if tail.is_empty() => {
                        Some(Self::new(SampleEncoding::S32, order))
                    }
                    ("f32", Some((order, tail))) if tail.is_empty() => {
                        Some(Self::new(SampleEncoding::F32, order))
                    }
                    ("f64", Some((order, tail))) if tail.is_empty() => {
                        Some(Self::new(SampleEncoding::F64, order))
                    }
                    _ => None,
                }
            }
        };

        let format = parsed.ok_or_else(|| {
            ParameterError::invalid_value("sample_format", format!("unknown format '{s}'"))
        })?;
        Ok(if planar { format.into_planar() } else { format })
    }
}
