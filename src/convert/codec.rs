//! Per-format sample codecs.
//!
//! Every convertible [`SampleFormat`] maps to exactly one [`Codec`]. Integer
//! codecs share one scaling contract, parameterised by bit depth:
//!
//! - decode: negative codes divide by `2^(bits-1)`, non-negative codes divide
//!   by `max + 0.5`, so the minimum code is exactly `-1.0` and the maximum
//!   code lands just below `1.0`;
//! - encode: clamp to `[-1, 1]`, multiply by the same divisor, add the dither
//!   offset, round half away from zero, clamp to `[min, max]`.
//!
//! All scaling arithmetic runs in `f64` so codes up to 24 bits survive a round
//! trip through the `f32` domain exactly.

use i24::I24;

use crate::format::{ByteOrder, SampleEncoding, SampleFormat};

/// Integer storage variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntLayout {
    U8,
    S8,
    S16,
    S24Packed,
    S24Padded,
    S24PaddedMsb,
    S32,
}

/// Scaling constants for one integer bit depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IntScale {
    /// Divisor for negative codes, `2^(bits-1)`.
    pub neg: f64,
    /// Divisor for non-negative codes, `max + 0.5`.
    pub pos: f64,
    /// Smallest code.
    pub min: f64,
    /// Largest code.
    pub max: f64,
}

impl IntScale {
    pub(crate) const fn for_bits(bits: u32) -> Self {
        let half = (1u64 << (bits - 1)) as f64;
        Self {
            neg: half,
            pos: half - 0.5,
            min: -half,
            max: half - 1.0,
        }
    }

    /// Code to normalized value.
    #[inline(always)]
    pub(crate) fn normalize(&self, code: f64) -> f32 {
        if code < 0.0 {
            (code / self.neg) as f32
        } else {
            (code / self.pos) as f32
        }
    }

    /// Clamped normalized value to unrounded code.
    #[inline(always)]
    pub(crate) fn scale(&self, value: f64) -> f64 {
        if value < 0.0 {
            value * self.neg
        } else {
            value * self.pos
        }
    }

    /// Unrounded code plus dither offset to a representable code.
    #[inline(always)]
    pub(crate) fn quantize(&self, scaled: f64, dither: f64) -> i32 {
        (scaled + dither).round().clamp(self.min, self.max) as i32
    }
}

impl IntLayout {
    pub(crate) const fn bits(self) -> u32 {
        match self {
            Self::U8 | Self::S8 => 8,
            Self::S16 => 16,
            Self::S24Packed | Self::S24Padded | Self::S24PaddedMsb => 24,
            Self::S32 => 32,
        }
    }

    pub(crate) const fn bytes(self) -> usize {
        match self {
            Self::U8 | Self::S8 => 1,
            Self::S16 => 2,
            Self::S24Packed => 3,
            Self::S24Padded | Self::S24PaddedMsb | Self::S32 => 4,
        }
    }

    /// Reads one sign-extended code. `bytes` holds exactly one sample.
    #[inline(always)]
    pub(crate) fn read(self, bytes: &[u8], order: ByteOrder) -> i32 {
        match self {
            Self::U8 => bytes[0] as i32 - 128,
            Self::S8 => bytes[0] as i8 as i32,
            Self::S16 => {
                let raw = [bytes[0], bytes[1]];
                match order {
                    ByteOrder::Little => i16::from_le_bytes(raw) as i32,
                    ByteOrder::Big => i16::from_be_bytes(raw) as i32,
                }
            }
            Self::S24Packed => read_i24(order, [bytes[0], bytes[1], bytes[2]]),
            // significant bytes are the low three of the container
            Self::S24Padded => match order {
                ByteOrder::Little => read_i24(order, [bytes[0], bytes[1], bytes[2]]),
                ByteOrder::Big => read_i24(order, [bytes[1], bytes[2], bytes[3]]),
            },
            // significant bytes are the high three of the container
            Self::S24PaddedMsb => match order {
                ByteOrder::Little => read_i24(order, [bytes[1], bytes[2], bytes[3]]),
                ByteOrder::Big => read_i24(order, [bytes[0], bytes[1], bytes[2]]),
            },
            Self::S32 => {
                let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
                match order {
                    ByteOrder::Little => i32::from_le_bytes(raw),
                    ByteOrder::Big => i32::from_be_bytes(raw),
                }
            }
        }
    }

    /// Writes one code, already clamped to this layout's range.
    #[inline(always)]
    pub(crate) fn write(self, code: i32, bytes: &mut [u8], order: ByteOrder) {
        match self {
            Self::U8 => bytes[0] = (code + 128) as u8,
            Self::S8 => bytes[0] = code as i8 as u8,
            Self::S16 => {
                let raw = match order {
                    ByteOrder::Little => (code as i16).to_le_bytes(),
                    ByteOrder::Big => (code as i16).to_be_bytes(),
                };
                bytes[..2].copy_from_slice(&raw);
            }
            Self::S24Packed => bytes[..3].copy_from_slice(&write_i24(code, order)),
            Self::S24Padded => {
                let raw = match order {
                    ByteOrder::Little => code.to_le_bytes(),
                    ByteOrder::Big => code.to_be_bytes(),
                };
                bytes[..4].copy_from_slice(&raw);
            }
            Self::S24PaddedMsb => {
                let raw = match order {
                    ByteOrder::Little => (code << 8).to_le_bytes(),
                    ByteOrder::Big => (code << 8).to_be_bytes(),
                };
                bytes[..4].copy_from_slice(&raw);
            }
            Self::S32 => {
                let raw = match order {
                    ByteOrder::Little => code.to_le_bytes(),
                    ByteOrder::Big => code.to_be_bytes(),
                };
                bytes[..4].copy_from_slice(&raw);
            }
        }
    }
}

#[inline(always)]
fn read_i24(order: ByteOrder, raw: [u8; 3]) -> i32 {
    match order {
        ByteOrder::Little => I24::from_le_bytes(raw).to_i32(),
        ByteOrder::Big => I24::from_be_bytes(raw).to_i32(),
    }
}

#[inline(always)]
fn write_i24(code: i32, order: ByteOrder) -> [u8; 3] {
    let sample = I24::saturating_from_i32(code);
    match order {
        ByteOrder::Little => sample.to_le_bytes(),
        ByteOrder::Big => sample.to_be_bytes(),
    }
}

/// Transform for one convertible format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Codec {
    Int {
        layout: IntLayout,
        order: ByteOrder,
        scale: IntScale,
    },
    F32(ByteOrder),
    F64(ByteOrder),
}

impl Codec {
    /// The codec for `format`, or `None` if the format is not convertible.
    pub(crate) const fn for_format(format: SampleFormat) -> Option<Self> {
        let order = format.byte_order;
        let layout = match format.encoding {
            SampleEncoding::U8 => IntLayout::U8,
            SampleEncoding::S8 => IntLayout::S8,
            SampleEncoding::S16 => IntLayout::S16,
            SampleEncoding::S24Packed => IntLayout::S24Packed,
            SampleEncoding::S24Padded => IntLayout::S24Padded,
            SampleEncoding::S24PaddedMsb => IntLayout::S24PaddedMsb,
            SampleEncoding::S32 => IntLayout::S32,
            SampleEncoding::F32 => return Some(Self::F32(order)),
            SampleEncoding::F64 => return Some(Self::F64(order)),
            SampleEncoding::Raw => return None,
        };
        Some(Self::Int {
            layout,
            order,
            scale: IntScale::for_bits(layout.bits()),
        })
    }

    /// Bytes per encoded sample.
    pub(crate) const fn bytes(&self) -> usize {
        match self {
            Self::Int { layout, .. } => layout.bytes(),
            Self::F32(_) => 4,
            Self::F64(_) => 8,
        }
    }

    /// Whether dither applies when encoding to this codec.
    pub(crate) const fn is_ditherable(&self) -> bool {
        match self {
            Self::Int { layout, .. } => layout.bits() <= 16,
            _ => false,
        }
    }

    /// Decodes one sample.
    #[inline(always)]
    pub(crate) fn decode_one(&self, bytes: &[u8]) -> f32 {
        match *self {
            Self::Int {
                layout,
                order,
                scale,
            } => scale.normalize(layout.read(bytes, order) as f64),
            Self::F32(order) => {
                let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
                match order {
                    ByteOrder::Little => f32::from_le_bytes(raw),
                    ByteOrder::Big => f32::from_be_bytes(raw),
                }
            }
            Self::F64(order) => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes[..8]);
                match order {
                    ByteOrder::Little => f64::from_le_bytes(raw) as f32,
                    ByteOrder::Big => f64::from_be_bytes(raw) as f32,
                }
            }
        }
    }

    /// Encodes one sample with the given dither offset (in codes).
    #[inline(always)]
    pub(crate) fn encode_one(&self, value: f32, dither: f64, bytes: &mut [u8]) {
        match *self {
            Self::Int {
                layout,
                order,
                scale,
            } => {
                let clamped = (value as f64).max(-1.0).min(1.0);
                let code = scale.quantize(scale.scale(clamped), dither);
                layout.write(code, bytes, order);
            }
            Self::F32(order) => {
                let raw = match order {
                    ByteOrder::Little => value.to_le_bytes(),
                    ByteOrder::Big => value.to_be_bytes(),
                };
                bytes[..4].copy_from_slice(&raw);
            }
            Self::F64(order) => {
                let raw = match order {
                    ByteOrder::Little => (value as f64).to_le_bytes(),
                    ByteOrder::Big => (value as f64).to_be_bytes(),
                };
                bytes[..8].copy_from_slice(&raw);
            }
        }
    }
}
