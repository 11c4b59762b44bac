//! Portable scalar kernels.
//!
//! These define the reference behaviour; the vectorized kernels must produce
//! identical output.

use super::codec::Codec;
use super::dither::Dither;

/// Decodes `output.len()` samples from `input`.
pub(crate) fn decode(codec: &Codec, input: &[u8], output: &mut [f32]) {
    if let Codec::F32(order) = codec
        && order.is_native()
        && let Ok(samples) = bytemuck::try_cast_slice::<u8, f32>(&input[..output.len() * 4])
    {
        output.copy_from_slice(samples);
        return;
    }

    let width = codec.bytes();
    for (bytes, out) in input.chunks_exact(width).zip(output.iter_mut()) {
        *out = codec.decode_one(bytes);
    }
}

/// Encodes `input.len()` samples into `output`.
pub(crate) fn encode(codec: &Codec, input: &[f32], output: &mut [u8], mut dither: Option<&mut Dither>) {
    if let Codec::F32(order) = codec
        && order.is_native()
        && let Ok(samples) = bytemuck::try_cast_slice_mut::<u8, f32>(&mut output[..input.len() * 4])
    {
        samples.copy_from_slice(input);
        return;
    }

    let width = codec.bytes();
    for (value, bytes) in input.iter().zip(output.chunks_exact_mut(width)) {
        let offset = next_offset(&mut dither);
        codec.encode_one(*value, offset, bytes);
    }
}

#[inline(always)]
pub(crate) fn next_offset(dither: &mut Option<&mut Dither>) -> f64 {
    dither.as_deref_mut().map_or(0.0, Dither::next_offset)
}
