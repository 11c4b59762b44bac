//! Vectorized kernels for integer codecs.
//!
//! Four samples are scaled per iteration with `f64x4`. Lane arithmetic is the
//! same IEEE sequence the portable kernel performs (clamp, multiply or
//! divide, round half away from zero) and dither offsets are drawn in sample
//! order, so both kernels produce identical bytes.
//!
//! Float codecs have nothing to scale and always take the portable path.

use wide::f64x4;

use super::codec::{Codec, IntLayout, IntScale};
use super::dither::Dither;
use super::portable;
use crate::format::ByteOrder;

const LANES: usize = 4;

/// Decodes `output.len()` samples from `input`.
pub(crate) fn decode(codec: &Codec, input: &[u8], output: &mut [f32]) {
    match *codec {
        Codec::Int {
            layout,
            order,
            scale,
        } => decode_int(layout, order, scale, input, output),
        _ => portable::decode(codec, input, output),
    }
}

/// Encodes `input.len()` samples into `output`.
pub(crate) fn encode(codec: &Codec, input: &[f32], output: &mut [u8], dither: Option<&mut Dither>) {
    match *codec {
        Codec::Int {
            layout,
            order,
            scale,
        } => encode_int(layout, order, scale, input, output, dither),
        _ => portable::encode(codec, input, output, dither),
    }
}

fn decode_int(layout: IntLayout, order: ByteOrder, scale: IntScale, input: &[u8], output: &mut [f32]) {
    let width = layout.bytes();
    let neg_div = f64x4::splat(scale.neg);
    let pos_div = f64x4::splat(scale.pos);

    let mut in_chunks = input.chunks_exact(LANES * width);
    let mut out_chunks = output.chunks_exact_mut(LANES);
    for (bytes, out) in (&mut in_chunks).zip(&mut out_chunks) {
        let codes = [
            layout.read(&bytes[0..width], order) as f64,
            layout.read(&bytes[width..2 * width], order) as f64,
            layout.read(&bytes[2 * width..3 * width], order) as f64,
            layout.read(&bytes[3 * width..4 * width], order) as f64,
        ];
        let lanes = f64x4::from(codes);
        let neg = (lanes / neg_div).to_array();
        let pos = (lanes / pos_div).to_array();
        for lane in 0..LANES {
            let value = if codes[lane] < 0.0 { neg[lane] } else { pos[lane] };
            out[lane] = value as f32;
        }
    }

    // Tail
    for (bytes, out) in in_chunks
        .remainder()
        .chunks_exact(width)
        .zip(out_chunks.into_remainder().iter_mut())
    {
        *out = scale.normalize(layout.read(bytes, order) as f64);
    }
}

fn encode_int(
    layout: IntLayout,
    order: ByteOrder,
    scale: IntScale,
    input: &[f32],
    output: &mut [u8],
    mut dither: Option<&mut Dither>,
) {
    let width = layout.bytes();
    let lower = f64x4::splat(-1.0);
    let upper = f64x4::splat(1.0);
    let neg_mul = f64x4::splat(scale.neg);
    let pos_mul = f64x4::splat(scale.pos);

    let mut in_chunks = input.chunks_exact(LANES);
    let mut out_chunks = output.chunks_exact_mut(LANES * width);
    for (values, bytes) in (&mut in_chunks).zip(&mut out_chunks) {
        let lanes = f64x4::from([
            values[0] as f64,
            values[1] as f64,
            values[2] as f64,
            values[3] as f64,
        ]);
        let clamped = lanes.max(lower).min(upper);
        let neg = (clamped * neg_mul).to_array();
        let pos = (clamped * pos_mul).to_array();
        let clamped = clamped.to_array();
        for lane in 0..LANES {
            let scaled = if clamped[lane] < 0.0 { neg[lane] } else { pos[lane] };
            let code = scale.quantize(scaled, portable::next_offset(&mut dither));
            layout.write(code, &mut bytes[lane * width..(lane + 1) * width], order);
        }
    }

    let codec = Codec::Int {
        layout,
        order,
        scale,
    };
    portable::encode(
        &codec,
        in_chunks.remainder(),
        out_chunks.into_remainder(),
        dither,
    );
}
