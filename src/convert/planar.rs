//! Planar (one buffer per channel) conversion.
//!
//! Planar buffers are converted sample by sample straight into, or out of,
//! their interleaved position, so no intermediate buffer is needed.

use super::codec::Codec;
use super::dither::Dither;
use super::portable::next_offset;

/// Decodes `frames` samples from each plane into interleaved `output`.
pub(crate) fn decode(codec: &Codec, planes: &[&[u8]], frames: usize, output: &mut [f32]) {
    let channels = planes.len();
    let width = codec.bytes();
    for (channel, plane) in planes.iter().enumerate() {
        for (frame, bytes) in plane.chunks_exact(width).take(frames).enumerate() {
            output[frame * channels + channel] = codec.decode_one(bytes);
        }
    }
}

/// Encodes interleaved `input` into `frames` samples per plane.
///
/// Dither offsets are drawn plane by plane.
pub(crate) fn encode(
    codec: &Codec,
    input: &[f32],
    frames: usize,
    planes: &mut [&mut [u8]],
    mut dither: Option<&mut Dither>,
) {
    let channels = planes.len();
    let width = codec.bytes();
    for (channel, plane) in planes.iter_mut().enumerate() {
        for (frame, bytes) in plane.chunks_exact_mut(width).take(frames).enumerate() {
            let offset = next_offset(&mut dither);
            codec.encode_one(input[frame * channels + channel], offset, bytes);
        }
    }
}
