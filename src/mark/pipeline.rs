// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Single-image embed / extract / verify pipelines.
//!
//! Embed: channel → Haar → approximation subband → pad & split → modulate
//! one bit per interior block → merge & crop → write edge blocks through
//! their reflected reads → inverse Haar.
//!
//! Extract: channel → Haar → approximation subband → read one bit per block
//! → payload decode. No partial results: every call either processes the
//! whole bit stream or returns an error.

use std::borrow::Cow;

use tracing::{debug, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::plane::Plane;
use crate::transform::dct::DctPlan;
use crate::transform::haar::{self, HaarDecomposition};
use super::config::WatermarkConfig;
use super::detect::detect_in_subband;
use super::edge::{plan_edge_writes, EdgeGrid};
use super::error::WatermarkError;
use super::modulator::{embed_bit, extract_bit};
use super::partition::{block_at, block_count, merge_and_crop, pad_and_split, Block};
use super::payload::{self, BitStream, DecodedPayload};
use super::reliability::ReliabilityClass;
use super::signature::{MessageSigner, MessageVerifier};

/// Outcome of [`verify_message`].
///
/// An invalid signature is reported here (`valid == false`) rather than as
/// an error so callers can still inspect what was extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Block size used for extraction (detected or supplied).
    pub block_size: usize,
    pub message: Vec<u8>,
    pub signature: Vec<u8>,
    /// Verdict from the [`MessageVerifier`].
    pub valid: bool,
}

impl Verification {
    /// Message as text, with invalid UTF-8 replaced by U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.message)
    }

    /// Turn an invalid verdict into [`WatermarkError::SignatureInvalid`].
    pub fn require_valid(self) -> Result<Self, WatermarkError> {
        if self.valid {
            Ok(self)
        } else {
            Err(WatermarkError::SignatureInvalid)
        }
    }
}

/// Write `bits` into the first `bits.len()` blocks of `channel`.
///
/// Blocks past the end of the stream are left untouched (apart from the
/// Haar round trip). Blocks that overhang the subband are written through
/// their reflected read so the bit survives the crop.
///
/// # Errors
/// - [`WatermarkError::UnsupportedBlockSize`] if `block_size` is invalid for
///   `config`.
/// - [`WatermarkError::CapacityExceeded`] if the stream is longer than the
///   block count.
/// - [`WatermarkError::DegenerateBlock`] if a stream bit lands on an edge
///   block that cannot carry one at this block size. Nothing is written.
/// - [`WatermarkError::InvalidShape`] if the channel is empty.
pub fn embed_bits(
    channel: &Plane,
    bits: &BitStream,
    block_size: usize,
    config: &WatermarkConfig,
) -> Result<Plane, WatermarkError> {
    config.validate_block_size(block_size)?;
    let dec = haar::forward(channel)?;
    let (sw, sh) = dec.approx.dims();
    let available = block_count(sw, sh, block_size);

    debug!(
        block_size,
        payload_bits = bits.len(),
        capacity_bits = available,
        "embedding watermark"
    );
    if bits.len() > available {
        return Err(WatermarkError::CapacityExceeded {
            required_bits: bits.len(),
            available_bits: available,
        });
    }
    if config.reliability.classify(block_size) == ReliabilityClass::Danger {
        warn!(block_size, "block size has no reliability calibration; extraction may fail");
    }

    let plan = DctPlan::new(block_size);
    let grid = EdgeGrid::new(sw, sh, block_size);
    let edges = plan_edge_writes(&grid, bits.len(), &plan, config)?;

    let blocks = pad_and_split(&dec.approx, block_size)?;
    let stream = bits.bits();
    let modulate = |(i, block): (usize, Block)| match stream.get(i) {
        Some(&bit) if !grid.overhangs(i) => embed_bit(&block, bit, &plan, config),
        _ => block,
    };

    #[cfg(feature = "parallel")]
    let marked: Vec<_> = blocks.into_par_iter().enumerate().map(modulate).collect();
    #[cfg(not(feature = "parallel"))]
    let marked: Vec<_> = blocks.into_iter().enumerate().map(modulate).collect();

    let mut approx = merge_and_crop(&marked, block_size, (sw, sh))?;
    // Edge blocks read through the reflected padding, so they are written
    // on the cropped subband once every interior block is in place.
    for write in &edges {
        write.apply(approx.samples_mut(), stream[write.index()], config);
    }
    trace!(edge_blocks = edges.len(), "wrote overhanging blocks");
    haar::inverse(&HaarDecomposition { approx, ..dec })
}

/// Sign `message`, frame it and embed it.
///
/// # Errors
/// Anything [`payload::encode`] or [`embed_bits`] can return.
pub fn embed_message<S: MessageSigner + ?Sized>(
    channel: &Plane,
    message: &[u8],
    block_size: usize,
    signer: &S,
    config: &WatermarkConfig,
) -> Result<Plane, WatermarkError> {
    let signature = signer.sign(message);
    let bits = payload::encode(block_size, &signature, message, config)?;
    embed_bits(channel, &bits, block_size, config)
}

/// Read the first `count` payload bits at `block_size`.
///
/// # Errors
/// - [`WatermarkError::UnsupportedBlockSize`] if `block_size` is invalid.
/// - [`WatermarkError::CapacityExceeded`] if `count` exceeds the block count.
/// - [`WatermarkError::InvalidShape`] if the channel is empty.
pub fn extract_bits(
    channel: &Plane,
    block_size: usize,
    count: usize,
    config: &WatermarkConfig,
) -> Result<BitStream, WatermarkError> {
    config.validate_block_size(block_size)?;
    let dec = haar::forward(channel)?;
    let (sw, sh) = dec.approx.dims();
    let available = block_count(sw, sh, block_size);
    if count > available {
        return Err(WatermarkError::CapacityExceeded { required_bits: count, available_bits: available });
    }
    Ok(read_bits(&dec.approx, block_size, count, config))
}

/// Read every block at `block_size` and decode the payload.
///
/// # Errors
/// - [`WatermarkError::UnsupportedBlockSize`] if `block_size` is invalid.
/// - [`WatermarkError::BlockSizeMismatch`] if the image header declares a
///   different size.
/// - [`WatermarkError::PayloadTruncated`] / [`WatermarkError::TerminatorNotFound`]
///   if the stream is not a complete payload.
pub fn extract_payload(
    channel: &Plane,
    block_size: usize,
    config: &WatermarkConfig,
) -> Result<DecodedPayload, WatermarkError> {
    config.validate_block_size(block_size)?;
    let dec = haar::forward(channel)?;
    decode_subband(&dec.approx, block_size, config)
}

/// Extract the payload and check its signature.
///
/// With `block_size == None` the size is auto-detected first.
///
/// # Errors
/// Everything [`extract_payload`] returns, plus
/// [`WatermarkError::DetectionFailed`] when detection finds no size. A bad
/// signature is not an error; see [`Verification::valid`].
pub fn verify_message<V: MessageVerifier + ?Sized>(
    channel: &Plane,
    block_size: Option<usize>,
    verifier: &V,
    config: &WatermarkConfig,
) -> Result<Verification, WatermarkError> {
    let dec = haar::forward(channel)?;
    let block_size = match block_size {
        Some(bs) => {
            config.validate_block_size(bs)?;
            bs
        }
        None => detect_in_subband(&dec.approx, config)?,
    };

    let DecodedPayload { signature, message } = decode_subband(&dec.approx, block_size, config)?;
    let valid = verifier.verify(&signature, &message);
    debug!(block_size, message_len = message.len(), valid, "verified watermark");
    Ok(Verification { block_size, message, signature, valid })
}

fn decode_subband(
    subband: &Plane,
    block_size: usize,
    config: &WatermarkConfig,
) -> Result<DecodedPayload, WatermarkError> {
    let (sw, sh) = subband.dims();
    let count = block_count(sw, sh, block_size);
    debug!(block_size, capacity_bits = count, "extracting watermark");
    let bits = read_bits(subband, block_size, count, config);
    payload::decode(bits.bits(), block_size, config)
}

/// Bits of blocks `0..count` in row-major order.
fn read_bits(subband: &Plane, block_size: usize, count: usize, config: &WatermarkConfig) -> BitStream {
    let plan = DctPlan::new(block_size);
    let read = |i: usize| extract_bit(&block_at(subband, block_size, i), &plan, config);

    #[cfg(feature = "parallel")]
    let bits: Vec<u8> = (0..count).into_par_iter().map(read).collect();
    #[cfg(not(feature = "parallel"))]
    let bits: Vec<u8> = (0..count).map(read).collect();

    BitStream::from(bits)
}
