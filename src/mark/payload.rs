// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Watermark payload framing.
//!
//! The payload is serialized MSB-first and written one bit per block in
//! row-major block order:
//!
//! ```text
//! [8 bits ] block size header (4..=255)
//! [32 bits] signature length L in bytes (big-endian u32)
//! [L*8    ] signature bytes
//! [M*8    ] message bytes (UTF-8)
//! [32 bits] terminator (default 0x00000000)
//! [K*8    ] zero margin, K = reliability margin for the block size
//! ```
//!
//! This layout is the persisted artifact inside a watermarked image. Readers
//! locate the message end by scanning for the terminator; the margin is
//! never read back.

use super::config::WatermarkConfig;
use super::error::WatermarkError;
use super::{HEADER_BITS, LENGTH_FIELD_BITS, TERMINATOR_BITS};

/// An ordered sequence of payload bits, one `0`/`1` per element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitStream {
    bits: Vec<u8>,
}

impl BitStream {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn into_bits(self) -> Vec<u8> {
        self.bits
    }
}

impl From<Vec<u8>> for BitStream {
    fn from(bits: Vec<u8>) -> Self {
        Self { bits }
    }
}

/// Signature and message recovered from a bit stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub signature: Vec<u8>,
    pub message: Vec<u8>,
}

/// Fixed bytes around the signature and message for `block_size`:
/// header(1) + length(4) + terminator(4) + margin.
pub fn framing_overhead_bytes(block_size: usize, config: &WatermarkConfig) -> usize {
    (HEADER_BITS + LENGTH_FIELD_BITS + TERMINATOR_BITS) / 8 + config.margin_bytes(block_size)
}

/// Total encoded length in bits for a payload of the given sizes.
pub fn payload_bits(signature_len: usize, message_len: usize, block_size: usize, config: &WatermarkConfig) -> usize {
    (framing_overhead_bytes(block_size, config) + signature_len + message_len) * 8
}

/// 8-bit MSB-first header for `block_size` (which must fit in a byte).
pub fn encode_header(block_size: u8) -> [u8; 8] {
    let mut bits = [0u8; 8];
    for (i, b) in bits.iter_mut().enumerate() {
        *b = (block_size >> (7 - i)) & 1;
    }
    bits
}

/// Read the 8-bit header from the start of `bits`, or `None` if fewer than
/// eight bits are available.
pub fn decode_header(bits: &[u8]) -> Option<u8> {
    let head = bits.get(..HEADER_BITS)?;
    Some(head.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1)))
}

/// Serialize a payload into its bit stream.
///
/// # Errors
/// - [`WatermarkError::UnsupportedBlockSize`] if `block_size` is not a valid
///   embedding size for `config`.
/// - [`WatermarkError::EmptySignature`] if `signature` is empty; decode
///   treats a zero length field as a truncated stream.
/// - [`WatermarkError::MessageContainsTerminator`] if the message would be
///   cut short by the terminator scan on decode.
/// - [`WatermarkError::CapacityExceeded`] if the signature does not fit the
///   32-bit length field.
pub fn encode(
    block_size: usize,
    signature: &[u8],
    message: &[u8],
    config: &WatermarkConfig,
) -> Result<BitStream, WatermarkError> {
    config.validate_block_size(block_size)?;
    let header = u8::try_from(block_size).map_err(|_| WatermarkError::UnsupportedBlockSize(block_size))?;
    if signature.is_empty() {
        return Err(WatermarkError::EmptySignature);
    }
    let sig_len = u32::try_from(signature.len()).map_err(|_| WatermarkError::CapacityExceeded {
        required_bits: signature.len().saturating_mul(8),
        available_bits: u32::MAX as usize,
    })?;

    let mut body = Vec::with_capacity(message.len() + config.terminator.len());
    body.extend_from_slice(message);
    body.extend_from_slice(&config.terminator);
    if find_terminator(&body, &config.terminator) != Some(message.len()) {
        return Err(WatermarkError::MessageContainsTerminator);
    }

    let margin = config.margin_bytes(block_size);
    let mut bytes = Vec::with_capacity(4 + signature.len() + body.len() + margin);
    bytes.extend_from_slice(&sig_len.to_be_bytes());
    bytes.extend_from_slice(signature);
    bytes.extend_from_slice(&body);
    bytes.resize(bytes.len() + margin, 0);

    let mut bits = Vec::with_capacity(HEADER_BITS + bytes.len() * 8);
    bits.extend_from_slice(&encode_header(header));
    bits.extend(bytes_to_bits(&bytes));

    debug_assert_eq!(bits.len(), payload_bits(signature.len(), message.len(), block_size, config));
    Ok(BitStream::from(bits))
}

/// Parse a bit stream read from an image with `declared_block_size`.
///
/// `bits` may extend past the payload (e.g. one bit per block of the whole
/// image); everything after the terminator is ignored.
///
/// # Errors
/// - [`WatermarkError::PayloadTruncated`] if the stream ends inside the
///   header, length or signature field.
/// - [`WatermarkError::BlockSizeMismatch`] if the header disagrees with
///   `declared_block_size`.
/// - [`WatermarkError::TerminatorNotFound`] if no terminator follows the
///   signature.
pub fn decode(
    bits: &[u8],
    declared_block_size: usize,
    config: &WatermarkConfig,
) -> Result<DecodedPayload, WatermarkError> {
    let found = decode_header(bits).ok_or(WatermarkError::PayloadTruncated)?;
    if found as usize != declared_block_size {
        return Err(WatermarkError::BlockSizeMismatch { declared: declared_block_size, found });
    }

    // Only whole bytes: a zero-padded partial byte could fake a terminator.
    let bytes = bits_to_bytes(&bits[HEADER_BITS..]);
    let len_field = bytes.get(..4).ok_or(WatermarkError::PayloadTruncated)?;
    let sig_len = u32::from_be_bytes([len_field[0], len_field[1], len_field[2], len_field[3]]) as usize;
    if sig_len == 0 {
        // Every signer emits at least one byte; zero means noise or a cut stream.
        return Err(WatermarkError::PayloadTruncated);
    }

    let sig_end = 4usize.checked_add(sig_len).ok_or(WatermarkError::PayloadTruncated)?;
    let signature = bytes.get(4..sig_end).ok_or(WatermarkError::PayloadTruncated)?.to_vec();

    let rest = &bytes[sig_end..];
    let msg_len = find_terminator(rest, &config.terminator).ok_or(WatermarkError::TerminatorNotFound)?;

    Ok(DecodedPayload { signature, message: rest[..msg_len].to_vec() })
}

/// Byte offset of the first occurrence of `terminator` in `data`.
fn find_terminator(data: &[u8], terminator: &[u8]) -> Option<usize> {
    data.windows(terminator.len()).position(|w| w == terminator)
}

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Trailing bits that do not fill a whole byte are dropped.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1)))
        .collect()
}
