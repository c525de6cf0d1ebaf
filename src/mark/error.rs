// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the watermark codec.
//!
//! [`WatermarkError`] covers every failure mode from transform shape checks
//! through payload framing and block-size detection.

use core::fmt;

/// Errors that can occur while embedding, extracting or verifying a watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// A plane could not be transformed or reassembled with the given shape.
    InvalidShape(&'static str),
    /// The block size is outside the supported range or cannot hold the
    /// configured coefficient position.
    UnsupportedBlockSize(usize),
    /// The payload bit stream needs more blocks than the subband provides.
    CapacityExceeded {
        required_bits: usize,
        available_bits: usize,
    },
    /// Block `index` overhangs the subband and its reflected carrier read
    /// cannot be moved at this block size without disturbing a neighbour.
    DegenerateBlock { index: usize, block_size: usize },
    /// The header read from the image disagrees with the requested block size.
    BlockSizeMismatch { declared: usize, found: u8 },
    /// The bit stream ended before the message terminator was found.
    TerminatorNotFound,
    /// The bit stream ended inside the length or signature field.
    PayloadTruncated,
    /// A payload needs a non-empty signature.
    EmptySignature,
    /// The message contains the terminator pattern and could not be decoded
    /// back unambiguously.
    MessageContainsTerminator,
    /// No candidate block size in the probed range carried a matching header.
    DetectionFailed { min: usize, max: usize },
    /// The extracted signature does not verify against the extracted message.
    SignatureInvalid,
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape(msg) => write!(f, "invalid plane shape: {msg}"),
            Self::UnsupportedBlockSize(bs) => write!(f, "unsupported block size: {bs}"),
            Self::CapacityExceeded { required_bits, available_bits } => write!(
                f,
                "payload needs {required_bits} bits but the image only has {available_bits} blocks"
            ),
            Self::DegenerateBlock { index, block_size } => write!(
                f,
                "edge block {index} cannot carry a bit at block size {block_size}"
            ),
            Self::BlockSizeMismatch { declared, found } => {
                write!(f, "block size header mismatch: expected {declared}, found {found}")
            }
            Self::TerminatorNotFound => write!(f, "message terminator not found"),
            Self::PayloadTruncated => write!(f, "watermark payload truncated"),
            Self::EmptySignature => write!(f, "signature is empty"),
            Self::MessageContainsTerminator => write!(f, "message contains the terminator pattern"),
            Self::DetectionFailed { min, max } => {
                write!(f, "no block size in {min}..={max} matched the embedded header")
            }
            Self::SignatureInvalid => write!(f, "watermark signature is invalid"),
        }
    }
}

impl std::error::Error for WatermarkError {}
