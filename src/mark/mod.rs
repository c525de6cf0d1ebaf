// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Signed watermark codec.
//!
//! A payload (block-size header, signature, message, terminator, margin) is
//! written one bit per block into the Haar approximation subband of a single
//! channel. Each bit is carried by the sign of one mid-frequency DCT
//! coefficient of its block. Extraction inverts the chain and can recover
//! the block size on its own from the header.
//!
//! - [`embed_message`] / [`verify_message`]: embed and verify entry points.
//! - [`payload`]: bit-stream framing.
//! - [`detect`]: block-size auto-detection.
//! - [`capacity`] and [`reliability`]: sizing and margin calibration.

pub mod error;
pub mod config;
pub mod reliability;
pub mod partition;
mod edge;
pub mod modulator;
pub mod payload;
pub mod capacity;
pub mod detect;
pub mod signature;
mod pipeline;

pub use error::WatermarkError;
pub use pipeline::{
    embed_bits, embed_message, extract_bits, extract_payload, verify_message, Verification,
};

/// Smallest block size accepted for embedding.
///
/// Sizes 2 and 3 cannot hold the default `(3, 3)` carrier coefficient, and
/// the margin table has no calibration below 4.
pub const MIN_BLOCK_SIZE: usize = 4;

/// Largest block size the 8-bit header can declare.
pub const MAX_BLOCK_SIZE: usize = 255;

/// Block size used when the caller has no preference.
pub const DEFAULT_BLOCK_SIZE: usize = 8;

/// Bits in the block-size header.
pub const HEADER_BITS: usize = 8;

/// Bits in the big-endian signature length field.
pub const LENGTH_FIELD_BITS: usize = 32;

/// Bits in the message terminator.
pub const TERMINATOR_BITS: usize = 32;
