// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Embedding capacity.
//!
//! One payload bit per block of the padded approximation subband, so the
//! capacity follows directly from the image dimensions and the same Haar +
//! partition rules used by the embedder:
//!
//! ```text
//! subband  = ceil(w/2) × ceil(h/2)
//! capacity = ceil(sub_w / n) × ceil(sub_h / n)   bits
//! ```
//!
//! Usable message space subtracts the framing overhead (header, length
//! field, signature, terminator, reliability margin). Fitting is not quite
//! enough: for some remainders an edge block cannot carry a bit, so
//! [`CapacityRecord::embeddable`] also checks every block the payload
//! reaches.

use crate::transform::dct::DctPlan;
use crate::transform::haar::subband_dims;
use super::config::WatermarkConfig;
use super::edge::{plan_edge_writes, EdgeGrid};
use super::partition::block_count;
use super::payload::{framing_overhead_bytes, payload_bits};

/// Derived capacity of one image at one block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacityRecord {
    /// Number of blocks, i.e. embeddable bits.
    pub capacity_bits: usize,
    /// `capacity_bits / 8`, rounded down.
    pub capacity_bytes: usize,
    pub block_size: usize,
    pub width: usize,
    pub height: usize,
}

impl CapacityRecord {
    /// Capacity of a `width × height` channel at `block_size` (must be > 0).
    pub fn new(width: usize, height: usize, block_size: usize) -> Self {
        let capacity_bits = capacity_bits(width, height, block_size);
        Self {
            capacity_bits,
            capacity_bytes: capacity_bits / 8,
            block_size,
            width,
            height,
        }
    }

    /// Message bytes left after framing a `signature_len`-byte signature,
    /// or 0 if the overhead alone does not fit.
    pub fn message_capacity_bytes(&self, signature_len: usize, config: &WatermarkConfig) -> usize {
        self.capacity_bytes
            .saturating_sub(framing_overhead_bytes(self.block_size, config) + signature_len)
    }

    /// Bits required for the given payload sizes at this block size.
    pub fn required_bits(&self, signature_len: usize, message_len: usize, config: &WatermarkConfig) -> usize {
        payload_bits(signature_len, message_len, self.block_size, config)
    }

    /// `true` if a payload of the given sizes fits.
    pub fn fits(&self, signature_len: usize, message_len: usize, config: &WatermarkConfig) -> bool {
        self.required_bits(signature_len, message_len, config) <= self.capacity_bits
    }

    /// `true` if a payload of the given sizes fits and every block it lands
    /// on can carry a bit, i.e. [`crate::embed_message`] will not fail on
    /// size or geometry.
    pub fn embeddable(&self, signature_len: usize, message_len: usize, config: &WatermarkConfig) -> bool {
        if config.validate_block_size(self.block_size).is_err()
            || !self.fits(signature_len, message_len, config)
            || self.width == 0
            || self.height == 0
        {
            return false;
        }
        let (sw, sh) = subband_dims(self.width, self.height);
        let grid = EdgeGrid::new(sw, sh, self.block_size);
        let bits = self.required_bits(signature_len, message_len, config);
        plan_edge_writes(&grid, bits, &DctPlan::new(self.block_size), config).is_ok()
    }
}

/// Number of blocks (one bit each) for a `width × height` channel.
/// Returns 0 for an empty channel or a zero block size.
pub fn capacity_bits(width: usize, height: usize, block_size: usize) -> usize {
    if width == 0 || height == 0 || block_size == 0 {
        return 0;
    }
    let (sw, sh) = subband_dims(width, height);
    block_count(sw, sh, block_size)
}

/// Pick a block size for a payload of the given sizes.
///
/// Prefers the largest `Safe` size that is [embeddable](CapacityRecord::embeddable)
/// (larger blocks spread the same coefficient change over more samples),
/// then the largest `Warning` size. Returns `None` if no calibrated size
/// works; `Danger` sizes are never recommended.
pub fn recommend_block_size(
    width: usize,
    height: usize,
    signature_len: usize,
    message_len: usize,
    config: &WatermarkConfig,
) -> Option<usize> {
    let table = &config.reliability;
    [&table.safe, &table.warning].into_iter().find_map(|sizes| {
        sizes
            .iter()
            .copied()
            .filter(|&bs| {
                CapacityRecord::new(width, height, bs).embeddable(signature_len, message_len, config)
            })
            .max()
    })
}
