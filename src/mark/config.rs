// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Codec tunables.
//!
//! Every embed/extract call takes a [`WatermarkConfig`] so an alternate
//! calibration (coefficient, magnitude, margin table) can be swapped in
//! without touching the algorithm. Encoder and decoder must use the same
//! configuration.

use super::error::WatermarkError;
use super::reliability::ReliabilityTable;
use super::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};

/// Tunable parameters shared by embedding, extraction and detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WatermarkConfig {
    /// Frequency position `(row, col)` inside each block whose sign carries
    /// one bit.
    pub coefficient: (usize, usize),
    /// Absolute value written into the carrier coefficient.
    pub magnitude: f64,
    /// Byte pattern that ends the message field.
    pub terminator: [u8; 4],
    /// Block-size → margin calibration.
    pub reliability: ReliabilityTable,
    /// Smallest block size tried by auto-detection.
    pub probe_min: usize,
    /// Largest block size tried by auto-detection.
    pub probe_max: usize,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            coefficient: (3, 3),
            magnitude: 150.0,
            terminator: [0; 4],
            reliability: ReliabilityTable::default(),
            probe_min: 2,
            probe_max: 64,
        }
    }
}

impl WatermarkConfig {
    /// `true` if a `block_size × block_size` block contains the carrier
    /// coefficient.
    pub fn holds_coefficient(&self, block_size: usize) -> bool {
        self.coefficient.0 < block_size && self.coefficient.1 < block_size
    }

    /// Check that `block_size` can carry a full payload.
    ///
    /// # Errors
    /// [`WatermarkError::UnsupportedBlockSize`] if the size is below
    /// [`MIN_BLOCK_SIZE`], above [`MAX_BLOCK_SIZE`] (the 8-bit header limit),
    /// or too small for the configured coefficient.
    pub fn validate_block_size(&self, block_size: usize) -> Result<(), WatermarkError> {
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) || !self.holds_coefficient(block_size) {
            return Err(WatermarkError::UnsupportedBlockSize(block_size));
        }
        Ok(())
    }

    /// Margin bytes reserved for `block_size`.
    pub fn margin_bytes(&self, block_size: usize) -> usize {
        self.reliability.margin_bytes(block_size)
    }
}
