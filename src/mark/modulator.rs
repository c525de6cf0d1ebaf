// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Single-bit modulation of one DCT coefficient per block.
//!
//! Embedding forces the carrier coefficient to `+M` (bit 1) or `-M` (bit 0)
//! and inverts the transform; extraction reads the coefficient's sign
//! (`>= 0` → 1). The inverse transform spreads the change over every sample
//! of the block, which is why rounding elsewhere in the chain can flip a bit
//! (see [`super::reliability`]).

use crate::transform::dct::DctPlan;
use super::config::WatermarkConfig;
use super::partition::Block;

/// Return a new block carrying `bit` in the configured coefficient.
///
/// `plan` must be built for `block.size()`, and the block must hold the
/// coefficient (checked by [`WatermarkConfig::validate_block_size`]).
pub fn embed_bit(block: &Block, bit: u8, plan: &DctPlan, config: &WatermarkConfig) -> Block {
    let n = block.size();
    debug_assert_eq!(plan.size(), n);
    let (u, v) = config.coefficient;

    let mut coeffs = plan.forward(block.samples());
    coeffs[u * n + v] = if bit & 1 == 1 { config.magnitude } else { -config.magnitude };
    Block::from_parts(n, plan.inverse(&coeffs))
}

/// Read the bit carried by `block`.
pub fn extract_bit(block: &Block, plan: &DctPlan, config: &WatermarkConfig) -> u8 {
    debug_assert_eq!(plan.size(), block.size());
    let (u, v) = config.coefficient;
    u8::from(plan.coefficient(block.samples(), u, v) >= 0.0)
}
