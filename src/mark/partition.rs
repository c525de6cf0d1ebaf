// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Subband padding and block tiling.
//!
//! A subband is conceptually padded at the bottom and right edge by
//! symmetric reflection until both dimensions are multiples of the block
//! size, then cut into `block_size × block_size` tiles in row-major order.
//! Block `i` sits at block row `i / blocks_wide`, block column
//! `i % blocks_wide`; this is also the order in which payload bits are
//! written and read.
//!
//! [`merge_and_crop`] places the tiles back and drops the padding, so
//! `merge_and_crop(pad_and_split(x, n), n, dims(x)) == x` for every `n ≥ 1`.

use crate::plane::Plane;
use crate::transform::symmetric_index;
use super::error::WatermarkError;

/// One `size × size` tile of a padded subband, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    size: usize,
    samples: Vec<f64>,
}

impl Block {
    /// Wrap `size * size` row-major samples.
    ///
    /// # Errors
    /// [`WatermarkError::InvalidShape`] if the sample count is wrong.
    pub fn from_vec(size: usize, samples: Vec<f64>) -> Result<Self, WatermarkError> {
        if size.checked_mul(size) != Some(samples.len()) {
            return Err(WatermarkError::InvalidShape("block sample count does not match size * size"));
        }
        Ok(Self { size, samples })
    }

    /// Wrap samples whose length is already known to be `size * size`.
    pub(crate) fn from_parts(size: usize, samples: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), size * size);
        Self { size, samples }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

/// Block grid `(blocks_wide, blocks_tall)` for a subband of the given size.
/// A zero block size has no grid.
pub fn block_grid(width: usize, height: usize, block_size: usize) -> (usize, usize) {
    if block_size == 0 {
        return (0, 0);
    }
    (width.div_ceil(block_size), height.div_ceil(block_size))
}

/// Number of blocks in the padded subband.
pub fn block_count(width: usize, height: usize, block_size: usize) -> usize {
    let (bw, bt) = block_grid(width, height, block_size);
    bw * bt
}

/// Read block `index` of the (virtually) padded subband without
/// materializing the padding.
///
/// Reflection is applied per sample, so this returns exactly the tile
/// [`pad_and_split`] would produce at the same index. Used by the detector,
/// which only needs the first few blocks at each candidate size.
///
/// Callers check what [`pad_and_split`] checks: non-zero `block_size`, a
/// non-empty subband and `index` inside the grid.
pub(crate) fn block_at(subband: &Plane, block_size: usize, index: usize) -> Block {
    let (w, h) = subband.dims();
    let (bw, _) = block_grid(w, h, block_size);
    let r0 = (index / bw) * block_size;
    let c0 = (index % bw) * block_size;

    let mut samples = Vec::with_capacity(block_size * block_size);
    for dr in 0..block_size {
        let r = symmetric_index(r0 + dr, h);
        for dc in 0..block_size {
            let c = symmetric_index(c0 + dc, w);
            samples.push(subband.get(r, c));
        }
    }
    Block { size: block_size, samples }
}

/// Pad `subband` to a multiple of `block_size` and split it into tiles in
/// row-major order.
///
/// # Errors
/// [`WatermarkError::InvalidShape`] if `block_size` is zero or the subband
/// is empty.
pub fn pad_and_split(subband: &Plane, block_size: usize) -> Result<Vec<Block>, WatermarkError> {
    let (w, h) = subband.dims();
    if block_size == 0 {
        return Err(WatermarkError::InvalidShape("block size must be non-zero"));
    }
    if w == 0 || h == 0 {
        return Err(WatermarkError::InvalidShape("subband has a zero dimension"));
    }
    let count = block_count(w, h, block_size);
    Ok((0..count).map(|i| block_at(subband, block_size, i)).collect())
}

/// Reassemble tiles produced by [`pad_and_split`] and crop the padding so
/// the result has `original_dims` (`(width, height)`).
///
/// # Errors
/// [`WatermarkError::InvalidShape`] if the block count or any block's size
/// does not match the grid implied by `original_dims` and `block_size`.
pub fn merge_and_crop(
    blocks: &[Block],
    block_size: usize,
    original_dims: (usize, usize),
) -> Result<Plane, WatermarkError> {
    let (w, h) = original_dims;
    if block_size == 0 || w == 0 || h == 0 {
        return Err(WatermarkError::InvalidShape("block size and dimensions must be non-zero"));
    }
    let (bw, bt) = block_grid(w, h, block_size);
    if blocks.len() != bw * bt {
        return Err(WatermarkError::InvalidShape("block count does not match padded grid"));
    }

    let mut out = Plane::new(w, h);
    for (i, block) in blocks.iter().enumerate() {
        if block.size != block_size {
            return Err(WatermarkError::InvalidShape("block has the wrong size"));
        }
        let r0 = (i / bw) * block_size;
        let c0 = (i % bw) * block_size;
        let rows = block_size.min(h - r0);
        let cols = block_size.min(w - c0);
        for dr in 0..rows {
            for dc in 0..cols {
                out.set(r0 + dr, c0 + dc, block.samples[dr * block_size + dc]);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> Plane {
        Plane::from_fn(w, h, |r, c| (r * 100 + c) as f64)
    }

    #[test]
    fn grid_rounds_up() {
        assert_eq!(block_grid(960, 544, 8), (120, 68));
        assert_eq!(block_count(960, 544, 8), 8160);
        assert_eq!(block_grid(10, 7, 4), (3, 2));
        assert_eq!(block_grid(12, 8, 4), (3, 2));
    }

    #[test]
    fn zero_block_size_has_no_grid() {
        assert_eq!(block_grid(10, 7, 0), (0, 0));
        assert_eq!(block_count(10, 7, 0), 0);
        assert_eq!(block_count(0, 7, 4), 0);
    }

    #[test]
    fn exact_fit_has_no_padding() {
        let sub = ramp(8, 4);
        let blocks = pad_and_split(&sub, 4).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].samples()[0], 4.0);
        assert_eq!(blocks[1].samples()[15], 307.0);
    }

    #[test]
    fn padding_reflects_trailing_edges() {
        // 3 wide, block 4: column 3 mirrors column 2.
        let sub = ramp(3, 3);
        let blocks = pad_and_split(&sub, 4).unwrap();
        assert_eq!(blocks.len(), 1);
        let b = blocks[0].samples();
        assert_eq!(b[3], 2.0); // row 0, col 3 ← col 2
        assert_eq!(b[3 * 4], 200.0); // row 3 ← row 2
        assert_eq!(b[3 * 4 + 3], 202.0);
    }

    #[test]
    fn padding_wider_than_plane_keeps_reflecting() {
        let sub = ramp(1, 2);
        let blocks = pad_and_split(&sub, 5).unwrap();
        let b = blocks[0].samples();
        // Rows: 0 1 | 1 0 | 0
        let col0: Vec<f64> = (0..5).map(|r| b[r * 5]).collect();
        assert_eq!(col0, vec![0.0, 100.0, 100.0, 0.0, 0.0]);
    }

    #[test]
    fn merge_restores_original() {
        let sub = ramp(11, 7);
        for bs in 1..=12 {
            let blocks = pad_and_split(&sub, bs).unwrap();
            let back = merge_and_crop(&blocks, bs, sub.dims()).unwrap();
            assert_eq!(back, sub, "block size {bs}");
        }
    }

    #[test]
    fn block_at_matches_split() {
        let sub = ramp(10, 9);
        let blocks = pad_and_split(&sub, 4).unwrap();
        for (i, b) in blocks.iter().enumerate() {
            assert_eq!(&block_at(&sub, 4, i), b);
        }
    }

    #[test]
    fn merge_rejects_wrong_count() {
        let sub = ramp(8, 8);
        let mut blocks = pad_and_split(&sub, 4).unwrap();
        blocks.pop();
        assert!(merge_and_crop(&blocks, 4, (8, 8)).is_err());
    }

    #[test]
    fn zero_block_size_rejected() {
        assert!(pad_and_split(&ramp(4, 4), 0).is_err());
        assert!(Block::from_vec(3, vec![0.0; 8]).is_err());
    }
}
