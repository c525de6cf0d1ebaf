// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Carrier writes for blocks that overhang the subband.
//!
//! A block on the trailing edge is read back through symmetric reflection,
//! so its carrier coefficient is a folded linear functional of in-bounds
//! samples, and some of those samples belong to the neighbouring block.
//! Writing the block into the padded tile and cropping loses the padding
//! half of the change, which flips bits.
//!
//! Instead, each edge block is written directly on the cropped subband:
//! the read functional is projected away from the reads of every neighbour
//! that already carries a bit, and the sample change runs along what is
//! left. Neighbour bits are unchanged and the edge read lands exactly on
//! `±M`. If nothing is left after the projection the block cannot carry a
//! bit at that block size, which happens when the reflection mirrors an
//! odd carrier basis onto itself (for example a remainder of `n / 2`).

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::transform::dct::DctPlan;
use crate::transform::symmetric_index;
use super::config::WatermarkConfig;
use super::error::WatermarkError;
use super::partition::block_grid;

/// Squared gain below which an edge block cannot move its own read.
const DEGENERATE_GAIN: f64 = 1e-9;

/// Neighbour reads with less weight than this inside a block's support do
/// not constrain it.
const CONSTRAINT_EPS: f64 = 1e-9;

/// Folded weights below this are treated as exact cancellations.
const WEIGHT_EPS: f64 = 1e-12;

/// Block layout of one subband at one block size.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeGrid {
    width: usize,
    height: usize,
    block_size: usize,
    cols: usize,
    rows: usize,
}

impl EdgeGrid {
    /// `width`, `height` and `block_size` must be non-zero.
    pub(crate) fn new(width: usize, height: usize, block_size: usize) -> Self {
        let (cols, rows) = block_grid(width, height, block_size);
        Self { width, height, block_size, cols, rows }
    }

    /// `true` if block `index` reaches into the reflected padding.
    pub(crate) fn overhangs(&self, index: usize) -> bool {
        let n = self.block_size;
        (index % self.cols == self.cols - 1 && self.width % n != 0)
            || (index / self.cols == self.rows - 1 && self.height % n != 0)
    }

    /// Carrier read of block `index` as weights over flat subband offsets.
    fn read(&self, index: usize, plan: &DctPlan, (u, v): (usize, usize)) -> Functional {
        let n = self.block_size;
        let r0 = (index / self.cols) * n;
        let c0 = (index % self.cols) * n;
        let (row_basis, col_basis) = (plan.basis_row(u), plan.basis_row(v));

        let mut taps = Vec::with_capacity(n * n);
        for (dr, &wr) in row_basis.iter().enumerate() {
            let r = symmetric_index(r0 + dr, self.height);
            for (dc, &wc) in col_basis.iter().enumerate() {
                let c = symmetric_index(c0 + dc, self.width);
                taps.push((r * self.width + c, wr * wc));
            }
        }
        Functional::from_taps(taps)
    }

    /// Blocks in the 3×3 neighbourhood of `index`, excluding `index`.
    ///
    /// Reflection never reaches further than one block, so these are the
    /// only blocks whose reads can share samples with `index`.
    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (br, bc) = (index / self.cols, index % self.cols);
        let rows = br.saturating_sub(1)..=(br + 1).min(self.rows - 1);
        rows.flat_map(move |r| {
            let cols = bc.saturating_sub(1)..=(bc + 1).min(self.cols - 1);
            cols.map(move |c| r * self.cols + c)
        })
        .filter(move |&j| j != index)
    }
}

/// Sparse linear functional over a flattened subband.
#[derive(Debug, Clone, PartialEq)]
struct Functional {
    /// Ascending, unique.
    offsets: Vec<usize>,
    weights: Vec<f64>,
}

impl Functional {
    /// Sum duplicate offsets and drop weights that cancel.
    fn from_taps(mut taps: Vec<(usize, f64)>) -> Self {
        taps.sort_unstable_by_key(|&(offset, _)| offset);
        let mut offsets: Vec<usize> = Vec::with_capacity(taps.len());
        let mut weights: Vec<f64> = Vec::with_capacity(taps.len());
        for (offset, w) in taps {
            match offsets.last() {
                Some(&last) if last == offset => {
                    if let Some(acc) = weights.last_mut() {
                        *acc += w;
                    }
                }
                _ => {
                    offsets.push(offset);
                    weights.push(w);
                }
            }
        }

        let (offsets, weights): (Vec<usize>, Vec<f64>) = offsets
            .into_iter()
            .zip(weights)
            .filter(|&(_, w)| w.abs() > WEIGHT_EPS)
            .unzip();
        Self { offsets, weights }
    }

    fn apply(&self, samples: &[f64]) -> f64 {
        self.offsets.iter().zip(&self.weights).map(|(&o, &w)| samples[o] * w).sum()
    }

    /// This functional's weights at each of `support`'s offsets (0 where absent).
    fn restricted_to(&self, support: &Functional) -> Vec<f64> {
        let mut out = vec![0.0; support.offsets.len()];
        let mut j = 0;
        for (i, &offset) in support.offsets.iter().enumerate() {
            while j < self.offsets.len() && self.offsets[j] < offset {
                j += 1;
            }
            if j < self.offsets.len() && self.offsets[j] == offset {
                out[i] = self.weights[j];
            }
        }
        out
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sub_scaled(a: &mut [f64], k: f64, b: &[f64]) {
    a.iter_mut().zip(b).for_each(|(x, y)| *x -= k * y);
}

/// Precomputed write for one overhanging block.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EdgeWrite {
    index: usize,
    read: Functional,
    /// Sample change per unit of read change, aligned with `read.offsets`.
    step: Vec<f64>,
}

impl EdgeWrite {
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Move this block's carrier read to `±config.magnitude` for `bit`.
    pub(crate) fn apply(&self, samples: &mut [f64], bit: u8, config: &WatermarkConfig) {
        let target = if bit & 1 == 1 { config.magnitude } else { -config.magnitude };
        let delta = target - self.read.apply(samples);
        for (&offset, &s) in self.read.offsets.iter().zip(&self.step) {
            samples[offset] += delta * s;
        }
    }
}

/// Plan the writes for every overhanging block among the first `count`.
///
/// Plans depend only on geometry, so this runs before any sample is
/// touched. Interior blocks are assumed to be written first, then edge
/// blocks in ascending index order.
///
/// # Errors
/// [`WatermarkError::DegenerateBlock`] for the lowest-indexed block whose
/// read cannot be moved without disturbing a written neighbour.
pub(crate) fn plan_edge_writes(
    grid: &EdgeGrid,
    count: usize,
    plan: &DctPlan,
    config: &WatermarkConfig,
) -> Result<Vec<EdgeWrite>, WatermarkError> {
    let edges: Vec<usize> = (0..count).filter(|&i| grid.overhangs(i)).collect();
    let plan_one = |index: usize| plan_edge_write(grid, index, count, plan, config);

    #[cfg(feature = "parallel")]
    let planned: Vec<_> = edges.into_par_iter().map(plan_one).collect();
    #[cfg(not(feature = "parallel"))]
    let planned: Vec<_> = edges.into_iter().map(plan_one).collect();

    planned.into_iter().collect()
}

fn plan_edge_write(
    grid: &EdgeGrid,
    index: usize,
    count: usize,
    plan: &DctPlan,
    config: &WatermarkConfig,
) -> Result<EdgeWrite, WatermarkError> {
    let read = grid.read(index, plan, config.coefficient);
    let written_before = |j: usize| j < count && (!grid.overhangs(j) || j < index);

    // Orthonormal basis of the neighbour reads, seen through this block's support.
    let mut fixed: Vec<Vec<f64>> = Vec::new();
    for j in grid.neighbours(index).filter(|&j| written_before(j)) {
        let mut g = grid.read(j, plan, config.coefficient).restricted_to(&read);
        for q in &fixed {
            let p = dot(&g, q);
            sub_scaled(&mut g, p, q);
        }
        let norm = dot(&g, &g).sqrt();
        if norm > CONSTRAINT_EPS {
            g.iter_mut().for_each(|x| *x /= norm);
            fixed.push(g);
        }
    }

    let mut step = read.weights.clone();
    for q in &fixed {
        let p = dot(&step, q);
        sub_scaled(&mut step, p, q);
    }
    let gain = dot(&step, &step);
    if gain < DEGENERATE_GAIN {
        return Err(WatermarkError::DegenerateBlock { index, block_size: grid.block_size });
    }
    step.iter_mut().for_each(|x| *x /= gain);
    Ok(EdgeWrite { index, read, step })
}
