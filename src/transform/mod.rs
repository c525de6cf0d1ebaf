// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Linear transforms used by the watermark codec.
//!
//! - [`haar`]: one-level 2D Haar wavelet (channel ↔ four subbands).
//! - [`dct`]: N×N orthonormal 2D DCT for per-block modulation.
//!
//! Both are zero-dependency and deterministic.

pub mod dct;
pub mod haar;

/// Map an out-of-range index onto `0..len` by symmetric (half-sample)
/// reflection: `… x1 x0 | x0 x1 … xn-1 | xn-1 xn-2 …`.
///
/// Works for arbitrarily large `i` (reflection repeats with period
/// `2 * len`). `len` must be non-zero.
#[inline]
pub fn symmetric_index(i: usize, len: usize) -> usize {
    debug_assert!(len > 0);
    let m = i % (2 * len);
    if m < len { m } else { 2 * len - 1 - m }
}
