// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! N×N orthonormal 2D DCT (type II forward, type III inverse).
//!
//! Same scaling as `cv2.dct` / `scipy.fft.dctn(norm="ortho")`:
//! `F[u][v] = c(u) c(v) Σx Σy f[x][y] cos((2x+1)uπ/2N) cos((2y+1)vπ/2N)`
//! with `c(0) = √(1/N)` and `c(k>0) = √(2/N)`. The basis is orthogonal, so
//! `inverse(forward(b)) == b` up to rounding and energy is preserved.

use std::f64::consts::PI;

/// Precomputed scaled cosine basis for one block size.
///
/// `basis[u * n + x] = c(u) · cos((2x+1)uπ / 2n)`. Building it once per
/// block size avoids recomputing `n²` cosines for every block.
#[derive(Debug, Clone)]
pub struct DctPlan {
    n: usize,
    basis: Vec<f64>,
}

impl DctPlan {
    /// Build the plan for `n × n` blocks. `n` must be non-zero.
    pub fn new(n: usize) -> Self {
        debug_assert!(n > 0);
        let scale0 = (1.0 / n as f64).sqrt();
        let scale = (2.0 / n as f64).sqrt();
        let mut basis = vec![0.0; n * n];
        for u in 0..n {
            let cu = if u == 0 { scale0 } else { scale };
            for x in 0..n {
                basis[u * n + x] = cu * ((2 * x + 1) as f64 * u as f64 * PI / (2 * n) as f64).cos();
            }
        }
        Self { n, basis }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Scaled basis vector `u`: `c(u) · cos((2x+1)uπ / 2n)` for `x in 0..n`.
    pub fn basis_row(&self, u: usize) -> &[f64] {
        &self.basis[u * self.n..(u + 1) * self.n]
    }

    /// Forward 2D DCT of a row-major `n × n` block.
    pub fn forward(&self, block: &[f64]) -> Vec<f64> {
        debug_assert_eq!(block.len(), self.n * self.n);
        let n = self.n;

        // Rows: temp[r][v] = Σc block[r][c] · B[v][c]
        let mut temp = vec![0.0; n * n];
        for r in 0..n {
            for v in 0..n {
                let mut sum = 0.0;
                for c in 0..n {
                    sum += block[r * n + c] * self.basis[v * n + c];
                }
                temp[r * n + v] = sum;
            }
        }

        // Columns: out[u][v] = Σr B[u][r] · temp[r][v]
        let mut out = vec![0.0; n * n];
        for u in 0..n {
            for v in 0..n {
                let mut sum = 0.0;
                for r in 0..n {
                    sum += self.basis[u * n + r] * temp[r * n + v];
                }
                out[u * n + v] = sum;
            }
        }
        out
    }

    /// Inverse 2D DCT of a row-major `n × n` coefficient block.
    pub fn inverse(&self, coeffs: &[f64]) -> Vec<f64> {
        debug_assert_eq!(coeffs.len(), self.n * self.n);
        let n = self.n;

        // Columns: temp[r][v] = Σu B[u][r] · coeffs[u][v]
        let mut temp = vec![0.0; n * n];
        for r in 0..n {
            for v in 0..n {
                let mut sum = 0.0;
                for u in 0..n {
                    sum += self.basis[u * n + r] * coeffs[u * n + v];
                }
                temp[r * n + v] = sum;
            }
        }

        // Rows: out[r][c] = Σv temp[r][v] · B[v][c]
        let mut out = vec![0.0; n * n];
        for r in 0..n {
            for c in 0..n {
                let mut sum = 0.0;
                for v in 0..n {
                    sum += temp[r * n + v] * self.basis[v * n + c];
                }
                out[r * n + c] = sum;
            }
        }
        out
    }

    /// Single coefficient `(u, v)` of the forward transform, without
    /// computing the rest of the block.
    pub fn coefficient(&self, block: &[f64], u: usize, v: usize) -> f64 {
        debug_assert_eq!(block.len(), self.n * self.n);
        let n = self.n;
        let mut sum = 0.0;
        for r in 0..n {
            let mut row = 0.0;
            for c in 0..n {
                row += block[r * n + c] * self.basis[v * n + c];
            }
            sum += self.basis[u * n + r] * row;
        }
        sum
    }
}
