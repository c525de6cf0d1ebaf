// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! One-level 2D Haar wavelet transform.
//!
//! Splits a channel into the approximation subband (LL) and three detail
//! subbands (horizontal, vertical, diagonal), each of size
//! `ceil(h/2) × ceil(w/2)`. Odd dimensions are extended by one symmetric
//! sample before the transform; [`inverse`] crops that sample again, so
//! `inverse(forward(x)) == x` up to floating-point rounding for any shape.
//!
//! Orthonormal scaling is used (each 2×2 butterfly divides by 2), which keeps
//! the approximation subband at twice the local mean of the channel.

use crate::mark::error::WatermarkError;
use crate::plane::Plane;
use super::symmetric_index;

/// Output of [`forward`]: approximation plus untouched detail subbands.
///
/// The details and the original channel dimensions must be handed back to
/// [`inverse`] unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct HaarDecomposition {
    /// Approximation (LL) subband, the only plane the codec modifies.
    pub approx: Plane,
    /// Row-difference detail subband.
    pub horizontal: Plane,
    /// Column-difference detail subband.
    pub vertical: Plane,
    /// Diagonal detail subband.
    pub diagonal: Plane,
    /// Width of the channel this decomposition came from.
    pub width: usize,
    /// Height of the channel this decomposition came from.
    pub height: usize,
}

/// Subband dimensions `(width, height)` for a channel of the given size.
pub fn subband_dims(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(2), height.div_ceil(2))
}

/// Forward one-level Haar transform.
///
/// # Errors
/// [`WatermarkError::InvalidShape`] if the channel is empty.
pub fn forward(channel: &Plane) -> Result<HaarDecomposition, WatermarkError> {
    let (w, h) = channel.dims();
    if w == 0 || h == 0 {
        return Err(WatermarkError::InvalidShape("channel has a zero dimension"));
    }
    let (sw, sh) = subband_dims(w, h);

    let mut approx = Plane::new(sw, sh);
    let mut horizontal = Plane::new(sw, sh);
    let mut vertical = Plane::new(sw, sh);
    let mut diagonal = Plane::new(sw, sh);

    for r in 0..sh {
        let r0 = 2 * r;
        let r1 = symmetric_index(2 * r + 1, h);
        for c in 0..sw {
            let c0 = 2 * c;
            let c1 = symmetric_index(2 * c + 1, w);
            let a = channel.get(r0, c0);
            let b = channel.get(r0, c1);
            let d = channel.get(r1, c0);
            let e = channel.get(r1, c1);

            approx.set(r, c, (a + b + d + e) * 0.5);
            horizontal.set(r, c, (a + b - d - e) * 0.5);
            vertical.set(r, c, (a - b + d - e) * 0.5);
            diagonal.set(r, c, (a - b - d + e) * 0.5);
        }
    }

    Ok(HaarDecomposition { approx, horizontal, vertical, diagonal, width: w, height: h })
}

/// Inverse one-level Haar transform, cropped to the original channel size.
///
/// # Errors
/// [`WatermarkError::InvalidShape`] if any subband does not have the
/// dimensions implied by `width`/`height`.
pub fn inverse(dec: &HaarDecomposition) -> Result<Plane, WatermarkError> {
    let (w, h) = (dec.width, dec.height);
    if w == 0 || h == 0 {
        return Err(WatermarkError::InvalidShape("channel has a zero dimension"));
    }
    let expected = subband_dims(w, h);
    for band in [&dec.approx, &dec.horizontal, &dec.vertical, &dec.diagonal] {
        if band.dims() != expected {
            return Err(WatermarkError::InvalidShape("subband dimensions do not match channel"));
        }
    }

    let (sw, sh) = expected;
    let mut out = Plane::new(w, h);
    for r in 0..sh {
        for c in 0..sw {
            let ll = dec.approx.get(r, c);
            let hd = dec.horizontal.get(r, c);
            let vd = dec.vertical.get(r, c);
            let dd = dec.diagonal.get(r, c);

            let quad = [
                (ll + hd + vd + dd) * 0.5,
                (ll + hd - vd - dd) * 0.5,
                (ll - hd + vd - dd) * 0.5,
                (ll - hd - vd + dd) * 0.5,
            ];
            for (k, &v) in quad.iter().enumerate() {
                let row = 2 * r + k / 2;
                let col = 2 * c + k % 2;
                // Samples beyond an odd edge were reflected in; drop them.
                if row < h && col < w {
                    out.set(row, col, v);
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(w: usize, h: usize) -> Plane {
        Plane::from_fn(w, h, |r, c| ((r * 31 + c * 17 + r * c * 7) % 96) as f64 + 80.0)
    }

    #[test]
    fn even_roundtrip() {
        let ch = textured(16, 10);
        let dec = forward(&ch).unwrap();
        assert_eq!(dec.approx.dims(), (8, 5));
        let back = inverse(&dec).unwrap();
        assert!(back.max_abs_diff(&ch).unwrap() < 1e-9);
    }

    #[test]
    fn odd_roundtrip() {
        let ch = textured(17, 9);
        let dec = forward(&ch).unwrap();
        assert_eq!(dec.approx.dims(), (9, 5));
        let back = inverse(&dec).unwrap();
        assert_eq!(back.dims(), (17, 9));
        assert!(back.max_abs_diff(&ch).unwrap() < 1e-9);
    }

    #[test]
    fn approx_is_twice_local_mean() {
        let ch = Plane::from_vec(2, 2, vec![10.0, 20.0, 30.0, 40.0]).unwrap();
        let dec = forward(&ch).unwrap();
        assert_eq!(dec.approx.get(0, 0), 50.0);
        assert_eq!(dec.horizontal.get(0, 0), -20.0);
        assert_eq!(dec.vertical.get(0, 0), -10.0);
        assert_eq!(dec.diagonal.get(0, 0), 0.0);
    }

    #[test]
    fn constant_channel_has_zero_details() {
        let ch = Plane::filled(7, 5, 100.0);
        let dec = forward(&ch).unwrap();
        assert!(dec.approx.samples().iter().all(|&v| v == 200.0));
        for band in [&dec.horizontal, &dec.vertical, &dec.diagonal] {
            assert!(band.samples().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn empty_channel_rejected() {
        let ch = Plane::new(0, 4);
        assert!(matches!(forward(&ch), Err(WatermarkError::InvalidShape(_))));
    }

    #[test]
    fn mismatched_subband_rejected() {
        let ch = textured(8, 8);
        let mut dec = forward(&ch).unwrap();
        dec.approx = Plane::new(3, 4);
        assert!(matches!(inverse(&dec), Err(WatermarkError::InvalidShape(_))));
    }

    #[test]
    fn approx_edit_only_changes_its_quad() {
        let ch = textured(8, 8);
        let mut dec = forward(&ch).unwrap();
        let v = dec.approx.get(1, 2);
        dec.approx.set(1, 2, v + 4.0);
        let back = inverse(&dec).unwrap();
        for r in 0..8 {
            for c in 0..8 {
                let delta = back.get(r, c) - ch.get(r, c);
                if r / 2 == 1 && c / 2 == 2 {
                    assert!((delta - 2.0).abs() < 1e-9);
                } else {
                    assert!(delta.abs() < 1e-9);
                }
            }
        }
    }
}
