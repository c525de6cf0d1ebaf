// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Single-channel sample storage.
//!
//! [`Plane`] holds one numeric plane of an image (the designated embedding
//! channel) or any plane derived from it (wavelet subbands, padded
//! subbands). Samples are `f64` in row-major order, index = row * width + col.

use crate::mark::error::WatermarkError;

/// One numeric plane in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    samples: Vec<f64>,
}

impl Plane {
    /// Create a plane filled with zeros.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            samples: vec![0.0; width * height],
        }
    }

    /// Create a plane filled with a single value.
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width * height],
        }
    }

    /// Wrap existing row-major samples.
    ///
    /// # Errors
    /// [`WatermarkError::InvalidShape`] if `samples.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, samples: Vec<f64>) -> Result<Self, WatermarkError> {
        if width.checked_mul(height) != Some(samples.len()) {
            return Err(WatermarkError::InvalidShape("sample count does not match width * height"));
        }
        Ok(Self { width, height, samples })
    }

    /// Build a plane by evaluating `f(row, col)` at every position.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                samples.push(f(r, c));
            }
        }
        Self { width, height, samples }
    }

    /// Wrap 8-bit grayscale samples.
    pub fn from_u8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, WatermarkError> {
        Self::from_vec(width, height, pixels.iter().map(|&p| p as f64).collect())
    }

    /// Extract channel `channel` from an interleaved buffer with `channels`
    /// samples per pixel (e.g. channel 0 of a BGR buffer).
    pub fn from_interleaved(
        width: usize,
        height: usize,
        channels: usize,
        channel: usize,
        data: &[u8],
    ) -> Result<Self, WatermarkError> {
        if channel >= channels {
            return Err(WatermarkError::InvalidShape("channel index out of range"));
        }
        if width.checked_mul(height).and_then(|n| n.checked_mul(channels)) != Some(data.len()) {
            return Err(WatermarkError::InvalidShape("buffer length does not match width * height * channels"));
        }
        let samples = data.chunks_exact(channels).map(|px| px[channel] as f64).collect();
        Ok(Self { width, height, samples })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.samples[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        let idx = self.index(row, col);
        self.samples[idx] = val;
    }

    /// Raw read-only access to all samples.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Raw mutable access to all samples.
    pub fn samples_mut(&mut self) -> &mut [f64] {
        &mut self.samples
    }

    /// Round and clamp every sample to 0..=255.
    pub fn to_u8(&self) -> Vec<u8> {
        self.samples.iter().map(|&v| to_u8_sample(v)).collect()
    }

    /// Write this plane back into channel `channel` of an interleaved buffer,
    /// rounding and clamping to 0..=255.
    pub fn write_interleaved(&self, channels: usize, channel: usize, data: &mut [u8]) -> Result<(), WatermarkError> {
        if channel >= channels {
            return Err(WatermarkError::InvalidShape("channel index out of range"));
        }
        if self.samples.len().checked_mul(channels) != Some(data.len()) {
            return Err(WatermarkError::InvalidShape("buffer length does not match width * height * channels"));
        }
        for (px, &v) in data.chunks_exact_mut(channels).zip(&self.samples) {
            px[channel] = to_u8_sample(v);
        }
        Ok(())
    }

    /// Largest absolute difference to `other`, or `None` if the shapes differ.
    pub fn max_abs_diff(&self, other: &Plane) -> Option<f64> {
        if self.dims() != other.dims() {
            return None;
        }
        Some(
            self.samples
                .iter()
                .zip(&other.samples)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max),
        )
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height, "row {row} >= {}", self.height);
        debug_assert!(col < self.width, "col {col} >= {}", self.width);
        row * self.width + col
    }
}

fn to_u8_sample(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set() {
        let mut p = Plane::new(3, 2);
        assert_eq!(p.dims(), (3, 2));
        assert_eq!(p.get(1, 2), 0.0);
        p.set(1, 2, 42.5);
        assert_eq!(p.get(1, 2), 42.5);
        assert_eq!(p.samples()[5], 42.5);
        assert_eq!(p.get(0, 2), 0.0);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        assert!(Plane::from_vec(4, 4, vec![0.0; 15]).is_err());
        assert!(Plane::from_vec(4, 4, vec![0.0; 16]).is_ok());
    }

    #[test]
    fn from_fn_is_row_major() {
        let p = Plane::from_fn(3, 2, |r, c| (r * 10 + c) as f64);
        assert_eq!(p.samples(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn to_u8_rounds_and_clamps() {
        let p = Plane::from_vec(4, 1, vec![-3.0, 12.4, 12.6, 300.0]).unwrap();
        assert_eq!(p.to_u8(), vec![0, 12, 13, 255]);
    }

    #[test]
    fn interleaved_roundtrip_touches_one_channel() {
        // 2x1 BGR image.
        let mut bgr = vec![10u8, 20, 30, 40, 50, 60];
        let blue = Plane::from_interleaved(2, 1, 3, 0, &bgr).unwrap();
        assert_eq!(blue.samples(), &[10.0, 40.0]);

        let edited = Plane::from_vec(2, 1, vec![11.0, 41.0]).unwrap();
        edited.write_interleaved(3, 0, &mut bgr).unwrap();
        assert_eq!(bgr, vec![11, 20, 30, 41, 50, 60]);
    }

    #[test]
    fn interleaved_shape_errors() {
        let data = vec![0u8; 12];
        assert!(Plane::from_interleaved(2, 2, 3, 3, &data).is_err());
        assert!(Plane::from_interleaved(2, 3, 3, 0, &data).is_err());
        assert!(Plane::from_interleaved(2, 2, 3, 2, &data).is_ok());
    }
}
