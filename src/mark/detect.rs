// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Block-size auto-detection.
//!
//! The first eight payload bits encode the block size used at embed time.
//! Reading those bits back with the right block size therefore yields that
//! same number, while a wrong size reads an unrelated byte. The detector
//! tries candidate sizes in ascending order and accepts the first one whose
//! header decodes to itself.
//!
//! Collisions (a wrong, smaller size that happens to read its own value) are
//! not ruled out; the ascending scan makes the outcome deterministic and the
//! lowest matching size wins.

use tracing::{debug, trace};

use crate::plane::Plane;
use crate::transform::dct::DctPlan;
use crate::transform::haar;
use super::config::WatermarkConfig;
use super::error::WatermarkError;
use super::modulator::extract_bit;
use super::partition::{block_at, block_count};
use super::payload::decode_header;
use super::{HEADER_BITS, MAX_BLOCK_SIZE};

/// Result of probing one candidate block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The header decoded to the candidate size.
    Match,
    /// The header decoded to a different value.
    Mismatch(u8),
    /// The subband has fewer than eight blocks at this size.
    TooFewBlocks,
    /// The size cannot carry a payload under the current configuration.
    Unsupported,
}

/// One step of a [`ProbeSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub block_size: usize,
    pub outcome: ProbeOutcome,
}

impl ProbeAttempt {
    pub fn is_match(&self) -> bool {
        self.outcome == ProbeOutcome::Match
    }
}

/// Lazy, finite scan over candidate block sizes `min..=max`.
///
/// Each call to `next` probes one size. Cloning a sequence yields an
/// independent scan from the same position, so an early-exit search and an
/// exhaustive listing can run over identical attempts.
#[derive(Debug, Clone)]
pub struct ProbeSequence<'a> {
    subband: &'a Plane,
    config: &'a WatermarkConfig,
    next: usize,
    max: usize,
}

impl<'a> ProbeSequence<'a> {
    /// Scan the configured range `config.probe_min..=config.probe_max`.
    pub fn new(subband: &'a Plane, config: &'a WatermarkConfig) -> Self {
        Self::with_range(subband, config, config.probe_min, config.probe_max)
    }

    /// Scan an explicit range.
    ///
    /// `max` is capped at [`MAX_BLOCK_SIZE`]: no larger size fits the header.
    pub fn with_range(subband: &'a Plane, config: &'a WatermarkConfig, min: usize, max: usize) -> Self {
        Self { subband, config, next: min, max: max.min(MAX_BLOCK_SIZE) }
    }
}

impl Iterator for ProbeSequence<'_> {
    type Item = ProbeAttempt;

    fn next(&mut self) -> Option<ProbeAttempt> {
        if self.next > self.max {
            return None;
        }
        let block_size = self.next;
        self.next += 1;
        let outcome = probe(self.subband, block_size, self.config);
        trace!(block_size, ?outcome, "block size probe");
        Some(ProbeAttempt { block_size, outcome })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.max + 1).saturating_sub(self.next);
        (n, Some(n))
    }
}

/// Read the header at one candidate size.
pub fn probe(subband: &Plane, block_size: usize, config: &WatermarkConfig) -> ProbeOutcome {
    if config.validate_block_size(block_size).is_err() {
        return ProbeOutcome::Unsupported;
    }
    let (w, h) = subband.dims();
    if w == 0 || h == 0 || block_count(w, h, block_size) < HEADER_BITS {
        return ProbeOutcome::TooFewBlocks;
    }

    let plan = DctPlan::new(block_size);
    let bits: Vec<u8> = (0..HEADER_BITS)
        .map(|i| extract_bit(&block_at(subband, block_size, i), &plan, config))
        .collect();

    match decode_header(&bits) {
        Some(value) if value as usize == block_size => ProbeOutcome::Match,
        Some(value) => ProbeOutcome::Mismatch(value),
        None => ProbeOutcome::TooFewBlocks,
    }
}

/// Detect the block size from an already-decomposed approximation subband.
///
/// # Errors
/// [`WatermarkError::DetectionFailed`] if no size in the configured range
/// matches.
pub fn detect_in_subband(subband: &Plane, config: &WatermarkConfig) -> Result<usize, WatermarkError> {
    let found = ProbeSequence::new(subband, config)
        .find(ProbeAttempt::is_match)
        .map(|a| a.block_size);
    match found {
        Some(block_size) => {
            debug!(block_size, "detected watermark block size");
            Ok(block_size)
        }
        None => Err(WatermarkError::DetectionFailed { min: config.probe_min, max: config.probe_max }),
    }
}

/// Detect the block size a channel was watermarked with.
///
/// # Errors
/// - [`WatermarkError::InvalidShape`] if the channel cannot be transformed.
/// - [`WatermarkError::DetectionFailed`] if no candidate matches.
pub fn detect(channel: &Plane, config: &WatermarkConfig) -> Result<usize, WatermarkError> {
    let dec = haar::forward(channel)?;
    detect_in_subband(&dec.approx, config)
}
