// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! # sigmark-core
//!
//! Signed, invisible image watermarks in the transform domain. A message and
//! its signature are framed into a bit stream and written one bit per block
//! into the Haar approximation subband of one image channel, each bit carried
//! by the sign of a single mid-frequency DCT coefficient.
//!
//! - **Embed**: [`embed_message`] signs, frames and writes the payload.
//! - **Verify**: [`verify_message`] reads it back, optionally detecting the
//!   block size from the embedded header, and checks the signature.
//! - **Sizing**: [`CapacityRecord`] and [`recommend_block_size`] tell how
//!   much fits; the [`ReliabilityTable`] supplies per-size safety margins.
//!
//! The codec works on one [`Plane`] of `f64` samples; decoding and encoding
//! image files is left to the host. All processing is pure and stateless.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use sigmark_core::{embed_message, verify_message, HmacSha256Key, Plane, WatermarkConfig};
//!
//! let config = WatermarkConfig::default();
//! let key = HmacSha256Key::new(b"shared secret");
//! let channel = Plane::from_u8(width, height, &blue_channel)?;
//! let marked = embed_message(&channel, b"(c) 2026", 8, &key, &config)?;
//! let report = verify_message(&marked, None, &key, &config)?.require_valid()?;
//! assert_eq!(report.text(), "(c) 2026");
//! ```

pub mod mark;
pub mod plane;
pub mod transform;

pub use mark::{embed_bits, embed_message, extract_bits, extract_payload, verify_message, Verification};
pub use mark::{WatermarkError, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};
pub use mark::capacity::{capacity_bits, recommend_block_size, CapacityRecord};
pub use mark::config::WatermarkConfig;
pub use mark::detect::{detect, ProbeAttempt, ProbeOutcome, ProbeSequence};
pub use mark::payload::{BitStream, DecodedPayload};
pub use mark::reliability::{ReliabilityClass, ReliabilityTable};
pub use mark::signature::{Ed25519Signer, Ed25519Verifier, HmacSha256Key, MessageSigner, MessageVerifier};
pub use plane::Plane;
