// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Capacity math, reliability margins and block-size recommendation.

use sigmark_core::mark::payload::{framing_overhead_bytes, payload_bits};
use sigmark_core::{
    capacity_bits, embed_message, recommend_block_size, CapacityRecord, HmacSha256Key,
    MessageSigner, Plane, ReliabilityClass, ReliabilityTable, WatermarkConfig, WatermarkError,
};

#[test]
fn full_hd_frame_at_block_8() {
    let cfg = WatermarkConfig::default();
    let rec = CapacityRecord::new(1920, 1088, 8);
    assert_eq!(rec.capacity_bits, 120 * 68);
    assert_eq!(rec.capacity_bytes, 1020);

    // 5-byte message, 256-byte signature: 1 + 4 + 256 + 5 + 4 + 4 = 274 bytes.
    assert_eq!(rec.required_bits(256, 5, &cfg), 2192);
    assert!(rec.fits(256, 5, &cfg));
}

#[test]
fn overhead_follows_reliability_class() {
    let cfg = WatermarkConfig::default();
    assert_eq!(framing_overhead_bytes(8, &cfg), 13);
    assert_eq!(framing_overhead_bytes(12, &cfg), 17);
    assert_eq!(framing_overhead_bytes(16, &cfg), 21);
    assert_eq!(payload_bits(32, 10, 8, &cfg), (13 + 32 + 10) * 8);
}

#[test]
fn message_capacity_per_class() {
    let cfg = WatermarkConfig::default();
    // 1000×1000 → 500×500 subband.
    let safe = CapacityRecord::new(1000, 1000, 8); // 63×63 = 3969 bits = 496 bytes
    let warning = CapacityRecord::new(1000, 1000, 10); // 50×50 = 2500 bits = 312 bytes
    let danger = CapacityRecord::new(1000, 1000, 16); // 32×32 = 1024 bits = 128 bytes
    assert_eq!(safe.message_capacity_bytes(32, &cfg), 496 - 13 - 32);
    assert_eq!(warning.message_capacity_bytes(32, &cfg), 312 - 17 - 32);
    assert_eq!(danger.message_capacity_bytes(32, &cfg), 128 - 21 - 32);
}

#[test]
fn capacity_matches_embedder() {
    let cfg = WatermarkConfig::default();
    let key = HmacSha256Key::new(b"k");
    let img = Plane::from_fn(200, 200, |r, c| 100.0 + ((r * 3 + c * 5) % 50) as f64);
    let rec = CapacityRecord::new(200, 200, 4); // 25×25 = 625 bits
    assert_eq!(rec.capacity_bits, 625);

    let fits = rec.message_capacity_bytes(key.signature_len(), &cfg);
    assert!(embed_message(&img, &vec![b'a'; fits], 4, &key, &cfg).is_ok());
    assert!(matches!(
        embed_message(&img, &vec![b'a'; fits + 1], 4, &key, &cfg),
        Err(WatermarkError::CapacityExceeded { available_bits: 625, .. })
    ));
}

#[test]
fn reliability_table_defaults() {
    let table = ReliabilityTable::default();
    for k in [4, 6, 8, 9, 13] {
        assert_eq!(table.classify(k), ReliabilityClass::Safe);
        assert_eq!(table.margin_bytes(k), 4);
    }
    for k in [10, 12, 15] {
        assert_eq!(table.classify(k), ReliabilityClass::Warning);
        assert_eq!(table.margin_bytes(k), 8);
    }
    for k in [5, 7, 11, 14, 16, 64, 255] {
        assert_eq!(table.classify(k), ReliabilityClass::Danger);
        assert_eq!(table.margin_bits(k), 96);
    }
}

#[test]
fn custom_calibration_changes_margins() {
    let cfg = WatermarkConfig {
        reliability: ReliabilityTable { safe: vec![16], warning: vec![], ..ReliabilityTable::default() },
        ..WatermarkConfig::default()
    };
    assert_eq!(cfg.margin_bytes(16), 4);
    assert_eq!(cfg.margin_bytes(8), 12);
    assert_eq!(recommend_block_size(4000, 3000, 32, 100, &cfg), Some(16));
}

#[test]
fn recommendation_prefers_safe_then_warning() {
    let cfg = WatermarkConfig::default();
    assert_eq!(recommend_block_size(1920, 1088, 64, 100, &cfg), Some(13));

    let warning_only = WatermarkConfig {
        reliability: ReliabilityTable { safe: vec![], warning: vec![10, 12], ..ReliabilityTable::default() },
        ..WatermarkConfig::default()
    };
    assert_eq!(recommend_block_size(1920, 1088, 64, 100, &warning_only), Some(12));
}

#[test]
fn zero_sized_inputs() {
    assert_eq!(capacity_bits(0, 0, 8), 0);
    assert_eq!(CapacityRecord::new(0, 500, 8).capacity_bytes, 0);
}
