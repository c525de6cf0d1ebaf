// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Property tests for the transform, partition and framing layers.

use proptest::prelude::*;
use sigmark_core::mark::partition::{merge_and_crop, pad_and_split};
use sigmark_core::mark::payload::{self, decode_header, encode_header};
use sigmark_core::transform::{dct::DctPlan, haar};
use sigmark_core::{
    capacity_bits, embed_bits, extract_bits, BitStream, Plane, WatermarkConfig, WatermarkError,
};

fn plane(max_w: usize, max_h: usize) -> impl Strategy<Value = Plane> {
    (1..=max_w, 1..=max_h).prop_flat_map(|(w, h)| {
        prop::collection::vec(0.0..255.0f64, w * h).prop_map(move |s| Plane::from_vec(w, h, s).unwrap())
    })
}

#[test]
fn split_then_merge_is_identity() {
    proptest!(|(p in plane(40, 40), bs in 1usize..20)| {
        let blocks = pad_and_split(&p, bs).unwrap();
        let back = merge_and_crop(&blocks, bs, p.dims()).unwrap();
        prop_assert_eq!(back, p);
    });
}

#[test]
fn haar_round_trip_any_shape() {
    proptest!(|(p in plane(33, 33))| {
        let back = haar::inverse(&haar::forward(&p).unwrap()).unwrap();
        prop_assert!(back.max_abs_diff(&p).unwrap() < 1e-9);
    });
}

#[test]
fn dct_round_trip() {
    proptest!(|(n in 1usize..17, seed in prop::collection::vec(-300.0..300.0f64, 256))| {
        let plan = DctPlan::new(n);
        let block = &seed[..n * n];
        let back = plan.inverse(&plan.forward(block));
        for (a, b) in back.iter().zip(block) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    });
}

#[test]
fn header_round_trip() {
    proptest!(|(k in 4u8..=255)| {
        prop_assert_eq!(decode_header(&encode_header(k)), Some(k));
    });
}

#[test]
fn payload_round_trip() {
    let cfg = WatermarkConfig::default();
    proptest!(|(
        k in 4usize..=64,
        signature in prop::collection::vec(any::<u8>(), 1..80),
        message in prop::collection::vec(1u8..=255, 0..120),
    )| {
        let bits = payload::encode(k, &signature, &message, &cfg).unwrap();
        let out = payload::decode(bits.bits(), k, &cfg).unwrap();
        prop_assert_eq!(out.signature, signature);
        prop_assert_eq!(out.message, message);
    });
}

#[test]
fn capacity_never_grows_with_block_size() {
    proptest!(|(w in 1usize..4000, h in 1usize..4000, k in 1usize..64)| {
        prop_assert!(capacity_bits(w, h, k) >= capacity_bits(w, h, k + 1));
    });
}

#[test]
fn bits_survive_embedding() {
    let cfg = WatermarkConfig::default();
    proptest!(ProptestConfig::with_cases(24), |(
        k in 4usize..=10,
        cols in 2usize..6,
        rows in 2usize..6,
        raw in prop::collection::vec(any::<bool>(), 36),
        fill in 0.0..255.0f64,
    )| {
        let img = Plane::from_fn(2 * k * cols, 2 * k * rows, |r, c| (fill + (r * 7 + c * 3) as f64) % 256.0);
        let n = (cols * rows).min(raw.len());
        let bits = BitStream::from(raw[..n].iter().map(|&b| u8::from(b)).collect::<Vec<_>>());

        let marked = embed_bits(&img, &bits, k, &cfg).unwrap();
        prop_assert_eq!(extract_bits(&marked, k, n, &cfg).unwrap(), bits);
    });
}

#[test]
fn bits_survive_embedding_with_partial_edges() {
    let cfg = WatermarkConfig::default();
    proptest!(ProptestConfig::with_cases(24), |(
        k in 4usize..=10,
        cols in 2usize..6,
        rows in 2usize..6,
        extra in (1usize..64, 1usize..64),
        odd in (any::<bool>(), any::<bool>()),
        raw in prop::collection::vec(any::<bool>(), 49),
        fill in 0.0..255.0f64,
    )| {
        // Subband sides k * cols + rw and k * rows + rh, never a multiple of k.
        let (rw, rh) = (1 + extra.0 % (k - 1), 1 + extra.1 % (k - 1));
        let w = 2 * (k * cols + rw) - usize::from(odd.0);
        let h = 2 * (k * rows + rh) - usize::from(odd.1);
        let img = Plane::from_fn(w, h, |r, c| (fill + (r * 7 + c * 3) as f64) % 256.0);
        let n = ((cols + 1) * (rows + 1)).min(raw.len());
        let bits = BitStream::from(raw[..n].iter().map(|&b| u8::from(b)).collect::<Vec<_>>());

        match embed_bits(&img, &bits, k, &cfg) {
            Ok(marked) => prop_assert_eq!(extract_bits(&marked, k, n, &cfg).unwrap(), bits),
            Err(err) => prop_assert!(
                matches!(err, WatermarkError::DegenerateBlock { block_size, .. } if block_size == k),
                "unexpected error {:?}", err
            ),
        }
    });
}
