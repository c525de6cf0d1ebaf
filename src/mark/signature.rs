// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Message signing collaborators.
//!
//! The codec frames whatever signature bytes it is handed and returns them
//! verbatim on extraction; producing and checking them is delegated to a
//! [`MessageSigner`] / [`MessageVerifier`]. Two stock implementations are
//! provided:
//!
//! - [`HmacSha256Key`]: shared-secret HMAC-SHA-256, 32-byte tags. Implements
//!   both traits.
//! - [`Ed25519Signer`] / [`Ed25519Verifier`]: Ed25519, 64-byte signatures.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Produces the signature embedded alongside a message.
pub trait MessageSigner {
    /// Length in bytes of every signature this signer produces.
    fn signature_len(&self) -> usize;

    /// Sign the raw message bytes.
    fn sign(&self, message: &[u8]) -> Vec<u8>;
}

/// Checks an extracted signature against the extracted message.
pub trait MessageVerifier {
    /// `true` if `signature` is valid for `message`. Malformed signatures
    /// (wrong length, bad encoding) verify as `false`.
    fn verify(&self, signature: &[u8], message: &[u8]) -> bool;
}

impl<T: MessageSigner + ?Sized> MessageSigner for &T {
    fn signature_len(&self) -> usize {
        (**self).signature_len()
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        (**self).sign(message)
    }
}

impl<T: MessageVerifier + ?Sized> MessageVerifier for &T {
    fn verify(&self, signature: &[u8], message: &[u8]) -> bool {
        (**self).verify(signature, message)
    }
}

/// HMAC-SHA-256 shared secret. The key is wiped from memory on drop.
#[derive(Clone)]
pub struct HmacSha256Key {
    key: Zeroizing<Vec<u8>>,
}

impl HmacSha256Key {
    /// HMAC tag length in bytes.
    pub const TAG_LEN: usize = 32;

    pub fn new(key: &[u8]) -> Self {
        Self { key: Zeroizing::new(key.to_vec()) }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length")
    }
}

impl core::fmt::Debug for HmacSha256Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HmacSha256Key").finish_non_exhaustive()
    }
}

impl MessageSigner for HmacSha256Key {
    fn signature_len(&self) -> usize {
        Self::TAG_LEN
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
}

impl MessageVerifier for HmacSha256Key {
    fn verify(&self, signature: &[u8], message: &[u8]) -> bool {
        let mut mac = self.mac();
        mac.update(message);
        // Constant-time; rejects any length other than 32.
        mac.verify_slice(signature).is_ok()
    }
}

/// Ed25519 private key.
#[derive(Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Signature length in bytes.
    pub const SIGNATURE_LEN: usize = 64;

    /// Build from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self { signing_key: SigningKey::from_bytes(seed) }
    }

    /// The matching public verifier.
    pub fn verifier(&self) -> Ed25519Verifier {
        Ed25519Verifier { verifying_key: self.signing_key.verifying_key() }
    }
}

impl core::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("verifying_key", &self.signing_key.verifying_key())
            .finish_non_exhaustive()
    }
}

impl MessageSigner for Ed25519Signer {
    fn signature_len(&self) -> usize {
        Self::SIGNATURE_LEN
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

/// Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Verifier {
    verifying_key: VerifyingKey,
}

impl Ed25519Verifier {
    /// Parse a 32-byte compressed public key.
    ///
    /// # Errors
    /// Returns the underlying [`ed25519_dalek::SignatureError`] if the bytes
    /// are not a valid curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, ed25519_dalek::SignatureError> {
        Ok(Self { verifying_key: VerifyingKey::from_bytes(bytes)? })
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }
}

impl MessageVerifier for Ed25519Verifier {
    fn verify(&self, signature: &[u8], message: &[u8]) -> bool {
        match Signature::from_slice(signature) {
            Ok(sig) => self.verifying_key.verify(message, &sig).is_ok(),
            Err(_) => false,
        }
    }
}
