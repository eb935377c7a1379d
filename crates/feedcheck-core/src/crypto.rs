//! Cryptographic primitives for feedcheck.
//!
//! SHA-256 message hashes, Ed25519 feed keys and signatures, and the
//! network HMAC. Debug output shows the base64 form used on the wire.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

use crate::error::CoreError;
use crate::types::{decode_tagged, FeedId, SIG_ED25519_TAG};

/// A SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash([u8; 32]);

impl Sha256Hash {
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", self.to_hex())
    }
}

/// The public half of a feed's signing key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check `signature` over `data`.
    ///
    /// Verification is strict: small-order keys and non-canonical `s`
    /// values fail, as they do under libsodium.
    pub fn verify(&self, data: &[u8], signature: &Ed25519Signature) -> Result<(), CoreError> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;
        key.verify_strict(data, &Signature::from_bytes(&signature.0))
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey({})", STANDARD.encode(self.0))
    }
}

/// An Ed25519 signature as carried in a message's `signature` field.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    /// Parse `<base64>.sig.ed25519`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let bytes = decode_tagged(s, SIG_ED25519_TAG, 64)?;
        let mut sig = [0u8; 64];
        sig.copy_from_slice(&bytes);
        Ok(Self(sig))
    }

    /// Render as `<base64>.sig.ed25519`.
    pub fn to_tagged(&self) -> String {
        format!("{}.{}", STANDARD.encode(self.0), SIG_ED25519_TAG)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature({})", self.to_tagged())
    }
}

/// A 32-byte network key.
///
/// When set, signatures cover HMAC-SHA-512-256(key, signed bytes) instead of
/// the bytes themselves, which keeps test networks apart from the main one.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKey([u8; 32]);

impl HmacKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a base64-encoded 32-byte key.
    pub fn from_base64(s: &str) -> Result<Self, CoreError> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| CoreError::InvalidEncoding(format!("hmac key: {e}")))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CoreError::InvalidEncoding(format!("hmac key: expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    /// HMAC-SHA-512 truncated to 32 bytes.
    pub fn authenticate(&self, data: &[u8]) -> Result<[u8; 32], CoreError> {
        let mut mac = Hmac::<Sha512>::new_from_slice(&self.0)
            .map_err(|_| CoreError::InvalidEncoding("hmac key length".into()))?;
        mac.update(data);
        let tag = mac.finalize().into_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&tag[..32]);
        Ok(out)
    }
}

impl fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HmacKey(..)")
    }
}

/// A feed's signing key.
#[derive(Clone)]
pub struct Keypair(SigningKey);

impl Keypair {
    /// A fresh key from the thread RNG.
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut rand::thread_rng()))
    }

    /// A key derived from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key().to_bytes())
    }

    /// The feed this key authors.
    pub fn feed_id(&self) -> FeedId {
        FeedId::from_public_key(&self.public_key())
    }

    pub fn sign(&self, data: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(data).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({})", self.feed_id())
    }
}
