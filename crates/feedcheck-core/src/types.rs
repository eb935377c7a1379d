//! Strong type definitions for feed identifiers.
//!
//! Identifiers travel as tagged strings (`<sigil><base64>.<tag>`). The
//! newtypes keep the received text verbatim, since chain links are compared
//! as text, and decode it only on demand.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::crypto::{Ed25519PublicKey, Sha256Hash};
use crate::error::CoreError;

/// Sigil of message keys.
pub const MSG_SIGIL: char = '%';

/// Sigil of feed identifiers.
pub const FEED_SIGIL: char = '@';

/// The only supported hash algorithm tag.
pub const SHA256_TAG: &str = "sha256";

/// The only supported feed key algorithm tag.
pub const ED25519_TAG: &str = "ed25519";

/// The only supported signature algorithm tag.
pub const SIG_ED25519_TAG: &str = "sig.ed25519";

/// A message key: `%<base64 sha256>.sha256`.
///
/// The content address of a message, computed over its canonical value.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgKey(String);

impl MsgKey {
    /// Wrap a key string without checking it.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Render the key for a SHA-256 digest.
    pub fn from_sha256(hash: &Sha256Hash) -> Self {
        Self(format!(
            "{}{}.{}",
            MSG_SIGIL,
            STANDARD.encode(hash.as_bytes()),
            SHA256_TAG
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key has the `%<base64>.<tag>` shape.
    pub fn is_well_formed(&self) -> bool {
        is_link_shaped(&self.0, MSG_SIGIL)
    }

    /// Decode the digest, rejecting tags other than `sha256`.
    pub fn to_sha256(&self) -> Result<Sha256Hash, CoreError> {
        let bytes = decode_link(&self.0, MSG_SIGIL, SHA256_TAG, 32)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Sha256Hash::from_bytes(arr))
    }
}

impl fmt::Debug for MsgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MsgKey({})", self.0)
    }
}

impl fmt::Display for MsgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MsgKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for MsgKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for MsgKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl PartialEq<str> for MsgKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A feed identifier: `@<base64 ed25519 public key>.ed25519`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    /// Wrap a feed identifier without checking it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier of an Ed25519 public key.
    pub fn from_public_key(key: &Ed25519PublicKey) -> Self {
        Self(format!(
            "{}{}.{}",
            FEED_SIGIL,
            STANDARD.encode(key.as_bytes()),
            ED25519_TAG
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier has the `@<base64>.<tag>` shape.
    pub fn is_well_formed(&self) -> bool {
        is_link_shaped(&self.0, FEED_SIGIL)
    }

    /// Decode the public key, rejecting tags other than `ed25519`.
    pub fn public_key(&self) -> Result<Ed25519PublicKey, CoreError> {
        feed_public_key(&self.0)
    }
}

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedId({})", self.0)
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FeedId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for FeedId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for FeedId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for FeedId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Split `<base64 body>.<tag>` at the first dot.
///
/// Returns `None` unless the body is non-empty base64 alphabet text and the
/// tag is non-empty.
pub(crate) fn split_tagged(s: &str) -> Option<(&str, &str)> {
    let (body, tag) = s.split_once('.')?;
    let body_ok = !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=');
    if body_ok && !tag.is_empty() {
        Some((body, tag))
    } else {
        None
    }
}

/// Whether `s` looks like `<sigil><base64>.<tag>`.
pub(crate) fn is_link_shaped(s: &str, sigil: char) -> bool {
    s.strip_prefix(sigil).and_then(split_tagged).is_some()
}

/// Decode the body of a tagged string, checking the tag and decoded length.
pub(crate) fn decode_tagged(
    s: &str,
    expected_tag: &str,
    expected_len: usize,
) -> Result<Vec<u8>, CoreError> {
    let (body, tag) =
        split_tagged(s).ok_or_else(|| CoreError::InvalidEncoding(format!("not tagged: {s}")))?;

    if tag != expected_tag {
        return Err(CoreError::UnsupportedAlgorithm(tag.to_string()));
    }

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| CoreError::InvalidEncoding(format!("{s}: {e}")))?;

    if bytes.len() != expected_len {
        return Err(CoreError::InvalidEncoding(format!(
            "{s}: expected {expected_len} bytes, got {}",
            bytes.len()
        )));
    }

    Ok(bytes)
}

/// Decode the public key named by a feed id string.
pub(crate) fn feed_public_key(s: &str) -> Result<Ed25519PublicKey, CoreError> {
    let bytes = decode_link(s, FEED_SIGIL, ED25519_TAG, 32)?;
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(Ed25519PublicKey::from_bytes(arr))
}

fn decode_link(
    s: &str,
    sigil: char,
    expected_tag: &str,
    expected_len: usize,
) -> Result<Vec<u8>, CoreError> {
    let rest = s
        .strip_prefix(sigil)
        .ok_or_else(|| CoreError::InvalidEncoding(format!("expected sigil {sigil}: {s}")))?;
    decode_tagged(rest, expected_tag, expected_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: &str = "@U5GvOKP/YUza9k53DSXxT0mk3PIrnyAmessvNfZl5E0=.ed25519";
    const KEY: &str = "%kmXb3MXtBJaNugcEL/Q7G40DgcAkMNTj3yhmxKHjfCM=.sha256";

    #[test]
    fn test_msg_key_roundtrip() {
        let key = MsgKey::new(KEY);
        assert!(key.is_well_formed());
        let hash = key.to_sha256().unwrap();
        assert_eq!(MsgKey::from_sha256(&hash), key);
    }

    #[test]
    fn test_feed_id_roundtrip() {
        let id = FeedId::new(AUTHOR);
        assert!(id.is_well_formed());
        let pk = id.public_key().unwrap();
        assert_eq!(FeedId::from_public_key(&pk), id);
    }

    #[test]
    fn test_unsupported_tags() {
        let key = MsgKey::new("%kmXb3MXtBJaNugcEL/Q7G40DgcAkMNTj3yhmxKHjfCM=.blake2b");
        assert!(key.is_well_formed());
        assert_eq!(
            key.to_sha256(),
            Err(CoreError::UnsupportedAlgorithm("blake2b".into()))
        );

        let id = FeedId::new("@U5GvOKP/YUza9k53DSXxT0mk3PIrnyAmessvNfZl5E0=.bamboo");
        assert!(matches!(
            id.public_key(),
            Err(CoreError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_malformed_links() {
        assert!(!is_link_shaped("kmXb3.sha256", MSG_SIGIL));
        assert!(!is_link_shaped("%.sha256", MSG_SIGIL));
        assert!(!is_link_shaped("%kmXb3", MSG_SIGIL));
        assert!(!is_link_shaped("%km Xb3.sha256", MSG_SIGIL));
        assert!(!is_link_shaped(AUTHOR, MSG_SIGIL));

        // Well shaped but too short once decoded.
        let id = FeedId::new("@AAAA.ed25519");
        assert!(id.is_well_formed());
        assert!(matches!(id.public_key(), Err(CoreError::InvalidEncoding(_))));
    }

    #[test]
    fn test_split_tagged_signature() {
        let (body, tag) = split_tagged("PkZ3BRVS==.sig.ed25519").unwrap();
        assert_eq!(body, "PkZ3BRVS==");
        assert_eq!(tag, SIG_ED25519_TAG);
    }
}
