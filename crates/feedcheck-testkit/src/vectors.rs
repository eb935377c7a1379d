//! Golden test vectors for compatibility with existing feeds.
//!
//! These are real messages from the network. Their keys and signatures were
//! produced by other implementations, so matching them pins down the
//! canonical encoding byte for byte.

use feedcheck_core::{Message, MsgKey};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// The message as JSON text, in wire field order.
    pub json: &'static str,
    /// Expected message key.
    pub expected_key: &'static str,
}

impl GoldenVector {
    /// Parse the vector's message.
    pub fn message(&self) -> Message {
        Message::from_json(self.json).expect("golden vectors are valid JSON")
    }

    pub fn expected_key(&self) -> MsgKey {
        MsgKey::new(self.expected_key)
    }
}

/// A contact message at sequence 8 of its feed.
pub const CONTACT_MESSAGE: GoldenVector = GoldenVector {
    name: "contact message, seq 8",
    json: r#"{
  "key": "%kmXb3MXtBJaNugcEL/Q7G40DgcAkMNTj3yhmxKHjfCM=.sha256",
  "value": {
    "previous": "%IIjwbJbV3WBE/SBLnXEv5XM3Pr+PnMkrAJ8F+7TsUVQ=.sha256",
    "author": "@U5GvOKP/YUza9k53DSXxT0mk3PIrnyAmessvNfZl5E0=.ed25519",
    "sequence": 8,
    "timestamp": 1470187438539,
    "hash": "sha256",
    "content": {
      "type": "contact",
      "contact": "@ye+QM09iPcDJD6YvQYjoQc7sLF/IFhmNbEqgdzQo3lQ=.ed25519",
      "following": true,
      "blocking": false
    },
    "signature": "PkZ34BRVSmGG51vMXo4GvaoS/2NBc0lzdFoVv4wkI8E8zXv4QYyE5o2mPACKOcrhrLJpymLzqpoE70q78INuBg==.sig.ed25519"
  },
  "timestamp": 1571140551543
}"#,
    expected_key: "%kmXb3MXtBJaNugcEL/Q7G40DgcAkMNTj3yhmxKHjfCM=.sha256",
};

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![CONTACT_MESSAGE]
}

/// The contact message vector, parsed.
pub fn sample_message() -> Message {
    CONTACT_MESSAGE.message()
}

/// Check every vector's key, returning the names of those that differ.
pub fn verify_all_vectors() -> Vec<&'static str> {
    all_vectors()
        .into_iter()
        .filter(|v| v.message().compute_key().ok() != Some(v.expected_key()))
        .map(|v| v.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_parse() {
        for vector in all_vectors() {
            let message = vector.message();
            assert_eq!(message.key, vector.expected_key(), "{}", vector.name);
        }
    }

    #[test]
    fn test_vector_keys() {
        assert!(verify_all_vectors().is_empty());
    }

    #[test]
    fn test_sample_fields() {
        let message = sample_message();
        assert_eq!(message.sequence(), Some(8));
        assert_eq!(message.timestamp, Some(1571140551543.0));
    }
}
