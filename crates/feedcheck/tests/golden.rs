//! Golden vectors: real messages signed by other implementations.
//!
//! Matching these keys and signatures pins the canonical encoding down to
//! the byte.

use feedcheck::core::canonical::{canonical_json, legacy_length, signing_json};
use feedcheck::core::MessageValue;
use feedcheck::{ErrorKind, Validator};
use feedcheck_testkit::vectors::{all_vectors, sample_message, CONTACT_MESSAGE};
use serde_json::json;

#[test]
fn test_golden_keys() {
    for vector in all_vectors() {
        let message = vector.message();
        assert_eq!(
            message.compute_key().unwrap(),
            vector.expected_key(),
            "key mismatch for {}",
            vector.name
        );
    }
}

#[test]
fn test_golden_signature() {
    let validator = Validator::default();
    validator
        .verify_signatures(&[sample_message()])
        .expect("golden signature should verify");
}

#[test]
fn test_golden_tampered_signature() {
    let mut message = sample_message();
    message.value["content"]["following"] = json!(false);

    let err = Validator::default()
        .verify_signatures(&[message])
        .unwrap_err();
    let rejection = err.rejection().unwrap();
    assert_eq!(rejection.kind(), ErrorKind::InvalidSignature);
    assert!(err.to_string().contains("signature was invalid"));
}

#[test]
fn test_golden_needs_predecessor() {
    // Sequence 8 cannot start a feed.
    let err = Validator::default()
        .validate_single(&sample_message(), None)
        .unwrap_err();
    assert_eq!(
        err.rejection().unwrap().kind(),
        ErrorKind::FirstMessageMustHaveSeqOne
    );
}

#[test]
fn test_golden_encoding_layout() {
    let message = sample_message();
    let canonical = canonical_json(&message.value);

    assert!(canonical.starts_with("{\n  \"previous\": \"%IIjw"));
    assert!(canonical.contains("\n  \"sequence\": 8,\n"));
    assert!(canonical.contains("\n    \"following\": true,\n"));
    assert!(canonical.ends_with(".sig.ed25519\"\n}"));
    assert_eq!(legacy_length(&canonical), canonical.len());

    let fields = message.value.as_object().unwrap();
    let signing = signing_json(fields);
    assert!(!signing.contains("signature"));
    assert!(signing.ends_with("\"blocking\": false\n  }\n}"));
}

#[test]
fn test_golden_structure() {
    let message = CONTACT_MESSAGE.message();
    let parsed = MessageValue::parse(&message).unwrap();
    assert_eq!(parsed.sequence, 8);
    assert_eq!(parsed.hash, "sha256");
    assert_eq!(
        parsed.previous,
        Some("%IIjwbJbV3WBE/SBLnXEv5XM3Pr+PnMkrAJ8F+7TsUVQ=.sha256")
    );
}
