//! Canonical JSON encoding for message hashing and signing.
//!
//! The network's wire format is the output of `JSON.stringify(value, null, 2)`:
//! - Object fields in the order they were received (never re-sorted)
//! - Two-space indentation, `"name": value` pairs, `{}` / `[]` when empty
//! - Minimal string escaping (quote, backslash, control characters)
//! - Numbers printed with the ECMAScript Number-to-String rules
//!
//! Keys hash the encoded text as UTF-16 code units truncated to their low
//! byte. Signatures cover the UTF-8 bytes of the encoding with the
//! `signature` field left out.
//!
//! Field order survives deserialization because `serde_json` is built with
//! `preserve_order`.

use serde_json::{Map, Number, Value};

use crate::crypto::{HmacKey, Sha256Hash};
use crate::error::CoreError;
use crate::types::{MsgKey, SHA256_TAG};

/// Maximum canonical length of a message value, in UTF-16 code units.
pub const MAX_MESSAGE_LENGTH: usize = 8192;

/// Largest integer that survives a round trip through an IEEE double.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Name of the field excluded from the signed bytes.
const SIGNATURE_FIELD: &str = "signature";

/// Encode a JSON value canonically.
pub fn canonical_json(value: &Value) -> String {
    let mut buf = String::new();
    encode_value_to(&mut buf, value, 0);
    buf
}

/// Encode a message value without its `signature` field.
pub fn signing_json(value: &Map<String, Value>) -> String {
    let mut buf = String::new();
    encode_object(
        &mut buf,
        value.iter().filter(|(k, _)| k.as_str() != SIGNATURE_FIELD),
        0,
    );
    buf
}

/// The bytes a message signature covers.
///
/// With a network key the signature covers the HMAC of the encoding instead.
pub fn signed_bytes(value: &Map<String, Value>, hmac_key: Option<&HmacKey>) -> Result<Vec<u8>, CoreError> {
    let bytes = signing_json(value).into_bytes();
    match hmac_key {
        Some(key) => Ok(key.authenticate(&bytes)?.to_vec()),
        None => Ok(bytes),
    }
}

/// Legacy "binary" bytes of a string: each UTF-16 code unit, low byte only.
pub fn legacy_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().map(|unit| unit as u8).collect()
}

/// Length of a string in UTF-16 code units.
pub fn legacy_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Compute a message key from an already-encoded value.
pub fn key_from_canonical(canonical: &str, hash_tag: &str) -> Result<MsgKey, CoreError> {
    if hash_tag != SHA256_TAG {
        return Err(CoreError::UnsupportedAlgorithm(hash_tag.to_string()));
    }
    let hash = Sha256Hash::hash(&legacy_bytes(canonical));
    Ok(MsgKey::from_sha256(&hash))
}

/// Compute the key of a message value, using the algorithm named by its
/// `hash` field.
pub fn compute_key(value: &Value) -> Result<MsgKey, CoreError> {
    let hash_tag = value
        .get("hash")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::InvalidEncoding("value has no hash field".into()))?;
    key_from_canonical(&canonical_json(value), hash_tag)
}

/// Recursively encode a value at the given nesting depth.
fn encode_value_to(buf: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => buf.push_str("null"),
        Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => buf.push_str(&encode_number(n)),
        Value::String(s) => encode_string(buf, s),
        Value::Array(items) => encode_array(buf, items, depth),
        Value::Object(map) => encode_object(buf, map.iter(), depth),
    }
}

fn encode_object<'a>(
    buf: &mut String,
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
    depth: usize,
) {
    let mut entries = entries.peekable();
    if entries.peek().is_none() {
        buf.push_str("{}");
        return;
    }

    buf.push('{');
    let mut first = true;
    for (key, value) in entries {
        if !first {
            buf.push(',');
        }
        first = false;
        buf.push('\n');
        push_indent(buf, depth + 1);
        encode_string(buf, key);
        buf.push_str(": ");
        encode_value_to(buf, value, depth + 1);
    }
    buf.push('\n');
    push_indent(buf, depth);
    buf.push('}');
}

fn encode_array(buf: &mut String, items: &[Value], depth: usize) {
    if items.is_empty() {
        buf.push_str("[]");
        return;
    }

    buf.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(',');
        }
        buf.push('\n');
        push_indent(buf, depth + 1);
        encode_value_to(buf, item, depth + 1);
    }
    buf.push('\n');
    push_indent(buf, depth);
    buf.push(']');
}

fn push_indent(buf: &mut String, depth: usize) {
    for _ in 0..depth {
        buf.push_str("  ");
    }
}

fn encode_string(buf: &mut String, s: &str) {
    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\u{08}' => buf.push_str("\\b"),
            '\u{0c}' => buf.push_str("\\f"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if (c as u32) < 0x20 => buf.push_str(&format!("\\u{:04x}", c as u32)),
            c => buf.push(c),
        }
    }
    buf.push('"');
}

/// Integers print exactly while they fit a double; everything else goes
/// through the double conversion a JavaScript parser would have applied.
fn encode_number(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        if u <= MAX_SAFE_INTEGER {
            return u.to_string();
        }
        return js_number(u as f64);
    }
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_SAFE_INTEGER {
            return i.to_string();
        }
        return js_number(i as f64);
    }
    js_number(n.as_f64().unwrap_or(f64::NAN))
}

/// ECMAScript Number::toString for finite doubles.
fn js_number(f: f64) -> String {
    if !f.is_finite() {
        return "null".to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits, e.g. "1.470187438539004e12".
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return f.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    // value = 0.d1d2...dk * 10^n
    let k = digits.len() as i32;
    let n = exp + 1;

    let mut out = String::new();
    if f < 0.0 {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let e = n - 1;
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if e >= 0 { '+' } else { '-' });
        out.push_str(&e.abs().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_pretty_layout() {
        let value = json!({
            "a": 1,
            "b": [true, null],
            "c": {},
            "d": [],
            "e": { "f": "g" }
        });
        let expected = "{\n  \"a\": 1,\n  \"b\": [\n    true,\n    null\n  ],\n  \"c\": {},\n  \"d\": [],\n  \"e\": {\n    \"f\": \"g\"\n  }\n}";
        assert_eq!(canonical_json(&value), expected);
    }

    #[test]
    fn test_field_order_preserved() {
        let a = parse(r#"{"sequence": 2, "author": "x"}"#);
        let b = parse(r#"{"author": "x", "sequence": 2}"#);
        assert!(canonical_json(&a).starts_with("{\n  \"sequence\""));
        assert!(canonical_json(&b).starts_with("{\n  \"author\""));
        assert_ne!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn test_reparse_is_stable() {
        let text = r#"{"z":1,"a":{"y":[1,2,{"k":"v"}],"b":"\u0001"}}"#;
        let once = canonical_json(&parse(text));
        let twice = canonical_json(&parse(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_string_escaping() {
        let value = Value::String("q\"b\\n\nt\tc\u{01}\u{1f}/é€".to_string());
        assert_eq!(
            canonical_json(&value),
            "\"q\\\"b\\\\n\\nt\\tc\\u0001\\u001f/é€\""
        );
    }

    #[test]
    fn test_js_number_formatting() {
        assert_eq!(js_number(1.0), "1");
        assert_eq!(js_number(-0.5), "-0.5");
        assert_eq!(js_number(123.456), "123.456");
        assert_eq!(js_number(1470187438539.004), "1470187438539.004");
        assert_eq!(js_number(1e21), "1e+21");
        assert_eq!(js_number(1.5e300), "1.5e+300");
        assert_eq!(js_number(1e20), "100000000000000000000");
        assert_eq!(js_number(0.000001), "0.000001");
        assert_eq!(js_number(1e-7), "1e-7");
        assert_eq!(js_number(-2.5e-8), "-2.5e-8");
        assert_eq!(js_number(-0.0), "0");
    }

    #[test]
    fn test_integer_encoding() {
        assert_eq!(canonical_json(&json!(0)), "0");
        assert_eq!(canonical_json(&json!(-42)), "-42");
        assert_eq!(canonical_json(&json!(1470187438539u64)), "1470187438539");
        // Beyond 2^53 the value is what a double would hold.
        assert_eq!(canonical_json(&json!(9007199254740993u64)), "9007199254740992");
        assert_eq!(canonical_json(&json!(u64::MAX)), "18446744073709552000");
        assert_eq!(canonical_json(&json!(2.0)), "2");
    }

    #[test]
    fn test_legacy_bytes() {
        assert_eq!(legacy_bytes("ab"), b"ab".to_vec());
        assert_eq!(legacy_bytes("é"), vec![0xe9]);
        assert_eq!(legacy_bytes("€"), vec![0xac]);
        // Surrogate pair D83D DE00.
        assert_eq!(legacy_bytes("😀"), vec![0x3d, 0x00]);
        assert_eq!(legacy_length("😀a"), 3);
    }

    #[test]
    fn test_signing_json_skips_signature() {
        let value = json!({ "author": "a", "content": { "signature": "kept" }, "signature": "s" });
        let map = value.as_object().unwrap();
        let text = signing_json(map);
        assert_eq!(
            text,
            "{\n  \"author\": \"a\",\n  \"content\": {\n    \"signature\": \"kept\"\n  }\n}"
        );
    }

    #[test]
    fn test_compute_key_deterministic() {
        let value = json!({ "hash": "sha256", "content": { "type": "post" } });
        let k1 = compute_key(&value).unwrap();
        let k2 = compute_key(&value).unwrap();
        assert_eq!(k1, k2);
        assert!(k1.is_well_formed());
        assert!(k1.as_str().ends_with(".sha256"));
    }

    #[test]
    fn test_compute_key_changes_with_value() {
        let a = json!({ "hash": "sha256", "content": { "type": "post", "text": "a" } });
        let b = json!({ "hash": "sha256", "content": { "type": "post", "text": "b" } });
        assert_ne!(compute_key(&a).unwrap(), compute_key(&b).unwrap());
    }

    #[test]
    fn test_compute_key_unsupported_algorithm() {
        let value = json!({ "hash": "blake3" });
        assert_eq!(
            compute_key(&value),
            Err(CoreError::UnsupportedAlgorithm("blake3".into()))
        );
    }

    #[test]
    fn test_signed_bytes_with_hmac() {
        let value = json!({ "author": "a", "signature": "s" });
        let map = value.as_object().unwrap();
        let plain = signed_bytes(map, None).unwrap();
        assert_eq!(plain, signing_json(map).into_bytes());

        let key = HmacKey::from_bytes([9; 32]);
        let mac = signed_bytes(map, Some(&key)).unwrap();
        assert_eq!(mac.len(), 32);
        assert_ne!(mac, plain);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn leaf() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i32>().prop_map(Value::from),
                "\\PC{0,12}".prop_map(Value::String),
            ]
        }

        fn tree() -> impl Strategy<Value = Value> {
            leaf().prop_recursive(3, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                    prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                        .prop_map(|entries| Value::Object(entries.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn encoding_parses_back(value in tree()) {
                let text = canonical_json(&value);
                prop_assert_eq!(parse(&text), value);
            }

            #[test]
            fn legacy_bytes_match_length(text in "\\PC{0,32}") {
                prop_assert_eq!(legacy_bytes(&text).len(), legacy_length(&text));
            }
        }
    }
}
