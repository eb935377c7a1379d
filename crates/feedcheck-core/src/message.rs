//! Message: the unit of validation.
//!
//! A message is a key-value-timestamp record. The value is kept as the raw
//! JSON object it arrived as, because its field order is part of what gets
//! hashed and signed. [`MessageValue`] is the checked, typed view of it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::canonical::{
    canonical_json, key_from_canonical, legacy_length, signed_bytes, MAX_MESSAGE_LENGTH,
    MAX_SAFE_INTEGER,
};
use crate::crypto::{HmacKey, Keypair};
use crate::error::{CoreError, ValidationError};
use crate::types::{is_link_shaped, split_tagged, FeedId, MsgKey, FEED_SIGIL, MSG_SIGIL, SHA256_TAG};

/// The fields of a message value, in wire order.
pub const VALUE_FIELDS: [&str; 7] = [
    "previous",
    "author",
    "sequence",
    "timestamp",
    "hash",
    "content",
    "signature",
];

/// Allowed length of `content.type`, in UTF-16 code units.
const CONTENT_TYPE_LENGTH: std::ops::RangeInclusive<usize> = 3..=52;

/// A message as stored and replicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The claimed content address of `value`.
    pub key: MsgKey,

    /// The signed message value, verbatim.
    pub value: Value,

    /// Local receive time (Unix milliseconds). Not hashed, not signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Message {
    /// Parse a message from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text).map_err(|e| CoreError::InvalidEncoding(e.to_string()))
    }

    pub fn author(&self) -> Option<&str> {
        self.value.get("author").and_then(Value::as_str)
    }

    pub fn sequence(&self) -> Option<u64> {
        self.value.get("sequence").and_then(Value::as_u64)
    }

    pub fn previous(&self) -> Option<&str> {
        self.value.get("previous").and_then(Value::as_str)
    }

    pub fn content(&self) -> Option<&Value> {
        self.value.get("content")
    }

    /// Recompute the key from the value.
    pub fn compute_key(&self) -> Result<MsgKey, CoreError> {
        crate::canonical::compute_key(&self.value)
    }
}

/// A structurally checked view of a message value.
#[derive(Debug, Clone)]
pub struct MessageValue<'a> {
    pub previous: Option<&'a str>,
    pub author: &'a str,
    pub sequence: u64,
    pub timestamp: &'a Number,
    pub hash: &'a str,
    pub content: &'a Value,
    pub signature: &'a str,

    /// The whole value object.
    pub fields: &'a Map<String, Value>,

    /// Canonical encoding of the whole value.
    pub canonical: String,
}

impl<'a> MessageValue<'a> {
    /// Check the shape of a message and borrow its fields.
    ///
    /// Only layout is checked here. Algorithm tags, decoded lengths, links
    /// and signatures are left to the validators.
    pub fn parse(message: &'a Message) -> Result<Self, ValidationError> {
        if !message.key.is_well_formed() {
            return Err(malformed(format!("invalid key: {}", message.key)));
        }

        let fields = message
            .value
            .as_object()
            .ok_or_else(|| malformed("value must be an object"))?;

        for name in fields.keys() {
            if !VALUE_FIELDS.contains(&name.as_str()) {
                return Err(malformed(format!("unexpected field: {name}")));
            }
        }

        let previous = match fields.get("previous") {
            Some(Value::Null) => None,
            Some(Value::String(s)) if is_link_shaped(s, MSG_SIGIL) => Some(s.as_str()),
            Some(_) => return Err(malformed("previous must be null or a message key")),
            None => return Err(malformed("missing field: previous")),
        };

        let author = match fields.get("author") {
            Some(Value::String(s)) if is_link_shaped(s, FEED_SIGIL) => s.as_str(),
            Some(_) => return Err(malformed("author must be a feed id")),
            None => return Err(malformed("missing field: author")),
        };

        let sequence = match fields.get("sequence") {
            Some(v) => match v.as_u64() {
                Some(n) if (1..=MAX_SAFE_INTEGER).contains(&n) => n,
                _ => {
                    return Err(malformed(format!(
                        "sequence must be an integer between 1 and {MAX_SAFE_INTEGER}"
                    )))
                }
            },
            None => return Err(malformed("missing field: sequence")),
        };

        let timestamp = match fields.get("timestamp") {
            Some(Value::Number(n)) => n,
            Some(_) => return Err(malformed("timestamp must be a number")),
            None => return Err(malformed("missing field: timestamp")),
        };

        let hash = match fields.get("hash") {
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Err(malformed("hash must be a string")),
            None => return Err(malformed("missing field: hash")),
        };

        let content = fields
            .get("content")
            .ok_or_else(|| malformed("missing field: content"))?;
        check_content(content)?;

        let signature = match fields.get("signature") {
            Some(Value::String(s)) if is_signature_shaped(s) => s.as_str(),
            Some(_) => return Err(malformed("signature must be a tagged signature string")),
            None => return Err(malformed("missing field: signature")),
        };

        // All seven are present and unique at this point.
        if !fields.keys().map(String::as_str).eq(VALUE_FIELDS.iter().copied()) {
            return Err(malformed("fields out of order"));
        }

        let canonical = canonical_json(&message.value);
        let length = legacy_length(&canonical);
        if length > MAX_MESSAGE_LENGTH {
            return Err(malformed(format!(
                "encoded message must not be larger than {MAX_MESSAGE_LENGTH} bytes, got {length}"
            )));
        }

        Ok(Self {
            previous,
            author,
            sequence,
            timestamp,
            hash,
            content,
            signature,
            fields,
            canonical,
        })
    }
}

/// Content is either an object with a `type`, or an encrypted string.
fn check_content(content: &Value) -> Result<(), ValidationError> {
    match content {
        Value::Object(map) => match map.get("type") {
            Some(Value::String(t)) if CONTENT_TYPE_LENGTH.contains(&legacy_length(t)) => Ok(()),
            Some(Value::String(_)) => Err(malformed(
                "content type must be between 3 and 52 characters",
            )),
            _ => Err(malformed("content must have a string type")),
        },
        Value::String(s) if is_encrypted(s) => Ok(()),
        _ => Err(malformed(
            "content must be an object or an encrypted string",
        )),
    }
}

/// `<base64>.sig.<tag>`
fn is_signature_shaped(s: &str) -> bool {
    matches!(split_tagged(s), Some((_, tag)) if tag.len() > 4 && tag.starts_with("sig."))
}

fn is_encrypted(s: &str) -> bool {
    s.ends_with(".box") || s.ends_with(".box2")
}

fn malformed(reason: impl Into<String>) -> ValidationError {
    ValidationError::MalformedMessage(reason.into())
}

/// Builder for creating signed messages.
///
/// Fields are laid out in wire order. The author is explicit so that
/// messages claiming someone else's feed can be built for tests.
pub struct MessageBuilder {
    author: FeedId,
    sequence: u64,
    previous: Option<MsgKey>,
    timestamp: Number,
    content: Value,
    hmac_key: Option<HmacKey>,
    received: Option<f64>,
}

impl MessageBuilder {
    /// Start building a message.
    pub fn new(author: FeedId, sequence: u64) -> Self {
        let mut content = Map::new();
        content.insert("type".into(), Value::String("post".into()));
        Self {
            author,
            sequence,
            previous: None,
            timestamp: Number::from(0),
            content: Value::Object(content),
            hmac_key: None,
            received: None,
        }
    }

    /// Set the previous message key.
    pub fn previous(mut self, key: MsgKey) -> Self {
        self.previous = Some(key);
        self
    }

    /// Set the author-claimed timestamp.
    pub fn timestamp(mut self, ts: impl Into<Number>) -> Self {
        self.timestamp = ts.into();
        self
    }

    /// Set the content.
    pub fn content(mut self, content: Value) -> Self {
        self.content = content;
        self
    }

    /// Sign under a network key.
    pub fn hmac_key(mut self, key: HmacKey) -> Self {
        self.hmac_key = Some(key);
        self
    }

    /// Set the local receive time.
    pub fn received_at(mut self, ts: f64) -> Self {
        self.received = Some(ts);
        self
    }

    /// Build, sign, and compute the key.
    pub fn sign(self, keypair: &Keypair) -> Result<Message, CoreError> {
        let mut fields = Map::new();
        fields.insert(
            "previous".into(),
            self.previous
                .map_or(Value::Null, |k| Value::String(k.as_str().to_string())),
        );
        fields.insert("author".into(), Value::String(self.author.as_str().to_string()));
        fields.insert("sequence".into(), Value::from(self.sequence));
        fields.insert("timestamp".into(), Value::Number(self.timestamp));
        fields.insert("hash".into(), Value::String(SHA256_TAG.into()));
        fields.insert("content".into(), self.content);

        let bytes = signed_bytes(&fields, self.hmac_key.as_ref())?;
        let signature = keypair.sign(&bytes);
        fields.insert("signature".into(), Value::String(signature.to_tagged()));

        let value = Value::Object(fields);
        let key = key_from_canonical(&canonical_json(&value), SHA256_TAG)?;

        Ok(Message {
            key,
            value,
            timestamp: self.received,
        })
    }
}
