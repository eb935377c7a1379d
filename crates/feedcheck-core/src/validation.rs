//! Single-message validation: structure, chain links, key and signature.

use serde_json::{Map, Value};

use crate::canonical::{key_from_canonical, signed_bytes};
use crate::crypto::{Ed25519Signature, HmacKey};
use crate::error::{CoreError, Rejection, ValidationError};
use crate::message::{Message, MessageValue};
use crate::types::feed_public_key;

/// Settings shared by every validator.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Network key. When set, signatures must cover the HMAC of the signed
    /// bytes under this key.
    pub hmac_key: Option<HmacKey>,

    /// Spread independent work (feeds, signatures) over the rayon pool.
    pub parallel: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            hmac_key: None,
            parallel: true,
        }
    }
}

impl ValidationConfig {
    /// Validate messages signed under a network key.
    pub fn with_hmac_key(mut self, key: HmacKey) -> Self {
        self.hmac_key = Some(key);
        self
    }

    /// Run everything on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Validate one message against its predecessor.
///
/// `previous` is the message at `sequence - 1` of the same feed, or `None`
/// if `message` must start a feed.
pub fn validate_single(
    message: &Message,
    previous: Option<&Message>,
    config: &ValidationConfig,
) -> Result<(), Rejection> {
    validate_message(message, previous, config)
        .map_err(|error| Rejection::new(message.key.as_str(), 0, error))
}

/// The checks behind every validator, in order. The first failure wins.
pub(crate) fn validate_message(
    message: &Message,
    previous: Option<&Message>,
    config: &ValidationConfig,
) -> Result<(), ValidationError> {
    // 1. Structure
    let value = MessageValue::parse(message)?;

    // 2. Sequence
    match previous {
        None => {
            if value.sequence != 1 {
                return Err(ValidationError::FirstMessageMustHaveSeqOne {
                    got: value.sequence,
                });
            }
        }
        Some(prev) => {
            let prev_author = prev.author().ok_or_else(|| {
                ValidationError::MalformedMessage("previous message has no author".into())
            })?;
            if prev_author != value.author {
                return Err(ValidationError::AuthorMismatch {
                    expected: prev_author.to_string(),
                    got: value.author.to_string(),
                });
            }

            let prev_seq = prev.sequence().ok_or_else(|| {
                ValidationError::MalformedMessage("previous message has no sequence".into())
            })?;
            let Some(expected) = prev_seq.checked_add(1) else {
                return Err(ValidationError::SequenceOutOfOrder {
                    expected: prev_seq,
                    got: value.sequence,
                });
            };
            if value.sequence != expected {
                return Err(ValidationError::SequenceOutOfOrder {
                    expected,
                    got: value.sequence,
                });
            }
        }
    }

    // 3. Chain link
    match (previous, value.previous) {
        (Some(prev), claimed) => {
            if claimed != Some(prev.key.as_str()) {
                return Err(ValidationError::PreviousHashMismatch {
                    expected: prev.key.clone(),
                    got: claimed.map(str::to_string),
                });
            }
        }
        (None, Some(claimed)) => {
            return Err(ValidationError::UnexpectedPrevious(claimed.to_string()));
        }
        (None, None) => {}
    }

    // 4. Key
    let computed = key_from_canonical(&value.canonical, value.hash)?;
    if computed != message.key {
        return Err(ValidationError::InvalidHash {
            claimed: message.key.clone(),
            computed,
        });
    }

    // 5. Signature
    check_signature(
        value.fields,
        value.author,
        value.signature,
        config.hmac_key.as_ref(),
    )?;

    Ok(())
}

/// Check an author's signature over a message value.
///
/// `fields` is the whole value; its `signature` field is left out of the
/// signed bytes.
pub fn check_signature(
    fields: &Map<String, Value>,
    author: &str,
    signature: &str,
    hmac_key: Option<&HmacKey>,
) -> Result<(), CoreError> {
    let public_key = feed_public_key(author)?;
    let signature = Ed25519Signature::parse(signature)?;
    let bytes = signed_bytes(fields, hmac_key)?;
    public_key.verify(&bytes, &signature)
}
