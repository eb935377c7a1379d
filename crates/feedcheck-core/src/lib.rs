//! # Feedcheck Core
//!
//! Pure primitives for validating signed, hash-linked append-only feeds:
//! canonical encoding, message keys, signatures and chain rules.
//!
//! This crate contains no I/O and no async runtime. Batch validators use
//! the rayon pool when asked to.
//!
//! ## Key Types
//!
//! - [`Message`] - A key, a signed value, and a receive time
//! - [`MsgKey`] - Content address of a message (`%<sha256>.sha256`)
//! - [`FeedId`] - Identifier of a feed (`@<ed25519 key>.ed25519`)
//! - [`FeedState`] - Heads of known feeds, advanced by validated appends
//!
//! ## Canonicalization
//!
//! Keys and signatures are computed over the two-space indented JSON text
//! of the value, in received field order. See the [`canonical`] module.

pub mod batch;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod feed;
pub mod message;
pub mod types;
pub mod validation;

pub use batch::{validate_batch, validate_multi_author_batch, validate_ooo_batch, verify_signatures};
pub use canonical::{canonical_json, compute_key, signed_bytes, MAX_MESSAGE_LENGTH};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, HmacKey, Keypair, Sha256Hash};
pub use error::{CoreError, ErrorKind, Rejection, ValidationError};
pub use feed::{AppendError, FeedState};
pub use message::{Message, MessageBuilder, MessageValue};
pub use types::{FeedId, MsgKey};
pub use validation::{check_signature, validate_single, ValidationConfig};
