//! # Feedcheck
//!
//! Validation of signed, hash-linked append-only feeds.
//!
//! ## Overview
//!
//! Every message names its author, its position in the author's feed and
//! the key of the message before it. Feedcheck checks that:
//!
//! - **Structure**: the value has exactly the expected fields and fits the size limit
//! - **Order**: sequences start at 1 and increase by one
//! - **Links**: each message points at the key of its predecessor
//! - **Keys**: the claimed key is the hash of the canonical value
//! - **Signatures**: the value is signed by the author's Ed25519 key
//!
//! ## Usage
//!
//! ```rust,no_run
//! use feedcheck::{Validator, ValidationConfig};
//! use feedcheck::core::{Keypair, MessageBuilder};
//!
//! fn example() -> feedcheck::Result<()> {
//!     let keypair = Keypair::generate();
//!     let first = MessageBuilder::new(keypair.feed_id(), 1)
//!         .timestamp(1_700_000_000_000u64)
//!         .sign(&keypair)
//!         .unwrap();
//!
//!     let validator = Validator::new(ValidationConfig::default());
//!     validator.validate_single(&first, None)?;
//!     validator.validate_ooo_batch(&[first])?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `feedcheck::core` - Message types, canonical encoding, and the
//!   validators as plain functions

pub mod error;
pub mod validator;

pub use feedcheck_core as core;

pub use error::{FeedcheckError, Result};
pub use validator::Validator;

pub use feedcheck_core::{
    AppendError, ErrorKind, FeedId, FeedState, HmacKey, Message, MsgKey, Rejection,
    ValidationConfig, ValidationError,
};
