//! # Feedcheck Testkit
//!
//! Testing utilities for feedcheck.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Real messages with known keys and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic authors and feeds
//!
//! ## Golden Vectors
//!
//! ```rust
//! use feedcheck_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     let key = vector.message().compute_key().unwrap();
//!     assert_eq!(key, vector.expected_key());
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use feedcheck_testkit::generators::{chain_from_params, ChainParams};
//!
//! proptest! {
//!     #[test]
//!     fn keys_are_deterministic(params: ChainParams) {
//!         let a = chain_from_params(&params);
//!         let b = chain_from_params(&params);
//!         prop_assert_eq!(a, b);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use feedcheck_testkit::fixtures::FeedFixture;
//!
//! let fixture = FeedFixture::with_seed([7; 32]);
//! let feed = fixture.make_feed(5);
//! assert_eq!(feed.len(), 5);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_author_feed, multi_party_fixtures, shuffled, FeedFixture};
pub use generators::{chain_from_params, ChainParams};
pub use vectors::{all_vectors, sample_message, verify_all_vectors, GoldenVector};
