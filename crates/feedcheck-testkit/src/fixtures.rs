//! Test fixtures and helpers.
//!
//! Deterministic feeds for integration tests and benchmarks.

use feedcheck_core::{FeedId, HmacKey, Keypair, Message, MessageBuilder};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{json, Value};

/// Author timestamp of the first message in a fixture feed.
pub const BASE_TIMESTAMP: u64 = 1_470_000_000_000;

/// A feed author with a keypair and an optional network key.
pub struct FeedFixture {
    pub keypair: Keypair,
    pub hmac_key: Option<HmacKey>,
}

impl FeedFixture {
    /// Create a new fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
            hmac_key: None,
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            hmac_key: None,
        }
    }

    /// Sign everything under a network key.
    pub fn with_hmac_key(mut self, key: HmacKey) -> Self {
        self.hmac_key = Some(key);
        self
    }

    pub fn feed_id(&self) -> FeedId {
        self.keypair.feed_id()
    }

    /// Create a message following `previous` with the given content.
    pub fn make_message(&self, seq: u64, previous: Option<&Message>, content: Value) -> Message {
        let mut builder = MessageBuilder::new(self.feed_id(), seq)
            .timestamp(BASE_TIMESTAMP + seq * 1000)
            .content(content);
        if let Some(prev) = previous {
            builder = builder.previous(prev.key.clone());
        }
        if let Some(key) = &self.hmac_key {
            builder = builder.hmac_key(key.clone());
        }
        builder
            .sign(&self.keypair)
            .expect("fixture messages always sign")
    }

    /// Create a feed of `len` messages starting at sequence 1.
    pub fn make_feed(&self, len: u64) -> Vec<Message> {
        let mut messages = Vec::with_capacity(len as usize);
        self.extend_into(&mut messages, len);
        messages
    }

    /// Create `count` messages continuing from `head`.
    pub fn extend_feed(&self, head: &Message, count: u64) -> Vec<Message> {
        let mut messages = vec![head.clone()];
        self.extend_into(&mut messages, count);
        messages.remove(0);
        messages
    }

    fn extend_into(&self, messages: &mut Vec<Message>, count: u64) {
        for _ in 0..count {
            let prev = messages.last();
            let seq = prev.and_then(Message::sequence).unwrap_or(0) + 1;
            let message = self.make_message(seq, prev, sample_content(seq, &self.feed_id()));
            messages.push(message);
        }
    }
}

impl Default for FeedFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Content cycling through a few common message types.
pub fn sample_content(seq: u64, author: &FeedId) -> Value {
    match seq % 4 {
        0 => json!({ "type": "about", "about": author.as_str(), "name": format!("user-{seq}") }),
        1 => json!({ "type": "post", "text": format!("post number {seq}") }),
        2 => json!({
            "type": "contact",
            "contact": author.as_str(),
            "following": true,
            "blocking": false
        }),
        _ => json!({
            "type": "vote",
            "vote": { "link": author.as_str(), "value": 1, "expression": "Like" }
        }),
    }
}

/// Create multiple fixtures for multi-author tests.
pub fn multi_party_fixtures(count: usize) -> Vec<FeedFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0xfe;
            FeedFixture::with_seed(seed)
        })
        .collect()
}

/// Complete feeds of `authors` authors, `per_author` messages each,
/// shuffled with `seed`.
pub fn multi_author_feed(authors: usize, per_author: u64, seed: u64) -> Vec<Message> {
    let messages = multi_party_fixtures(authors)
        .iter()
        .flat_map(|fixture| fixture.make_feed(per_author))
        .collect();
    shuffled(messages, seed)
}

/// Deterministically shuffle messages.
pub fn shuffled(mut messages: Vec<Message>, seed: u64) -> Vec<Message> {
    let mut rng = StdRng::seed_from_u64(seed);
    messages.shuffle(&mut rng);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_chain() {
        let fixture = FeedFixture::with_seed([1; 32]);
        let feed = fixture.make_feed(5);

        assert_eq!(feed.len(), 5);
        for (i, pair) in feed.windows(2).enumerate() {
            assert_eq!(pair[1].previous(), Some(pair[0].key.as_str()));
            assert_eq!(pair[1].sequence(), Some(i as u64 + 2));
        }
        assert_eq!(feed[0].previous(), None);
    }

    #[test]
    fn test_extend_feed() {
        let fixture = FeedFixture::with_seed([1; 32]);
        let feed = fixture.make_feed(6);
        let tail = fixture.extend_feed(&feed[2], 3);

        let keys: Vec<_> = tail.iter().map(|m| m.key.clone()).collect();
        let expected: Vec<_> = feed[3..].iter().map(|m| m.key.clone()).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);
        let ids: Vec<_> = parties.iter().map(|p| p.feed_id()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[test]
    fn test_shuffle_deterministic() {
        let a = multi_author_feed(3, 4, 7);
        let b = multi_author_feed(3, 4, 7);
        assert_eq!(a.len(), 12);
        assert_eq!(a, b);
    }
}
