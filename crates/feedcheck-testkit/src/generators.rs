//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Value};

use feedcheck_core::{Keypair, Message, MessageBuilder};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a content type within the allowed length.
pub fn content_type() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{2,20}".prop_map(String::from)
}

/// Generate free text, including non-ASCII characters.
pub fn text() -> impl Strategy<Value = String> {
    "\\PC{0,64}".prop_map(String::from)
}

/// Generate message content.
pub fn content() -> impl Strategy<Value = Value> {
    prop_oneof![
        (content_type(), text()).prop_map(|(t, text)| json!({ "type": t, "text": text })),
        (content_type(), any::<bool>(), any::<i32>())
            .prop_map(|(t, flag, n)| json!({ "type": t, "flag": flag, "count": n })),
        "[A-Za-z0-9+/]{8,40}".prop_map(|body| Value::String(format!("{body}.box"))),
    ]
}

/// Generate a reasonable author timestamp.
pub fn timestamp() -> impl Strategy<Value = u64> {
    0u64..=1_700_000_000_000u64
}

/// Parameters for generating a feed.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub keypair: Keypair,
    pub timestamp: u64,
    pub contents: Vec<Value>,
}

impl Arbitrary for ChainParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            timestamp(),
            prop::collection::vec(content(), 1..=12),
        )
            .prop_map(|(seed, timestamp, contents)| ChainParams {
                keypair: Keypair::from_seed(&seed),
                timestamp,
                contents,
            })
            .boxed()
    }
}

/// Build a feed from parameters, one message per content.
pub fn chain_from_params(params: &ChainParams) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::with_capacity(params.contents.len());
    for (i, content) in params.contents.iter().enumerate() {
        let seq = i as u64 + 1;
        let mut builder = MessageBuilder::new(params.keypair.feed_id(), seq)
            .timestamp(params.timestamp + seq)
            .content(content.clone());
        if let Some(prev) = messages.last() {
            builder = builder.previous(prev.key.clone());
        }
        messages.push(
            builder
                .sign(&params.keypair)
                .expect("generated messages always sign"),
        );
    }
    messages
}
