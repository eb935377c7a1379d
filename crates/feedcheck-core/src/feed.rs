//! Feed state: the latest validated message of each known feed.
//!
//! Validation folds messages into a [`FeedState`] by value. A rejected
//! append hands the untouched state back alongside the rejection, so a
//! caller never observes a half-applied message.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::error::Rejection;
use crate::message::Message;
use crate::types::FeedId;
use crate::validation::{validate_message, ValidationConfig};

/// Heads of the feeds seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    heads: BTreeMap<FeedId, Message>,
}

/// A message that could not be appended.
#[derive(Debug, Error)]
#[error("append rejected: {rejection}")]
pub struct AppendError {
    /// The state before the failed append.
    pub state: FeedState,
    pub rejection: Rejection,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the state with already trusted heads.
    ///
    /// Messages without an author are ignored. For repeated authors the
    /// highest sequence wins.
    pub fn from_heads(heads: impl IntoIterator<Item = Message>) -> Self {
        Self::new().advance(heads)
    }

    /// The latest message of a feed.
    pub fn head(&self, author: &str) -> Option<&Message> {
        self.heads.get(author)
    }

    /// Sequence of the latest message of a feed, 0 if unknown.
    pub fn sequence(&self, author: &str) -> u64 {
        self.head(author)
            .and_then(Message::sequence)
            .unwrap_or(0)
    }

    /// Known feeds, in ascending order.
    pub fn feeds(&self) -> impl Iterator<Item = &FeedId> {
        self.heads.keys()
    }

    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Validate `message` against its feed's head and make it the new head.
    pub fn append(
        mut self,
        message: Message,
        config: &ValidationConfig,
    ) -> Result<Self, AppendError> {
        let head = message.author().and_then(|author| self.heads.get(author));
        if let Err(error) = validate_message(&message, head, config) {
            let rejection = Rejection::new(message.key.as_str(), 0, error);
            return Err(AppendError {
                state: self,
                rejection,
            });
        }

        let author = message.author().map(FeedId::from);
        if let Some(author) = author {
            self.heads.insert(author, message);
        }
        Ok(self)
    }

    /// Append messages in order, stopping at the first rejection.
    ///
    /// The rejection's index is the position in `messages`; the returned
    /// state holds everything appended before it.
    pub fn append_all(
        self,
        messages: impl IntoIterator<Item = Message>,
        config: &ValidationConfig,
    ) -> Result<Self, AppendError> {
        messages
            .into_iter()
            .enumerate()
            .try_fold(self, |state, (index, message)| {
                state.append(message, config).map_err(|mut e| {
                    e.rejection.index = index;
                    e
                })
            })
    }

    /// Record heads without validating them.
    pub fn advance(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        for message in messages {
            let Some(author) = message.author().map(FeedId::from) else {
                continue;
            };
            let seq = message.sequence().unwrap_or(0);
            if seq > self.sequence(author.as_str()) {
                self.heads.insert(author, message);
            }
        }
        self
    }
}
