//! Batch validation.
//!
//! Every validator here is fail-fast and reports the first failure as a
//! [`Rejection`] whose index points into the caller's slice. "First" is
//! deterministic: parallel runs report the same failure as sequential ones.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::error::{Rejection, ValidationError};
use crate::feed::FeedState;
use crate::message::Message;
use crate::validation::{check_signature, validate_message, ValidationConfig};

/// Validate a contiguous run of one feed.
///
/// `messages` must be in sequence order; `previous` is the message just
/// before the first one, or `None` if the run starts the feed.
pub fn validate_batch(
    messages: &[Message],
    previous: Option<&Message>,
    config: &ValidationConfig,
) -> Result<(), Rejection> {
    validate_chain(messages.iter().enumerate(), previous, config)
}

/// Validate a set of messages from one or more feeds, in any order.
///
/// Each feed in the set must be complete from sequence 1.
pub fn validate_ooo_batch(messages: &[Message], config: &ValidationConfig) -> Result<(), Rejection> {
    validate_multi_author_batch(messages, &FeedState::new(), config)
}

/// Validate a set of messages from one or more feeds, in any order,
/// continuing each feed from its head in `known`.
///
/// Messages are grouped by author and sorted by sequence; each group is
/// then checked as a chain. Groups are independent and run on the rayon
/// pool when `config.parallel` is set. When several groups fail, the one
/// whose author sorts first is reported.
pub fn validate_multi_author_batch(
    messages: &[Message],
    known: &FeedState,
    config: &ValidationConfig,
) -> Result<(), Rejection> {
    let partitions: Vec<(&str, Vec<usize>)> = partition_by_author(messages)?.into_iter().collect();

    let check = |(author, indices): &(&str, Vec<usize>)| {
        let chain = indices.iter().map(|&i| (i, &messages[i]));
        validate_chain(chain, known.head(author), config).err()
    };

    let failure = if config.parallel {
        partitions.par_iter().find_map_first(check)
    } else {
        partitions.iter().find_map(check)
    };

    failure.map_or(Ok(()), Err)
}

/// Check signatures only, ignoring chain order and keys.
///
/// Reports the failing message with the lowest index.
pub fn verify_signatures(messages: &[Message], config: &ValidationConfig) -> Result<(), Rejection> {
    let check = |(index, message): (usize, &Message)| {
        verify_one(message, config)
            .err()
            .map(|error| Rejection::new(message.key.as_str(), index, error))
    };

    let failure = if config.parallel {
        messages.par_iter().enumerate().find_map_first(check)
    } else {
        messages.iter().enumerate().find_map(check)
    };

    failure.map_or(Ok(()), Err)
}

/// Fold a chain from `head`, tagging failures with the paired index.
fn validate_chain<'a>(
    chain: impl IntoIterator<Item = (usize, &'a Message)>,
    head: Option<&'a Message>,
    config: &ValidationConfig,
) -> Result<(), Rejection> {
    chain
        .into_iter()
        .try_fold(head, |prev, (index, message)| {
            validate_message(message, prev, config)
                .map_err(|error| Rejection::new(message.key.as_str(), index, error))?;
            Ok(Some(message))
        })
        .map(|_| ())
}

/// Group message indices by author, each group sorted by sequence.
///
/// Ties keep input order. A message without an author is rejected before
/// any chain is checked.
fn partition_by_author(messages: &[Message]) -> Result<BTreeMap<&str, Vec<usize>>, Rejection> {
    let mut partitions: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, message) in messages.iter().enumerate() {
        let author = message.author().ok_or_else(|| {
            Rejection::new(
                message.key.as_str(),
                index,
                ValidationError::MalformedMessage("missing field: author".into()),
            )
        })?;
        partitions.entry(author).or_default().push(index);
    }

    for indices in partitions.values_mut() {
        indices.sort_by_key(|&i| (messages[i].sequence().unwrap_or(0), i));
    }
    Ok(partitions)
}

fn verify_one(message: &Message, config: &ValidationConfig) -> Result<(), ValidationError> {
    let fields = message
        .value
        .as_object()
        .ok_or_else(|| ValidationError::MalformedMessage("value must be an object".into()))?;
    let field = |name: &str| {
        fields
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ValidationError::MalformedMessage(format!("missing field: {name}")))
    };

    check_signature(
        fields,
        field("author")?,
        field("signature")?,
        config.hmac_key.as_ref(),
    )?;
    Ok(())
}
