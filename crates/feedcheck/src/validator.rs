//! The Validator: one configuration, every validation entry point.
//!
//! The synchronous methods run on the calling thread (and the rayon pool
//! when the configuration allows). The `_async` variants move the work onto
//! tokio's blocking pool so a runtime thread is never held by hashing and
//! signature checks.

use std::sync::Arc;

use feedcheck_core::{
    batch, validation, AppendError, FeedState, Message, Rejection, ValidationConfig,
};

use crate::error::Result;

/// Validates messages under a fixed configuration.
///
/// Cheap to clone; clones share the configuration.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: Arc<ValidationConfig>,
}

impl Validator {
    /// Create a validator.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Synchronous Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate one message against its predecessor.
    pub fn validate_single(&self, message: &Message, previous: Option<&Message>) -> Result<()> {
        report(
            "single",
            1,
            validation::validate_single(message, previous, &self.config),
        )
    }

    /// Validate a contiguous, ordered run of one feed.
    pub fn validate_batch(&self, messages: &[Message], previous: Option<&Message>) -> Result<()> {
        report(
            "batch",
            messages.len(),
            batch::validate_batch(messages, previous, &self.config),
        )
    }

    /// Validate complete feeds delivered in any order.
    pub fn validate_ooo_batch(&self, messages: &[Message]) -> Result<()> {
        report(
            "ooo_batch",
            messages.len(),
            batch::validate_ooo_batch(messages, &self.config),
        )
    }

    /// Validate messages from many feeds, continuing from `known` heads.
    pub fn validate_multi_author_batch(
        &self,
        messages: &[Message],
        known: &FeedState,
    ) -> Result<()> {
        report(
            "multi_author_batch",
            messages.len(),
            batch::validate_multi_author_batch(messages, known, &self.config),
        )
    }

    /// Check signatures only.
    pub fn verify_signatures(&self, messages: &[Message]) -> Result<()> {
        report(
            "signatures",
            messages.len(),
            batch::verify_signatures(messages, &self.config),
        )
    }

    /// Validate `message` and fold it into `state`.
    pub fn append(
        &self,
        state: FeedState,
        message: Message,
    ) -> std::result::Result<FeedState, AppendError> {
        state.append(message, &self.config).map_err(|e| {
            tracing::warn!("Rejected message: {}", e.rejection);
            e
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Async Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// [`Validator::validate_single`] on the blocking pool.
    pub async fn validate_single_async(
        &self,
        message: Message,
        previous: Option<Message>,
    ) -> Result<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.validate_single(&message, previous.as_ref()))
            .await?
    }

    /// [`Validator::validate_batch`] on the blocking pool.
    pub async fn validate_batch_async(
        &self,
        messages: Vec<Message>,
        previous: Option<Message>,
    ) -> Result<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.validate_batch(&messages, previous.as_ref()))
            .await?
    }

    /// [`Validator::validate_ooo_batch`] on the blocking pool.
    pub async fn validate_ooo_batch_async(&self, messages: Vec<Message>) -> Result<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.validate_ooo_batch(&messages)).await?
    }

    /// [`Validator::validate_multi_author_batch`] on the blocking pool.
    pub async fn validate_multi_author_batch_async(
        &self,
        messages: Vec<Message>,
        known: FeedState,
    ) -> Result<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.validate_multi_author_batch(&messages, &known))
            .await?
    }

    /// [`Validator::verify_signatures`] on the blocking pool.
    pub async fn verify_signatures_async(&self, messages: Vec<Message>) -> Result<()> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.verify_signatures(&messages)).await?
    }
}

/// Log the outcome and lift a rejection into the facade error.
fn report(
    op: &'static str,
    count: usize,
    result: std::result::Result<(), Rejection>,
) -> Result<()> {
    match result {
        Ok(()) => {
            tracing::debug!(op, count, "accepted");
            Ok(())
        }
        Err(rejection) => {
            tracing::warn!(
                op,
                index = rejection.index,
                kind = %rejection.kind(),
                "Rejected message {}: {}",
                rejection.key,
                rejection.error
            );
            Err(rejection.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcheck_core::{ErrorKind, Keypair, MessageBuilder};

    fn first(keypair: &Keypair) -> Message {
        MessageBuilder::new(keypair.feed_id(), 1)
            .timestamp(1u64)
            .sign(keypair)
            .unwrap()
    }

    #[test]
    fn test_rejection_surfaces() {
        let keypair = Keypair::from_seed(&[3; 32]);
        let validator = Validator::default();
        let message = MessageBuilder::new(keypair.feed_id(), 2)
            .sign(&keypair)
            .unwrap();

        let err = validator.validate_single(&message, None).unwrap_err();
        let rejection = err.rejection().unwrap();
        assert_eq!(rejection.kind(), ErrorKind::FirstMessageMustHaveSeqOne);
    }

    #[test]
    fn test_clones_share_config() {
        let validator = Validator::new(ValidationConfig::default().sequential());
        let clone = validator.clone();
        assert!(Arc::ptr_eq(&validator.config, &clone.config));
        assert!(!clone.config().parallel);
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let keypair = Keypair::from_seed(&[3; 32]);
        let validator = Validator::default();
        let message = first(&keypair);

        assert!(validator.validate_single(&message, None).is_ok());
        assert!(validator
            .validate_single_async(message.clone(), None)
            .await
            .is_ok());
        assert!(validator
            .verify_signatures_async(vec![message])
            .await
            .is_ok());
    }
}
