//! Credential refresh trait.

use async_trait::async_trait;

use crate::credential::Credential;
use crate::error::RefreshFailure;

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Success(Credential),
    Failure(RefreshFailure),
}

/// Exchanges ambient long-lived session proof for a new credential.
///
/// Implementations make exactly one call per invocation and never retry.
/// They must not send the expired credential.
#[async_trait]
pub trait Refresher: Send + Sync {
    async fn refresh(&self) -> RefreshOutcome;
}
