use chrono::{DateTime, Utc};

use crate::domain_model::{CredentialId, CredentialRecord, OwnerId};

/// Keyed store of issued credentials. Implementations own their
/// synchronization: `mark_consumed_if_unused` must be linearizable per
/// id, so of N concurrent calls against one id at most one succeeds.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a freshly issued record. The id must be new.
    async fn put(&self, record: CredentialRecord) -> Result<(), CredentialStoreError>;

    /// Fetch a record by id. Does not evaluate expiry; consumed and
    /// expired records stay readable until deleted or swept.
    async fn get(&self, id: &CredentialId) -> Result<CredentialRecord, CredentialStoreError>;

    /// Atomically flip `consumed` from false to true.
    ///
    /// The check and the set happen under one critical section for the
    /// id. A record already consumed reports `AlreadyConsumed`; one past
    /// `expires_at` reports `Expired` without being mutated.
    async fn mark_consumed_if_unused(
        &self,
        id: &CredentialId,
        now: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;

    /// Record the successor produced by a rotation, for audit chaining.
    async fn link_successor(
        &self,
        id: &CredentialId,
        successor: &CredentialId,
    ) -> Result<(), CredentialStoreError>;

    /// All ids currently held for an owner, consumed or not.
    async fn ids_for_owner(&self, owner: &OwnerId) -> Result<Vec<CredentialId>, CredentialStoreError>;

    /// Remove a record. Removing an absent id is not an error.
    async fn delete(&self, id: &CredentialId) -> Result<(), CredentialStoreError>;

    /// Drop every record with `expires_at` strictly before `now` and
    /// return how many were dropped. Must not hold a whole-store lock;
    /// unrelated ids stay reachable while the sweep runs.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, CredentialStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("credential id already present")]
    DuplicateId,
    #[error("credential not found")]
    NotFound,
    #[error("credential expired")]
    Expired,
    #[error("credential already consumed")]
    AlreadyConsumed,
    #[error("store error: {0}")]
    Store(String),
}
