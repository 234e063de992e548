use chrono::{DateTime, Utc};

use crate::domain_model::{OwnerId, SessionId, SessionRecord};

use super::SecretSourceError;

/// Store of live sessions with sliding idle expiry.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, owner_id: OwnerId) -> Result<SessionRecord, SessionStoreError>;

    /// Refresh `last_seen_at`. A session past its idle timeout (or past
    /// the absolute lifetime cap, where configured) is removed and
    /// reported `Expired`; a later touch of the same id is `NotFound`.
    async fn touch(&self, id: &SessionId) -> Result<SessionRecord, SessionStoreError>;

    /// Swap the identifier on a trust-level change. The old id stops
    /// validating unconditionally, even if it was never ours; the new
    /// record keeps the owner and restarts `created_at`.
    async fn regenerate(
        &self,
        old_id: &SessionId,
        owner_id: OwnerId,
    ) -> Result<SessionRecord, SessionStoreError>;

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError>;

    /// Drop sessions whose idle timeout (or lifetime cap) elapsed before
    /// `now`.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session not found")]
    NotFound,
    #[error("session expired")]
    Expired,
    #[error(transparent)]
    Secret(#[from] SecretSourceError),
    #[error("store error: {0}")]
    Store(String),
}
