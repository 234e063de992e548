use chrono::{DateTime, Utc};

use crate::domain_model::{CredentialId, OwnerId};

/// Registry of explicitly invalidated credentials.
///
/// Consulted by any policy that accepts a credential, in addition to the
/// store's own expiry/consumption checks: a structurally valid
/// credential can still be revoked.
#[async_trait::async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// Record a revocation. Idempotent; re-revoking extends the entry to
    /// the later of the two expiries. `expires_at` should mirror the
    /// credential's own expiry so the entry can be swept once the
    /// credential would have lapsed regardless.
    async fn revoke(
        &self,
        credential_id: CredentialId,
        owner_id: Option<OwnerId>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RevocationError>;

    async fn is_revoked(&self, credential_id: &CredentialId) -> Result<bool, RevocationError>;

    /// Bulk revocation for one owner: the reuse-detection response and
    /// "log out everywhere". Returns how many entries were recorded.
    async fn revoke_all_for_owner(
        &self,
        owner_id: OwnerId,
        credential_ids: Vec<CredentialId>,
        expires_at: DateTime<Utc>,
    ) -> Result<usize, RevocationError>;

    /// Drop entries whose `expires_at` is strictly before `now`.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("registry error: {0}")]
    Store(String),
}
