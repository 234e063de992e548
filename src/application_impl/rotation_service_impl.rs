use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::application_port::{
    AccessToken, RefreshToken, RotationError, RotationService, TokenPair,
};
use crate::domain_model::{CredentialId, CredentialRecord, OwnerId};
use crate::domain_port::{
    Clock, CredentialStore, CredentialStoreError, RevocationRegistry, SecretSource, SECRET_BYTES,
};

#[derive(Debug, Clone)]
pub struct RotationConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Stored id of a refresh token: the SHA-256 digest of the bearer value.
/// The plaintext secret never rests in the store.
pub fn refresh_token_id(token: &RefreshToken) -> CredentialId {
    let mut hasher = Sha256::new();
    hasher.update(token.0.as_bytes());
    CredentialId(hex::encode(hasher.finalize()))
}

pub struct RealRotationService {
    credentials: Arc<dyn CredentialStore>,
    revocations: Arc<dyn RevocationRegistry>,
    secrets: Arc<dyn SecretSource>,
    clock: Arc<dyn Clock>,
    config: RotationConfig,
}

impl RealRotationService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        revocations: Arc<dyn RevocationRegistry>,
        secrets: Arc<dyn SecretSource>,
        clock: Arc<dyn Clock>,
        config: RotationConfig,
    ) -> Self {
        Self {
            credentials,
            revocations,
            secrets,
            clock,
            config,
        }
    }

    /// Horizon past which no credential of this service can still be
    /// live; used as the registry expiry when the record is gone.
    fn revocation_horizon(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now() + self.config.refresh_ttl
    }

    async fn revoke_lineage(&self, owner: &OwnerId) -> Result<usize, RotationError> {
        let ids = self.credentials.ids_for_owner(owner).await?;
        self.revocations
            .revoke_all_for_owner(owner.clone(), ids, self.revocation_horizon())
            .await
            .map_err(|e| RotationError::Store(e.to_string()))
    }
}

#[async_trait::async_trait]
impl RotationService for RealRotationService {
    async fn issue_pair(&self, owner_id: OwnerId) -> Result<TokenPair, RotationError> {
        let now = self.clock.now();

        let access_token = AccessToken(self.secrets.generate(SECRET_BYTES)?);
        let refresh_token = RefreshToken(self.secrets.generate(SECRET_BYTES)?);

        let record = CredentialRecord {
            id: refresh_token_id(&refresh_token),
            owner_id,
            issued_at: now,
            expires_at: now + self.config.refresh_ttl,
            consumed: false,
            superseded_by: None,
        };
        let refresh_expires_at = record.expires_at;
        self.credentials.put(record).await?;

        Ok(TokenPair {
            access_token,
            access_token_expires_at: now + self.config.access_ttl,
            refresh_token,
            refresh_token_expires_at: refresh_expires_at,
        })
    }

    async fn exchange(&self, refresh_token: &RefreshToken) -> Result<TokenPair, RotationError> {
        let id = refresh_token_id(refresh_token);

        let record = self.credentials.get(&id).await?;

        // Snapshot taken before the consume: replaying a consumed token
        // classifies as reuse even after its lineage got revoked.
        let revoked = self
            .revocations
            .is_revoked(&id)
            .await
            .map_err(|e| RotationError::Store(e.to_string()))?;

        let now = self.clock.now();
        if record.is_expired(now) {
            self.credentials.delete(&id).await?;
            tracing::info!(owner = %record.owner_id, "refresh token expired");
            return Err(RotationError::TokenExpired);
        }

        match self.credentials.mark_consumed_if_unused(&id, now).await {
            Ok(()) => {}
            Err(CredentialStoreError::AlreadyConsumed) => {
                let count = self.revoke_lineage(&record.owner_id).await?;
                tracing::warn!(
                    owner = %record.owner_id,
                    revoked = count,
                    "consumed refresh token replayed, owner lineage revoked"
                );
                return Err(RotationError::ReuseDetected);
            }
            Err(e) => return Err(e.into()),
        }

        if revoked {
            tracing::warn!(owner = %record.owner_id, "revoked refresh token presented");
            return Err(RotationError::TokenInvalid);
        }

        let pair = self.issue_pair(record.owner_id.clone()).await?;
        self.credentials
            .link_successor(&id, &refresh_token_id(&pair.refresh_token))
            .await?;

        Ok(pair)
    }

    async fn revoke(&self, refresh_token: &RefreshToken) -> Result<(), RotationError> {
        let id = refresh_token_id(refresh_token);

        let (owner, expires_at) = match self.credentials.get(&id).await {
            Ok(record) => (Some(record.owner_id), record.expires_at),
            Err(CredentialStoreError::NotFound) => (None, self.revocation_horizon()),
            Err(e) => return Err(e.into()),
        };

        self.revocations
            .revoke(id, owner, expires_at)
            .await
            .map_err(|e| RotationError::Store(e.to_string()))
    }

    async fn revoke_all_for_owner(&self, owner_id: OwnerId) -> Result<usize, RotationError> {
        let count = self.revoke_lineage(&owner_id).await?;
        tracing::info!(owner = %owner_id, count, "all credentials revoked for owner");
        Ok(count)
    }
}
