use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain_model::{CredentialId, OwnerId, RevocationEntry};
use crate::domain_port::{RevocationError, RevocationRegistry, Sweep};

/// In-memory revocation registry. Entry presence alone means revoked;
/// the stored expiry only bounds how long the entry must be kept.
#[derive(Default)]
pub struct InMemoryRevocationRegistry {
    entries: DashMap<CredentialId, RevocationEntry>,
}

impl InMemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RevocationRegistry for InMemoryRevocationRegistry {
    async fn revoke(
        &self,
        credential_id: CredentialId,
        owner_id: Option<OwnerId>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RevocationError> {
        match self.entries.entry(credential_id.clone()) {
            Entry::Occupied(mut present) => {
                let entry = present.get_mut();
                if expires_at > entry.expires_at {
                    entry.expires_at = expires_at;
                }
                if entry.owner_id.is_none() {
                    entry.owner_id = owner_id;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(RevocationEntry {
                    credential_id,
                    owner_id,
                    expires_at,
                });
            }
        }
        Ok(())
    }

    async fn is_revoked(&self, credential_id: &CredentialId) -> Result<bool, RevocationError> {
        Ok(self.entries.contains_key(credential_id))
    }

    async fn revoke_all_for_owner(
        &self,
        owner_id: OwnerId,
        credential_ids: Vec<CredentialId>,
        expires_at: DateTime<Utc>,
    ) -> Result<usize, RevocationError> {
        let count = credential_ids.len();
        for credential_id in credential_ids {
            self.revoke(credential_id, Some(owner_id.clone()), expires_at)
                .await?;
        }
        Ok(count)
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationError> {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if entry.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl Sweep for InMemoryRevocationRegistry {
    fn name(&self) -> &'static str {
        "revocations"
    }

    async fn sweep(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        Ok(self.sweep_expired(now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn revoked_id_reports_revoked() {
        let registry = InMemoryRevocationRegistry::new();
        let horizon = Utc::now() + Duration::minutes(5);

        registry
            .revoke(CredentialId("a".into()), None, horizon)
            .await
            .unwrap();

        assert!(registry.is_revoked(&CredentialId("a".into())).await.unwrap());
        assert!(!registry.is_revoked(&CredentialId("b".into())).await.unwrap());
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_keeps_the_later_expiry() {
        let registry = InMemoryRevocationRegistry::new();
        let near = Utc::now() + Duration::minutes(5);
        let far = near + Duration::minutes(5);

        registry
            .revoke(CredentialId("a".into()), None, far)
            .await
            .unwrap();
        registry
            .revoke(CredentialId("a".into()), Some(OwnerId("u1".into())), near)
            .await
            .unwrap();
        assert_eq!(registry.len(), 1);

        // Entry outlives the earlier horizon.
        let removed = registry.sweep_expired(near + Duration::minutes(1)).await.unwrap();
        assert_eq!(removed, 0);
        assert!(registry.is_revoked(&CredentialId("a".into())).await.unwrap());
    }

    #[tokio::test]
    async fn bulk_revocation_counts_and_covers_all_ids() {
        let registry = InMemoryRevocationRegistry::new();
        let horizon = Utc::now() + Duration::minutes(5);
        let ids = vec![CredentialId("a".into()), CredentialId("b".into())];

        let count = registry
            .revoke_all_for_owner(OwnerId("u1".into()), ids.clone(), horizon)
            .await
            .unwrap();
        assert_eq!(count, 2);

        for id in &ids {
            assert!(registry.is_revoked(id).await.unwrap());
        }
    }

    #[tokio::test]
    async fn sweep_drops_lapsed_entries() {
        let registry = InMemoryRevocationRegistry::new();
        let now = Utc::now();

        registry
            .revoke(CredentialId("dead".into()), None, now - Duration::seconds(1))
            .await
            .unwrap();
        registry
            .revoke(CredentialId("live".into()), None, now + Duration::minutes(5))
            .await
            .unwrap();

        let removed = registry.sweep_expired(now).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!registry.is_revoked(&CredentialId("dead".into())).await.unwrap());
        assert!(registry.is_revoked(&CredentialId("live".into())).await.unwrap());
    }
}
