use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain_model::{CredentialId, CredentialRecord, OwnerId};
use crate::domain_port::{CredentialStore, CredentialStoreError, Sweep};

use super::util;

/// Sharded in-memory credential store. Every mutation runs under the
/// entry's shard guard, so check-and-set on one id is a single critical
/// section and a sweep never locks more than the shard it is walking.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: DashMap<CredentialId, CredentialRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn put(&self, record: CredentialRecord) -> Result<(), CredentialStoreError> {
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(CredentialStoreError::DuplicateId),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &CredentialId) -> Result<CredentialRecord, CredentialStoreError> {
        match self.records.get(id) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(CredentialStoreError::NotFound),
        }
    }

    async fn mark_consumed_if_unused(
        &self,
        id: &CredentialId,
        now: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let Some(mut entry) = self.records.get_mut(id) else {
            return Err(CredentialStoreError::NotFound);
        };

        // Collision guard on the keyed lookup.
        if !util::constant_time_eq(entry.key().0.as_bytes(), id.0.as_bytes()) {
            return Err(CredentialStoreError::NotFound);
        }

        if entry.is_expired(now) {
            return Err(CredentialStoreError::Expired);
        }
        if entry.consumed {
            return Err(CredentialStoreError::AlreadyConsumed);
        }

        entry.consumed = true;
        Ok(())
    }

    async fn link_successor(
        &self,
        id: &CredentialId,
        successor: &CredentialId,
    ) -> Result<(), CredentialStoreError> {
        let Some(mut entry) = self.records.get_mut(id) else {
            return Err(CredentialStoreError::NotFound);
        };
        entry.superseded_by = Some(successor.clone());
        Ok(())
    }

    async fn ids_for_owner(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<CredentialId>, CredentialStoreError> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.owner_id == *owner)
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn delete(&self, id: &CredentialId) -> Result<(), CredentialStoreError> {
        self.records.remove(id);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, CredentialStoreError> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            if record.is_expired(now) {
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
impl Sweep for InMemoryCredentialStore {
    fn name(&self) -> &'static str {
        "credentials"
    }

    async fn sweep(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        Ok(self.sweep_expired(now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(id: &str, owner: &str, expires_in_secs: i64) -> CredentialRecord {
        let now = Utc::now();
        CredentialRecord {
            id: CredentialId(id.to_owned()),
            owner_id: OwnerId(owner.to_owned()),
            issued_at: now,
            expires_at: now + Duration::seconds(expires_in_secs),
            consumed: false,
            superseded_by: None,
        }
    }

    #[tokio::test]
    async fn put_rejects_duplicate_ids() {
        let store = InMemoryCredentialStore::new();
        store.put(record("a", "u1", 60)).await.unwrap();

        let err = store.put(record("a", "u2", 60)).await.unwrap_err();
        assert!(matches!(err, CredentialStoreError::DuplicateId));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn mark_consumed_flips_exactly_once() {
        let store = InMemoryCredentialStore::new();
        store.put(record("a", "u1", 60)).await.unwrap();
        let now = Utc::now();

        store
            .mark_consumed_if_unused(&CredentialId("a".into()), now)
            .await
            .unwrap();

        let err = store
            .mark_consumed_if_unused(&CredentialId("a".into()), now)
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialStoreError::AlreadyConsumed));

        // Consumed records stay queryable until swept.
        let stored = store.get(&CredentialId("a".into())).await.unwrap();
        assert!(stored.consumed);
    }

    #[tokio::test]
    async fn mark_consumed_reports_expiry_without_mutating() {
        let store = InMemoryCredentialStore::new();
        store.put(record("a", "u1", -1)).await.unwrap();

        let err = store
            .mark_consumed_if_unused(&CredentialId("a".into()), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialStoreError::Expired));

        let stored = store.get(&CredentialId("a".into())).await.unwrap();
        assert!(!stored.consumed);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = InMemoryCredentialStore::new();
        let err = store
            .mark_consumed_if_unused(&CredentialId("missing".into()), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialStoreError::NotFound));
    }

    #[tokio::test]
    async fn link_successor_sets_audit_chain() {
        let store = InMemoryCredentialStore::new();
        store.put(record("old", "u1", 60)).await.unwrap();

        store
            .link_successor(&CredentialId("old".into()), &CredentialId("new".into()))
            .await
            .unwrap();

        let stored = store.get(&CredentialId("old".into())).await.unwrap();
        assert_eq!(stored.superseded_by, Some(CredentialId("new".into())));
    }

    #[tokio::test]
    async fn ids_for_owner_scopes_to_one_owner() {
        let store = InMemoryCredentialStore::new();
        store.put(record("a", "u1", 60)).await.unwrap();
        store.put(record("b", "u1", 60)).await.unwrap();
        store.put(record("c", "u2", 60)).await.unwrap();

        let mut ids = store.ids_for_owner(&OwnerId("u1".into())).await.unwrap();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(ids, vec![CredentialId("a".into()), CredentialId("b".into())]);
    }

    #[tokio::test]
    async fn sweep_removes_strictly_past_expiry_only() {
        let store = InMemoryCredentialStore::new();
        let now = Utc::now();

        let mut exact = record("exact", "u1", 0);
        exact.expires_at = now;
        store.put(exact).await.unwrap();
        store.put(record("dead", "u1", -10)).await.unwrap();
        store.put(record("live", "u1", 60)).await.unwrap();

        let removed = store.sweep_expired(now).await.unwrap();
        assert_eq!(removed, 1);

        // A record expiring exactly now survives until the next tick.
        assert!(store.get(&CredentialId("exact".into())).await.is_ok());
        assert!(store.get(&CredentialId("dead".into())).await.is_err());
        assert!(store.get(&CredentialId("live".into())).await.is_ok());
    }

    #[tokio::test]
    async fn delete_is_silent_for_absent_ids() {
        let store = InMemoryCredentialStore::new();
        store.delete(&CredentialId("missing".into())).await.unwrap();
    }
}
