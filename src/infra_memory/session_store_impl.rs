use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain_model::{OwnerId, SessionId, SessionRecord};
use crate::domain_port::{
    Clock, SECRET_BYTES, SecretSource, SessionStore, SessionStoreError, Sweep,
};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sliding window: a session untouched for this long is dead.
    pub idle_timeout: Duration,
    /// Optional hard cap measured from `created_at`, regardless of
    /// activity.
    pub max_lifetime: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_lifetime: None,
        }
    }
}

/// In-memory session store with sliding idle expiry.
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, SessionRecord>,
    secrets: Arc<dyn SecretSource>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl InMemorySessionStore {
    pub fn new(secrets: Arc<dyn SecretSource>, clock: Arc<dyn Clock>, config: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            secrets,
            clock,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_dead(&self, record: &SessionRecord, now: DateTime<Utc>) -> bool {
        if now > record.last_seen_at + self.config.idle_timeout {
            return true;
        }
        match self.config.max_lifetime {
            Some(cap) => now > record.created_at + cap,
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, owner_id: OwnerId) -> Result<SessionRecord, SessionStoreError> {
        let now = self.clock.now();
        let id = SessionId(self.secrets.generate(SECRET_BYTES)?);

        let record = SessionRecord {
            id: id.clone(),
            owner_id,
            created_at: now,
            last_seen_at: now,
        };

        match self.sessions.entry(id) {
            Entry::Occupied(_) => Err(SessionStoreError::Store(
                "session id collision".to_owned(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn touch(&self, id: &SessionId) -> Result<SessionRecord, SessionStoreError> {
        let now = self.clock.now();
        {
            let Some(mut entry) = self.sessions.get_mut(id) else {
                return Err(SessionStoreError::NotFound);
            };
            if !self.is_dead(&entry, now) {
                entry.last_seen_at = now;
                return Ok(entry.clone());
            }
        }
        // Guard dropped above; removing under it would deadlock the shard.
        self.sessions.remove(id);
        Err(SessionStoreError::Expired)
    }

    async fn regenerate(
        &self,
        old_id: &SessionId,
        owner_id: OwnerId,
    ) -> Result<SessionRecord, SessionStoreError> {
        if let Some((_, old)) = self.sessions.remove(old_id) {
            if old.owner_id != owner_id {
                tracing::warn!(
                    owner = %owner_id,
                    "session regeneration presented an id owned by another principal"
                );
            }
        }
        self.create(owner_id).await
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionStoreError> {
        let mut removed = 0;
        self.sessions.retain(|_, record| {
            if self.is_dead(record, now) {
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
impl Sweep for InMemorySessionStore {
    fn name(&self) -> &'static str {
        "sessions"
    }

    async fn sweep(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        Ok(self.sweep_expired(now).await?)
    }
}
