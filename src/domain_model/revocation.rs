use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CredentialId, OwnerId};

/// An explicit early invalidation, independent of any stored credential.
///
/// `owner_id` is absent when a credential is revoked by its bare id (a
/// public JTI, for instance) and the issuing record is unknown or gone.
/// `expires_at` mirrors the credential's own expiry so the entry can be
/// swept once the credential would have died naturally anyway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationEntry {
    pub credential_id: CredentialId,
    pub owner_id: Option<OwnerId>,
    pub expires_at: DateTime<Utc>,
}

impl RevocationEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
