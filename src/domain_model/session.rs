use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::OwnerId;

/// Opaque session identifier, intended to back a cookie value.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live session. Expiry is sliding: measured from `last_seen_at`, not
/// from issuance. `created_at` only matters for the optional absolute
/// lifetime cap and is reset by regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}
